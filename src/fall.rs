//! Renderer-side fall animation: linear descent from above the playfield to
//! below it, measured for the engine's miss detector.

use crate::block::{Block, BlockId};
use crate::game::{BlockExtent, BlockMeasure};
use crate::sections::Viewport;
use std::collections::HashMap;
use std::time::Duration;

/// Extra distance below the viewport the animation travels (px).
const OVERSHOOT: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct FallAnimator {
    /// Session time each block was first drawn.
    mounted: HashMap<BlockId, Duration>,
    fall_duration: Duration,
    viewport: Viewport,
    block_height: f32,
    now: Duration,
}

impl FallAnimator {
    pub fn new(fall_duration: Duration, viewport: Viewport, block_height: f32) -> Self {
        Self {
            mounted: HashMap::new(),
            fall_duration,
            viewport,
            block_height,
            now: Duration::ZERO,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_fall_duration(&mut self, fall_duration: Duration) {
        self.fall_duration = fall_duration;
    }

    /// Mount blocks seen for the first time, forget removed ones and move the clock.
    pub fn sync(&mut self, blocks: &[Block], now: Duration) {
        self.now = now;
        self.mounted
            .retain(|id, _| blocks.iter().any(|b| b.id == *id));
        for b in blocks {
            self.mounted.entry(b.id).or_insert(now);
        }
    }

    pub fn clear(&mut self) {
        self.mounted.clear();
    }

    /// Top edge of a mounted block at the current time.
    pub fn top(&self, id: BlockId) -> Option<f32> {
        let mounted_at = *self.mounted.get(&id)?;
        let elapsed = self.now.saturating_sub(mounted_at).as_secs_f32();
        let t = elapsed / self.fall_duration.as_secs_f32().max(f32::EPSILON);
        let start = -self.block_height;
        let end = self.viewport.height + OVERSHOOT;
        Some(start + (end - start) * t.min(1.0))
    }
}

impl BlockMeasure for FallAnimator {
    fn measure_block(&self, id: BlockId) -> Option<BlockExtent> {
        self.top(id).map(|top| BlockExtent {
            top,
            height: self.block_height,
        })
    }
}
