//! Lane partitioning of the playfield width.

use crate::config::{ALLOCATION_ATTEMPTS, MARGIN, MIN_BLOCK_WIDTH, MIN_SECTIONS, SECTION_MIN_WIDTH};
use rand::Rng;

/// Fraction of a lane's width used for random horizontal jitter.
const X_JITTER: f32 = 0.6;

/// Playfield size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A granted lane and the x coordinate inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub section: usize,
    pub x: f32,
}

/// Splits the viewport into equal lanes and tracks which are occupied.
#[derive(Debug, Clone)]
pub struct SectionAllocator {
    viewport: Viewport,
    /// Occupant count per lane; only >1 after a resize squeezed more blocks than lanes.
    occupied: Vec<u8>,
}

/// `max(MIN_SECTIONS, floor((width - 2 * margin) / SECTION_MIN_WIDTH))`.
pub fn section_count(width: f32) -> usize {
    let available = (width - 2.0 * MARGIN).max(0.0);
    ((available / SECTION_MIN_WIDTH).floor() as usize).max(MIN_SECTIONS)
}

impl SectionAllocator {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            occupied: vec![0; section_count(viewport.width)],
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn section_count(&self) -> usize {
        self.occupied.len()
    }

    pub fn section_width(&self) -> f32 {
        (self.viewport.width - 2.0 * MARGIN).max(0.0) / self.section_count() as f32
    }

    pub fn is_occupied(&self, section: usize) -> bool {
        self.occupied.get(section).is_some_and(|&n| n > 0)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&n| n > 0).count()
    }

    /// Probe random lanes for a free one. `None` after [`ALLOCATION_ATTEMPTS`] misses.
    pub fn allocate(&mut self, rng: &mut impl Rng) -> Option<Placement> {
        let count = self.section_count();
        for _ in 0..ALLOCATION_ATTEMPTS {
            let section = rng.random_range(0..count);
            if !self.is_occupied(section) {
                return Some(self.claim(section, rng));
            }
        }
        log::trace!(
            "no free lane after {} probes ({}/{} occupied)",
            ALLOCATION_ATTEMPTS,
            self.occupied_count(),
            count
        );
        None
    }

    /// Take a specific lane (may already be occupied; used by resize overflow).
    fn claim(&mut self, section: usize, rng: &mut impl Rng) -> Placement {
        self.occupied[section] = self.occupied[section].saturating_add(1);
        Placement {
            section,
            x: self.x_in_section(section, rng.random::<f32>()),
        }
    }

    pub fn release(&mut self, section: usize) {
        if let Some(n) = self.occupied.get_mut(section) {
            *n = n.saturating_sub(1);
        }
    }

    /// Horizontal position for lane `section` with jitter `r` in `0.0..1.0`.
    /// Kept inside the viewport and never left of the lane start.
    pub fn x_in_section(&self, section: usize, r: f32) -> f32 {
        let sw = self.section_width();
        let start = MARGIN + section as f32 * sw;
        let x = start + r * sw * X_JITTER;
        x.min(self.viewport.width - MIN_BLOCK_WIDTH - MARGIN).max(start)
    }

    /// Recompute lanes for a new viewport and hand every block (in order) a new
    /// placement. Free lanes are handed out first; if there are more blocks than
    /// lanes the rest share lanes round-robin.
    pub fn reassign(
        &mut self,
        viewport: Viewport,
        blocks: usize,
        rng: &mut impl Rng,
    ) -> Vec<Placement> {
        self.viewport = viewport;
        self.occupied = vec![0; section_count(viewport.width)];
        let count = self.section_count();
        if blocks > count {
            log::warn!("{} blocks squeezed into {} lanes after resize", blocks, count);
        }
        (0..blocks)
            .map(|i| {
                let free: Vec<usize> = (0..count).filter(|&s| !self.is_occupied(s)).collect();
                let section = if free.is_empty() {
                    i % count
                } else {
                    free[rng.random_range(0..free.len())]
                };
                self.claim(section, rng)
            })
            .collect()
    }
}
