//! Falling word blocks and their lifecycle.

use std::fmt;

/// Stable identifier used to correlate engine blocks with what the renderer drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a block while it is in the session.
///
/// A correct click moves `Falling` straight to `Exploding`; the block is
/// removed when the explosion ends. A block that leaves the screen is missed
/// and removed in the same step, so clicked, missed and removed are never
/// stored: they show up as `GameEvent`s instead. A wrong click only enters the
/// transient `Shaking` substate, which reverts to `Falling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Falling,
    Shaking,
    Exploding,
}

impl Lifecycle {
    /// Still travelling down the screen (and therefore subject to miss detection).
    pub fn is_falling(self) -> bool {
        matches!(self, Self::Falling | Self::Shaking)
    }
}

/// A single falling word instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub word: &'static str,
    pub section: usize,
    pub x: f32,
    pub is_target: bool,
    pub lifecycle: Lifecycle,
    /// Click-once latch; set by the first click of any kind.
    latched: bool,
}

impl Block {
    pub fn new(id: BlockId, word: &'static str, section: usize, x: f32, is_target: bool) -> Self {
        Self {
            id,
            word,
            section,
            x,
            is_target,
            lifecycle: Lifecycle::Falling,
            latched: false,
        }
    }

    /// Take the click latch. Returns false if the block was already clicked or is no
    /// longer falling.
    pub fn latch(&mut self) -> bool {
        if self.latched || !self.lifecycle.is_falling() {
            return false;
        }
        self.latched = true;
        true
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Correct click.
    pub fn explode(&mut self) {
        self.lifecycle = Lifecycle::Exploding;
    }

    pub fn start_shake(&mut self) {
        if self.lifecycle == Lifecycle::Falling {
            self.lifecycle = Lifecycle::Shaking;
        }
    }

    pub fn end_shake(&mut self) {
        if self.lifecycle == Lifecycle::Shaking {
            self.lifecycle = Lifecycle::Falling;
        }
    }
}
