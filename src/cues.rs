//! Audio cue hooks. Fire-and-forget; the engine never waits on them.

use std::io::Write;

/// Sound hooks the engine calls on gameplay events. Every method defaults to silence.
pub trait AudioCues {
    fn correct(&mut self) {}
    fn wrong(&mut self) {}
    fn missed_target(&mut self) {}
    /// Intro countdown, called with 3, 2, 1.
    fn countdown(&mut self, _n: u8) {}
    fn game_start(&mut self) {}
    fn game_over(&mut self) {}
    /// Menu / button click.
    fn click(&mut self) {}
}

/// No sound at all.
#[derive(Debug, Default)]
pub struct Muted;

impl AudioCues for Muted {}

/// Terminal stand-in for the sound layer: rings the bell on mistakes when enabled
/// and logs every cue.
#[derive(Debug, Default)]
pub struct TerminalBell {
    pub ring: bool,
}

impl TerminalBell {
    pub fn new(ring: bool) -> Self {
        Self { ring }
    }

    fn bell(&self) {
        if self.ring {
            let mut out = std::io::stdout();
            // BEL is harmless inside the alternate screen.
            let _ = out.write_all(b"\x07").and_then(|()| out.flush());
        }
    }
}

impl AudioCues for TerminalBell {
    fn correct(&mut self) {
        log::debug!("cue: correct");
    }

    fn wrong(&mut self) {
        log::debug!("cue: wrong");
        self.bell();
    }

    fn missed_target(&mut self) {
        log::debug!("cue: missed target");
        self.bell();
    }

    fn countdown(&mut self, n: u8) {
        log::debug!("cue: countdown {}", n);
    }

    fn game_start(&mut self) {
        log::debug!("cue: game start");
    }

    fn game_over(&mut self) {
        log::debug!("cue: game over");
    }

    fn click(&mut self) {
        log::trace!("cue: click");
    }
}

/// Records cues for assertions.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct Recorder(pub std::rc::Rc<std::cell::RefCell<Vec<Cue>>>);

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Correct,
    Wrong,
    MissedTarget,
    Countdown(u8),
    GameStart,
    GameOver,
    Click,
}

#[cfg(test)]
impl Recorder {
    pub fn cues(&self) -> Vec<Cue> {
        self.0.borrow().clone()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.0.borrow().iter().filter(|c| **c == cue).count()
    }
}

#[cfg(test)]
impl AudioCues for Recorder {
    fn correct(&mut self) {
        self.0.borrow_mut().push(Cue::Correct);
    }
    fn wrong(&mut self) {
        self.0.borrow_mut().push(Cue::Wrong);
    }
    fn missed_target(&mut self) {
        self.0.borrow_mut().push(Cue::MissedTarget);
    }
    fn countdown(&mut self, n: u8) {
        self.0.borrow_mut().push(Cue::Countdown(n));
    }
    fn game_start(&mut self) {
        self.0.borrow_mut().push(Cue::GameStart);
    }
    fn game_over(&mut self) {
        self.0.borrow_mut().push(Cue::GameOver);
    }
    fn click(&mut self) {
        self.0.borrow_mut().push(Cue::Click);
    }
}
