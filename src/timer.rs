//! Round-scoped timers driven by the session's own clock.
//!
//! The host advances time in arbitrary steps; [`Timers::pop_due`] hands back every
//! expired entry in chronological order so periodic tasks never overlap.

use crate::block::BlockId;
use std::time::Duration;

/// Identity of one round. Every timer remembers the round it was armed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundId(pub u32);

impl RoundId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Intro countdown step.
    Countdown,
    /// One-second session clock.
    Clock,
    Spawn,
    MissCheck,
    EndShake(BlockId),
    RemoveExploded(BlockId),
}

#[derive(Debug, Clone)]
struct Entry {
    due: Duration,
    seq: u64,
    round: RoundId,
    period: Option<Duration>,
    kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct Timers {
    entries: Vec<Entry>,
    seq: u64,
    round: RoundId,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every pending timer and only accept entries for `round` from now on.
    pub fn cancel_all(&mut self, round: RoundId) {
        self.entries.clear();
        self.round = round;
    }

    /// Fire `kind` every `period`, first at `now + period`.
    pub fn every(&mut self, now: Duration, period: Duration, kind: TimerKind) {
        self.push(now + period, Some(period), kind);
    }

    /// Fire `kind` once at `now + delay`.
    pub fn after(&mut self, now: Duration, delay: Duration, kind: TimerKind) {
        self.push(now + delay, None, kind);
    }

    fn push(&mut self, due: Duration, period: Option<Duration>, kind: TimerKind) {
        self.seq += 1;
        self.entries.push(Entry {
            due,
            seq: self.seq,
            round: self.round,
            period,
            kind,
        });
    }

    /// Remove and return the earliest entry due at or before `until`.
    /// Periodic entries are re-armed one period later. Entries left over from a
    /// previous round are discarded instead of returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<(Duration, TimerKind)> {
        loop {
            let idx = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.due <= until)
                .min_by_key(|(_, e)| (e.due, e.seq))
                .map(|(i, _)| i)?;
            let entry = self.entries.swap_remove(idx);
            if entry.round != self.round {
                log::trace!("discarding stale {:?} from round {}", entry.kind, entry.round.0);
                continue;
            }
            if let Some(period) = entry.period {
                self.push(entry.due + period, Some(period), entry.kind);
            }
            return Some((entry.due, entry.kind));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn arm_stale(&mut self, round: RoundId, due: Duration, kind: TimerKind) {
        self.seq += 1;
        self.entries.push(Entry {
            due,
            seq: self.seq,
            round,
            period: None,
            kind,
        });
    }
}
