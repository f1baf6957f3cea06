//! Round state: spawn scheduling, block lifecycle, miss detection and the session clock.

use crate::block::{Block, BlockId};
use crate::config::{
    CLOCK_INTERVAL_MS, EXPLOSION_DURATION_MS, MISS_CHECK_INTERVAL_MS, SHAKE_DURATION_MS,
    SessionConfig, WORDS,
};
use crate::cues::AudioCues;
use crate::sections::{SectionAllocator, Viewport};
use crate::spawn::{WordPicker, random_target};
use crate::timer::{RoundId, TimerKind, Timers};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

/// Countdown steps shown during the intro (3, 2, 1).
const COUNTDOWN_STEPS: u8 = 3;

/// Vertical extent of a drawn block, as reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockExtent {
    pub top: f32,
    pub height: f32,
}

/// Renderer measurement callback. `None` means the block is not drawn yet.
pub trait BlockMeasure {
    fn measure_block(&self, id: BlockId) -> Option<BlockExtent>;
}

impl<F> BlockMeasure for F
where
    F: Fn(BlockId) -> Option<BlockExtent>,
{
    fn measure_block(&self, id: BlockId) -> Option<BlockExtent> {
        self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub correct_clicks: u32,
    pub wrong_clicks: u32,
    pub missed_targets: u32,
}

impl Stats {
    /// No mistakes and at least one hit.
    pub fn is_perfect(&self) -> bool {
        self.wrong_clicks == 0 && self.missed_targets == 0 && self.correct_clicks > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No round running.
    Idle,
    /// Target word shown, countdown running.
    Intro,
    Playing,
    /// Time ran out; stats are frozen.
    Ended,
}

/// One-shot notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RoundStarted { round: RoundId, target: &'static str },
    Countdown(u8),
    PlayStarted,
    Spawned { id: BlockId, word: &'static str, section: usize },
    Exploded { id: BlockId },
    Shaken { id: BlockId },
    MissedTarget { id: BlockId, section: usize },
    Removed { id: BlockId },
    RoundEnded { stats: Stats },
    PerfectRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Correct,
    Wrong,
    /// Unknown block, already clicked, or no round in play.
    Ignored,
}

/// A game session: owns the active blocks and runs one round at a time.
pub struct Session {
    config: SessionConfig,
    round: RoundId,
    phase: Phase,
    countdown: u8,
    time_remaining: u32,
    stats: Stats,
    blocks: Vec<Block>,
    sections: SectionAllocator,
    picker: WordPicker,
    timers: Timers,
    now: Duration,
    next_id: u64,
    rng: StdRng,
    cues: Box<dyn AudioCues>,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(config: SessionConfig, viewport: Viewport, cues: Box<dyn AudioCues>) -> Self {
        // Placeholder until `start` picks the round's target.
        let target = config.target_word.unwrap_or(WORDS[0]);
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            picker: WordPicker::new(target, config.spawn.target_chance),
            time_remaining: config.round_secs,
            config,
            round: RoundId::default(),
            phase: Phase::Idle,
            countdown: 0,
            stats: Stats::default(),
            blocks: Vec::new(),
            sections: SectionAllocator::new(viewport),
            timers: Timers::new(),
            now: Duration::ZERO,
            next_id: 1,
            rng,
            cues,
            events: Vec::new(),
        }
    }

    /// Start a fresh round, cancelling anything left from the previous one.
    pub fn start(&mut self) {
        self.reset(Phase::Idle);
        self.stats = Stats::default();
        self.time_remaining = self.config.round_secs;
        let target = match self.config.target_word {
            Some(word) => word,
            None => random_target(&mut self.rng),
        };
        self.picker = WordPicker::new(target, self.config.spawn.target_chance);
        log::info!(
            "round {} started: target '{}', difficulty {:?}",
            self.round.0,
            target,
            self.config.difficulty
        );
        self.events.push(GameEvent::RoundStarted {
            round: self.round,
            target,
        });

        if self.config.intro_duration.is_zero() {
            self.begin_play();
        } else {
            self.phase = Phase::Intro;
            self.countdown = COUNTDOWN_STEPS;
            self.cues.countdown(self.countdown);
            self.events.push(GameEvent::Countdown(self.countdown));
            let step = self.config.intro_duration / u32::from(COUNTDOWN_STEPS);
            self.timers.every(self.now, step, TimerKind::Countdown);
        }
    }

    /// Abort the current round without scoring it.
    pub fn stop(&mut self) {
        self.reset(Phase::Idle);
        log::debug!("session stopped");
    }

    /// Swap the difficulty used by the next `start`.
    pub fn reconfigure(&mut self, config: SessionConfig) {
        self.config = config;
    }

    /// New round identity, no timers, no blocks.
    fn reset(&mut self, phase: Phase) {
        self.round = self.round.next();
        self.timers.cancel_all(self.round);
        self.clear_blocks();
        self.phase = phase;
        self.countdown = 0;
    }

    fn clear_blocks(&mut self) {
        self.blocks.clear();
        self.sections = SectionAllocator::new(self.sections.viewport());
    }

    fn begin_play(&mut self) {
        self.timers.cancel_all(self.round);
        self.phase = Phase::Playing;
        self.cues.game_start();
        self.events.push(GameEvent::PlayStarted);

        for i in 0..self.config.spawn.initial_blocks {
            self.spawn_block(i == 0);
        }

        let now = self.now;
        self.timers.every(
            now,
            Duration::from_millis(CLOCK_INTERVAL_MS),
            TimerKind::Clock,
        );
        self.timers
            .every(now, self.config.spawn.spawn_interval, TimerKind::Spawn);
        self.timers.every(
            now,
            Duration::from_millis(MISS_CHECK_INTERVAL_MS),
            TimerKind::MissCheck,
        );
    }

    /// Move session time forward, firing every timer that falls due in order.
    pub fn advance(&mut self, dt: Duration, measure: &dyn BlockMeasure) {
        let until = self.now + dt;
        while let Some((due, kind)) = self.timers.pop_due(until) {
            self.now = due;
            self.fire(kind, measure);
        }
        self.now = until;
    }

    fn fire(&mut self, kind: TimerKind, measure: &dyn BlockMeasure) {
        match (kind, self.phase) {
            (TimerKind::Countdown, Phase::Intro) => self.countdown_step(),
            (TimerKind::Clock, Phase::Playing) => self.clock_tick(),
            (TimerKind::Spawn, Phase::Playing) => self.spawn_tick(),
            (TimerKind::MissCheck, Phase::Playing) => self.detect_misses(measure),
            (TimerKind::EndShake(id), Phase::Playing) => {
                if let Some(b) = self.blocks.iter_mut().find(|b| b.id == id) {
                    b.end_shake();
                }
            }
            (TimerKind::RemoveExploded(id), Phase::Playing) => self.remove_block(id),
            (kind, phase) => log::trace!("ignoring {:?} during {:?}", kind, phase),
        }
    }

    fn countdown_step(&mut self) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.begin_play();
        } else {
            self.cues.countdown(self.countdown);
            self.events.push(GameEvent::Countdown(self.countdown));
        }
    }

    fn clock_tick(&mut self) {
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.end_round();
        }
    }

    fn end_round(&mut self) {
        self.timers.cancel_all(self.round);
        self.clear_blocks();
        self.phase = Phase::Ended;
        self.cues.game_over();
        let stats = self.stats;
        log::info!(
            "round {} over: {} correct, {} wrong, {} missed",
            self.round.0,
            stats.correct_clicks,
            stats.wrong_clicks,
            stats.missed_targets
        );
        self.events.push(GameEvent::RoundEnded { stats });
        if stats.is_perfect() {
            self.events.push(GameEvent::PerfectRound);
        }
    }

    fn spawn_tick(&mut self) {
        if self.blocks.len() >= self.config.spawn.max_blocks {
            log::trace!("spawn skipped: {} blocks active", self.blocks.len());
            return;
        }
        self.spawn_block(false);
    }

    fn target_on_screen(&self) -> bool {
        self.blocks
            .iter()
            .any(|b| b.is_target && b.lifecycle.is_falling())
    }

    /// Allocate a lane and create a block. `force_target` skips the coin flip.
    fn spawn_block(&mut self, force_target: bool) -> Option<BlockId> {
        let placement = self.sections.allocate(&mut self.rng)?;
        let word = if force_target {
            self.picker.target()
        } else {
            let on_screen = self.target_on_screen();
            self.picker.pick(on_screen, &mut self.rng)
        };
        let id = BlockId(self.next_id);
        self.next_id += 1;
        let is_target = word == self.picker.target();
        self.blocks
            .push(Block::new(id, word, placement.section, placement.x, is_target));
        log::debug!(
            "spawned {} '{}' in lane {} at x={:.0}",
            id,
            word,
            placement.section,
            placement.x
        );
        self.events.push(GameEvent::Spawned {
            id,
            word,
            section: placement.section,
        });
        Some(id)
    }

    /// Resolve a click on block `id`.
    pub fn click(&mut self, id: BlockId) -> ClickOutcome {
        if self.phase != Phase::Playing {
            return ClickOutcome::Ignored;
        }
        let target = self.picker.target();
        let Some(block) = self.blocks.iter_mut().find(|b| b.id == id) else {
            return ClickOutcome::Ignored;
        };
        if !block.latch() {
            return ClickOutcome::Ignored;
        }
        if block.word == target {
            block.explode();
            self.stats.correct_clicks += 1;
            self.cues.correct();
            self.events.push(GameEvent::Exploded { id });
            self.timers.after(
                self.now,
                Duration::from_millis(EXPLOSION_DURATION_MS),
                TimerKind::RemoveExploded(id),
            );
            log::debug!("correct click on {}", id);
            ClickOutcome::Correct
        } else {
            block.start_shake();
            self.stats.wrong_clicks += 1;
            self.cues.wrong();
            self.events.push(GameEvent::Shaken { id });
            self.timers.after(
                self.now,
                Duration::from_millis(SHAKE_DURATION_MS),
                TimerKind::EndShake(id),
            );
            log::debug!("wrong click on {} ('{}')", id, block.word);
            ClickOutcome::Wrong
        }
    }

    /// The still-falling block in `section`, if any.
    pub fn block_in_section(&self, section: usize) -> Option<BlockId> {
        self.blocks
            .iter()
            .find(|b| b.section == section && b.lifecycle.is_falling())
            .map(|b| b.id)
    }

    fn detect_misses(&mut self, measure: &dyn BlockMeasure) {
        let bottom = self.sections.viewport().height;
        let missed: Vec<BlockId> = self
            .blocks
            .iter()
            .filter(|b| b.lifecycle.is_falling())
            .filter_map(|b| {
                let extent = measure.measure_block(b.id)?;
                if extent.top <= bottom {
                    return None;
                }
                log::trace!(
                    "{} left the playfield (top {:.0}, height {:.0})",
                    b.id,
                    extent.top,
                    extent.height
                );
                Some(b.id)
            })
            .collect();
        for id in missed {
            self.miss(id);
        }
    }

    fn miss(&mut self, id: BlockId) {
        let Some(block) = self.blocks.iter().find(|b| b.id == id) else {
            return;
        };
        if block.is_target {
            self.stats.missed_targets += 1;
            self.cues.missed_target();
            self.events.push(GameEvent::MissedTarget {
                id,
                section: block.section,
            });
            log::debug!("missed target {}", id);
        }
        self.remove_block(id);
    }

    fn remove_block(&mut self, id: BlockId) {
        let Some(idx) = self.blocks.iter().position(|b| b.id == id) else {
            return;
        };
        let block = self.blocks.remove(idx);
        self.sections.release(block.section);
        self.events.push(GameEvent::Removed { id });
    }

    /// New playfield size: lanes are recomputed and every active block is re-placed.
    pub fn resize(&mut self, viewport: Viewport) {
        let placements = self
            .sections
            .reassign(viewport, self.blocks.len(), &mut self.rng);
        for (block, p) in self.blocks.iter_mut().zip(placements) {
            block.section = p.section;
            block.x = p.x;
        }
        log::debug!(
            "resized to {:.0}x{:.0}: {} lanes",
            viewport.width,
            viewport.height,
            self.sections.section_count()
        );
    }

    /// Take the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target_word(&self) -> &'static str {
        self.picker.target()
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Current intro countdown value (0 outside the intro).
    pub fn countdown(&self) -> u8 {
        self.countdown
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn viewport(&self) -> Viewport {
        self.sections.viewport()
    }

    pub fn section_count(&self) -> usize {
        self.sections.section_count()
    }

    pub fn section_width(&self) -> f32 {
        self.sections.section_width()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// True when no timer is armed (idle or finished).
    pub fn is_quiescent(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn audio(&mut self) -> &mut dyn AudioCues {
        self.cues.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Lifecycle;
    use crate::config::{Difficulty, DifficultyConfig, GAME_DURATION_SECS};
    use crate::cues::{Cue, Recorder};
    use crate::fall::FallAnimator;
    use std::collections::HashSet;

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn unmounted(_: BlockId) -> Option<BlockExtent> {
        None
    }

    fn session_with(config: SessionConfig) -> (Session, Recorder) {
        let rec = Recorder::default();
        let session = Session::new(config, VIEWPORT, Box::new(rec.clone()));
        (session, rec)
    }

    fn config(difficulty: Difficulty, seed: u64) -> SessionConfig {
        let mut c = SessionConfig::new(difficulty, seed);
        c.intro_duration = Duration::ZERO;
        c.target_word = Some("der");
        c
    }

    fn started(difficulty: Difficulty, seed: u64) -> (Session, Recorder) {
        let (mut s, rec) = session_with(config(difficulty, seed));
        s.start();
        (s, rec)
    }

    fn assert_distinct_lanes(s: &Session) {
        let mut lanes = HashSet::new();
        for b in s.blocks() {
            assert!(lanes.insert(b.section), "lane {} shared", b.section);
            assert!(b.section < s.section_count());
        }
    }

    fn first_non_target(s: &Session) -> Option<BlockId> {
        s.blocks().iter().find(|b| !b.is_target).map(|b| b.id)
    }

    fn first_target(s: &Session) -> BlockId {
        s.blocks()
            .iter()
            .find(|b| b.is_target)
            .map(|b| b.id)
            .unwrap()
    }

    #[test]
    fn initial_blocks_always_include_target() {
        for difficulty in Difficulty::ALL {
            for seed in 0..50 {
                let (mut s, _) = session_with(SessionConfig {
                    target_word: None,
                    intro_duration: Duration::ZERO,
                    ..SessionConfig::new(difficulty, seed)
                });
                s.start();
                let target = s.target_word();
                assert!(s.blocks().iter().any(|b| b.word == target && b.is_target));
                assert!(s.blocks().len() <= difficulty.config().initial_blocks);
            }
        }
    }

    fn with_chance(difficulty: Difficulty, seed: u64, chance: f64) -> SessionConfig {
        let mut c = config(difficulty, seed);
        c.spawn = DifficultyConfig::builder(difficulty)
            .target_chance(chance)
            .build()
            .unwrap();
        c
    }

    #[test]
    fn lanes_stay_exclusive_while_spawning() {
        let (mut s, _) = started(Difficulty::Hard, 42);
        for _ in 0..300 {
            s.advance(ms(100), &unmounted);
            assert_distinct_lanes(&s);
            assert!(s.blocks().len() <= 10);
        }
    }

    #[test]
    fn lanes_stay_exclusive_across_removals() {
        let (mut s, _) = started(Difficulty::Hard, 42);
        let sink_every_third = |id: BlockId| {
            (id.0 % 3 == 0).then_some(BlockExtent {
                top: 601.0,
                height: 50.0,
            })
        };
        let mut removed = 0;
        for step in 0..300 {
            if step % 5 == 0 {
                let falling_target = s
                    .blocks()
                    .iter()
                    .find(|b| b.is_target && b.lifecycle.is_falling())
                    .map(|b| b.id);
                if let Some(id) = falling_target {
                    assert_eq!(s.click(id), ClickOutcome::Correct);
                }
                assert_distinct_lanes(&s);
            }
            s.advance(ms(100), &sink_every_third);
            removed += s
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::Removed { .. }))
                .count();
            assert_distinct_lanes(&s);
            assert!(s.blocks().len() <= 10);
        }
        assert!(removed > 0);
        assert!(s.stats().correct_clicks > 0);
    }

    #[test]
    fn saturation_blocks_new_spawns_until_removal() {
        let (mut s, _) = started(Difficulty::Easy, 3);
        s.advance(ms(30_000), &unmounted);
        assert_eq!(s.blocks().len(), 3);
        let before: Vec<BlockId> = s.blocks().iter().map(|b| b.id).collect();
        s.advance(ms(9_000), &unmounted);
        let after: Vec<BlockId> = s.blocks().iter().map(|b| b.id).collect();
        assert_eq!(before, after);

        let gone = before[0];
        let drop_one = move |id: BlockId| {
            (id == gone).then_some(BlockExtent {
                top: 1000.0,
                height: 50.0,
            })
        };
        s.advance(ms(100), &drop_one);
        assert_eq!(s.blocks().len(), 2);
        s.advance(ms(5_000), &unmounted);
        assert_eq!(s.blocks().len(), 3);
        assert!(s.blocks().iter().all(|b| b.id != gone));
    }

    #[test]
    fn double_click_on_target_scores_once() {
        let (mut s, rec) = started(Difficulty::Easy, 1);
        let id = first_target(&s);
        assert_eq!(s.click(id), ClickOutcome::Correct);
        assert_eq!(s.click(id), ClickOutcome::Ignored);
        assert_eq!(s.stats().correct_clicks, 1);
        assert_eq!(rec.count(Cue::Correct), 1);
    }

    #[test]
    fn wrong_click_shakes_but_keeps_falling() {
        let (mut s, rec) = session_with(with_chance(Difficulty::Normal, 9, 0.0));
        s.start();
        let id = first_non_target(&s).unwrap();
        assert_eq!(s.click(id), ClickOutcome::Wrong);
        assert_eq!(s.click(id), ClickOutcome::Ignored);
        assert_eq!(s.stats().wrong_clicks, 1);
        assert_eq!(rec.count(Cue::Wrong), 1);
        let state = |s: &Session| s.blocks().iter().find(|b| b.id == id).unwrap().lifecycle;
        assert_eq!(state(&s), Lifecycle::Shaking);
        s.advance(ms(500), &unmounted);
        assert_eq!(state(&s), Lifecycle::Falling);
        assert!(s.drain_events().contains(&GameEvent::Shaken { id }));
    }

    #[test]
    fn correct_click_explodes_then_frees_lane() {
        let (mut s, _) = started(Difficulty::Easy, 4);
        let id = first_target(&s);
        let lane = s.blocks().iter().find(|b| b.id == id).unwrap().section;
        s.click(id);
        assert_eq!(
            s.blocks().iter().find(|b| b.id == id).unwrap().lifecycle,
            Lifecycle::Exploding
        );
        s.advance(ms(499), &unmounted);
        assert!(s.blocks().iter().any(|b| b.id == id));
        s.advance(ms(1), &unmounted);
        assert!(s.blocks().iter().all(|b| b.id != id));
        assert!(!s.sections.is_occupied(lane));
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::Exploded { id }));
        assert!(events.contains(&GameEvent::Removed { id }));
    }

    #[test]
    fn exploding_block_is_not_missed() {
        let (mut s, _) = started(Difficulty::Easy, 4);
        let id = first_target(&s);
        s.click(id);
        let below = move |b: BlockId| {
            (b == id).then_some(BlockExtent {
                top: 601.0,
                height: 50.0,
            })
        };
        s.advance(ms(100), &below);
        assert_eq!(s.stats().missed_targets, 0);
        assert_eq!(s.stats().correct_clicks, 1);
    }

    #[test]
    fn only_target_misses_count() {
        let (mut s, rec) = started(Difficulty::Hard, 21);
        let targets = s.blocks().iter().filter(|b| b.is_target).count() as u32;
        let below = |_: BlockId| {
            Some(BlockExtent {
                top: 601.0,
                height: 50.0,
            })
        };
        s.advance(ms(100), &below);
        assert!(s.blocks().is_empty());
        assert_eq!(s.stats().missed_targets, targets);
        assert_eq!(s.stats().wrong_clicks, 0);
        assert_eq!(s.stats().correct_clicks, 0);
        assert_eq!(rec.count(Cue::MissedTarget), targets as usize);
    }

    #[test]
    fn unmeasured_blocks_are_retried() {
        let (mut s, _) = started(Difficulty::Easy, 8);
        let count = s.blocks().len();
        s.advance(ms(1_000), &unmounted);
        assert!(s.blocks().len() >= count);
        assert_eq!(s.stats().missed_targets, 0);
    }

    #[test]
    fn block_above_bottom_is_not_missed() {
        let (mut s, _) = started(Difficulty::Easy, 8);
        let at_edge = |_: BlockId| {
            Some(BlockExtent {
                top: 600.0,
                height: 50.0,
            })
        };
        s.advance(ms(100), &at_edge);
        assert_eq!(s.stats().missed_targets, 0);
        assert!(!s.blocks().is_empty());
    }

    #[test]
    fn round_ends_exactly_at_zero() {
        let (mut s, rec) = started(Difficulty::Normal, 2);
        s.advance(ms(u64::from(GAME_DURATION_SECS) * 1000 - 1), &unmounted);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.time_remaining(), 1);
        s.advance(ms(1), &unmounted);
        assert_eq!(s.phase(), Phase::Ended);
        assert_eq!(s.time_remaining(), 0);
        assert!(s.blocks().is_empty());
        assert!(s.is_quiescent());
        assert_eq!(rec.count(Cue::GameOver), 1);
    }

    #[test]
    fn stats_are_frozen_after_the_round() {
        let (mut s, _) = started(Difficulty::Easy, 2);
        let id = first_target(&s);
        s.advance(ms(45_000), &unmounted);
        assert_eq!(s.click(id), ClickOutcome::Ignored);
        s.advance(ms(10_000), &unmounted);
        assert_eq!(s.stats(), Stats::default());
        assert_eq!(s.phase(), Phase::Ended);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::RoundEnded {
            stats: Stats::default()
        }));
        assert!(!events.contains(&GameEvent::PerfectRound));
    }

    #[test]
    fn perfect_needs_a_hit_and_no_mistakes() {
        let hit = Stats {
            correct_clicks: 1,
            ..Stats::default()
        };
        assert!(hit.is_perfect());
        assert!(!Stats::default().is_perfect());
        assert!(
            !Stats {
                wrong_clicks: 1,
                ..hit
            }
            .is_perfect()
        );
        assert!(
            !Stats {
                missed_targets: 1,
                ..hit
            }
            .is_perfect()
        );
    }

    #[test]
    fn wrong_click_spoils_perfect_round() {
        let (mut s, _) = session_with(with_chance(Difficulty::Normal, 9, 0.0));
        s.start();
        assert_eq!(s.click(first_target(&s)), ClickOutcome::Correct);
        assert_eq!(s.click(first_non_target(&s).unwrap()), ClickOutcome::Wrong);
        s.advance(ms(45_000), &unmounted);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::RoundEnded {
            stats: Stats {
                correct_clicks: 1,
                wrong_clicks: 1,
                missed_targets: 0,
            }
        }));
        assert!(!events.contains(&GameEvent::PerfectRound));
    }

    #[test]
    fn missed_target_spoils_perfect_round() {
        let (mut s, _) = session_with(with_chance(Difficulty::Easy, 9, 1.0));
        s.start();
        assert_eq!(s.blocks().len(), 2);
        let hit = s.blocks()[0].id;
        let lost = s.blocks()[1].id;
        assert_eq!(s.click(hit), ClickOutcome::Correct);
        let sink = move |id: BlockId| {
            (id == lost).then_some(BlockExtent {
                top: 601.0,
                height: 50.0,
            })
        };
        s.advance(ms(100), &sink);
        assert_eq!(s.stats().missed_targets, 1);
        s.advance(ms(45_000), &unmounted);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::RoundEnded {
            stats: Stats {
                correct_clicks: 1,
                wrong_clicks: 0,
                missed_targets: 1,
            }
        }));
        assert!(!events.contains(&GameEvent::PerfectRound));
    }

    #[test]
    fn first_round_target_comes_from_the_seed() {
        for seed in 0..20 {
            let (mut s, _) = session_with(SessionConfig {
                target_word: None,
                intro_duration: Duration::ZERO,
                ..SessionConfig::new(Difficulty::Easy, seed)
            });
            s.start();
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(s.target_word(), random_target(&mut rng));
        }
    }

    #[test]
    fn restart_discards_pending_callbacks() {
        let (mut s, _) = started(Difficulty::Easy, 6);
        let old_round = s.round;
        let id = first_target(&s);
        s.click(id);
        s.start();
        assert_ne!(s.round, old_round);
        assert_eq!(s.stats(), Stats::default());
        let fresh: Vec<BlockId> = s.blocks().iter().map(|b| b.id).collect();
        assert!(fresh.iter().all(|b| *b != id));
        // The old explosion timer would have fired here.
        s.advance(ms(600), &unmounted);
        let now: Vec<BlockId> = s.blocks().iter().map(|b| b.id).take(fresh.len()).collect();
        assert_eq!(now, fresh);
        assert_eq!(s.stats(), Stats::default());
    }

    #[test]
    fn stop_cancels_everything() {
        let (mut s, _) = started(Difficulty::Hard, 6);
        s.stop();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.blocks().is_empty());
        assert!(s.is_quiescent());
        s.advance(ms(60_000), &unmounted);
        assert!(s.blocks().is_empty());
        assert_eq!(s.time_remaining(), GAME_DURATION_SECS);
    }

    #[test]
    fn intro_counts_down_before_play() {
        let mut c = config(Difficulty::Easy, 12);
        c.intro_duration = ms(3000);
        let (mut s, rec) = session_with(c);
        s.start();
        assert_eq!(s.phase(), Phase::Intro);
        assert!(s.blocks().is_empty());
        assert_eq!(s.click(BlockId(1)), ClickOutcome::Ignored);
        s.advance(ms(2_999), &unmounted);
        assert_eq!(s.phase(), Phase::Intro);
        assert_eq!(s.countdown(), 1);
        s.advance(ms(1), &unmounted);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.blocks().len(), 2);
        assert_eq!(
            rec.cues(),
            vec![
                Cue::Countdown(3),
                Cue::Countdown(2),
                Cue::Countdown(1),
                Cue::GameStart
            ]
        );
        // Clock starts with play, not with the intro.
        s.advance(ms(44_999), &unmounted);
        assert_eq!(s.phase(), Phase::Playing);
    }

    #[test]
    fn resize_reassigns_without_collisions() {
        let mut c = config(Difficulty::Hard, 17);
        c.spawn = DifficultyConfig::builder(Difficulty::Hard)
            .max_blocks(5)
            .build()
            .unwrap();
        let (mut s, _) = session_with(c);
        s.start();
        s.resize(Viewport::new(1920.0, 1080.0));
        s.advance(ms(6_000), &unmounted);
        let count = s.blocks().len();
        assert!((3..=5).contains(&count));
        let shrunk = Viewport::new(1000.0, 700.0);
        s.resize(shrunk);
        assert_eq!(s.blocks().len(), count);
        assert_eq!(s.section_count(), 6);
        assert_distinct_lanes(&s);
        for b in s.blocks() {
            assert!(b.x >= crate::config::MARGIN && b.x < shrunk.width);
        }
    }

    #[test]
    fn lane_key_finds_block() {
        let (mut s, _) = started(Difficulty::Easy, 5);
        let b = s.blocks()[0].clone();
        assert!(b.is_target);
        assert_eq!(s.block_in_section(b.section), Some(b.id));
        assert_eq!(s.click(b.id), ClickOutcome::Correct);
        assert_eq!(s.block_in_section(b.section), None);
    }

    #[test]
    fn perfect_round_end_to_end() {
        let (mut s, rec) = started(Difficulty::Easy, 2024);
        let mut anim = FallAnimator::new(
            s.config().spawn.fall_duration,
            s.viewport(),
            crate::config::BLOCK_HEIGHT,
        );
        let mut spawned_targets = 0;
        let mut clicked = 0;
        let mut perfect = false;
        loop {
            for event in s.drain_events() {
                match event {
                    GameEvent::Spawned { word, .. } if word == "der" => spawned_targets += 1,
                    GameEvent::PerfectRound => perfect = true,
                    _ => {}
                }
            }
            if s.phase() == Phase::Ended {
                break;
            }
            let targets: Vec<BlockId> = s
                .blocks()
                .iter()
                .filter(|b| b.word == "der" && b.lifecycle.is_falling())
                .map(|b| b.id)
                .collect();
            for id in targets {
                assert_eq!(s.click(id), ClickOutcome::Correct);
                clicked += 1;
            }
            anim.sync(s.blocks(), s.now());
            s.advance(ms(100), &anim);
        }
        let stats = s.stats();
        assert_eq!(stats.wrong_clicks, 0);
        assert_eq!(stats.missed_targets, 0);
        assert_eq!(stats.correct_clicks, clicked);
        assert!(stats.correct_clicks >= 1);
        assert!(spawned_targets >= clicked);
        assert!(perfect);
        assert_eq!(rec.count(Cue::GameOver), 1);
    }
}
