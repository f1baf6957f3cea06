//! Difficulty presets, round timing constants and the word list.

use std::time::Duration;
use thiserror::Error;

/// Round length in seconds (same for every difficulty).
pub const GAME_DURATION_SECS: u32 = 45;
/// Intro (target word + countdown) before blocks start falling.
pub const INTRO_DURATION_MS: u64 = 3000;
/// How long success / error / missed banners stay visible.
pub const FEEDBACK_DURATION_MS: u64 = 1500;
/// Wrong-click wobble.
pub const SHAKE_DURATION_MS: u64 = 500;
/// Correct-click explosion before the block is removed.
pub const EXPLOSION_DURATION_MS: u64 = 500;
/// Miss detector period.
pub const MISS_CHECK_INTERVAL_MS: u64 = 100;
/// Session clock period.
pub const CLOCK_INTERVAL_MS: u64 = 1000;

/// Horizontal margin on both sides of the playfield (px).
pub const MARGIN: f32 = 10.0;
/// A lane is never narrower than this (px).
pub const SECTION_MIN_WIDTH: f32 = 150.0;
/// Narrowest word box the renderer draws (px).
pub const MIN_BLOCK_WIDTH: f32 = 120.0;
/// Nominal height of a word box (px).
pub const BLOCK_HEIGHT: f32 = 50.0;
/// Lower bound for the lane count on narrow screens.
pub const MIN_SECTIONS: usize = 3;
/// Random lane probes before a spawn is given up for this tick.
pub const ALLOCATION_ATTEMPTS: usize = 15;

/// Words the blocks are drawn from.
pub const WORDS: &[&str] = &[
    "der", "die", "das", "und", "ist", "von", "mit", "auf", "für", "aus", "bei", "bis", "hat",
    "war", "zur", "wie", "dem", "nur", "vor", "zum",
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("target chance must be within 0.0..=1.0, got {0}")]
    TargetChance(f64),
    #[error("max blocks must be at least 1")]
    NoBlocks,
    #[error("initial blocks ({initial}) exceed max blocks ({max})")]
    TooManyInitial { initial: usize, max: usize },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("'{0}' is not in the word list")]
    UnknownWord(String),
}

/// Difficulty tier selectable from the menu or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Difficulty {
    #[default]
    #[value(alias = "leicht")]
    Easy,
    Normal,
    #[value(alias = "schwer")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    pub fn name(self) -> &'static str {
        match self {
            Self::Easy => "Leicht",
            Self::Normal => "Normal",
            Self::Hard => "Schwer",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Easy => "Perfekt zum Üben",
            Self::Normal => "Für geübte Leser",
            Self::Hard => "Für Blitzlese-Profis",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Easy => Self::Normal,
            Self::Normal => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Easy => Self::Hard,
            Self::Normal => Self::Easy,
            Self::Hard => Self::Normal,
        }
    }

    /// Preset descriptor for this tier.
    pub fn config(self) -> DifficultyConfig {
        match self {
            Self::Easy => DifficultyConfig {
                spawn_interval: Duration::from_millis(3000),
                max_blocks: 3,
                initial_blocks: 2,
                target_chance: 0.3,
                fall_duration: Duration::from_secs(12),
            },
            Self::Normal => DifficultyConfig {
                spawn_interval: Duration::from_millis(2000),
                max_blocks: 6,
                initial_blocks: 2,
                target_chance: 0.25,
                fall_duration: Duration::from_secs(8),
            },
            Self::Hard => DifficultyConfig {
                spawn_interval: Duration::from_millis(1500),
                max_blocks: 10,
                initial_blocks: 3,
                target_chance: 0.2,
                fall_duration: Duration::from_secs(6),
            },
        }
    }
}

/// Per-round spawn parameters. Immutable once a round has started.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyConfig {
    pub spawn_interval: Duration,
    pub max_blocks: usize,
    pub initial_blocks: usize,
    pub target_chance: f64,
    pub fall_duration: Duration,
}

impl DifficultyConfig {
    pub fn builder(base: Difficulty) -> DifficultyConfigBuilder {
        DifficultyConfigBuilder::new(base)
    }
}

/// Starts from a preset and applies optional overrides, validating on `build`.
#[derive(Debug, Clone)]
pub struct DifficultyConfigBuilder {
    config: DifficultyConfig,
}

impl DifficultyConfigBuilder {
    pub fn new(base: Difficulty) -> Self {
        Self {
            config: base.config(),
        }
    }

    pub fn spawn_interval(&mut self, x: Duration) -> &mut Self {
        self.config.spawn_interval = x;
        self
    }

    pub fn max_blocks(&mut self, x: usize) -> &mut Self {
        self.config.max_blocks = x;
        self
    }

    pub fn initial_blocks(&mut self, x: usize) -> &mut Self {
        self.config.initial_blocks = x;
        self
    }

    pub fn target_chance(&mut self, x: f64) -> &mut Self {
        self.config.target_chance = x;
        self
    }

    pub fn fall_duration(&mut self, x: Duration) -> &mut Self {
        self.config.fall_duration = x;
        self
    }

    pub fn build(&self) -> Result<DifficultyConfig, ConfigError> {
        let c = &self.config;
        if !(0.0..=1.0).contains(&c.target_chance) {
            return Err(ConfigError::TargetChance(c.target_chance));
        }
        if c.max_blocks == 0 {
            return Err(ConfigError::NoBlocks);
        }
        if c.initial_blocks > c.max_blocks {
            return Err(ConfigError::TooManyInitial {
                initial: c.initial_blocks,
                max: c.max_blocks,
            });
        }
        if c.spawn_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("spawn interval"));
        }
        if c.fall_duration.is_zero() {
            return Err(ConfigError::ZeroDuration("fall duration"));
        }
        Ok(c.clone())
    }
}

/// Everything a [`crate::game::Session`] needs to run rounds.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub spawn: DifficultyConfig,
    pub round_secs: u32,
    pub intro_duration: Duration,
    /// Fixed target word; a random one is drawn per round when `None`.
    pub target_word: Option<&'static str>,
    pub seed: u64,
}

impl SessionConfig {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            spawn: difficulty.config(),
            round_secs: GAME_DURATION_SECS,
            intro_duration: Duration::from_millis(INTRO_DURATION_MS),
            target_word: None,
            seed,
        }
    }
}

/// Resolve a user-supplied word against the word list.
pub fn lookup_word(word: &str) -> Result<&'static str, ConfigError> {
    let needle = word.trim().to_lowercase();
    WORDS
        .iter()
        .copied()
        .find(|w| *w == needle)
        .ok_or_else(|| ConfigError::UnknownWord(word.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_preset_matches_reference_round() {
        let c = Difficulty::Easy.config();
        assert_eq!(c.max_blocks, 3);
        assert_eq!(c.initial_blocks, 2);
        assert!((c.target_chance - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn builder_applies_overrides() {
        let c = DifficultyConfig::builder(Difficulty::Hard)
            .max_blocks(4)
            .target_chance(0.5)
            .build()
            .unwrap();
        assert_eq!(c.max_blocks, 4);
        assert_eq!(c.initial_blocks, 3);
        assert_eq!(c.spawn_interval, Duration::from_millis(1500));
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert_eq!(
            DifficultyConfig::builder(Difficulty::Easy)
                .target_chance(1.5)
                .build(),
            Err(ConfigError::TargetChance(1.5))
        );
        assert_eq!(
            DifficultyConfig::builder(Difficulty::Easy)
                .max_blocks(0)
                .build(),
            Err(ConfigError::NoBlocks)
        );
        assert_eq!(
            DifficultyConfig::builder(Difficulty::Easy)
                .initial_blocks(5)
                .build(),
            Err(ConfigError::TooManyInitial { initial: 5, max: 3 })
        );
        assert!(DifficultyConfig::builder(Difficulty::Normal)
            .spawn_interval(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn lookup_word_is_case_insensitive() {
        assert_eq!(lookup_word("DER"), Ok("der"));
        assert!(lookup_word("katze").is_err());
    }

    #[test]
    fn word_list_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for w in WORDS {
            assert!(seen.insert(*w), "duplicate word '{}'", w);
        }
    }
}
