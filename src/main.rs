//! Blitzlesen: flash-reading word game in the terminal.

mod app;
mod block;
mod config;
mod cues;
mod fall;
mod game;
mod input;
mod sections;
mod spawn;
mod theme;
mod timer;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use config::{Difficulty, DifficultyConfig, SessionConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.log_level.as_deref())?;
    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(t) => t,
        Err(e) => {
            log::warn!("theme not loaded: {}", e);
            theme::Theme::default()
        }
    };
    let config = args.session_config(args.difficulty)?;
    log::info!(
        "starting: difficulty {:?}, seed {}, target {:?}",
        config.difficulty,
        config.seed,
        config.target_word
    );
    let mut app = App::new(args, config, theme);
    app.run()?;
    Ok(())
}

/// Logs go to a file only; the terminal belongs to the game.
fn init_logging(path: Option<&Path>, level: Option<&str>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .init();
    Ok(())
}

/// Flash-reading word game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blitzlesen",
    version,
    about = "Flash-reading word game: click the falling blocks that show the target word.",
    long_about = "Blitzlesen is a terminal reading game for children.\n\n\
        A target word is shown, then word blocks fall down the screen. Click every block \
        that carries the target word before it leaves the screen; leave the others alone. \
        A round lasts 45 seconds.\n\n\
        CONTROLS:\n  Mouse click   Select a block     1-9         Select the block in that lane\n  \
        Arrows/hjkl   Navigate menus     Enter/Space Confirm\n  \
        P             Pause              Q / Esc     Quit menu     R  Restart\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Difficulty: easy (Leicht), normal, or hard (Schwer).
    #[arg(short, long, default_value = "easy")]
    pub difficulty: Difficulty,

    /// Skip main menu and start a round immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// RNG seed; a random one is used if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Round length in seconds.
    #[arg(long, default_value_t = config::GAME_DURATION_SECS, value_name = "SECS")]
    pub round_secs: u32,

    /// Intro (target word + countdown) length in ms. 0 starts immediately.
    #[arg(long, default_value_t = config::INTRO_DURATION_MS, value_name = "MS")]
    pub intro_ms: u64,

    /// Override the difficulty's spawn interval.
    #[arg(long, value_name = "MS")]
    pub spawn_interval_ms: Option<u64>,

    /// Override the difficulty's maximum number of blocks on screen.
    #[arg(long, value_name = "N")]
    pub max_blocks: Option<usize>,

    /// Override the number of blocks spawned at round start.
    #[arg(long, value_name = "N")]
    pub initial_blocks: Option<usize>,

    /// Override the probability (0.0-1.0) that a spawned block shows the target word.
    #[arg(long, value_name = "P")]
    pub target_chance: Option<f64>,

    /// Override how long a block takes to fall through the playfield.
    #[arg(long, value_name = "SECS")]
    pub fall_secs: Option<f64>,

    /// Fixed target word (must be in the word list); random per round if not set.
    #[arg(long, value_name = "WORD")]
    pub target: Option<String>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Ring the terminal bell on wrong clicks and missed targets.
    #[arg(long)]
    pub bell: bool,

    /// No audio cues at all (overrides --bell).
    #[arg(long)]
    pub mute: bool,

    /// Write logs to this file (nothing is logged otherwise).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "blitzlesen=trace". RUST_LOG wins if set.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Engine steps per second.
    #[arg(long, default_value = "50.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,
}

impl Args {
    /// Session settings for `difficulty` with the command-line overrides applied.
    pub fn session_config(&self, difficulty: Difficulty) -> Result<SessionConfig> {
        let mut builder = DifficultyConfig::builder(difficulty);
        if let Some(ms) = self.spawn_interval_ms {
            builder.spawn_interval(Duration::from_millis(ms));
        }
        if let Some(n) = self.max_blocks {
            builder.max_blocks(n);
        }
        if let Some(n) = self.initial_blocks {
            builder.initial_blocks(n);
        }
        if let Some(p) = self.target_chance {
            builder.target_chance(p);
        }
        if let Some(secs) = self.fall_secs {
            let fall = Duration::try_from_secs_f64(secs)
                .map_err(|_| config::ConfigError::ZeroDuration("fall duration"))?;
            builder.fall_duration(fall);
        }
        if self.round_secs == 0 {
            return Err(config::ConfigError::ZeroDuration("round length").into());
        }
        let target_word = self
            .target
            .as_deref()
            .map(config::lookup_word)
            .transpose()?;
        Ok(SessionConfig {
            spawn: builder.build()?,
            round_secs: self.round_secs,
            intro_duration: Duration::from_millis(self.intro_ms),
            target_word,
            ..SessionConfig::new(difficulty, self.seed.unwrap_or_else(rand::random))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
