//! App: terminal init, main loop, engine stepping, key and mouse handling.

use crate::Args;
use crate::config::{BLOCK_HEIGHT, Difficulty, FEEDBACK_DURATION_MS, SessionConfig};
use crate::cues::{AudioCues, Muted, TerminalBell};
use crate::fall::FallAnimator;
use crate::game::{GameEvent, Session};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, Effects, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use rand::Rng;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

/// Pieces launched on a perfect round.
const CONFETTI_PIECES: usize = 80;
const CONFETTI_GLYPHS: [char; 5] = ['*', '•', '✦', '▪', '◆'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    /// Intro and play; the session phase tells them apart.
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

impl QuitOption {
    fn next(self) -> Self {
        match self {
            Self::Resume => Self::MainMenu,
            Self::MainMenu => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::MainMenu => Self::Resume,
            Self::Exit => Self::MainMenu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuFocus {
    Difficulty,
    Start,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub selected: Difficulty,
    pub focus: MenuFocus,
    pub animation_start: Instant,
}

impl MenuState {
    fn new(selected: Difficulty) -> Self {
        Self {
            selected,
            focus: MenuFocus::Difficulty,
            animation_start: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Wrong,
    Missed,
}

/// Banner shown until `until` (session time).
#[derive(Debug, Clone, Copy)]
struct Feedback {
    kind: FeedbackKind,
    until: Duration,
}

/// One falling confetti piece, in terminal cells relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confetti {
    pub x: f32,
    pub y: f32,
    vx: f32,
    vy: f32,
    pub color: usize,
    pub glyph: char,
}

pub struct App {
    args: Args,
    theme: Theme,
    session: Session,
    animator: FallAnimator,
    effects: Effects,
    screen: Screen,
    paused: bool,
    menu_state: MenuState,
    quit_selected: QuitOption,
    feedback: Option<Feedback>,
    confetti: Vec<Confetti>,
    /// Whole terminal area from the last layout pass.
    area: Rect,
    /// Inner board area; the engine viewport and mouse hits map onto it.
    board: Rect,
    last_tick: Instant,
    last_frame: Instant,
}

impl App {
    pub fn new(args: Args, config: SessionConfig, theme: Theme) -> Self {
        let cues: Box<dyn AudioCues> = if args.mute {
            Box::new(Muted)
        } else {
            Box::new(TerminalBell::new(args.bell))
        };
        let area = Rect::new(0, 0, 80, 24);
        let board = ui::game_layout(area).board_inner;
        let viewport = ui::viewport_for(board);
        let animator = FallAnimator::new(config.spawn.fall_duration, viewport, BLOCK_HEIGHT);
        let menu_state = MenuState::new(config.difficulty);
        let session = Session::new(config, viewport, cues);
        let now = Instant::now();
        let mut app = Self {
            theme,
            session,
            animator,
            effects: Effects::default(),
            screen: Screen::Menu,
            paused: false,
            menu_state,
            quit_selected: QuitOption::Resume,
            feedback: None,
            confetti: Vec::new(),
            area,
            board,
            last_tick: now,
            last_frame: now,
            args,
        };
        if app.args.no_menu {
            app.start_round(app.menu_state.selected);
        }
        app
    }

    /// Recompute the layout for a terminal size and pass the new viewport to the engine.
    fn relayout(&mut self, cols: u16, rows: u16) {
        self.area = Rect::new(0, 0, cols, rows);
        self.board = ui::game_layout(self.area).board_inner;
        let viewport = ui::viewport_for(self.board);
        if viewport != self.session.viewport() {
            self.session.resize(viewport);
            self.animator.set_viewport(viewport);
            self.effects.clear_lanes();
        }
    }

    fn start_round(&mut self, difficulty: Difficulty) {
        if difficulty != self.session.config().difficulty {
            match self.args.session_config(difficulty) {
                Ok(config) => self.session.reconfigure(config),
                Err(e) => log::warn!("keeping {:?}: {}", self.session.config().difficulty, e),
            }
        }
        self.animator
            .set_fall_duration(self.session.config().spawn.fall_duration);
        self.animator.clear();
        self.effects.clear();
        self.confetti.clear();
        self.feedback = None;
        self.paused = false;
        self.session.start();
        self.screen = Screen::Playing;
        self.last_tick = Instant::now();
        self.process_events();
    }

    fn to_menu(&mut self) {
        self.session.stop();
        self.effects.clear();
        self.confetti.clear();
        self.feedback = None;
        self.paused = false;
        self.screen = Screen::Menu;
        self.menu_state.selected = self.session.config().difficulty;
        self.menu_state.focus = MenuFocus::Difficulty;
        self.menu_state.animation_start = Instant::now();
    }

    /// Advance the engine by `dt`, measuring blocks with the fall animator.
    fn step(&mut self, dt: Duration) {
        self.animator.sync(self.session.blocks(), self.session.now());
        self.session.advance(dt, &self.animator);
        self.animator.sync(self.session.blocks(), self.session.now());
        if self
            .feedback
            .is_some_and(|f| self.session.now() >= f.until)
        {
            self.feedback = None;
        }
        self.process_events();
    }

    fn process_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::Exploded { id } => {
                    self.show_feedback(FeedbackKind::Correct);
                    self.effects.explode(id, &self.theme);
                }
                GameEvent::Shaken { id } => {
                    self.show_feedback(FeedbackKind::Wrong);
                    self.effects.shake(id, &self.theme);
                }
                GameEvent::Removed { id } => self.effects.forget(id),
                GameEvent::MissedTarget { section, .. } => {
                    self.show_feedback(FeedbackKind::Missed);
                    self.effects.missed(section, &self.theme);
                }
                GameEvent::RoundEnded { .. } => {
                    self.screen = Screen::GameOver;
                    self.effects.clear();
                    self.feedback = None;
                }
                GameEvent::PerfectRound => self.launch_confetti(),
                GameEvent::RoundStarted { .. }
                | GameEvent::Countdown(_)
                | GameEvent::PlayStarted
                | GameEvent::Spawned { .. } => {}
            }
        }
    }

    fn show_feedback(&mut self, kind: FeedbackKind) {
        self.feedback = Some(Feedback {
            kind,
            until: self.session.now() + Duration::from_millis(FEEDBACK_DURATION_MS),
        });
    }

    fn launch_confetti(&mut self) {
        let mut rng = rand::rng();
        let width = f32::from(self.area.width.max(1));
        self.confetti = (0..CONFETTI_PIECES)
            .map(|_| Confetti {
                x: rng.random_range(0.0..width),
                y: rng.random_range(-12.0..0.0),
                vx: rng.random_range(-1.5..1.5),
                vy: rng.random_range(4.0..10.0),
                color: rng.random_range(0..6),
                glyph: CONFETTI_GLYPHS[rng.random_range(0..CONFETTI_GLYPHS.len())],
            })
            .collect();
    }

    fn update_confetti(&mut self, dt: Duration) {
        let secs = dt.as_secs_f32();
        let bottom = f32::from(self.area.height);
        for c in &mut self.confetti {
            c.x += c.vx * secs;
            c.y += c.vy * secs;
        }
        self.confetti.retain(|c| c.y < bottom);
    }

    fn click_block_at(&mut self, col: u16, row: u16) {
        if self.screen != Screen::Playing || self.paused {
            return;
        }
        if let Some(id) = ui::hit_test(self.board, &self.session, &self.animator, col, row) {
            self.session.click(id);
            self.process_events();
        }
    }

    /// Handle one action. Returns true when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match self.screen {
            Screen::Menu => return self.handle_menu(action),
            Screen::Playing => self.handle_playing(action),
            Screen::QuitMenu => match action {
                Action::Down | Action::Right => self.quit_selected = self.quit_selected.next(),
                Action::Up | Action::Left => self.quit_selected = self.quit_selected.prev(),
                Action::Confirm => match self.quit_selected {
                    QuitOption::Resume => self.screen = Screen::Playing,
                    QuitOption::MainMenu => self.to_menu(),
                    QuitOption::Exit => return true,
                },
                Action::Pause | Action::Quit => self.screen = Screen::Playing,
                _ => {}
            },
            Screen::GameOver => match action {
                Action::Quit => return true,
                Action::Restart => self.start_round(self.session.config().difficulty),
                Action::Confirm => self.to_menu(),
                _ => {}
            },
        }
        false
    }

    fn handle_menu(&mut self, action: Action) -> bool {
        let menu = &mut self.menu_state;
        match action {
            Action::Quit => return true,
            Action::Left => menu.selected = menu.selected.prev(),
            Action::Right => menu.selected = menu.selected.next(),
            Action::Up | Action::Down => {
                menu.focus = match menu.focus {
                    MenuFocus::Difficulty => MenuFocus::Start,
                    MenuFocus::Start => MenuFocus::Difficulty,
                };
            }
            Action::Lane(n) => {
                if let Some(d) = Difficulty::ALL.get(usize::from(n)) {
                    menu.selected = *d;
                    menu.focus = MenuFocus::Start;
                }
            }
            Action::Confirm => {
                if menu.focus == MenuFocus::Start {
                    let selected = menu.selected;
                    self.session.audio().click();
                    self.start_round(selected);
                    return false;
                }
                menu.focus = MenuFocus::Start;
            }
            _ => return false,
        }
        self.session.audio().click();
        false
    }

    fn handle_playing(&mut self, action: Action) {
        if self.paused {
            match action {
                Action::Pause => self.paused = false,
                Action::Quit => {
                    self.screen = Screen::QuitMenu;
                    self.quit_selected = QuitOption::Resume;
                }
                _ => {}
            }
            return;
        }
        match action {
            Action::Pause => self.paused = true,
            Action::Quit => {
                self.screen = Screen::QuitMenu;
                self.quit_selected = QuitOption::Resume;
            }
            Action::Restart => self.start_round(self.session.config().difficulty),
            Action::Lane(n) => {
                if let Some(id) = self.session.block_in_section(usize::from(n)) {
                    self.session.click(id);
                    self.process_events();
                }
            }
            _ => {}
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let (cols, rows) = size()?;
        self.relayout(cols, rows);

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let tick_interval = Duration::from_secs_f64(1.0 / self.args.tick_rate.max(1.0));
        let frame_interval = Duration::from_secs_f64(1.0 / self.args.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            if self.screen == Screen::Playing && !self.paused && !self.session.is_quiescent() {
                let dt = now.saturating_duration_since(self.last_tick);
                if dt >= tick_interval {
                    self.step(dt);
                    self.last_tick = now;
                }
            } else {
                // Engine time stands still while paused or in menus.
                self.last_tick = now;
            }
            self.update_confetti(now.saturating_duration_since(self.last_frame));
            self.last_frame = now;
            self.effects.prune();

            let view = View {
                screen: self.screen,
                session: &self.session,
                animator: &self.animator,
                theme: &self.theme,
                paused: self.paused,
                menu: &self.menu_state,
                quit_selected: self.quit_selected,
                feedback: self.feedback.map(|f| f.kind),
                confetti: &self.confetti,
                now,
            };
            let effects = &mut self.effects;
            terminal.draw(|f| ui::draw(f, &view, effects))?;

            let timeout = tick_interval
                .min(frame_interval)
                .saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_action(key_to_action(key)) {
                                return Ok(());
                            }
                        }
                        Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                            self.click_block_at(m.column, m.row);
                        }
                        Event::Resize(cols, rows) => self.relayout(cols, rows),
                        _ => {}
                    }
                }
            }
        }
    }
}
