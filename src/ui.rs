//! Layout and drawing: menu, header, playfield with word boxes, sidebar, intro, pause,
//! quit menu, game over.

use crate::app::{Confetti, FeedbackKind, MenuFocus, MenuState, QuitOption, Screen};
use crate::block::{Block as WordBlock, BlockId, Lifecycle};
use crate::config::{
    Difficulty, EXPLOSION_DURATION_MS, FEEDBACK_DURATION_MS, MARGIN, MIN_BLOCK_WIDTH,
    SHAKE_DURATION_MS,
};
use crate::fall::FallAnimator;
use crate::game::{Phase, Session};
use crate::sections::Viewport;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::HashMap;
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Logical pixels per terminal cell.
pub const CELL_PX_W: f32 = 10.0;
pub const CELL_PX_H: f32 = 20.0;

const SIDEBAR_WIDTH: u16 = 26;
const HEADER_HEIGHT: u16 = 3;
/// Word boxes are drawn three rows tall (border, word, border).
const BOX_ROWS: u16 = 3;
/// Half period of the wrong-click wobble.
const SHAKE_STEP_MS: u128 = 50;

/// Screen regions of the playing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameLayout {
    pub header: Rect,
    pub board: Rect,
    /// Board without its border; the engine viewport maps onto this.
    pub board_inner: Rect,
    pub sidebar: Rect,
}

pub fn game_layout(area: Rect) -> GameLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Fill(1)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(SIDEBAR_WIDTH)])
        .split(rows[1]);
    let board = cols[0];
    GameLayout {
        header: rows[0],
        board,
        board_inner: Block::default().borders(Borders::ALL).inner(board),
        sidebar: cols[1],
    }
}

/// Engine viewport for a board area.
pub fn viewport_for(board_inner: Rect) -> Viewport {
    Viewport::new(
        f32::from(board_inner.width) * CELL_PX_W,
        f32::from(board_inner.height) * CELL_PX_H,
    )
}

/// Unclipped box position in board cells; may extend above or below the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoxGeom {
    x: i32,
    y: i32,
    width: u16,
}

impl BoxGeom {
    fn new(inner: Rect, block: &WordBlock, top_px: f32, jitter: i32) -> Self {
        let min_cells = (MIN_BLOCK_WIDTH / CELL_PX_W) as u16;
        let width = (block.word.chars().count() as u16 + 4).max(min_cells);
        Self {
            x: i32::from(inner.x) + (block.x / CELL_PX_W).round() as i32 + jitter,
            y: i32::from(inner.y) + (top_px / CELL_PX_H).floor() as i32,
            width,
        }
    }

    /// Part of the box inside `inner`, if any.
    fn visible(self, inner: Rect) -> Option<Rect> {
        let left = self.x.max(i32::from(inner.x));
        let right = (self.x + i32::from(self.width)).min(i32::from(inner.right()));
        let top = self.y.max(i32::from(inner.y));
        let bottom = (self.y + i32::from(BOX_ROWS)).min(i32::from(inner.bottom()));
        (right > left && bottom > top).then(|| {
            Rect::new(
                left as u16,
                top as u16,
                (right - left) as u16,
                (bottom - top) as u16,
            )
        })
    }
}

fn shake_jitter(block: &WordBlock, session: &Session) -> i32 {
    if block.lifecycle != Lifecycle::Shaking {
        return 0;
    }
    if (session.now().as_millis() / SHAKE_STEP_MS) % 2 == 0 {
        -1
    } else {
        1
    }
}

/// Block under the terminal cell `(col, row)`. Later-drawn blocks win.
pub fn hit_test(
    board_inner: Rect,
    session: &Session,
    animator: &FallAnimator,
    col: u16,
    row: u16,
) -> Option<BlockId> {
    let pos = Position::new(col, row);
    session.blocks().iter().rev().find_map(|b| {
        let top = animator.top(b.id)?;
        let rect = BoxGeom::new(board_inner, b, top, shake_jitter(b, session)).visible(board_inner)?;
        rect.contains(pos).then_some(b.id)
    })
}

/// tachyonfx effects for exploding blocks and missed-target lane flashes.
#[derive(Default)]
pub struct Effects {
    blocks: HashMap<BlockId, Effect>,
    lanes: Vec<(usize, Effect)>,
    last_process: Option<Instant>,
}

impl Effects {
    pub fn explode(&mut self, id: BlockId, theme: &Theme) {
        let effect = fx::fade_to(
            theme.correct,
            theme.bg,
            (EXPLOSION_DURATION_MS as u32, Interpolation::Linear),
        );
        self.blocks.insert(id, effect);
    }

    pub fn shake(&mut self, id: BlockId, theme: &Theme) {
        let effect = fx::fade_to(
            theme.block_fg,
            theme.block_bg,
            (SHAKE_DURATION_MS as u32, Interpolation::Linear),
        );
        self.blocks.insert(id, effect);
    }

    pub fn forget(&mut self, id: BlockId) {
        self.blocks.remove(&id);
    }

    pub fn missed(&mut self, section: usize, theme: &Theme) {
        let effect = fx::fade_to(
            theme.bg,
            theme.bg,
            (FEEDBACK_DURATION_MS as u32, Interpolation::Linear),
        );
        self.lanes.push((section, effect));
    }

    /// Lane flashes refer to lane indices, which a resize invalidates.
    pub fn clear_lanes(&mut self) {
        self.lanes.clear();
    }

    #[cfg(test)]
    pub fn lane_flashes(&self) -> usize {
        self.lanes.len()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.lanes.clear();
        self.last_process = None;
    }

    /// Drop finished effects.
    pub fn prune(&mut self) {
        self.blocks.retain(|_, e| !e.done());
        self.lanes.retain(|(_, e)| !e.done());
    }

    fn delta(&mut self, now: Instant) -> TfxDuration {
        let delta = self
            .last_process
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        self.last_process = Some(now);
        TfxDuration::from_millis(delta.as_millis().min(u32::MAX as u128) as u32)
    }
}

/// Everything a frame needs, borrowed from the app.
pub struct View<'a> {
    pub screen: Screen,
    pub session: &'a Session,
    pub animator: &'a FallAnimator,
    pub theme: &'a Theme,
    pub paused: bool,
    pub menu: &'a MenuState,
    pub quit_selected: QuitOption,
    pub feedback: Option<FeedbackKind>,
    pub confetti: &'a [Confetti],
    pub now: Instant,
}

/// Draw the current screen with overlays.
pub fn draw(frame: &mut Frame, view: &View, effects: &mut Effects) {
    let area = frame.area();
    let theme = view.theme;
    frame
        .buffer_mut()
        .set_style(area, Style::default().bg(theme.bg).fg(theme.main_fg));
    match view.screen {
        Screen::Menu => draw_menu(frame, view, area),
        Screen::Playing => {
            draw_game(frame, view, area, effects);
            if view.session.phase() == Phase::Intro {
                draw_intro(frame, view, area);
            }
            if view.paused {
                draw_pause_overlay(frame, theme, area);
            }
        }
        Screen::QuitMenu => {
            draw_game(frame, view, area, effects);
            draw_quit_menu(frame, theme, view.quit_selected);
        }
        Screen::GameOver => draw_game_over(frame, view, area),
    }
}

fn bold(style: Style) -> Style {
    style.add_modifier(Modifier::BOLD)
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn popup_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_menu(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let menu = view.menu;
    let popup = centered(area, 50, 22);

    let title = Line::from(vec![
        Span::styled(" Blitz", bold(Style::default().fg(theme.title))),
        Span::styled("lesen ", bold(Style::default().fg(theme.target))),
    ]);
    let highlight = bold(Style::default().fg(theme.bg).bg(theme.title));
    let selected = bold(Style::default().fg(theme.title));
    let normal = Style::default().fg(theme.main_fg);
    let hint = Style::default().fg(theme.inactive_fg);

    let mut lines = vec![
        Line::from(""),
        title,
        Line::from(Span::styled("Finde das Zielwort!", hint)),
        Line::from(""),
        Line::from(Span::styled(
            " ─ SCHWIERIGKEIT ─ ",
            Style::default().fg(theme.div_line),
        )),
        Line::from(""),
    ];
    for d in Difficulty::ALL {
        let is_selected = d == menu.selected;
        let style = if is_selected && menu.focus == MenuFocus::Difficulty {
            highlight
        } else if is_selected {
            selected
        } else {
            normal
        };
        let marker = if is_selected { "▶ " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{}{:<8}", marker, d.name()),
            style,
        )));
        lines.push(Line::from(Span::styled(d.description(), hint)));
    }
    let start_style = if menu.focus == MenuFocus::Start {
        highlight
    } else {
        normal
    };
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(" [ SPIEL STARTEN ] ", start_style)),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↕ ", Style::default().fg(theme.target)),
            Span::from("WÄHLEN   "),
            Span::styled(" ENTER ", Style::default().fg(theme.target)),
            Span::from("LOS"),
        ]),
        Line::from(""),
        Line::from(Span::styled(" [Q] BEENDEN ", Style::default().fg(theme.wrong))),
    ]);

    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme));

    // Slide in from below.
    let elapsed = view.now.duration_since(menu.animation_start).as_millis() as u32;
    let anim_duration = 500u32;
    let t = (elapsed as f32 / anim_duration as f32).min(1.0);
    let eased = 1.0 - (1.0 - t).powi(3);
    let mut anim_popup = popup;
    anim_popup.y += ((1.0 - eased) * 10.0) as u16;
    anim_popup.height = anim_popup
        .height
        .min(area.bottom().saturating_sub(anim_popup.y));

    p.render(anim_popup, frame.buffer_mut());
}

fn draw_game(frame: &mut Frame, view: &View, area: Rect, effects: &mut Effects) {
    let layout = game_layout(area);
    draw_header(frame, view, layout.header);
    draw_board(frame, view, &layout, effects);
    draw_sidebar(frame, view, layout.sidebar);
}

fn draw_header(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let session = view.session;
    let block = popup_block(theme).title(Span::styled(" Blitzlesen ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(24)])
        .split(inner);

    let secs = session.time_remaining();
    let line = Line::from(vec![
        Span::styled(" Zielwort: ", Style::default().fg(theme.main_fg)),
        Span::styled(
            session.target_word().to_uppercase(),
            bold(Style::default().fg(theme.target)),
        ),
        Span::styled("  │  ", Style::default().fg(theme.div_line)),
        Span::styled(
            session.config().difficulty.name(),
            Style::default().fg(theme.title),
        ),
        Span::styled("  │  ", Style::default().fg(theme.div_line)),
        Span::styled(
            format!("Zeit: {}:{:02}", secs / 60, secs % 60),
            Style::default().fg(theme.main_fg),
        ),
    ]);
    Paragraph::new(line).render(cols[0], frame.buffer_mut());

    let total = session.config().round_secs.max(1);
    let ratio = f64::from(secs) / f64::from(total);
    let bar_color = if ratio > 0.5 {
        theme.correct
    } else if ratio > 0.2 {
        theme.missed
    } else {
        theme.wrong
    };
    Gauge::default()
        .ratio(ratio.clamp(0.0, 1.0))
        .label("")
        .gauge_style(Style::default().fg(bar_color).bg(theme.div_line))
        .render(cols[1], frame.buffer_mut());
}

/// Column of the centre of `section` inside the board.
fn lane_center(inner: Rect, session: &Session, section: usize) -> u16 {
    let px = MARGIN + (section as f32 + 0.5) * session.section_width();
    inner.x + (px / CELL_PX_W) as u16
}

fn lane_span(inner: Rect, session: &Session, section: usize) -> Rect {
    let sw = session.section_width();
    let left = inner.x + ((MARGIN + section as f32 * sw) / CELL_PX_W) as u16;
    let width = ((sw / CELL_PX_W) as u16).max(1);
    Rect {
        x: left.min(inner.right().saturating_sub(1)),
        y: inner.bottom().saturating_sub(1),
        width: width.min(inner.right().saturating_sub(left)),
        height: 1.min(inner.height),
    }
}

fn draw_board(frame: &mut Frame, view: &View, layout: &GameLayout, effects: &mut Effects) {
    let theme = view.theme;
    let session = view.session;
    let inner = layout.board_inner;
    let board_block = popup_block(theme);
    board_block.render(layout.board, frame.buffer_mut());

    // Lane numbers on the top border double as the key legend.
    let lanes = session.section_count().min(9);
    for section in 0..lanes {
        let x = lane_center(inner, session, section);
        if x < inner.right() {
            frame.buffer_mut().set_string(
                x,
                layout.board.y,
                (section + 1).to_string(),
                Style::default().fg(theme.inactive_fg).bg(theme.bg),
            );
        }
    }

    let delta = effects.delta(view.now);

    for (section, effect) in &mut effects.lanes {
        let rect = lane_span(inner, session, *section);
        if rect.width == 0 || rect.height == 0 {
            continue;
        }
        let glyphs = "▼".repeat(rect.width as usize);
        frame.buffer_mut().set_stringn(
            rect.x,
            rect.y,
            glyphs,
            rect.width as usize,
            Style::default().fg(theme.missed).bg(theme.bg),
        );
        frame.render_effect(effect, rect, delta);
    }

    for b in session.blocks() {
        let Some(top) = view.animator.top(b.id) else {
            continue;
        };
        let geom = BoxGeom::new(inner, b, top, shake_jitter(b, session));
        let Some(rect) = geom.visible(inner) else {
            continue;
        };
        let (fg, bg, border) = match b.lifecycle {
            Lifecycle::Exploding => (theme.bg, theme.correct, theme.correct),
            Lifecycle::Shaking => (theme.block_fg, theme.wrong, theme.wrong),
            _ if b.is_latched() => (theme.inactive_fg, theme.block_bg, theme.div_line),
            _ => (theme.block_fg, theme.block_bg, theme.main_fg),
        };
        draw_word_box(frame.buffer_mut(), inner, geom, b.word, fg, bg, border);
        if let Some(effect) = effects.blocks.get_mut(&b.id) {
            frame.render_effect(effect, rect, delta);
        }
    }

    if let Some(kind) = view.feedback {
        let (text, color) = match kind {
            FeedbackKind::Correct => (" Super! ", theme.correct),
            FeedbackKind::Wrong => (" Das war nicht das Zielwort ", theme.wrong),
            FeedbackKind::Missed => (" Verpasst! ", theme.missed),
        };
        let w = text.chars().count() as u16;
        let x = inner.x + inner.width.saturating_sub(w) / 2;
        let y = inner.y + inner.height.saturating_sub(1);
        frame
            .buffer_mut()
            .set_string(x, y, text, bold(Style::default().fg(theme.bg).bg(color)));
    }
}

/// Draw a three-row word box, clipped to `inner` row by row.
fn draw_word_box(
    buf: &mut Buffer,
    inner: Rect,
    geom: BoxGeom,
    word: &str,
    fg: Color,
    bg: Color,
    border: Color,
) {
    let w = geom.width as usize;
    let pad = w.saturating_sub(2);
    let rows = [
        format!("┌{}┐", "─".repeat(pad)),
        format!("│{:^pad$}│", word, pad = pad),
        format!("└{}┘", "─".repeat(pad)),
    ];
    for (dy, row) in rows.iter().enumerate() {
        let y = geom.y + dy as i32;
        if y < i32::from(inner.y) || y >= i32::from(inner.bottom()) {
            continue;
        }
        let skip = (i32::from(inner.x) - geom.x).max(0) as usize;
        let x = geom.x.max(i32::from(inner.x));
        let room = (i32::from(inner.right()) - x).max(0) as usize;
        let text: String = row.chars().skip(skip).collect();
        let style = if dy == 1 {
            bold(Style::default().fg(fg).bg(bg))
        } else {
            Style::default().fg(border).bg(bg)
        };
        buf.set_stringn(x as u16, y as u16, text, room, style);
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let session = view.session;
    let stats = session.stats();
    let title_style = Style::default().fg(theme.title);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // stats
            Constraint::Length(1),
            Constraint::Length(4), // difficulty
            Constraint::Length(1),
            Constraint::Length(7), // controls
        ])
        .split(area);

    let stat_line = |label: &'static str, value: u32, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:<10}", label), title_style),
            Span::styled(value.to_string(), bold(Style::default().fg(color))),
        ])
    };
    let stats_block = popup_block(theme).title(Span::styled(" Punkte ", title_style));
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    Paragraph::new(vec![
        stat_line("Richtig", stats.correct_clicks, theme.correct),
        stat_line("Falsch", stats.wrong_clicks, theme.wrong),
        stat_line("Verpasst", stats.missed_targets, theme.missed),
        Line::from(Span::styled(
            format!("Blöcke    {}", session.blocks().len()),
            Style::default().fg(theme.inactive_fg),
        )),
    ])
    .render(stats_inner, frame.buffer_mut());

    let difficulty = session.config().difficulty;
    let level_block = popup_block(theme).title(Span::styled(" Stufe ", title_style));
    let level_inner = level_block.inner(chunks[2]);
    level_block.render(chunks[2], frame.buffer_mut());
    Paragraph::new(vec![
        Line::from(Span::styled(
            difficulty.name(),
            bold(Style::default().fg(theme.main_fg)),
        )),
        Line::from(Span::styled(
            difficulty.description(),
            Style::default().fg(theme.inactive_fg),
        )),
    ])
    .render(level_inner, frame.buffer_mut());

    let key = Style::default().fg(theme.target);
    let text = Style::default().fg(theme.main_fg);
    let controls_block = popup_block(theme).title(Span::styled(" Tasten ", title_style));
    let controls_inner = controls_block.inner(chunks[4]);
    controls_block.render(chunks[4], frame.buffer_mut());
    Paragraph::new(vec![
        Line::from(vec![Span::styled("Maus   ", key), Span::styled("Block wählen", text)]),
        Line::from(vec![Span::styled("1-9    ", key), Span::styled("Spur wählen", text)]),
        Line::from(vec![Span::styled("P      ", key), Span::styled("Pause", text)]),
        Line::from(vec![Span::styled("R      ", key), Span::styled("Neustart", text)]),
        Line::from(vec![Span::styled("Q      ", key), Span::styled("Menü", text)]),
    ])
    .render(controls_inner, frame.buffer_mut());
}

fn draw_intro(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let popup = centered(area, 36, 9);
    frame.buffer_mut().set_style(popup, Style::default().bg(theme.bg));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Finde das Wort:",
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}  ", view.session.target_word().to_uppercase()),
            bold(Style::default().fg(theme.bg).bg(theme.target)),
        )),
        Line::from(""),
        Line::from(Span::styled(
            view.session.countdown().to_string(),
            bold(Style::default().fg(theme.title)),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 30, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Pause ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P Weiter    Q Menü ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let stats = view.session.stats();
    let popup = centered(area, 44, 16);

    let card = |label: &'static str, value: u32, color: Color| {
        Line::from(vec![
            Span::styled(format!(" {:<12}", label), Style::default().fg(theme.main_fg)),
            Span::styled(format!("{:>4} ", value), bold(Style::default().fg(color))),
        ])
    };
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Zeit ist um! ",
            bold(Style::default().fg(theme.bg).bg(theme.title)),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Zielwort: ", Style::default().fg(theme.main_fg)),
            Span::styled(
                view.session.target_word().to_uppercase(),
                bold(Style::default().fg(theme.target)),
            ),
        ]),
        Line::from(""),
        card("Richtig", stats.correct_clicks, theme.correct),
        card("Falsch", stats.wrong_clicks, theme.wrong),
        card("Verpasst", stats.missed_targets, theme.missed),
        Line::from(""),
    ];
    if stats.is_perfect() {
        lines.push(Line::from(Span::styled(
            " Perfekt! Alles richtig! ",
            bold(Style::default().fg(theme.correct)),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            " R Nochmal    Enter Menü    Q Beenden ",
            Style::default().fg(theme.main_fg),
        )),
    ]);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme).title(Span::styled(" Blitzlesen ", theme.title)))
        .render(popup, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for c in view.confetti {
        if c.x < 0.0 || c.y < 0.0 {
            continue;
        }
        let (x, y) = (area.x + c.x as u16, area.y + c.y as u16);
        if x < area.right() && y < area.bottom() && !popup.contains(Position::new(x, y)) {
            buf[(x, y)]
                .set_char(c.glyph)
                .set_style(Style::default().fg(theme.confetti_color(c.color)));
        }
    }
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Beenden? ");

    frame
        .buffer_mut()
        .set_style(quit_rect, Style::default().bg(theme.bg));
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Weiter "),
        (QuitOption::MainMenu, " Hauptmenü "),
        (QuitOption::Exit, " Beenden "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            bold(Style::default().fg(theme.bg).bg(theme.title))
        } else {
            Style::default().fg(theme.title)
        };
        let w = label.chars().count() as u16;
        let rx = inner.x + inner.width.saturating_sub(w) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.bottom() {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_at(x: f32) -> WordBlock {
        WordBlock::new(BlockId(1), "und", 0, x, true)
    }

    #[test]
    fn viewport_maps_cells_to_pixels() {
        let layout = game_layout(Rect::new(0, 0, 106, 33));
        assert_eq!(layout.board_inner, Rect::new(1, 4, 78, 28));
        assert_eq!(viewport_for(layout.board_inner), Viewport::new(780.0, 560.0));
    }

    #[test]
    fn box_is_clipped_at_top() {
        let inner = Rect::new(1, 4, 78, 28);
        // Two rows above the board: only the bottom border shows.
        let geom = BoxGeom::new(inner, &block_at(100.0), -40.0, 0);
        assert_eq!(geom.width, 12);
        assert_eq!(geom.visible(inner), Some(Rect::new(11, 4, 12, 1)));
        let below = BoxGeom::new(inner, &block_at(100.0), 600.0, 0);
        assert_eq!(below.visible(inner), None);
    }

    #[test]
    fn word_box_draws_centered_word() {
        let inner = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(inner);
        let geom = BoxGeom::new(inner, &block_at(0.0), 20.0, 0);
        draw_word_box(&mut buf, inner, geom, "und", Color::White, Color::Black, Color::Gray);
        assert_eq!(buf[(0u16, 1u16)].symbol(), "┌");
        assert_eq!(buf[(11u16, 3u16)].symbol(), "┘");
        let word: String = (0..12u16)
            .map(|x| buf[(x, 2u16)].symbol().to_string())
            .collect();
        assert_eq!(word, "│   und    │");
    }
}
