//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Playfield and feedback colours, One Dark by default.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Playfield background.
    pub bg: Color,
    /// Borders and lane separators.
    pub div_line: Color,
    /// Body text.
    pub main_fg: Color,
    /// Titles and highlights.
    pub title: Color,
    /// Secondary text (hints, lane numbers).
    pub inactive_fg: Color,
    /// Word box text and fill.
    pub block_fg: Color,
    pub block_bg: Color,
    /// The target word in the header and intro.
    pub target: Color,
    pub correct: Color,
    pub wrong: Color,
    pub missed: Color,
    /// Perfect-round confetti.
    pub confetti: [Color; 6],
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// Hardcoded One Dark values (same hex as onedark.theme).
    pub fn onedark_default() -> Self {
        Self {
            bg: Color::from_u32(0x0031_353F),
            div_line: Color::from_u32(0x003F_444F),
            main_fg: Color::from_u32(0x00AB_B2BF),
            title: Color::from_u32(0x00E5_C07B),
            inactive_fg: Color::from_u32(0x005C_6370),
            block_fg: Color::from_u32(0x00E6_E6E6),
            block_bg: Color::from_u32(0x003E_4452),
            target: Color::from_u32(0x0061_AFEF),
            correct: Color::from_u32(0x0098_C379),
            wrong: Color::from_u32(0x00E0_6C75),
            missed: Color::from_u32(0x00D1_9A66),
            confetti: [
                Color::from_u32(0x0098_C379),
                Color::from_u32(0x00E5_C07B),
                Color::from_u32(0x00E0_6C75),
                Color::from_u32(0x0061_AFEF),
                Color::from_u32(0x00C6_78DD),
                Color::from_u32(0x0056_B6C2),
            ],
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark if path is None or the file does not exist.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            Some(p) => {
                log::warn!("theme file {} not found, using defaults", p.display());
                return Ok(Self::default_for_palette(palette));
            }
            None => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        log::info!("loaded theme {} ({} keys)", path.display(), map.len());
        Ok(theme)
    }

    fn default_for_palette(palette: Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override the feedback colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.block_fg = Color::White;
                self.block_bg = Color::Black;
                self.target = Color::from_u32(0x0000_FFFF);
                self.correct = Color::from_u32(0x0000_FF00);
                self.wrong = Color::from_u32(0x00FF_0000);
                self.missed = Color::from_u32(0x00FF_FF00);
            }
            Palette::Colorblind => {
                // Blue/orange instead of green/red.
                self.target = Color::from_u32(0x00BB_BB00);
                self.correct = Color::from_u32(0x0000_77BB);
                self.wrong = Color::from_u32(0x00EE_7733);
                self.missed = Color::from_u32(0x00EE_3377);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        Self {
            bg: get("meter_bg").or_else(|| get("main_bg")).unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
            block_fg: get("hi_fg").unwrap_or(d.block_fg),
            block_bg: get("selected_bg").unwrap_or(d.block_bg),
            target: get("cpu_box").unwrap_or(d.target),
            correct: get("mem_box")
                .or_else(|| get("cpu_start"))
                .unwrap_or(d.correct),
            wrong: get("cpu_end")
                .or_else(|| get("temp_end"))
                .unwrap_or(d.wrong),
            missed: get("cpu_mid").unwrap_or(d.missed),
            confetti: [
                get("mem_box").unwrap_or(d.confetti[0]),
                get("title").unwrap_or(d.confetti[1]),
                get("cpu_end").unwrap_or(d.confetti[2]),
                get("cpu_box").unwrap_or(d.confetti[3]),
                get("net_box").unwrap_or(d.confetti[4]),
                get("proc_misc").unwrap_or(d.confetti[5]),
            ],
        }
    }

    #[inline]
    pub fn confetti_color(&self, index: usize) -> Color {
        self.confetti[index % self.confetti.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(eq) = rest.find('=') {
            let value = rest[eq + 1..]
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string();
            if !value.is_empty() {
                map.insert(key.to_string(), value);
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_feedback_colours() {
        let map = parse_theme_file(
            "# comment\ntheme[mem_box]=\"#00FF00\"\ntheme[cpu_end]='#F00'\n",
        );
        let t = Theme::from_map(&map);
        assert_eq!(t.correct, Color::Rgb(0, 255, 0));
        assert_eq!(t.wrong, Color::Rgb(255, 0, 0));
        assert_eq!(t.title, Theme::onedark_default().title);
    }

    #[test]
    fn test_default_matches_onedark_hex() {
        let t = Theme::default();
        assert_eq!(t.bg, parse_hex("#31353F").unwrap());
        assert_eq!(t.title, parse_hex("#E5C07B").unwrap());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let t = Theme::load(Some(Path::new("/nonexistent/blitz.theme")), Palette::Colorblind)
            .unwrap();
        assert_eq!(t.correct, Color::Rgb(0x00, 0x77, 0xBB));
    }
}
