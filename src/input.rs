//! Key bindings: arrows/Enter for menus, number keys for lanes, vim keys as aliases.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Confirm,
    Pause,
    Quit,
    Restart,
    /// Lane shortcut, zero-based (key `1` is lane 0).
    Lane(u8),
    None,
}

/// Map key event to action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Char(c @ '1'..='9') => Action::Lane(c as u8 - b'1'),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn number_keys_select_lanes() {
        assert_eq!(key_to_action(press(KeyCode::Char('1'))), Action::Lane(0));
        assert_eq!(key_to_action(press(KeyCode::Char('9'))), Action::Lane(8));
        assert_eq!(key_to_action(press(KeyCode::Char('0'))), Action::None);
    }

    #[test]
    fn vim_keys_alias_arrows() {
        assert_eq!(key_to_action(press(KeyCode::Char('j'))), Action::Down);
        assert_eq!(key_to_action(press(KeyCode::Up)), Action::Up);
    }

    #[test]
    fn ctrl_c_quits_other_modifiers_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        let alt_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::ALT);
        assert_eq!(key_to_action(alt_q), Action::None);
    }
}
