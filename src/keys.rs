use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    /// Operator asks for a full process restart.
    Restart,
    ToggleLogs,
    Ignore,
}

pub fn action_for(key_event: KeyEvent) -> KeyAction {
    match (key_event.code, key_event.modifiers) {
        (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (Char('R'), _) => KeyAction::Restart,
        (Char('"'), _) => KeyAction::ToggleLogs,
        _ => KeyAction::Ignore,
    }
}
