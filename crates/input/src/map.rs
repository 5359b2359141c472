//! Key mapping from terminal events to control events.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::types::ControlEvent;

/// Map a key press to the control event a human player means by it.
pub fn handle_key_event(key: KeyEvent) -> Option<ControlEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(ControlEvent::MoveLeft)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(ControlEvent::MoveRight)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(ControlEvent::SoftDown)
        }

        // Rotation
        KeyCode::Up
        | KeyCode::Char('k')
        | KeyCode::Char('K')
        | KeyCode::Char('w')
        | KeyCode::Char('W')
        | KeyCode::Char('x')
        | KeyCode::Char('X') => Some(ControlEvent::RotateRight),
        KeyCode::Char('z') | KeyCode::Char('Z') | KeyCode::Char('y') | KeyCode::Char('Y') => {
            Some(ControlEvent::RotateLeft)
        }

        KeyCode::Char(' ') | KeyCode::Enter => Some(ControlEvent::HardDown),
        KeyCode::Char('c') | KeyCode::Char('C') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ControlEvent::Hold)
        }

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
