//! Key mapping from terminal events to session commands.

use crate::types::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    MoveCursor(Direction),
    /// Swap the tile under the cursor with its neighbour in this direction.
    Swap(Direction),
    /// Toggle the power-up in this slot (0-based).
    SelectPowerup(usize),
    /// Apply the selected power-up to the tile under the cursor.
    Apply,
    NextLevel,
    Retry,
}

/// Map keyboard input to commands. Key releases are ignored.
pub fn handle_key_event(key: KeyEvent) -> Option<InputCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        // Cursor
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') => {
            Some(InputCommand::MoveCursor(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') => {
            Some(InputCommand::MoveCursor(Direction::Right))
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
            Some(InputCommand::MoveCursor(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
            Some(InputCommand::MoveCursor(Direction::Down))
        }

        // Swaps
        KeyCode::Char('w') | KeyCode::Char('W') => Some(InputCommand::Swap(Direction::Up)),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(InputCommand::Swap(Direction::Left)),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(InputCommand::Swap(Direction::Down)),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(InputCommand::Swap(Direction::Right)),

        // Power-ups
        KeyCode::Char(c @ '1'..='3') => Some(InputCommand::SelectPowerup(c as usize - '1' as usize)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(InputCommand::Apply),

        // Session
        KeyCode::Char('n') | KeyCode::Char('N') => Some(InputCommand::NextLevel),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputCommand::Retry),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    #[test]
    fn test_cursor_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(InputCommand::MoveCursor(Direction::Left))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Up)),
            Some(InputCommand::MoveCursor(Direction::Up))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('J'))),
            Some(InputCommand::MoveCursor(Direction::Down))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('l'))),
            Some(InputCommand::MoveCursor(Direction::Right))
        );
    }

    #[test]
    fn test_swap_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('w'))),
            Some(InputCommand::Swap(Direction::Up))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('A'))),
            Some(InputCommand::Swap(Direction::Left))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('s'))),
            Some(InputCommand::Swap(Direction::Down))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('d'))),
            Some(InputCommand::Swap(Direction::Right))
        );
    }

    #[test]
    fn test_powerup_and_session_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('1'))),
            Some(InputCommand::SelectPowerup(0))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('3'))),
            Some(InputCommand::SelectPowerup(2))
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('4'))), None);
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Enter)),
            Some(InputCommand::Apply)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('n'))),
            Some(InputCommand::NextLevel)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('R'))),
            Some(InputCommand::Retry)
        );
    }

    #[test]
    fn test_releases_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('w'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(handle_key_event(release), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::from(KeyCode::Esc)));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }
}
