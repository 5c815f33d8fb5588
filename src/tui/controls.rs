//! Keyboard input handling for the dashboard.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::{App, View};

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Tab | KeyCode::Right => app.next_view(),
        KeyCode::BackTab | KeyCode::Left => app.prev_view(),
        KeyCode::Char(d @ '1'..='7') => {
            let idx = d as usize - '1' as usize;
            app.select(View::ALL[idx]);
        }
        KeyCode::Char('r') => app.force_refresh(),
        KeyCode::Char('+' | '=') | KeyCode::Up => app.raise_threshold(),
        KeyCode::Char('-') | KeyCode::Down => app.lower_threshold(),
        KeyCode::Char('c') => app.cycle_component(),
        _ => {}
    }
}
