use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::App;

/// Charts skipped by PgUp/PgDn.
const PAGE_JUMP: usize = 5;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If the series overlay is shown, handle overlay-specific keys
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Allow stepping through charts while overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Page switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_page();
            } else {
                app.next_page();
            }
        }
        KeyCode::BackTab => app.prev_page(),

        // Direct page access
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(digit) = c.to_digit(10) {
                app.set_page(digit as usize - 1);
            }
        }

        // Navigation (up/down for charts, left/right for pages)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_page(),
        KeyCode::Right | KeyCode::Char('l') => app.next_page(),
        KeyCode::PageUp => app.select_prev_n(PAGE_JUMP),
        KeyCode::PageDown => app.select_next_n(PAGE_JUMP),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Series overlay
        KeyCode::Enter => app.enter_detail(),

        // Go back (Esc and Backspace)
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Reload
        KeyCode::Char('r') => match app.reload_data() {
            Ok(()) => app.set_status_message("Reloaded".to_string()),
            Err(e) => app.set_status_message(format!("Reload failed: {}", e)),
        },

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Export charts (e) or charts plus debug data (d)
        KeyCode::Char(c @ ('e' | 'd')) => match app.export_artifacts(c == 'd') {
            Ok(dir) => app.set_status_message(format!("Exported to {}", dir.display())),
            Err(e) => app.set_status_message(format!("Export failed: {}", e)),
        },

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => app.go_back(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::ui::Theme;
    use crossterm::event::KeyEventState;
    use crossterm::event::KeyEventKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> (App, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        for time in [1, 2] {
            writeln!(
                file,
                r#"{{"type":"consumer","time":{time},"brokers":{{"b:1/1":{{"state":"UP"}}}},"topics":{{"t":{{"partitions":{{"0":{{"partition":0}}}}}}}}}}"#
            )
            .unwrap();
        }
        let mut app = App::with_theme(file.path(), Settings::default(), Theme::dark());
        app.reload_data().unwrap();
        (app, file)
    }

    #[test]
    fn digits_jump_to_pages() {
        let (mut app, _file) = app();
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.current_page, 1);
        handle_key_event(&mut app, key(KeyCode::Char('9')));
        assert_eq!(app.current_page, 1);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_page, 0);
    }

    #[test]
    fn help_swallows_next_key() {
        let (mut app, _file) = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn overlay_keys() {
        let (mut app, _file) = app();
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.show_detail_overlay);
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selected_chart, 1);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_detail_overlay);
    }

    #[test]
    fn mouse_scroll_moves_selection() {
        let (mut app, _file) = app();
        let scroll = |kind| MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, scroll(MouseEventKind::ScrollDown));
        handle_mouse_event(&mut app, scroll(MouseEventKind::ScrollDown));
        handle_mouse_event(&mut app, scroll(MouseEventKind::ScrollUp));
        assert_eq!(app.selected_chart, 1);
    }
}
