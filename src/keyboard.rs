// Keyboard handling module - translate key presses into intents
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::Intent;
use crate::screen_mode::ScreenMode;
use crate::session::ViewMode;

/// What the keymap needs to know about the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    pub alert_open: bool,
    pub screen: ScreenMode,
    pub view: ViewMode,
}

pub fn map_key(key: KeyEvent, ctx: KeyContext) -> Option<Intent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    // Ctrl+C quits from anywhere, even with an alert open
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Intent::Quit);
    }

    if ctx.alert_open {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Some(Intent::DismissAlert),
            _ => None,
        };
    }

    if key.code == KeyCode::Tab {
        return Some(Intent::ToggleDebug);
    }

    match ctx.screen {
        ScreenMode::Debug => debug_keys(key),
        ScreenMode::Session => match ctx.view {
            ViewMode::Picker => picker_keys(key),
            ViewMode::Reader => reader_keys(key),
        },
    }
}

fn debug_keys(key: KeyEvent) -> Option<Intent> {
    match key.code {
        KeyCode::Up => Some(Intent::ScrollLog(-1)),
        KeyCode::Down => Some(Intent::ScrollLog(1)),
        KeyCode::PageUp => Some(Intent::ScrollLog(-10)),
        KeyCode::PageDown => Some(Intent::ScrollLog(10)),
        KeyCode::Esc => Some(Intent::ToggleDebug),
        KeyCode::Char('q') => Some(Intent::Quit),
        _ => None,
    }
}

fn picker_keys(key: KeyEvent) -> Option<Intent> {
    match key.code {
        KeyCode::Enter | KeyCode::Char('o') => Some(Intent::PickFile),
        KeyCode::Char('r') => Some(Intent::Resume),
        KeyCode::Char('q') | KeyCode::Esc => Some(Intent::Quit),
        _ => None,
    }
}

fn reader_keys(key: KeyEvent) -> Option<Intent> {
    match key.code {
        KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') | KeyCode::Char('n') | KeyCode::Char('l') => {
            Some(Intent::Next)
        }
        KeyCode::Left | KeyCode::Up | KeyCode::Char('p') | KeyCode::Char('h') => Some(Intent::Previous),
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => Some(Intent::Back),
        KeyCode::Char('q') => Some(Intent::Quit),
        _ => None,
    }
}
