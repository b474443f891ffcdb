use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use furigana_editor_config::{Preferences, Theme};
use furigana_editor_engine::{EditError, EditOutcome, Editor, GateState, InputEvent};

/// What a terminal event asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleTheme,
    Input(InputEvent),
    None,
}

pub struct App {
    pub editor: Editor,
    pub preferences: Preferences,
    preferences_path: PathBuf,
    /// One-line message shown in the status bar
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(editor: Editor, preferences: Preferences, preferences_path: PathBuf) -> Self {
        Self {
            editor,
            preferences,
            preferences_path,
            status: None,
            should_quit: false,
        }
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme
    }

    /// Picks up the dictionary loader result, once.
    pub fn tick(&mut self) {
        let before = self.editor.gate_state().clone();
        let after = self.editor.poll_gate();
        if before == *after {
            return;
        }
        self.status = match after {
            GateState::Ready => Some("Dictionary loaded".to_string()),
            GateState::Failed(message) => Some(format!("Dictionary failed to load: {message}")),
            GateState::Loading => None,
        };
    }

    pub fn handle_event(&mut self, event: Event) {
        let action = match event {
            Event::Key(key) => map_key(key),
            Event::Paste(text) => Action::Input(InputEvent::Paste(text)),
            _ => Action::None,
        };
        self.apply(action);
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleTheme => self.toggle_theme(),
            Action::Input(input) => self.input(input),
            Action::None => {}
        }
    }

    fn toggle_theme(&mut self) {
        let theme = self.preferences.toggle_theme();
        if let Err(e) = self.preferences.save_to_path(&self.preferences_path) {
            log::warn!("Failed to save theme preference: {e}");
            self.status = Some(format!("Theme not saved: {e}"));
            return;
        }
        log::info!("Theme switched to {theme:?}");
    }

    fn input(&mut self, input: InputEvent) {
        match self.editor.handle(input) {
            Ok(EditOutcome::Converted {
                caret_restored: false,
            }) => self.status = Some("Converted; cursor position could not be kept".to_string()),
            Ok(EditOutcome::Converted { .. }) => self.status = None,
            Ok(_) => {}
            Err(EditError::NotReady) => {
                self.status = Some("Still loading the dictionary".to_string());
            }
            Err(e @ EditError::ConverterUnavailable(_)) => self.status = Some(e.to_string()),
            Err(e) => {
                log::warn!("Edit failed: {e}");
                self.status = Some(format!("Edit failed: {e}"));
            }
        }
    }
}

/// Terminals only deliver text an input method has already committed, so
/// Enter never arrives mid-composition here.
pub fn map_key(key: KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('q') if ctrl => Action::Quit,
        KeyCode::Char('t') if ctrl => Action::ToggleTheme,
        KeyCode::Char(_) if ctrl => Action::None,
        KeyCode::Char(c) => Action::Input(InputEvent::Char(c)),
        KeyCode::Enter => Action::Input(InputEvent::Enter { composing: false }),
        KeyCode::Backspace => Action::Input(InputEvent::Backspace),
        KeyCode::Left => Action::Input(InputEvent::Left),
        KeyCode::Right => Action::Input(InputEvent::Right),
        KeyCode::Up => Action::Input(InputEvent::Up),
        KeyCode::Down => Action::Input(InputEvent::Down),
        KeyCode::Home => Action::Input(InputEvent::Home),
        KeyCode::End => Action::Input(InputEvent::End),
        _ => Action::None,
    }
}
