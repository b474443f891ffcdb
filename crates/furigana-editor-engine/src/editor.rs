//! Front-end facing editor: routes input events to the active surface,
//! behind the initialization gate.

use crate::convert::{ConvertOptions, Script};
use crate::editing::{Document, EditError, TextBuffer};
use crate::gate::{GateState, InitGate};

/// Keyboard-level input delivered by a front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    /// `composing` is true while an input method still owns the keystroke.
    Enter { composing: bool },
    Backspace,
    Paste(String),
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Ignored,
    Edited,
    /// A line break was confirmed and conversion ran.
    Converted { caret_restored: bool },
}

/// The editing variant in use.
#[derive(Debug, Clone)]
pub enum Surface {
    /// Per-block incremental conversion.
    Blocks(Document),
    /// Global re-conversion of a flat buffer.
    Text(TextBuffer),
}

#[derive(Debug)]
pub struct Editor {
    gate: InitGate,
    surface: Surface,
    options: ConvertOptions,
}

impl Editor {
    pub fn with_blocks(gate: InitGate) -> Self {
        Self::new(gate, Surface::Blocks(Document::new()))
    }

    pub fn with_text(gate: InitGate) -> Self {
        Self::new(gate, Surface::Text(TextBuffer::new()))
    }

    pub fn new(gate: InitGate, surface: Surface) -> Self {
        Self {
            gate,
            surface,
            options: ConvertOptions::default(),
        }
    }

    /// Writes readings in `script` from now on.
    pub fn set_script(&mut self, script: Script) {
        self.options = ConvertOptions::okurigana(script);
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn gate_state(&self) -> &GateState {
        self.gate.state()
    }

    pub fn is_editable(&self) -> bool {
        self.gate.is_editable()
    }

    /// Non-blocking check on the dictionary loader.
    pub fn poll_gate(&mut self) -> &GateState {
        self.gate.poll()
    }

    /// Applies one input event.
    ///
    /// Fails fast with [`EditError::NotReady`] or
    /// [`EditError::ConverterUnavailable`] until the gate is open. A failed
    /// conversion leaves the surface untouched.
    pub fn handle(&mut self, event: InputEvent) -> Result<EditOutcome, EditError> {
        if let InputEvent::Enter { composing: true } = event {
            return Ok(EditOutcome::Ignored);
        }
        let converter = self.gate.converter()?;

        let outcome = match (&mut self.surface, event) {
            (Surface::Blocks(doc), InputEvent::Enter { .. }) => {
                doc.confirm_line_break(converter, &self.options)?;
                EditOutcome::Converted {
                    caret_restored: true,
                }
            }
            (Surface::Text(buffer), InputEvent::Enter { .. }) => {
                let caret_restored = buffer.confirm_line_break(converter, &self.options)?;
                EditOutcome::Converted { caret_restored }
            }
            (Surface::Blocks(doc), event) => edit_document(doc, event),
            (Surface::Text(buffer), event) => edit_buffer(buffer, event),
        };
        Ok(outcome)
    }
}

fn edit_document(doc: &mut Document, event: InputEvent) -> EditOutcome {
    match event {
        InputEvent::Char(c) => {
            doc.insert_text(c.encode_utf8(&mut [0; 4]));
        }
        InputEvent::Paste(text) => {
            doc.paste(&text);
        }
        InputEvent::Backspace => {
            if doc.delete_backward().is_none() {
                return EditOutcome::Ignored;
            }
        }
        InputEvent::Left => doc.move_left(),
        InputEvent::Right => doc.move_right(),
        InputEvent::Up => doc.move_up(),
        InputEvent::Down => doc.move_down(),
        InputEvent::Home => doc.move_home(),
        InputEvent::End => doc.move_end(),
        InputEvent::Enter { .. } => return EditOutcome::Ignored,
    }
    EditOutcome::Edited
}

fn edit_buffer(buffer: &mut TextBuffer, event: InputEvent) -> EditOutcome {
    match event {
        InputEvent::Char(c) => buffer.insert_text(c.encode_utf8(&mut [0; 4])),
        InputEvent::Paste(text) => buffer.paste(&text),
        InputEvent::Backspace => {
            if !buffer.delete_backward() {
                return EditOutcome::Ignored;
            }
        }
        InputEvent::Left => buffer.move_left(),
        InputEvent::Right => buffer.move_right(),
        InputEvent::Up => buffer.move_up(),
        InputEvent::Down => buffer.move_down(),
        InputEvent::Home => buffer.move_home(),
        InputEvent::End => buffer.move_end(),
        InputEvent::Enter { .. } => return EditOutcome::Ignored,
    }
    EditOutcome::Edited
}
