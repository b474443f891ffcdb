use xi_rope::Rope;

use crate::convert::{ConvertOptions, Converter};
use crate::editing::EditError;
use crate::editing::global::reconvert_with_caret;
use crate::editing::paste::normalize_line_breaks;

/// Flat text with a caret, edited by the global re-conversion variant.
///
/// Readings live inline in the text (`食(た)べる`) and every confirmed line
/// break rewrites the whole buffer.
#[derive(Clone, Default)]
pub struct TextBuffer {
    /// Whole document as UTF-8; readings included
    buffer: Rope,
    /// Caret as a byte offset into `buffer`
    caret: usize,
    version: u64,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding `text` with the caret at the end.
    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            caret: text.len(),
            version: 0,
        }
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_caret(&mut self, offset: usize) -> Result<(), EditError> {
        if !self.text().is_char_boundary(offset) {
            return Err(EditError::InvalidCaret {
                offset,
                len: self.len(),
            });
        }
        self.caret = offset;
        Ok(())
    }

    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.buffer.edit(self.caret..self.caret, text);
        self.caret += text.len();
        self.version += 1;
    }

    /// Clipboard text goes in verbatim, with line breaks normalized.
    pub fn paste(&mut self, text: &str) {
        self.insert_text(&normalize_line_breaks(text));
    }

    /// Removes the grapheme before the caret. Returns false at the start.
    pub fn delete_backward(&mut self) -> bool {
        let Some(prev) = self.buffer.prev_grapheme_offset(self.caret) else {
            return false;
        };
        self.buffer.edit(prev..self.caret, "");
        self.caret = prev;
        self.version += 1;
        true
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.buffer.prev_grapheme_offset(self.caret) {
            self.caret = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.buffer.next_grapheme_offset(self.caret) {
            self.caret = next;
        }
    }

    pub fn move_home(&mut self) {
        let text = self.text();
        self.caret = line_start(&text, self.caret);
    }

    pub fn move_end(&mut self) {
        let text = self.text();
        self.caret = line_end(&text, self.caret);
    }

    pub fn move_up(&mut self) {
        let text = self.text();
        let start = line_start(&text, self.caret);
        if start == 0 {
            return;
        }
        let column = text[start..self.caret].chars().count();
        let above = line_start(&text, start - 1);
        self.caret = offset_at_column(&text, above, start - 1, column);
    }

    pub fn move_down(&mut self) {
        let text = self.text();
        let end = line_end(&text, self.caret);
        if end == text.len() {
            return;
        }
        let column = text[line_start(&text, self.caret)..self.caret].chars().count();
        let below = end + 1;
        self.caret = offset_at_column(&text, below, line_end(&text, below), column);
    }

    /// Handles a confirmed line break by re-converting the whole buffer.
    ///
    /// Returns whether the caret could be restored. When the converter drops
    /// the caret sentinel the new text is still applied and the caret is only
    /// clamped into it.
    pub fn confirm_line_break(
        &mut self,
        converter: &dyn Converter,
        options: &ConvertOptions,
    ) -> Result<bool, EditError> {
        let result = reconvert_with_caret(converter, &self.text(), self.caret, options)?;

        let restored = result.caret.is_some();
        self.caret = match result.caret {
            Some(caret) => caret,
            None => floor_char_boundary(&result.text, self.caret),
        };
        self.buffer = Rope::from(result.text.as_str());
        self.version += 1;
        Ok(restored)
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field("text", &self.text())
            .field("caret", &self.caret)
            .field("version", &self.version)
            .finish()
    }
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len())
}

fn offset_at_column(text: &str, start: usize, end: usize, column: usize) -> usize {
    text[start..end]
        .char_indices()
        .nth(column)
        .map(|(i, _)| start + i)
        .unwrap_or(end)
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{FailingConverter, ScriptedConverter, sample_converter};
    use pretty_assertions::assert_eq;

    #[test]
    fn typing_and_backspace() {
        let mut buffer = TextBuffer::new();
        buffer.insert_text("たべる");
        assert_eq!(buffer.caret(), "たべる".len());
        assert!(buffer.delete_backward());
        assert_eq!(buffer.text(), "たべ");

        buffer.set_caret(0).unwrap();
        assert!(!buffer.delete_backward());
        assert_eq!(buffer.version(), 2);
    }

    #[test]
    fn enter_reconverts_whole_buffer() {
        let mut buffer = TextBuffer::from_text("今日は");
        let restored = buffer
            .confirm_line_break(&sample_converter(), &ConvertOptions::default())
            .unwrap();
        assert!(restored);
        assert_eq!(buffer.text(), "今日(きょう)は\n");
        assert_eq!(buffer.caret(), buffer.len());

        buffer.insert_text("食べる");
        buffer
            .confirm_line_break(&sample_converter(), &ConvertOptions::default())
            .unwrap();
        assert_eq!(buffer.text(), "今日(きょう)は\n食(た)べる\n");
    }

    #[test]
    fn lost_sentinel_clamps_caret() {
        let mut buffer = TextBuffer::from_text("長い長いテキスト");
        let restored = buffer
            .confirm_line_break(&ScriptedConverter::new("短い"), &ConvertOptions::default())
            .unwrap();
        assert!(!restored);
        assert_eq!(buffer.text(), "短い");
        assert_eq!(buffer.caret(), "短い".len());
    }

    #[test]
    fn failed_conversion_keeps_buffer() {
        let mut buffer = TextBuffer::from_text("今日は");
        let result = buffer.confirm_line_break(&FailingConverter, &ConvertOptions::default());
        assert!(result.is_err());
        assert_eq!(buffer.text(), "今日は");
        assert_eq!(buffer.caret(), "今日は".len());
        assert_eq!(buffer.version(), 0);
    }

    #[test]
    fn paste_keeps_line_breaks_in_text() {
        let mut buffer = TextBuffer::new();
        buffer.paste("一\r\n二");
        assert_eq!(buffer.text(), "一\n二");
    }

    #[test]
    fn vertical_movement_keeps_column() {
        let mut buffer = TextBuffer::from_text("あいう\nか\nさしす");
        buffer.set_caret("あい".len()).unwrap();
        buffer.move_down();
        assert_eq!(buffer.caret(), "あいう\nか".len());
        buffer.move_down();
        assert_eq!(buffer.caret(), "あいう\nか\nさ".len());
        buffer.move_up();
        buffer.move_up();
        assert_eq!(buffer.caret(), "あ".len());
        buffer.move_end();
        assert_eq!(buffer.caret(), "あいう".len());
        buffer.move_home();
        assert_eq!(buffer.caret(), 0);
    }

    #[test]
    fn invalid_caret_is_rejected() {
        let mut buffer = TextBuffer::from_text("あ");
        assert!(buffer.set_caret(1).is_err());
        assert!(buffer.set_caret(4).is_err());
    }
}
