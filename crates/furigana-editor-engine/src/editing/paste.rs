use std::borrow::Cow;

use crate::editing::{Caret, Document, Node, Patch};

/// Turns `\r\n` and lone `\r` into `\n`.
pub fn normalize_line_breaks(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

impl Document {
    /// Inserts clipboard text at the caret.
    ///
    /// Each line break in `text` ends the current block and starts a new one,
    /// exactly as a typed line break would, but nothing is converted. The
    /// caret ends up after the last pasted character.
    pub fn paste(&mut self, text: &str) -> Patch {
        let text = normalize_line_breaks(text);
        if self.locate_active_block(self.caret).is_none() {
            self.recover_active_block();
        }

        let first = self.caret.child;
        let mut lines = text.split('\n');
        if let Some(line) = lines.next() {
            self.insert_inline_text(line);
        }
        for line in lines {
            self.split_block_at_caret();
            self.insert_inline_text(line);
        }

        self.version += 1;
        self.patch(first..self.caret.child + 1)
    }

    /// Moves everything after the caret into a new block right below it and
    /// puts the caret at the start of that block.
    pub(crate) fn split_block_at_caret(&mut self) {
        let Caret { child, offset } = self.caret;
        let Some(Node::Block(block)) = self.children.get_mut(child) else {
            return;
        };
        let tail = block.split_off(offset);
        self.children.insert(child + 1, Node::Block(tail));
        self.caret = Caret::new(child + 1, 0);
    }
}
