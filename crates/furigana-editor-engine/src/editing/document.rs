use std::borrow::Cow;

use uuid::Uuid;

use crate::annotation::AnnotatedSpan;
use crate::editing::{EditError, Patch};

/// Stable identifier of a block, kept when the block is converted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BlockId(pub Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

/// An inline node inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Raw text as typed, not yet converted.
    Text(String),
    /// A converted run with readings attached.
    Annotated(AnnotatedSpan),
}

impl Inline {
    /// The text shown for this node; for annotated runs this includes readings.
    pub fn display_text(&self) -> &str {
        match self {
            Inline::Text(text) => text,
            Inline::Annotated(span) => span.markup(),
        }
    }

    /// The text without readings.
    pub fn source_text(&self) -> &str {
        match self {
            Inline::Text(text) => text,
            Inline::Annotated(span) => span.source(),
        }
    }

    pub fn len(&self) -> usize {
        self.display_text().len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_text().is_empty()
    }
}

/// One line of the document.
///
/// Offsets into a block are byte offsets into its display text (the
/// concatenation of every inline's [`Inline::display_text`]). A caret never
/// sits inside an annotated run: positions are snapped to the run's end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    inlines: Vec<Inline>,
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl Block {
    /// An empty block.
    pub fn new() -> Self {
        Self {
            id: BlockId::new(),
            inlines: Vec::new(),
        }
    }

    pub fn with_inlines(inlines: Vec<Inline>) -> Self {
        Self::from_parts(BlockId::new(), inlines)
    }

    pub(crate) fn from_parts(id: BlockId, inlines: Vec<Inline>) -> Self {
        let mut block = Self { id, inlines };
        block.normalize();
        block
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    pub(crate) fn into_inlines(self) -> Vec<Inline> {
        self.inlines
    }

    pub fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inlines.iter().map(Inline::len).sum()
    }

    pub fn text(&self) -> String {
        self.inlines.iter().map(Inline::display_text).collect()
    }

    pub fn source_text(&self) -> String {
        self.inlines.iter().map(Inline::source_text).collect()
    }

    /// True if the block holds typed text that has not been converted yet.
    pub fn has_pending_text(&self) -> bool {
        self.inlines
            .iter()
            .any(|inline| matches!(inline, Inline::Text(text) if !text.trim().is_empty()))
    }

    /// Drops empty text runs and merges neighbouring ones.
    fn normalize(&mut self) {
        let mut merged: Vec<Inline> = Vec::with_capacity(self.inlines.len());
        for inline in self.inlines.drain(..) {
            if let Inline::Text(text) = &inline {
                if text.is_empty() {
                    continue;
                }
                if let Some(Inline::Text(prev)) = merged.last_mut() {
                    prev.push_str(text);
                    continue;
                }
            }
            merged.push(inline);
        }
        self.inlines = merged;
    }

    pub(crate) fn snap(&self, offset: usize) -> usize {
        snap_in(&self.inlines, offset)
    }

    pub(crate) fn prev_position(&self, offset: usize) -> Option<usize> {
        prev_in(&self.inlines, offset)
    }

    /// Inserts raw text at `offset`, returning the offset just after it.
    pub(crate) fn insert_text(&mut self, offset: usize, text: &str) -> usize {
        let offset = self.snap(offset);
        if text.is_empty() {
            return offset;
        }

        let at = match locate(&self.inlines, offset) {
            None => self.inlines.len(),
            Some((index, local)) => match &mut self.inlines[index] {
                Inline::Text(existing) => {
                    existing.insert_str(local, text);
                    return offset + text.len();
                }
                Inline::Annotated(_) if local == 0 => index,
                Inline::Annotated(_) => index + 1,
            },
        };
        self.inlines.insert(at, Inline::Text(text.to_string()));
        self.normalize();
        offset + text.len()
    }

    /// Removes the character (or whole annotated run) before `offset`.
    /// Returns the new offset, or `None` at the start of the block.
    pub(crate) fn delete_before(&mut self, offset: usize) -> Option<usize> {
        let offset = self.snap(offset);
        let prev = self.prev_position(offset)?;
        let (index, start, _) =
            ranges(&self.inlines).find(|&(_, start, end)| start < offset && offset <= end)?;

        match &mut self.inlines[index] {
            Inline::Text(text) => text.replace_range(prev - start..offset - start, ""),
            Inline::Annotated(_) => {
                self.inlines.remove(index);
            }
        }
        self.normalize();
        Some(prev)
    }

    /// Splits the block at `offset`, keeping the head and returning the tail
    /// as a new block.
    pub(crate) fn split_off(&mut self, offset: usize) -> Block {
        let offset = self.snap(offset);
        let mut head = Vec::new();
        let mut tail = Vec::new();

        let spans: Vec<_> = ranges(&self.inlines).collect();
        for ((_, start, end), inline) in spans.into_iter().zip(self.inlines.drain(..)) {
            if end <= offset {
                head.push(inline);
            } else if start >= offset {
                tail.push(inline);
            } else if let Inline::Text(mut text) = inline {
                let rest = text.split_off(offset - start);
                head.push(Inline::Text(text));
                tail.push(Inline::Text(rest));
            }
        }

        self.inlines = head;
        self.normalize();
        Block::with_inlines(tail)
    }

    pub(crate) fn append(&mut self, other: Block) {
        self.inlines.extend(other.inlines);
        self.normalize();
    }
}

/// A direct child of the document root.
///
/// Well-formed documents contain only blocks. Text typed into a document that
/// has no block yet lands at the root as a loose node, the same way it does in
/// an editable surface with no paragraphs; the next line break gathers it
/// into a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Block(Block),
    Loose(Inline),
}

impl Node {
    pub fn len(&self) -> usize {
        match self {
            Node::Block(block) => block.len(),
            Node::Loose(inline) => inline.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Node::Block(block) => Cow::Owned(block.text()),
            Node::Loose(inline) => Cow::Borrowed(inline.display_text()),
        }
    }

    fn inlines(&self) -> &[Inline] {
        match self {
            Node::Block(block) => &block.inlines,
            Node::Loose(inline) => std::slice::from_ref(inline),
        }
    }
}

/// Caret position: root child index plus byte offset into its display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caret {
    pub child: usize,
    pub offset: usize,
}

impl Caret {
    pub fn new(child: usize, offset: usize) -> Self {
        Self { child, offset }
    }
}

/// The block-structured document edited by the per-block variant.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) children: Vec<Node>,
    pub(crate) caret: Caret,
    pub(crate) version: u64,
}

impl Document {
    /// An empty document with no blocks at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// One unconverted block per line, caret at the end.
    pub fn from_plain_text(text: &str) -> Self {
        let text = crate::editing::paste::normalize_line_breaks(text);
        let children: Vec<Node> = text
            .split('\n')
            .map(|line| Node::Block(Block::with_inlines(vec![Inline::Text(line.to_string())])))
            .collect();
        let last = children.len() - 1;
        let caret = Caret::new(last, children[last].len());
        Self {
            children,
            caret,
            version: 0,
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter_map(|node| match node {
            Node::Block(block) => Some(block),
            Node::Loose(_) => None,
        })
    }

    /// The block at root index `index`, if that child is a block.
    pub fn block(&self, index: usize) -> Option<&Block> {
        match self.children.get(index) {
            Some(Node::Block(block)) => Some(block),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Moves the caret, snapping the offset to a valid position in the child.
    pub fn set_caret(&mut self, caret: Caret) -> Result<(), EditError> {
        if self.children.is_empty() && caret == Caret::default() {
            self.caret = caret;
            return Ok(());
        }
        let node = self
            .children
            .get(caret.child)
            .ok_or(EditError::CaretOutOfRange {
                child: caret.child,
                children: self.children.len(),
            })?;
        self.caret = Caret::new(caret.child, snap_in(node.inlines(), caret.offset));
        Ok(())
    }

    /// Text as displayed, one line per root child.
    pub fn to_plain_text(&self) -> String {
        self.children
            .iter()
            .map(Node::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text with every reading removed, one line per root child.
    pub fn source_text(&self) -> String {
        self.children
            .iter()
            .map(|node| match node {
                Node::Block(block) => block.source_text(),
                Node::Loose(inline) => inline.source_text().to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Types text at the caret. Line breaks in `text` split blocks the same
    /// way a paste does.
    pub fn insert_text(&mut self, text: &str) -> Patch {
        if text.contains(['\n', '\r']) {
            return self.paste(text);
        }
        let child = self.caret.child;
        self.insert_inline_text(text);
        self.version += 1;
        self.patch(child..self.caret.child + 1)
    }

    pub(crate) fn insert_inline_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let Caret { child, offset } = self.caret;
        if child >= self.children.len() {
            self.children.push(Node::Loose(Inline::Text(text.to_string())));
            self.caret = Caret::new(self.children.len() - 1, text.len());
            return;
        }

        match &mut self.children[child] {
            Node::Block(block) => {
                self.caret.offset = block.insert_text(offset, text);
            }
            Node::Loose(Inline::Text(existing)) => {
                let offset = floor_char_boundary(existing, offset);
                existing.insert_str(offset, text);
                self.caret.offset = offset + text.len();
            }
            Node::Loose(Inline::Annotated(_)) => {
                let at = if offset == 0 { child } else { child + 1 };
                self.children
                    .insert(at, Node::Loose(Inline::Text(text.to_string())));
                self.caret = Caret::new(at, text.len());
            }
        }
    }

    /// Backspace. Merges with the previous block at the start of a block.
    /// Returns `None` when there is nothing to delete.
    pub fn delete_backward(&mut self) -> Option<Patch> {
        let Caret { child, offset } = self.caret;
        let node = self.children.get_mut(child)?;

        let changed = match node {
            Node::Block(block) => match block.delete_before(offset) {
                Some(new_offset) => {
                    self.caret.offset = new_offset;
                    child..child + 1
                }
                None => {
                    if child == 0 || !matches!(self.children[child - 1], Node::Block(_)) {
                        return None;
                    }
                    let Node::Block(current) = self.children.remove(child) else {
                        return None;
                    };
                    let Node::Block(previous) = &mut self.children[child - 1] else {
                        return None;
                    };
                    let join = previous.len();
                    previous.append(current);
                    self.caret = Caret::new(child - 1, join);
                    child - 1..child
                }
            },
            Node::Loose(inline) => {
                let prev = prev_in(std::slice::from_ref(&*inline), offset)?;
                if let Inline::Text(text) = inline {
                    text.replace_range(prev..offset, "");
                } else {
                    *inline = Inline::Text(String::new());
                }
                if inline.is_empty() {
                    self.children.remove(child);
                    self.caret = match child.checked_sub(1) {
                        Some(previous) => Caret::new(previous, self.children[previous].len()),
                        None => Caret::default(),
                    };
                } else {
                    self.caret.offset = prev;
                }
                child.saturating_sub(1)..child + 1
            }
        };

        self.version += 1;
        Some(self.patch(changed))
    }

    pub fn move_left(&mut self) {
        let Caret { child, offset } = self.caret;
        let Some(node) = self.children.get(child) else {
            return;
        };
        if let Some(prev) = prev_in(node.inlines(), offset) {
            self.caret.offset = prev;
        } else if child > 0 {
            self.caret = Caret::new(child - 1, self.children[child - 1].len());
        }
    }

    pub fn move_right(&mut self) {
        let Caret { child, offset } = self.caret;
        let Some(node) = self.children.get(child) else {
            return;
        };
        if let Some(next) = next_in(node.inlines(), offset) {
            self.caret.offset = next;
        } else if child + 1 < self.children.len() {
            self.caret = Caret::new(child + 1, 0);
        }
    }

    pub fn move_up(&mut self) {
        if self.caret.child > 0 {
            self.move_vertically(self.caret.child - 1);
        }
    }

    pub fn move_down(&mut self) {
        if self.caret.child + 1 < self.children.len() {
            self.move_vertically(self.caret.child + 1);
        }
    }

    pub fn move_home(&mut self) {
        self.caret.offset = 0;
    }

    pub fn move_end(&mut self) {
        if let Some(node) = self.children.get(self.caret.child) {
            self.caret.offset = node.len();
        }
    }

    /// Keeps the character column when moving between lines.
    fn move_vertically(&mut self, target: usize) {
        let column = self
            .children
            .get(self.caret.child)
            .map(|node| node.text()[..self.caret.offset.min(node.len())].chars().count())
            .unwrap_or(0);
        let node = &self.children[target];
        let text = node.text();
        let offset = text
            .char_indices()
            .nth(column)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        self.caret = Caret::new(target, snap_in(node.inlines(), offset));
    }

    pub(crate) fn patch(&self, changed: std::ops::Range<usize>) -> Patch {
        Patch {
            changed,
            caret: self.caret,
            version: self.version,
        }
    }
}

/// `(index, start, end)` of each inline within the concatenated text.
fn ranges(inlines: &[Inline]) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    inlines.iter().enumerate().scan(0, |start, (index, inline)| {
        let range = (index, *start, *start + inline.len());
        *start += inline.len();
        Some(range)
    })
}

/// The inline holding `offset` and the offset inside it. At a boundary the
/// earlier inline wins.
fn locate(inlines: &[Inline], offset: usize) -> Option<(usize, usize)> {
    ranges(inlines)
        .find(|&(_, start, end)| start <= offset && offset <= end)
        .map(|(index, start, _)| (index, offset - start))
}

fn snap_in(inlines: &[Inline], offset: usize) -> usize {
    let len: usize = inlines.iter().map(Inline::len).sum();
    let offset = offset.min(len);
    for (index, start, end) in ranges(inlines) {
        if start < offset && offset < end {
            return match &inlines[index] {
                Inline::Annotated(_) => end,
                Inline::Text(text) => start + floor_char_boundary(text, offset - start),
            };
        }
    }
    offset
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn prev_in(inlines: &[Inline], offset: usize) -> Option<usize> {
    let offset = snap_in(inlines, offset);
    let (index, start, _) =
        ranges(inlines).find(|&(_, start, end)| start < offset && offset <= end)?;
    match &inlines[index] {
        Inline::Text(text) => text[..offset - start]
            .char_indices()
            .next_back()
            .map(|(i, _)| start + i),
        Inline::Annotated(_) => Some(start),
    }
}

fn next_in(inlines: &[Inline], offset: usize) -> Option<usize> {
    let offset = snap_in(inlines, offset);
    let (index, start, end) =
        ranges(inlines).find(|&(_, start, end)| start <= offset && offset < end)?;
    match &inlines[index] {
        Inline::Text(text) => text[offset - start..]
            .chars()
            .next()
            .map(|c| offset + c.len_utf8()),
        Inline::Annotated(_) => Some(end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn annotated(source: &str, markup: &str) -> Inline {
        Inline::Annotated(AnnotatedSpan::from_markup(source, markup))
    }

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn normalize_merges_adjacent_text() {
        let block = Block::with_inlines(vec![
            text("あ"),
            text(""),
            text("い"),
            annotated("食", "食(た)"),
        ]);
        assert_eq!(block.inlines(), &[text("あい"), annotated("食", "食(た)")]);
    }

    #[test]
    fn snap_moves_out_of_annotated_runs() {
        let block = Block::with_inlines(vec![annotated("食べる", "食(た)べる"), text("よ")]);
        let span_len = "食(た)べる".len();
        assert_eq!(block.snap(1), span_len);
        assert_eq!(block.snap(span_len + 1), span_len);
        assert_eq!(block.snap(999), block.len());
    }

    #[test]
    fn typing_after_annotated_run_creates_text() {
        let mut block = Block::with_inlines(vec![annotated("食べる", "食(た)べる")]);
        let end = block.len();
        let caret = block.insert_text(end, "よ");
        assert_eq!(block.inlines(), &[annotated("食べる", "食(た)べる"), text("よ")]);
        assert_eq!(caret, block.len());
    }

    #[test]
    fn typing_before_annotated_run() {
        let mut block = Block::with_inlines(vec![annotated("食べる", "食(た)べる")]);
        block.insert_text(0, "私は");
        assert_eq!(block.text(), "私は食(た)べる");
        assert!(matches!(block.inlines()[0], Inline::Text(_)));
    }

    #[test]
    fn backspace_removes_whole_annotated_run() {
        let mut block = Block::with_inlines(vec![text("あ"), annotated("食べる", "食(た)べる")]);
        let caret = block.delete_before(block.len());
        assert_eq!(caret, Some("あ".len()));
        assert_eq!(block.inlines(), &[text("あ")]);
    }

    #[test]
    fn backspace_removes_one_character() {
        let mut block = Block::with_inlines(vec![text("あいう")]);
        let caret = block.delete_before("あい".len());
        assert_eq!(caret, Some("あ".len()));
        assert_eq!(block.text(), "あう");
        assert_eq!(block.delete_before(0), None);
    }

    #[test]
    fn split_off_divides_text() {
        let mut block = Block::with_inlines(vec![annotated("食", "食(た)"), text("べるよ")]);
        let at = "食(た)べる".len();
        let tail = block.split_off(at);
        assert_eq!(block.text(), "食(た)べる");
        assert_eq!(tail.text(), "よ");
        assert_ne!(block.id(), tail.id());
    }

    #[test]
    fn typing_into_empty_document_lands_at_root() {
        let mut doc = Document::new();
        doc.insert_text("ありがとう");
        assert_eq!(doc.children(), &[Node::Loose(text("ありがとう"))]);
        assert_eq!(doc.caret(), Caret::new(0, "ありがとう".len()));
    }

    #[test]
    fn from_plain_text_makes_one_block_per_line() {
        let doc = Document::from_plain_text("一\n二\r\n三");
        assert_eq!(doc.blocks().count(), 3);
        assert_eq!(doc.to_plain_text(), "一\n二\n三");
        assert_eq!(doc.caret(), Caret::new(2, "三".len()));
    }

    #[test]
    fn backspace_at_block_start_merges_blocks() {
        let mut doc = Document::from_plain_text("あい\nうえ");
        doc.set_caret(Caret::new(1, 0)).unwrap();
        let patch = doc.delete_backward().unwrap();
        assert_eq!(doc.to_plain_text(), "あいうえ");
        assert_eq!(doc.caret(), Caret::new(0, "あい".len()));
        assert_eq!(patch.changed, 0..1);
    }

    #[test]
    fn backspace_at_document_start_is_a_no_op() {
        let mut doc = Document::from_plain_text("あ");
        doc.set_caret(Caret::new(0, 0)).unwrap();
        assert!(doc.delete_backward().is_none());
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn backspace_empties_loose_text() {
        let mut doc = Document::new();
        doc.insert_text("a");
        doc.delete_backward();
        assert!(doc.is_empty());
        assert_eq!(doc.caret(), Caret::default());
    }

    #[test]
    fn caret_moves_across_blocks() {
        let mut doc = Document::from_plain_text("あい\nう");
        doc.set_caret(Caret::new(0, "あい".len())).unwrap();
        doc.move_right();
        assert_eq!(doc.caret(), Caret::new(1, 0));
        doc.move_left();
        assert_eq!(doc.caret(), Caret::new(0, "あい".len()));
        doc.move_left();
        assert_eq!(doc.caret(), Caret::new(0, "あ".len()));
        doc.move_down();
        assert_eq!(doc.caret(), Caret::new(1, "う".len()));
        doc.move_home();
        assert_eq!(doc.caret(), Caret::new(1, 0));
        doc.move_up();
        doc.move_end();
        assert_eq!(doc.caret(), Caret::new(0, "あい".len()));
    }

    #[test]
    fn set_caret_rejects_missing_child() {
        let mut doc = Document::from_plain_text("あ");
        assert!(matches!(
            doc.set_caret(Caret::new(3, 0)),
            Err(EditError::CaretOutOfRange { child: 3, children: 1 })
        ));
    }

    #[test]
    fn set_caret_snaps_to_char_boundary() {
        let mut doc = Document::from_plain_text("あい");
        doc.set_caret(Caret::new(0, 1)).unwrap();
        assert_eq!(doc.caret(), Caret::new(0, 0));
    }
}
