//! Per-block conversion: a line break converts only the block holding the
//! caret and opens a fresh block below it.

use crate::annotation::AnnotatedSpan;
use crate::convert::{ConvertOptions, Converter};
use crate::editing::{Block, Caret, Document, EditError, Inline, Node, Patch};

/// Converts every raw text run of `block` that has non-whitespace content.
/// Annotated runs and blank text are copied through unchanged; the block
/// keeps its id.
pub fn convert_block(
    block: &Block,
    converter: &dyn Converter,
    options: &ConvertOptions,
) -> Result<Block, EditError> {
    let mut inlines = Vec::with_capacity(block.inlines().len());
    for inline in block.inlines() {
        match inline {
            Inline::Text(text) if !text.trim().is_empty() => {
                let markup = converter.convert(text, options)?;
                inlines.push(Inline::Annotated(AnnotatedSpan::from_markup(
                    text.clone(),
                    markup,
                )));
            }
            other => inlines.push(other.clone()),
        }
    }
    Ok(Block::from_parts(block.id(), inlines))
}

impl Document {
    /// Index of the block holding `caret`, or `None` when the caret is on a
    /// loose root node or past the last child.
    pub fn locate_active_block(&self, caret: Caret) -> Option<usize> {
        match self.children.get(caret.child) {
            Some(Node::Block(_)) => Some(caret.child),
            _ => None,
        }
    }

    /// Repairs the root so the caret is inside a block again.
    ///
    /// An empty document gets one empty block. Otherwise every root child is
    /// gathered, in order, into a single new block which becomes the whole
    /// document, with the caret at its end. Line structure between former
    /// blocks is not preserved.
    pub(crate) fn recover_active_block(&mut self) -> usize {
        if self.children.is_empty() {
            log::debug!("Document has no blocks; creating one");
            self.children.push(Node::Block(Block::new()));
            self.caret = Caret::new(0, 0);
            return 0;
        }

        log::debug!(
            "Caret {:?} is outside any block; collecting {} root nodes into one block",
            self.caret,
            self.children.len()
        );
        let mut inlines = Vec::new();
        for node in self.children.drain(..) {
            match node {
                Node::Block(block) => inlines.extend(block.into_inlines()),
                Node::Loose(inline) => inlines.push(inline),
            }
        }
        let block = Block::with_inlines(inlines);
        let end = block.len();
        self.children.push(Node::Block(block));
        let index = self.children.len() - 1;
        self.caret = Caret::new(index, end);
        index
    }

    /// Handles a confirmed line break.
    ///
    /// Converts the active block (recovering one first if needed), then
    /// inserts an empty block after it and moves the caret there. The edit is
    /// all-or-nothing: if conversion fails the document and caret are left
    /// exactly as they were.
    pub fn confirm_line_break(
        &mut self,
        converter: &dyn Converter,
        options: &ConvertOptions,
    ) -> Result<Patch, EditError> {
        let mut next = self.clone();
        let index = match next.locate_active_block(next.caret) {
            Some(index) => index,
            None => next.recover_active_block(),
        };

        let block = next.block(index).ok_or(EditError::NoActiveBlock)?;
        let converted = convert_block(block, converter, options).inspect_err(|e| {
            log::warn!("Conversion of block {index} failed, line break abandoned: {e}");
        })?;

        next.caret = Caret::new(index, converted.len());
        next.children[index] = Node::Block(converted);

        next.children.insert(index + 1, Node::Block(Block::new()));
        next.caret = Caret::new(index + 1, 0);
        next.version += 1;

        *self = next;
        Ok(self.patch(index..index + 2))
    }
}
