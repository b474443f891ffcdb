use std::ops::Range;

use crate::editing::Caret;

/// Result of applying an edit to a [`Document`](crate::editing::Document)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Root child indices touched by the edit, in the edited document
    pub changed: Range<usize>,
    pub caret: Caret,
    pub version: u64,
}
