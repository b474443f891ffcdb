/*!
 * # Editing Core Module
 *
 * Two editing surfaces that share one conversion engine.
 *
 * ## Architecture Overview
 *
 * ### 1. Per-block conversion (`Document`)
 * - The document root is a list of **blocks**, one per line
 * - Each block holds **inlines**: raw text runs and converted runs
 * - A confirmed line break converts **only the block holding the caret**,
 *   then opens an empty block below it and moves the caret there
 * - Converted runs are never converted again, so earlier lines stay
 *   byte-for-byte as they were
 * - Line breaks are **transactional**: if conversion fails the document and
 *   caret are untouched
 *
 * ### 2. Global re-conversion (`TextBuffer`)
 * - The whole document is one **`xi_rope::Rope`** with readings inline
 * - A confirmed line break strips every old reading, re-converts the full
 *   text, and restores the caret through a sentinel character
 *
 * ### 3. Patches
 * - Every `Document` edit returns a **`Patch`** naming the changed children,
 *   the new caret and the new document version
 * - Frontends re-render from the patch and never touch children directly
 *
 * ## Module Structure
 *
 * - **`document`**: `Document`, `Block`, `Inline`, `Node` and caret movement
 * - **`block_convert`**: active-block location, recovery and per-block Enter
 * - **`global`**: sentinel-based whole-text re-conversion
 * - **`text_buffer`**: rope-backed flat buffer for the global variant
 * - **`paste`**: plain-text paste and line-break normalization
 * - **`html`**: HTML rendering of a `Document`
 * - **`patch`**: edit result metadata
 *
 * ## Usage Pattern
 *
 * ```rust
 * use furigana_editor_engine::convert::{ConvertOptions, DictionaryConverter};
 * use furigana_editor_engine::editing::Document;
 *
 * let converter = DictionaryConverter::from_entries([("食べる", "たべる")]).unwrap();
 *
 * let mut doc = Document::new();
 * doc.insert_text("食べる");
 * let patch = doc
 *     .confirm_line_break(&converter, &ConvertOptions::default())
 *     .unwrap();
 *
 * assert_eq!(doc.to_plain_text(), "食(た)べる\n");
 * assert_eq!(patch.caret.child, 1);
 * ```
 */

pub mod block_convert;
pub mod document;
pub mod global;
pub mod html;
pub mod paste;
pub mod patch;
pub mod text_buffer;

pub use block_convert::convert_block;
pub use document::{Block, BlockId, Caret, Document, Inline, Node};
pub use global::{CURSOR_SENTINEL, Reconversion, reconvert_with_caret};
pub use paste::normalize_line_breaks;
pub use patch::Patch;
pub use text_buffer::TextBuffer;

use crate::convert::ConvertError;

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Editor is not ready: dictionary still loading")]
    NotReady,

    #[error("Converter unavailable: {0}")]
    ConverterUnavailable(String),

    #[error(transparent)]
    Conversion(#[from] ConvertError),

    #[error("No active block to convert")]
    NoActiveBlock,

    #[error("Caret child {child} out of range ({children} children)")]
    CaretOutOfRange { child: usize, children: usize },

    #[error("Caret offset {offset} is not a character boundary (length {len})")]
    InvalidCaret { offset: usize, len: usize },

    #[error("Text already contains the cursor sentinel")]
    SentinelCollision,
}
