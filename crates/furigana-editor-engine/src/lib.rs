pub mod annotation;
pub mod convert;
pub mod editing;
pub mod editor;
pub mod gate;
pub mod kana;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::{
    ConvertError, ConvertMode, ConvertOptions, Converter, DictionaryConverter, DictionarySource,
    Script,
};
pub use editing::{Block, Caret, Document, EditError, Inline, Node, Patch, TextBuffer};
pub use editor::{EditOutcome, Editor, InputEvent, Surface};
pub use gate::{GateState, InitGate};
