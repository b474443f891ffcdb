//! Conversion of Japanese text into annotated markup.
//!
//! The editor only ever talks to a [`Converter`]; [`DictionaryConverter`] is
//! the implementation shipped with the workspace.

mod dictionary;
mod format;
mod source;

use std::path::PathBuf;

pub use dictionary::{BUNDLED_DICTIONARY, DictionaryConverter};
pub use source::DictionarySource;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to read dictionary at {path}: {source}")]
    DictionaryRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to fetch dictionary from {url}: {source}")]
    DictionaryFetch {
        url: String,
        source: reqwest::Error,
    },
    #[error("Malformed dictionary entry at {path}:{line}: {reason}")]
    DictionaryFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Dictionary at {0} has no entries")]
    EmptyDictionary(PathBuf),
    #[error("Conversion failed: {0}")]
    Failed(String),
}

/// How readings are written into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvertMode {
    /// Replace the text with its reading.
    Normal,
    /// Like `Normal` with a space between words.
    Spaced,
    /// Kanji followed by a bracketed reading: `食(た)べる`.
    #[default]
    Okurigana,
    /// HTML ruby markup.
    Furigana,
}

/// Script the readings are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Script {
    #[default]
    Hiragana,
    Katakana,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    pub mode: ConvertMode,
    pub to: Script,
}

impl ConvertOptions {
    /// The options the editor converts with: okurigana markup in `to`.
    pub fn okurigana(to: Script) -> Self {
        Self {
            mode: ConvertMode::Okurigana,
            to,
        }
    }
}

/// Something that can attach readings to a run of text.
pub trait Converter: Send + Sync {
    /// Converts `text`, returning the annotated markup.
    ///
    /// Input is expected to be free of previous annotations; feeding markup
    /// back in produces stacked readings.
    fn convert(&self, text: &str, options: &ConvertOptions) -> Result<String, ConvertError>;
}

impl<C: Converter + ?Sized> Converter for Box<C> {
    fn convert(&self, text: &str, options: &ConvertOptions) -> Result<String, ConvertError> {
        (**self).convert(text, options)
    }
}
