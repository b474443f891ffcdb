//! Whole-text re-conversion with caret tracking.
//!
//! The converter only sees flat text, so the caret is carried through it as a
//! sentinel character: strip the old readings, drop the sentinel where the
//! caret was, convert everything, then look for the sentinel in the output.

use crate::annotation::strip_readings_tracking;
use crate::convert::{ConvertOptions, Converter};
use crate::editing::EditError;

/// Caret placeholder. A private-use code point, so it never comes from a
/// keyboard and converters pass it through as unknown text.
pub const CURSOR_SENTINEL: char = '\u{E000}';

/// Output of [`reconvert_with_caret`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconversion {
    /// The converted text, sentinel removed.
    pub text: String,
    /// New caret byte offset, or `None` if the converter dropped the sentinel.
    pub caret: Option<usize>,
}

/// Re-converts `text` after inserting a line break at `caret`.
///
/// The line break goes before the sentinel, so the returned caret sits at the
/// start of the new line. Fails without side effects if `caret` is not a
/// character boundary of `text`, if `text` already contains the sentinel, or
/// if the converter fails.
pub fn reconvert_with_caret(
    converter: &dyn Converter,
    text: &str,
    caret: usize,
    options: &ConvertOptions,
) -> Result<Reconversion, EditError> {
    if !text.is_char_boundary(caret) {
        return Err(EditError::InvalidCaret {
            offset: caret,
            len: text.len(),
        });
    }
    if text.contains(CURSOR_SENTINEL) {
        return Err(EditError::SentinelCollision);
    }

    let (stripped, caret) = strip_readings_tracking(text, caret);
    let mut marked = String::with_capacity(stripped.len() + 1 + CURSOR_SENTINEL.len_utf8());
    marked.push_str(&stripped[..caret]);
    marked.push('\n');
    marked.push(CURSOR_SENTINEL);
    marked.push_str(&stripped[caret..]);

    let converted = converter.convert(&marked, options).inspect_err(|e| {
        log::warn!("Global conversion failed: {e}");
    })?;

    let found = converted.matches(CURSOR_SENTINEL).count();
    let caret = converted.find(CURSOR_SENTINEL);
    match found {
        0 => log::warn!("Cursor sentinel lost during conversion; caret not restored"),
        1 => {}
        n => log::warn!("Converter duplicated the cursor sentinel {n} times; using the first"),
    }

    Ok(Reconversion {
        text: converted.replace(CURSOR_SENTINEL, ""),
        caret,
    })
}
