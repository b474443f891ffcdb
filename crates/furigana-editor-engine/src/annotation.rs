//! Reading annotations in okurigana form: `食(た)べる`.
//!
//! The converter emits readings as a bracketed kana run right after the kanji
//! they belong to. This module owns both directions of that format: parsing
//! markup back into [`Segment`]s for display, and stripping it so text can be
//! converted again without stacking readings.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::kana::is_kanji;

/// A bracketed reading: ASCII or full-width parentheses around kana only.
static READING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[(（]([ぁ-ゖゝゞァ-ヺヽヾー]+)[)）]").expect("reading pattern is valid")
});

/// One display unit of an annotated run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text shown as-is (kana, punctuation, anything without a reading).
    Plain(String),
    /// A kanji run with the reading attached to it.
    Ruby { base: String, reading: String },
}

impl Segment {
    /// The text the segment annotates, without its reading.
    pub fn base(&self) -> &str {
        match self {
            Segment::Plain(text) => text,
            Segment::Ruby { base, .. } => base,
        }
    }
}

/// A converted text run.
///
/// Holds the text that was submitted for conversion, the markup the converter
/// returned for it and that markup parsed into segments. Spans are never
/// edited in place; a changed run is converted again from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSpan {
    source: String,
    markup: String,
    segments: Vec<Segment>,
}

impl AnnotatedSpan {
    pub fn from_markup(source: impl Into<String>, markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let segments = parse_okurigana(&markup);
        Self {
            source: source.into(),
            markup,
            segments,
        }
    }

    /// The unannotated text this span was converted from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The converter output as displayed, readings included.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Byte length of the displayed markup.
    pub fn len(&self) -> usize {
        self.markup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }

    /// Whether any segment actually carries a reading.
    pub fn has_readings(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Ruby { .. }))
    }
}

/// Removes every bracketed reading from `text`.
pub fn strip_readings(text: &str) -> Cow<'_, str> {
    READING.replace_all(text, "")
}

/// Strips readings and maps `caret` (a byte offset into `text`) onto the
/// stripped result. A caret inside a removed reading lands where the reading
/// used to start.
pub fn strip_readings_tracking(text: &str, caret: usize) -> (String, usize) {
    let mut stripped = String::with_capacity(text.len());
    let mut new_caret = None;
    let mut last = 0;

    for found in READING.find_iter(text) {
        if new_caret.is_none() && caret < found.end() {
            new_caret = Some(stripped.len() + caret.saturating_sub(last).min(found.start() - last));
        }
        stripped.push_str(&text[last..found.start()]);
        last = found.end();
    }

    let caret = new_caret.unwrap_or_else(|| stripped.len() + caret.saturating_sub(last));
    stripped.push_str(&text[last..]);
    let caret = caret.min(stripped.len());
    (stripped, caret)
}

/// Parses okurigana markup into segments.
///
/// The base of each reading is the run of kanji directly before the opening
/// bracket. A bracketed kana run with no kanji in front of it is kept as plain
/// text.
pub fn parse_okurigana(markup: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut last = 0;

    for captures in READING.captures_iter(markup) {
        let (Some(whole), Some(reading)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let before = &markup[last..whole.start()];
        let base_start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_kanji(*c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(before.len());

        if base_start == before.len() {
            plain.push_str(&markup[last..whole.end()]);
        } else {
            plain.push_str(&before[..base_start]);
            if !plain.is_empty() {
                segments.push(Segment::Plain(std::mem::take(&mut plain)));
            }
            segments.push(Segment::Ruby {
                base: before[base_start..].to_string(),
                reading: reading.as_str().to_string(),
            });
        }
        last = whole.end();
    }

    plain.push_str(&markup[last..]);
    if !plain.is_empty() {
        segments.push(Segment::Plain(plain));
    }
    segments
}

/// Writes segments back out in okurigana form.
pub fn format_okurigana(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Plain(text) => out.push_str(text),
            Segment::Ruby { base, reading } => {
                out.push_str(base);
                out.push('(');
                out.push_str(reading);
                out.push(')');
            }
        }
    }
    out
}
