use regex::Regex;

use super::{ConvertMode, ConvertOptions, Script};
use crate::annotation::{Segment, format_okurigana};
use crate::kana::{has_kanji, is_kanji, to_hiragana, to_katakana};

/// A word found by segmentation. `reading` is hiragana and absent for text
/// the dictionary does not know.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token<'a> {
    pub surface: &'a str,
    pub reading: Option<&'a str>,
}

pub(crate) fn render(tokens: &[Token<'_>], options: &ConvertOptions) -> String {
    match options.mode {
        ConvertMode::Normal => tokens
            .iter()
            .map(|token| spoken(token, options.to))
            .collect(),
        ConvertMode::Spaced => tokens
            .iter()
            .map(|token| spoken(token, options.to))
            .filter(|word| !word.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        ConvertMode::Okurigana => {
            let segments: Vec<Segment> = tokens
                .iter()
                .flat_map(|token| annotate(token, options.to))
                .collect();
            format_okurigana(&segments)
        }
        ConvertMode::Furigana => tokens
            .iter()
            .flat_map(|token| annotate(token, options.to))
            .map(|segment| match segment {
                Segment::Plain(text) => text,
                Segment::Ruby { base, reading } => {
                    format!("<ruby>{base}<rp>(</rp><rt>{reading}</rt><rp>)</rp></ruby>")
                }
            })
            .collect(),
    }
}

fn in_script(text: &str, to: Script) -> String {
    match to {
        Script::Hiragana => to_hiragana(text),
        Script::Katakana => to_katakana(text),
    }
}

fn spoken(token: &Token<'_>, to: Script) -> String {
    in_script(token.reading.unwrap_or(token.surface), to)
}

fn annotate(token: &Token<'_>, to: Script) -> Vec<Segment> {
    match token.reading {
        Some(reading) if has_kanji(token.surface) => align_okurigana(token.surface, reading)
            .into_iter()
            .map(|segment| match segment {
                Segment::Ruby { base, reading } => Segment::Ruby {
                    base,
                    reading: in_script(&reading, to),
                },
                plain => plain,
            })
            .collect(),
        _ => vec![Segment::Plain(token.surface.to_string())],
    }
}

/// Splits `surface` into kanji runs and kana runs and matches the kana
/// literally against `reading`, so each kanji run gets only its own part of
/// the reading: `取り扱い` / `とりあつかい` gives `取(と)り扱(あつか)い`.
///
/// Falls back to one reading over the whole word when the kana in the surface
/// cannot be found in the reading.
pub(crate) fn align_okurigana(surface: &str, reading: &str) -> Vec<Segment> {
    let runs = runs(surface);
    let mut pattern = String::from("^");
    for (kanji, run) in &runs {
        if *kanji {
            pattern.push_str("(.+?)");
        } else {
            pattern.push_str(&regex::escape(&to_hiragana(run)));
        }
    }
    pattern.push('$');

    let reading = to_hiragana(reading);
    let captures = Regex::new(&pattern).ok().and_then(|re| {
        re.captures(&reading).map(|c| {
            c.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect::<Vec<_>>()
        })
    });

    let Some(mut readings) = captures.map(|r| r.into_iter()) else {
        return vec![Segment::Ruby {
            base: surface.to_string(),
            reading,
        }];
    };

    runs.into_iter()
        .map(|(kanji, run)| {
            if kanji {
                Segment::Ruby {
                    base: run.to_string(),
                    reading: readings.next().unwrap_or_default(),
                }
            } else {
                Segment::Plain(run.to_string())
            }
        })
        .collect()
}

/// Maximal runs of kanji / non-kanji characters.
fn runs(text: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let kanji = is_kanji(c);
        match current {
            Some(kind) if kind == kanji => {}
            Some(kind) => {
                runs.push((kind, &text[start..i]));
                start = i;
                current = Some(kanji);
            }
            None => current = Some(kanji),
        }
    }
    if let Some(kind) = current {
        runs.push((kind, &text[start..]));
    }
    runs
}
