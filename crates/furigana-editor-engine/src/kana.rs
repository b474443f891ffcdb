//! Character classes and script conversion for Japanese text.

/// Offset between a hiragana code point and its katakana counterpart.
const KATAKANA_OFFSET: u32 = 0x60;

/// Returns true for characters that carry a reading of their own: CJK
/// ideographs plus the iteration and abbreviation marks `々`, `〆`, `ヶ`.
pub fn is_kanji(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '々' | '〆' | 'ヶ')
}

pub fn is_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{3096}' | 'ゝ' | 'ゞ')
}

/// Katakana letters, excluding `ヶ` which reads like a kanji.
pub fn is_katakana(c: char) -> bool {
    c != 'ヶ' && matches!(c, '\u{30A1}'..='\u{30FA}' | 'ヽ' | 'ヾ')
}

/// Hiragana, katakana or the long vowel mark `ー`.
pub fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c) || c == 'ー'
}

pub fn has_kanji(text: &str) -> bool {
    text.chars().any(is_kanji)
}

/// Returns true if `text` contains any kanji or kana.
pub fn has_japanese(text: &str) -> bool {
    text.chars().any(|c| is_kanji(c) || is_kana(c))
}

/// Converts katakana letters to hiragana, leaving everything else untouched.
pub fn to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{30A1}'..='\u{30F5}' | 'ヽ' | 'ヾ' => shift(c, -1),
            _ => c,
        })
        .collect()
}

/// Converts hiragana letters to katakana, leaving everything else untouched.
pub fn to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{3041}'..='\u{3095}' | 'ゝ' | 'ゞ' => shift(c, 1),
            _ => c,
        })
        .collect()
}

fn shift(c: char, direction: i32) -> char {
    let code = if direction > 0 {
        c as u32 + KATAKANA_OFFSET
    } else {
        c as u32 - KATAKANA_OFFSET
    };
    char::from_u32(code).unwrap_or(c)
}
