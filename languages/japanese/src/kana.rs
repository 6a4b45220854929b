//! Kana classification and conversion.

use nova_core::morphology::MorphResult;

const KANA_OFFSET: u32 = 0x60;

pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

/// Map katakana (ァ..ヶ) onto hiragana; everything else passes through.
/// The prolonged sound mark ー has no hiragana form and is kept.
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - KANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

pub fn hiragana_to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{3041}'..='\u{3096}' => char::from_u32(c as u32 + KANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Hiragana reading of an analyzed input
pub fn hiragana_reading(morph: &MorphResult) -> String {
    katakana_to_hiragana(&morph.reading())
}
