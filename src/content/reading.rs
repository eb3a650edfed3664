//! Reading time estimation

use lazy_static::lazy_static;
use regex::Regex;

use super::Section;

/// Reading speed used for estimates
pub const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    /// ECMAScript `\s`: differs from Unicode White_Space on U+0085 and U+FEFF
    static ref WHITESPACE: Regex = Regex::new(
        r"[\t\n\x0B\x0C\r \x{00A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]"
    )
    .unwrap();
}

/// Whether the page data is available yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    /// Data resolved, render normally
    #[default]
    Ready,
    /// Placeholder render while the page is generated
    Fallback,
}

/// Count the words of a text the way the reading time expects
///
/// Every single whitespace character separates two tokens, so runs of
/// whitespace and leading/trailing whitespace produce empty tokens that are
/// still counted. An empty string has no words.
pub fn count_words(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    WHITESPACE.split(text).count()
}

/// Estimated reading time in whole minutes, rounded up
pub fn estimate_reading_minutes(sections: &[Section]) -> usize {
    let words: usize = sections
        .iter()
        .map(|section| {
            count_words(&section.heading)
                + section
                    .text_blocks
                    .iter()
                    .map(|text| count_words(text))
                    .sum::<usize>()
        })
        .sum();

    words.div_ceil(WORDS_PER_MINUTE)
}

/// Reading time for a render, zero while the fallback is shown
pub fn reading_minutes(state: RenderState, sections: &[Section]) -> usize {
    match state {
        RenderState::Fallback => 0,
        RenderState::Ready => estimate_reading_minutes(sections),
    }
}
