//! Text folding used to compare captured words.

use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// Fold text so that visually identical selections compare equal:
/// ideographic and no-break spaces become plain spaces, outer whitespace is
/// trimmed, inner runs collapse to one space, then NFKC and lowercase.
pub fn normalize(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| match c {
            '\u{3000}' | '\u{00A0}' => ' ',
            other => other,
        })
        .collect();
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.nfkc().collect::<String>().to_lowercase()
}

/// Deduplication key of a capture
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub language: String,
    pub text: String,
}

impl Signature {
    pub fn new(language: &str, raw_text: &str) -> Self {
        Self {
            language: language.to_string(),
            text: normalize(raw_text),
        }
    }

    pub fn matches(&self, language: &str, raw_text: &str) -> bool {
        self.language == language && self.text == normalize(raw_text)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.language, self.text)
    }
}
