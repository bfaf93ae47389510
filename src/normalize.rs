use unicode_normalization::UnicodeNormalization;

use crate::config::Settings;

/// How two spellings are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub trim: bool,
    pub case_insensitive: bool,
}

impl NormalizeOptions {
    /// Options used for identity keys: always trimmed and case-folded.
    pub const IDENTITY: Self = Self {
        trim: true,
        case_insensitive: true,
    };
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<&Settings> for NormalizeOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            trim: settings.trim_spaces,
            case_insensitive: settings.case_insensitive,
        }
    }
}

/// Zero-width and invisible format characters that sneak in through copy/paste:
/// zero-width space/joiners, word joiner, BOM, soft hyphen and the LRM/RLM marks.
pub fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{2060}' | '\u{FEFF}'
    )
}

/// Single source of truth for turning typed or stored text into a comparable form.
///
/// Strips zero-width characters, applies NFKC, then optionally trims and
/// lowercases. Running it twice gives the same result as running it once.
pub fn normalize(text: &str, options: &NormalizeOptions) -> String {
    // Strip before composing: a zero-width char between a base letter and a
    // combining mark would otherwise leave the pair uncomposed.
    let stripped: String = text.chars().filter(|c| !is_zero_width(*c)).nfkc().collect();

    let trimmed = if options.trim {
        stripped.trim()
    } else {
        stripped.as_str()
    };

    if options.case_insensitive {
        // lowercasing can leave pairs that compose, e.g. ϊ + U+0301 -> ΐ
        trimmed.to_lowercase().nfkc().collect()
    } else {
        trimmed.to_string()
    }
}

/// Key used for de-duplication and mastery tracking.
pub fn identity_key(word: &str) -> String {
    normalize(word, &NormalizeOptions::IDENTITY)
}

/// Cleans a word for storage: NFKC, zero-width stripped, trimmed, casing kept.
pub fn sanitize(text: &str) -> String {
    normalize(
        text,
        &NormalizeOptions {
            trim: true,
            case_insensitive: false,
        },
    )
}
