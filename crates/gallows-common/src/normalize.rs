//! Canonical form for secret words, full-word guesses and single letters.
//!
//! Everything that is compared against the secret word goes through
//! [`normalize_word`] first: diacritics are folded to their base letter,
//! anything that is not an ASCII letter or whitespace is dropped, runs of
//! whitespace collapse to a single space and the result is uppercased.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Shortest secret word accepted by a round host.
pub const MIN_WORD_LEN: usize = 2;

pub fn normalize_word(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        let folded = fold_diacritic(c);
        if !folded.is_ascii_alphabetic() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(folded.to_ascii_uppercase());
    }

    out
}

/// Normalize a single keyboard letter. Returns `None` for anything that is
/// not a letter once diacritics are folded.
pub fn normalize_letter(c: char) -> Option<char> {
    let folded = fold_diacritic(c);
    folded
        .is_ascii_alphabetic()
        .then(|| folded.to_ascii_uppercase())
}

/// Whether a normalized word is long enough to be played.
pub fn is_playable(normalized: &str) -> bool {
    normalized.chars().filter(|c| *c != ' ').count() >= MIN_WORD_LEN
}

/// Base letter of `c`: the first non-combining char of its canonical
/// decomposition.
fn fold_diacritic(c: char) -> char {
    if c.is_ascii() {
        return c;
    }
    let base = std::iter::once(c)
        .nfd()
        .find(|d| !is_combining_mark(*d))
        .unwrap_or(c);
    if base.is_ascii() {
        return base;
    }
    // Stroked letters have no decomposition.
    let upper = base.is_uppercase();
    let folded = match base.to_lowercase().next().unwrap_or(base) {
        'ø' => 'o',
        'ł' | 'ŀ' => 'l',
        'đ' => 'd',
        'ħ' => 'h',
        'ı' => 'i',
        'ŧ' => 't',
        _ => return base,
    };
    if upper {
        folded.to_ascii_uppercase()
    } else {
        folded
    }
}
