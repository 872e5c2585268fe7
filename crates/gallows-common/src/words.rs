//! Built-in suggestions for a round host who can't think of a word.

use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordEntry {
    pub hint: &'static str,
    pub word: &'static str,
}

const BANK: &[(&str, &[&str])] = &[
    (
        "Tropical fruit",
        &["BANANA", "PINEAPPLE", "MANGO", "PAPAYA", "PASSION FRUIT", "COCONUT", "GUAVA"],
    ),
    (
        "Country",
        &["BRAZIL", "PORTUGAL", "JAPAN", "ICELAND", "NEW ZEALAND", "ARGENTINA", "KENYA"],
    ),
    (
        "Programming language",
        &["RUST", "PYTHON", "HASKELL", "JAVASCRIPT", "ERLANG", "KOTLIN", "FORTRAN"],
    ),
    (
        "Computer part",
        &["KEYBOARD", "MOTHERBOARD", "MONITOR", "PROCESSOR", "GRAPHICS CARD", "MOUSE"],
    ),
    (
        "At the beach",
        &["SUNSCREEN", "BEACH UMBRELLA", "SANDCASTLE", "SEASHELL", "SURFBOARD", "TOWEL"],
    ),
    (
        "Animal",
        &["ELEPHANT", "GIRAFFE", "PENGUIN", "OCTOPUS", "KANGAROO", "SEA TURTLE"],
    ),
];

pub fn random_entry<R: Rng + ?Sized>(rng: &mut R) -> Option<WordEntry> {
    let &(hint, words) = BANK.choose(rng)?;
    let &word = words.choose(rng)?;
    Some(WordEntry { hint, word })
}

#[cfg(test)]
fn all_entries() -> impl Iterator<Item = WordEntry> {
    BANK.iter().flat_map(|&(hint, words)| {
        words.iter().map(move |&word| WordEntry { hint, word })
    })
}
