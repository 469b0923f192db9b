//! Fuzzy matching of a question to one canonical attraction name.
//!
//! The question is reduced to a search term by dropping noise words
//! (articles, question particles, politeness phrases and the generic
//! price/hours words people wrap around a name) and `?`. An attraction
//! matches when its lower-cased name occurs in the lower-cased question, or
//! when the search term occurs in the name.
//!
//! When several attractions match, the longest name wins and equal lengths
//! fall back to the lexicographically smallest name, so "Louvre Museum"
//! beats "Louvre" for "Louvre Museum tickets".

use std::collections::HashSet;

pub const NOISE_WORDS: &[&str] = &[
    // Romanian particles, articles, prepositions
    "care", "este", "e", "sunt", "ce", "cum", "cât", "cat", "câte", "cate", "unde",
    "când", "cand", "la", "pentru", "de", "din", "în", "in", "pe", "cu", "și", "si",
    "sau", "un", "o", "al", "a", "ai", "ale", "lui", "cel", "cea", "mai", "ul", "dacă",
    "daca", "despre", "azi", "astăzi", "mâine", "mi", "îmi", "imi", "spune", "spune-mi",
    "spuneți-mi", "poți", "poti", "puteți", "puteti", "vreau", "aș", "as", "dori",
    // politeness
    "te", "rog", "vă", "va", "mulțumesc", "multumesc", "salut", "bună", "buna",
    // wrapper words around a name
    "program", "programul", "orar", "orarul", "preț", "pret", "prețul", "pretul",
    "prețuri", "preturi", "bilet", "biletul", "biletului", "bilete", "costă", "costa",
    "deschis", "deschisă", "închis", "inchis",
    // English
    "the", "a", "an", "what", "is", "are", "how", "much", "does", "do", "for", "at",
    "of", "to", "when", "can", "i", "please", "thanks", "thank", "you", "tell", "me",
    "price", "prices", "ticket", "tickets", "hours", "opening", "open",
];

#[derive(Debug, Clone)]
pub struct EntityMatcher {
    noise: HashSet<String>,
}

impl EntityMatcher {
    pub fn new(noise_words: &[&str]) -> Self {
        Self {
            noise: noise_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Lower-cases the question, drops `?` and every noise word, and
    /// collapses the remaining words with single spaces.
    pub fn search_term(&self, question: &str) -> String {
        let lowered = question.to_lowercase().replace('?', "");
        lowered
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| matches!(c, ',' | '.' | ':' | ';' | '!' | '"')))
            .filter(|w| !w.is_empty() && !self.noise.contains(*w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Resolves the question to at most one of `names`.
    pub fn find<'a, I>(&self, question: &str, names: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lowered = question.to_lowercase();
        let term = self.search_term(question);

        names
            .into_iter()
            .filter(|name| {
                let name_lower = name.to_lowercase();
                if name_lower.is_empty() {
                    return false;
                }
                lowered.contains(&name_lower) || (!term.is_empty() && name_lower.contains(&term))
            })
            .max_by(|a, b| {
                a.chars()
                    .count()
                    .cmp(&b.chars().count())
                    .then_with(|| b.cmp(a))
            })
            .map(str::to_string)
    }
}

impl Default for EntityMatcher {
    fn default() -> Self {
        Self::new(NOISE_WORDS)
    }
}
