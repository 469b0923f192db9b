//! Keyword-vocabulary intent classification.
//!
//! A question is routed to the structured store, the document index, or
//! both, depending on which [`Vocabulary`] it hits. Vocabularies are plain
//! ordered term lists so they can be tested and extended without touching
//! the dispatch logic in [`pipeline`](crate::pipeline).
//!
//! Terms match whole words of the lower-cased question. Inflected and
//! articulated forms (`bilet`, `biletul`, `biletului`) are listed
//! explicitly. A multi-word term matches a contiguous run of words.

use crate::structured::{CHEAPEST_TERMS, PRICIEST_TERMS};

/// Price, ticket, hours, day-of-week and age-category terms.
pub const STRUCTURED_TERMS: &[&str] = &[
    // price / tickets
    "preț", "pret", "prețul", "pretul", "prețului", "pretului", "prețuri", "preturi",
    "prețurile", "preturile", "cost", "costă", "costa", "costul", "costuri", "tarif",
    "tariful", "tarife", "bilet", "biletul", "biletului", "bilete", "biletele",
    "biletelor", "intrare", "intrarea", "eur", "euro",
    "price", "prices", "ticket", "tickets", "fee", "fees", "admission",
    // hours
    "program", "programul", "orar", "orarul", "deschis", "deschisă", "deschisa",
    "deschide", "închis", "inchis", "închisă", "inchisa", "închide", "inchide", "ora",
    "ore", "orele",
    "hours", "opening", "open", "closed", "schedule",
    // days
    "luni", "marți", "marti", "miercuri", "joi", "vineri", "sâmbătă", "sâmbăta",
    "sambata", "duminică", "duminica", "weekend",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    // age categories
    "adult", "adulți", "adulti", "copil", "copilul", "copii", "student", "studenți",
    "studenti", "elev", "elevi", "senior", "seniori", "pensionar", "pensionari",
    "redus", "redusă", "gratuit", "gratuită", "gratuita",
    "adults", "child", "children", "kids", "students", "seniors", "free",
    // aggregate indicators
    "ieftin", "ieftină", "ieftina", "ieftine", "ieftini", "scump", "scumpă", "scumpa",
    "scumpe", "minim", "minimă", "maxim", "maximă",
    "cheap", "cheapest", "expensive", "priciest", "minimum", "maximum",
];

/// Safety, rules, tips, transport and access terms.
pub const DOCUMENT_TERMS: &[&str] = &[
    // rules
    "regulă", "regula", "reguli", "regulile", "regulament", "regulamentul", "interzis",
    "interzisă", "interzise", "permis", "permise", "condiții", "conditii", "condițiile",
    "conditiile", "bagaj", "bagaje", "cod vestimentar",
    "rule", "rules", "regulations", "allowed", "forbidden", "luggage", "dress code",
    // safety
    "securitate", "securității", "securitatii", "siguranță", "siguranta", "siguranța",
    "sigur", "sigură", "pericol", "periculos", "furt", "furturi", "hoți", "hoti",
    "buzunari",
    "safety", "safe", "security", "scam", "scams", "pickpocket", "pickpockets",
    // tips
    "sfat", "sfaturi", "sfaturile", "recomandare", "recomandări", "recomandari",
    "recomandă", "recomanda", "recomanzi", "aglomerație", "aglomeratie", "aglomerația",
    "aglomerat", "coadă", "coada", "cozi", "ploaie", "ploioasă", "ploioasa", "trebuie",
    "vizită", "vizita", "vizitez", "vizitare",
    "tip", "tips", "advice", "recommend", "recommendation", "recommendations", "crowd",
    "crowds", "queue", "queues", "rain", "rainy", "visit", "should",
    // transport / access
    "transport", "transportul", "metrou", "metroul", "autobuz", "rer", "tren",
    "validare", "validarea", "validez", "acces", "accesul", "accesibil",
    "accesibilitate",
    "transit", "metro", "subway", "bus", "train", "access", "accessible",
    "accessibility",
];

/// Splits lower-cased text into words on anything that is not a letter or
/// digit, so `"d'orsay?"` yields `["d", "orsay"]`.
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// An ordered set of indicator terms.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: Vec<Vec<String>>,
}

impl Vocabulary {
    pub fn new(terms: &[&str]) -> Self {
        Self::from_lists(&[terms])
    }

    /// Concatenates several term lists, keeping list order.
    pub fn from_lists(lists: &[&[&str]]) -> Self {
        Self {
            terms: lists
                .iter()
                .flat_map(|list| list.iter())
                .map(|t| words(t))
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the first term (in vocabulary order) present in `text`.
    pub fn first_match(&self, text: &str) -> Option<String> {
        let question = words(text);
        self.terms
            .iter()
            .find(|term| question.windows(term.len()).any(|w| w == term.as_slice()))
            .map(|term| term.join(" "))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }
}

/// Which retrieval paths a question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    pub wants_structured: bool,
    pub wants_document: bool,
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    structured: Vocabulary,
    document: Vocabulary,
}

impl IntentClassifier {
    pub fn new(structured: Vocabulary, document: Vocabulary) -> Self {
        Self {
            structured,
            document,
        }
    }

    /// Both tests always run; neither flag excludes the other.
    pub fn classify(&self, question: &str) -> Intent {
        Intent {
            wants_structured: self.structured.matches(question),
            wants_document: self.document.matches(question),
        }
    }
}

/// The structured vocabulary includes every aggregate indicator, so a
/// question that would select an aggregate lookup always reaches it.
impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(
            Vocabulary::from_lists(&[STRUCTURED_TERMS, CHEAPEST_TERMS, PRICIEST_TERMS]),
            Vocabulary::new(DOCUMENT_TERMS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(q: &str) -> Intent {
        IntentClassifier::default().classify(q)
    }

    #[test]
    fn test_words_split_on_punctuation() {
        assert_eq!(
            words("Este Musée d'Orsay deschis luni?"),
            vec!["este", "musée", "d", "orsay", "deschis", "luni"]
        );
    }

    #[test]
    fn test_structured_only() {
        let intent = classify("Care este prețul biletului Adult la Louvre Museum?");
        assert!(intent.wants_structured);
        assert!(!intent.wants_document);
    }

    #[test]
    fn test_document_only() {
        let intent = classify("Ce reguli de securitate ar trebui să respect la atracțiile din Paris?");
        assert!(!intent.wants_structured);
        assert!(intent.wants_document);
    }

    #[test]
    fn test_mixed_intent() {
        let intent = classify(
            "Vreau să vizitez Louvre Museum: spune-mi programul și ce reguli de acces ar trebui să știu.",
        );
        assert!(intent.wants_structured);
        assert!(intent.wants_document);
    }

    #[test]
    fn test_no_indicator_terms() {
        let intent = classify("Paris?");
        assert!(!intent.wants_structured);
        assert!(!intent.wants_document);
    }

    #[test]
    fn test_matches_whole_words_only() {
        // "ore" is an hours term but must not fire inside "explore"
        let vocab = Vocabulary::new(&["ore"]);
        assert!(!vocab.matches("I want to explore Paris"));
        assert!(vocab.matches("La ce ore este deschis?"));
    }

    #[test]
    fn test_multi_word_term() {
        let vocab = Vocabulary::new(&["dress code"]);
        assert!(vocab.matches("Is there a dress code?"));
        assert!(!vocab.matches("What code should I dress in?"));
        assert_eq!(vocab.first_match("DRESS  CODE"), Some("dress code".to_string()));
    }

    #[test]
    fn test_vocabulary_order_decides_first_match() {
        let vocab = Vocabulary::new(&["bilet", "preț"]);
        assert_eq!(vocab.first_match("preț bilet"), Some("bilet".to_string()));
    }

    #[test]
    fn test_aggregate_terms_route_to_structured() {
        for term in CHEAPEST_TERMS.iter().chain(PRICIEST_TERMS) {
            let intent = classify(&format!("Care e {}?", term));
            assert!(intent.wants_structured, "aggregate term not structured: {}", term);
        }
    }

    #[test]
    fn test_lowest_entry_is_structured() {
        assert!(classify("Which attraction has the lowest entry?").wants_structured);
        assert!(classify("Care e suma minima?").wants_structured);
        assert!(classify("What is the highest one?").wants_structured);
    }

    #[test]
    fn test_builtin_vocabularies_are_disjoint() {
        let structured: Vec<String> = STRUCTURED_TERMS
            .iter()
            .chain(CHEAPEST_TERMS)
            .chain(PRICIEST_TERMS)
            .map(|t| t.to_lowercase())
            .collect();
        for term in DOCUMENT_TERMS {
            assert!(
                !structured.contains(&term.to_lowercase()),
                "term in both vocabularies: {}",
                term
            );
        }
    }
}
