use std::collections::BTreeMap;
use tracing::warn;

use pantry_core::config::LexiconSettings;
use pantry_core::types::{normalize_category, normalize_tag, Predicate};

/// What a lexicon phrase stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Attribute(String),
    Category(String),
}

impl Term {
    pub fn predicate(&self) -> Predicate {
        match self {
            Term::Attribute(tag) => Predicate::AttributeEquals(tag.clone()),
            Term::Category(path) => Predicate::CategoryEquals(path.clone()),
        }
    }
}

/// Phrase table for attribute and category words.
///
/// Phrases are stored as token sequences so that "nut free" and "nut-free"
/// are both single entries. The first mapping registered for a phrase wins.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    phrases: BTreeMap<Vec<String>, Term>,
    max_words: usize,
}

impl Lexicon {
    pub fn from_settings(settings: &LexiconSettings) -> Self {
        let mut lexicon = Self::default();
        for (tag, phrases) in &settings.attributes {
            let term = Term::Attribute(normalize_tag(tag));
            for phrase in phrases { lexicon.insert(phrase, term.clone()); }
        }
        for (path, phrases) in &settings.categories {
            let term = Term::Category(normalize_category(&[path.as_str()]));
            for phrase in phrases { lexicon.insert(phrase, term.clone()); }
        }
        lexicon
    }

    pub fn insert(&mut self, phrase: &str, term: Term) {
        let words: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() { return; }
        if let Some(existing) = self.phrases.get(&words) {
            if *existing != term {
                warn!(phrase, ?existing, ignored = ?term, "lexicon phrase mapped twice");
            }
            return;
        }
        self.max_words = self.max_words.max(words.len());
        self.phrases.insert(words, term);
    }

    /// Longest phrase starting at `tokens[at]`, with its length in tokens.
    pub fn longest_match(&self, tokens: &[String], at: usize) -> Option<(usize, &Term)> {
        let remaining = tokens.len().saturating_sub(at);
        (1..=self.max_words.min(remaining))
            .rev()
            .find_map(|len| self.phrases.get(&tokens[at..at + len]).map(|term| (len, term)))
    }

    pub fn len(&self) -> usize { self.phrases.len() }

    pub fn is_empty(&self) -> bool { self.phrases.is_empty() }
}
