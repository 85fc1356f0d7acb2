use std::collections::BTreeSet;
use tracing::debug;

use pantry_core::config::LexiconSettings;
use pantry_core::types::{parse_amount, Comparison, Predicate, Query};

use crate::lexicon::Lexicon;

/// Comparison keywords, longest first so "at least" is tried before "at".
const COMPARISONS: &[(&[&str], Comparison)] = &[
    (&["less", "than"], Comparison::Lt),
    (&["cheaper", "than"], Comparison::Lt),
    (&["more", "than"], Comparison::Gt),
    (&["at", "least"], Comparison::Ge),
    (&["at", "most"], Comparison::Le),
    (&["up", "to"], Comparison::Le),
    (&["under"], Comparison::Lt),
    (&["below"], Comparison::Lt),
    (&["<"], Comparison::Lt),
    (&["max"], Comparison::Le),
    (&["<="], Comparison::Le),
    (&["over"], Comparison::Gt),
    (&["above"], Comparison::Gt),
    (&[">"], Comparison::Gt),
    (&["min"], Comparison::Ge),
    (&[">="], Comparison::Ge),
];

/// Symbols that may be glued to the amount, as in `<5` or `<=4.50`.
const ATTACHED: &[(&str, Comparison)] = &[
    ("<=", Comparison::Le),
    (">=", Comparison::Ge),
    ("<", Comparison::Lt),
    (">", Comparison::Gt),
];

const UNITS: &[&str] = &["dollars", "dollar", "bucks", "usd"];

/// Words that turn the following lexicon phrase into an unsupported negation.
const NEGATORS: &[&str] = &["not", "non", "without"];

/// Splits free text into structured predicates and residual words.
///
/// Never fails: anything it cannot turn into a predicate is left in the
/// residual text for the embedding index.
#[derive(Debug, Clone)]
pub struct ConstraintParser {
    lexicon: Lexicon,
}

impl Default for ConstraintParser {
    fn default() -> Self { Self::from_settings(&LexiconSettings::default()) }
}

impl ConstraintParser {
    pub fn new(lexicon: Lexicon) -> Self { Self { lexicon } }

    pub fn from_settings(settings: &LexiconSettings) -> Self { Self::new(Lexicon::from_settings(settings)) }

    pub fn parse(&self, query_text: &str) -> Query {
        let original: Vec<&str> = query_text.split_whitespace().map(trim_token).filter(|t| !t.is_empty()).collect();
        let tokens: Vec<String> = original.iter().map(|t| t.to_lowercase()).collect();

        let mut predicates = BTreeSet::new();
        let mut residual: Vec<&str> = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if NEGATORS.contains(&tokens[i].as_str()) {
                if let Some((len, _)) = self.lexicon.longest_match(&tokens, i + 1) {
                    debug!(negated = %tokens[i + 1..i + 1 + len].join(" "), "negated phrase left in residual");
                    residual.extend_from_slice(&original[i..i + 1 + len]);
                    i += 1 + len;
                    continue;
                }
            }
            if let Some((len, predicate)) = parse_comparison(&tokens, i) {
                predicates.insert(predicate);
                i += len;
                continue;
            }
            if let Some((len, term)) = self.lexicon.longest_match(&tokens, i) {
                predicates.insert(term.predicate());
                i += len;
                continue;
            }
            residual.push(original[i]);
            i += 1;
        }

        let query = Query { raw: query_text.to_string(), residual: residual.join(" "), predicates };
        debug!(raw = %query.raw, residual = %query.residual, predicates = query.predicates.len(), "parsed query");
        query
    }
}

fn trim_token(token: &str) -> &str {
    token
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '!' | '?' | '"' | '\'' | '(' | ')'))
        .trim_end_matches('.')
}

/// A comparison keyword plus amount starting at `tokens[at]`, with the
/// number of tokens consumed. `None` when the amount does not parse.
fn parse_comparison(tokens: &[String], at: usize) -> Option<(usize, Predicate)> {
    let token = tokens[at].as_str();
    for (symbol, op) in ATTACHED {
        if let Some(rest) = token.strip_prefix(symbol) {
            if rest.is_empty() { break; }
            let cents = parse_amount(rest)?;
            return Some((1 + unit_len(tokens, at + 1), Predicate::price(*op, cents)));
        }
    }
    for (keyword, op) in COMPARISONS {
        let end = at + keyword.len();
        if end > tokens.len() || !tokens[at..end].iter().zip(keyword.iter()).all(|(t, k)| t == k) {
            continue;
        }
        let cents = parse_amount(tokens.get(end)?)?;
        return Some((keyword.len() + 1 + unit_len(tokens, end + 1), Predicate::price(*op, cents)));
    }
    None
}

fn unit_len(tokens: &[String], at: usize) -> usize {
    usize::from(tokens.get(at).is_some_and(|t| UNITS.contains(&t.as_str())))
}
