use pantry_core::types::{format_price, Predicate, RankedResult};

const GENERIC: &str = "Semantically similar to your query.";
const UNRELATED: &str = "Listed as a fallback; it does not closely match your query.";
const ALSO_SIMILAR: &str = " It also closely matches your search terms.";

/// Human-readable reason for a ranked result, built only from the predicates
/// it satisfied and its vector similarity.
///
/// Similarity is only claimed when the score is positive.
///
/// ```text
/// Recommended because it is in snacks, tagged nut-free, and priced under $5.
/// ```
pub fn explain(result: &RankedResult) -> String {
    let candidate = &result.candidate;
    let similar = candidate.similarity.is_some_and(|s| s > 0.0);
    if candidate.satisfied.is_empty() {
        let text = if similar { GENERIC } else { UNRELATED };
        return text.to_string();
    }

    let mut categories = Vec::new();
    let mut tags = Vec::new();
    let mut prices = Vec::new();
    for predicate in &candidate.satisfied {
        match predicate {
            Predicate::CategoryEquals(path) => categories.push(path.clone()),
            Predicate::AttributeEquals(tag) => tags.push(tag.clone()),
            Predicate::NumericComparison { op, value, .. } => {
                prices.push(format!("{} {}", op.phrase(), format_price(*value)))
            }
        }
    }

    let mut clauses = Vec::new();
    if !categories.is_empty() {
        clauses.push(format!("in {}", categories.join(" and ")));
    }
    if !tags.is_empty() {
        clauses.push(format!("tagged {}", tags.join(", ")));
    }
    if !prices.is_empty() {
        clauses.push(format!("priced {}", prices.join(" and ")));
    }

    let mut text = format!("Recommended because it is {}.", join_clauses(&clauses));
    if similar {
        text.push_str(ALSO_SIMILAR);
    }
    text
}

fn join_clauses(clauses: &[String]) -> String {
    match clauses {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}
