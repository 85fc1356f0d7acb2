//! Score fusion of vector hits and graph matches.
//!
//! ## Scoring
//!
//! ```text
//! score(p) = base(p) + predicate_weight * |satisfied(p)|
//! ```
//!
//! `base` is the vector similarity when the index returned the product,
//! otherwise the configured graph-only score. Results are ordered by score
//! descending (IEEE total order), then by ascending product id.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use pantry_core::config::{FusionSettings, GraphOnlyScore};
use pantry_core::error::{Error, Result};
use pantry_core::types::{CandidateMatch, GraphMatch, ProductId, RankedResult, SourceKind, VectorHit};

use crate::explain::explain;

/// Merges both candidate lists into at most `k` explained results.
///
/// A vector hit with a NaN or infinite score is rejected as malformed input.
/// Pure: the output depends only on the arguments.
pub fn fuse(
    vector_hits: &[VectorHit],
    graph_matches: &[GraphMatch],
    k: usize,
    settings: &FusionSettings,
) -> Result<Vec<RankedResult>> {
    if k == 0 {
        return Err(Error::InvalidArgument("k must be positive".into()));
    }
    if let Some(bad) = vector_hits.iter().find(|h| !h.score.is_finite()) {
        return Err(Error::InvalidArgument(format!(
            "vector hit for product {} has non-finite score {}",
            bad.product_id, bad.score
        )));
    }

    let candidates = merge(vector_hits, graph_matches);
    let graph_only = graph_only_score(vector_hits, settings.graph_only_score);

    let mut ranked: Vec<RankedResult> = candidates
        .into_values()
        .map(|candidate| {
            let base = candidate.similarity.unwrap_or(graph_only);
            let score = base + settings.predicate_weight * candidate.satisfied.len() as f32;
            RankedResult { candidate, score, explanation: String::new() }
        })
        .collect();
    let total = ranked.len();

    ranked.sort_by(rank_order);
    ranked.truncate(k);
    for result in &mut ranked {
        result.explanation = explain(result);
    }

    debug!(
        vector = vector_hits.len(),
        graph = graph_matches.len(),
        candidates = total,
        returned = ranked.len(),
        "fused candidates"
    );
    Ok(ranked)
}

/// Union by product id. Repeated vector hits keep the best similarity;
/// repeated graph matches union their predicates.
fn merge(vector_hits: &[VectorHit], graph_matches: &[GraphMatch]) -> BTreeMap<ProductId, CandidateMatch> {
    let mut by_id: BTreeMap<ProductId, CandidateMatch> = BTreeMap::new();

    for hit in vector_hits {
        by_id
            .entry(hit.product_id)
            .and_modify(|c| {
                if c.similarity.map_or(true, |s| hit.score.total_cmp(&s).is_gt()) {
                    c.similarity = Some(hit.score);
                }
            })
            .or_insert_with(|| CandidateMatch {
                product_id: hit.product_id,
                source: SourceKind::Vector,
                similarity: Some(hit.score),
                satisfied: Vec::new(),
            });
    }

    for m in graph_matches {
        let entry = by_id.entry(m.product_id).or_insert_with(|| CandidateMatch {
            product_id: m.product_id,
            source: SourceKind::Graph,
            similarity: None,
            satisfied: Vec::new(),
        });
        if entry.source == SourceKind::Vector {
            entry.source = SourceKind::Both;
        }
        let merged: BTreeSet<_> = entry.satisfied.drain(..).chain(m.satisfied.iter().cloned()).collect();
        entry.satisfied = merged.into_iter().collect();
    }

    by_id
}

fn graph_only_score(vector_hits: &[VectorHit], policy: GraphOnlyScore) -> f32 {
    match policy {
        GraphOnlyScore::Fixed { value } => value,
        GraphOnlyScore::MinObserved { floor } => vector_hits
            .iter()
            .map(|h| h.score)
            .min_by(|a, b| a.total_cmp(b))
            .unwrap_or(floor),
    }
}

fn rank_order(a: &RankedResult, b: &RankedResult) -> Ordering {
    b.score.total_cmp(&a.score).then(a.product_id().cmp(&b.product_id()))
}
