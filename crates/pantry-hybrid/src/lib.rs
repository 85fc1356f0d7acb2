//! pantry-hybrid
//!
//! Ties the pipeline together: parse the query, ask the embedding index and
//! the graph evaluator for candidates, fuse them, explain each result.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use pantry_core::config::Settings;
use pantry_core::error::{Error, Result};
use pantry_core::traits::{EmbeddingIndex, KnowledgeGraph};
use pantry_core::types::{GraphMatch, Query, RankedResult, VectorHit};
use pantry_graph::{collect_facts, GraphConstraintEvaluator};
use pantry_query::ConstraintParser;

pub mod explain;
pub mod fusion;

pub use explain::explain;
pub use fusion::fuse;

/// How the structured side of a search went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredMatch {
    /// No predicates were parsed; ranking is purely semantic.
    Unconstrained,
    /// Predicates were parsed but no product satisfies all of them.
    Empty,
    Matched(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: Query,
    pub structured: StructuredMatch,
    pub results: Vec<RankedResult>,
    /// One-hop graph facts about the returned products, in rank order.
    pub facts: Vec<String>,
}

/// Search over an injected embedding index and knowledge graph.
///
/// Both collaborators are shared read-only snapshots; the engine never
/// mutates them.
pub struct HybridSearchEngine<E: ?Sized, G: ?Sized> {
    index: Arc<E>,
    graph: Arc<G>,
    parser: ConstraintParser,
    settings: Settings,
}

impl<E, G> HybridSearchEngine<E, G>
where
    E: EmbeddingIndex + ?Sized,
    G: KnowledgeGraph + ?Sized,
{
    pub fn new(index: Arc<E>, graph: Arc<G>, settings: Settings) -> Self {
        let parser = ConstraintParser::from_settings(&settings.lexicon);
        Self { index, graph, parser, settings }
    }

    pub fn search(&self, query_text: &str, k: usize) -> Result<Vec<RankedResult>> {
        Ok(self.search_with_report(query_text, k)?.results)
    }

    #[instrument(name = "search", skip(self))]
    pub fn search_with_report(&self, query_text: &str, k: usize) -> Result<SearchResponse> {
        search_with(&self.parser, &*self.index, &*self.graph, &self.settings, query_text, k)
    }
}

impl<E, G> HybridSearchEngine<E, G>
where
    E: EmbeddingIndex + ?Sized + 'static,
    G: KnowledgeGraph + ?Sized + 'static,
{
    /// Same result as [`search_with_report`](Self::search_with_report), with
    /// the vector lookup and the graph evaluation running side by side on
    /// the blocking pool.
    #[instrument(name = "search_concurrent", skip(self))]
    pub async fn search_concurrent(&self, query_text: &str, k: usize) -> Result<SearchResponse> {
        check_k(k)?;
        let query = self.parser.parse(query_text);

        let index = Arc::clone(&self.index);
        let text = query.semantic_text().to_string();
        let candidates = candidate_count(&self.settings, k);
        let vector_task = tokio::task::spawn_blocking(move || index.search(&text, candidates));

        let graph = Arc::clone(&self.graph);
        let predicates = query.predicates.clone();
        let graph_task =
            tokio::task::spawn_blocking(move || GraphConstraintEvaluator::new(&*graph).evaluate(&predicates));

        let (hits, matches) = tokio::try_join!(joined(vector_task), joined(graph_task))?;
        respond(&*self.graph, query, &hits, &matches, k, &self.settings)
    }
}

/// One-shot search without building an engine.
pub fn hybrid_search<E, G>(
    query_text: &str,
    k: usize,
    index: &E,
    graph: &G,
    settings: &Settings,
) -> Result<Vec<RankedResult>>
where
    E: EmbeddingIndex + ?Sized,
    G: KnowledgeGraph + ?Sized,
{
    let parser = ConstraintParser::from_settings(&settings.lexicon);
    Ok(search_with(&parser, index, graph, settings, query_text, k)?.results)
}

fn search_with<E, G>(
    parser: &ConstraintParser,
    index: &E,
    graph: &G,
    settings: &Settings,
    query_text: &str,
    k: usize,
) -> Result<SearchResponse>
where
    E: EmbeddingIndex + ?Sized,
    G: KnowledgeGraph + ?Sized,
{
    check_k(k)?;
    let query = parser.parse(query_text);
    let hits = index.search(query.semantic_text(), candidate_count(settings, k))?;
    let matches = GraphConstraintEvaluator::new(graph).evaluate(&query.predicates)?;
    respond(graph, query, &hits, &matches, k, settings)
}

fn respond<G: KnowledgeGraph + ?Sized>(
    graph: &G,
    query: Query,
    hits: &[VectorHit],
    matches: &[GraphMatch],
    k: usize,
    settings: &Settings,
) -> Result<SearchResponse> {
    let structured = if query.predicates.is_empty() {
        StructuredMatch::Unconstrained
    } else if matches.is_empty() {
        StructuredMatch::Empty
    } else {
        StructuredMatch::Matched(matches.len())
    };
    let results = fuse(hits, matches, k, &settings.fusion)?;
    let facts = collect_facts(
        graph,
        results.iter().map(|r| r.candidate.product_id),
        settings.search.max_facts,
    )?;
    debug!(predicates = query.predicates.len(), ?structured, results = results.len(), "search finished");
    Ok(SearchResponse { query, structured, results, facts })
}

fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(Error::InvalidArgument("k must be positive".into()));
    }
    Ok(())
}

fn candidate_count(settings: &Settings, k: usize) -> usize {
    k.saturating_mul(settings.search.candidate_multiplier)
}

async fn joined<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle.await.map_err(|e| Error::Operation(format!("search task failed: {e}")))?
}
