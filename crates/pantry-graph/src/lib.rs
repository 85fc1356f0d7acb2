//! pantry-graph
//!
//! An in-memory product knowledge graph, the evaluator that resolves parsed
//! predicates against any [`KnowledgeGraph`](pantry_core::traits::KnowledgeGraph),
//! and one-hop fact rendering for search responses.
pub mod evaluate;
pub mod facts;
pub mod graph;

pub use evaluate::GraphConstraintEvaluator;
pub use facts::{collect_facts, product_facts};
pub use graph::ProductGraph;
