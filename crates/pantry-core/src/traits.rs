use std::collections::BTreeSet;

use crate::error::Result;
use crate::types::{EdgeType, NodeId, NodeKind, VectorHit};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Nearest-neighbour lookup over product embeddings.
///
/// Hits come back best first. Implementations report outages as
/// `Error::UpstreamUnavailable`.
pub trait EmbeddingIndex: Send + Sync {
    fn search(&self, query_text: &str, k: usize) -> Result<Vec<VectorHit>>;
}

/// Read-only view of a typed product graph snapshot.
pub trait KnowledgeGraph: Send + Sync {
    /// Nodes joined to `node` by an edge of type `edge`.
    fn neighbors(&self, node: &NodeId, edge: EdgeType) -> Result<BTreeSet<NodeId>>;

    /// Every node of the given kind.
    fn nodes(&self, kind: NodeKind) -> Result<BTreeSet<NodeId>>;
}
