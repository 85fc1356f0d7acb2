//! pantry-vector
//!
//! In-memory embedding index over catalog products. Suitable for fixtures
//! and demos; production deployments plug their own
//! [`EmbeddingIndex`](pantry_core::traits::EmbeddingIndex) into the engine.
pub mod index_build;
pub mod search;

pub use index_build::FlatIndexBuilder;
pub use search::FlatIndex;

use pantry_core::catalog::Catalog;
use pantry_core::error::Result;
use pantry_core::traits::Embedder;

/// Embeds every product of `catalog` with the default batch size.
pub fn build_index(catalog: &Catalog, embedder: Box<dyn Embedder>) -> Result<FlatIndex> {
    FlatIndexBuilder::new(embedder).build(catalog)
}
