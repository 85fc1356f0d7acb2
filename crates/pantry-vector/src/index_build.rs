use tracing::{debug, info};

use pantry_core::catalog::Catalog;
use pantry_core::error::{Error, Result};
use pantry_core::traits::Embedder;
use pantry_core::types::ProductId;

use crate::search::FlatIndex;

pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Embeds catalog products in batches and collects them into a [`FlatIndex`].
pub struct FlatIndexBuilder {
    embedder: Box<dyn Embedder>,
    batch_size: usize,
}

impl FlatIndexBuilder {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder, batch_size: DEFAULT_BATCH_SIZE }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn build(self, catalog: &Catalog) -> Result<FlatIndex> {
        let dim = self.embedder.dim();
        let products: Vec<_> = catalog.iter().collect();
        let mut rows: Vec<(ProductId, Vec<f32>)> = Vec::with_capacity(products.len());

        for batch in products.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|p| p.search_text()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != batch.len() {
                return Err(Error::Operation(format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                )));
            }
            for (product, vector) in batch.iter().zip(vectors) {
                if vector.len() != dim {
                    return Err(Error::Operation(format!(
                        "product {}: embedding has dim {}, expected {dim}",
                        product.id,
                        vector.len()
                    )));
                }
                rows.push((product.id, vector));
            }
            debug!(embedded = rows.len(), total = products.len(), "embedded batch");
        }

        info!(products = rows.len(), dim, "built flat vector index");
        Ok(FlatIndex::new(self.embedder, rows))
    }
}
