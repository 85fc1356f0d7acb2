use std::cmp::Ordering;
use tracing::debug;

use pantry_core::error::{Error, Result};
use pantry_core::traits::{EmbeddingIndex, Embedder};
use pantry_core::types::{ProductId, VectorHit};
use pantry_embed::dot;

/// Brute-force cosine index over unit-length product embeddings.
pub struct FlatIndex {
    embedder: Box<dyn Embedder>,
    rows: Vec<(ProductId, Vec<f32>)>,
}

impl FlatIndex {
    pub(crate) fn new(embedder: Box<dyn Embedder>, rows: Vec<(ProductId, Vec<f32>)>) -> Self {
        Self { embedder, rows }
    }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Best `k` rows by dot product, ties broken by ascending product id.
    /// Rows with no positive similarity are not hits.
    pub fn search_vec(&self, query: &[f32], k: usize) -> Vec<VectorHit> {
        let mut hits: Vec<VectorHit> = self
            .rows
            .iter()
            .map(|(product_id, v)| VectorHit { product_id: *product_id, score: dot(query, v) })
            .filter(|hit| hit.score > 0.0)
            .collect();
        hits.sort_by(rank_order);
        hits.truncate(k);
        hits
    }
}

fn rank_order(a: &VectorHit, b: &VectorHit) -> Ordering {
    b.score.total_cmp(&a.score).then(a.product_id.cmp(&b.product_id))
}

impl EmbeddingIndex for FlatIndex {
    fn search(&self, query_text: &str, k: usize) -> Result<Vec<VectorHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query = self
            .embedder
            .embed_batch(&[query_text.to_string()])?
            .pop()
            .ok_or_else(|| Error::Operation("embedder returned no vector for query".into()))?;
        let hits = self.search_vec(&query, k);
        debug!(k, hits = hits.len(), "flat index search");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Axis;

    impl Embedder for Axis {
        fn dim(&self) -> usize { 2 }
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| if t == "x" { vec![1.0, 0.0] } else { vec![0.0, 1.0] }).collect())
        }
    }

    fn index() -> FlatIndex {
        FlatIndex::new(
            Box::new(Axis),
            vec![
                (ProductId(3), vec![1.0, 0.0]),
                (ProductId(1), vec![1.0, 0.0]),
                (ProductId(2), vec![0.0, 1.0]),
            ],
        )
    }

    #[test]
    fn equal_scores_break_ties_by_id() {
        let hits = index().search("x", 3).unwrap();
        let ids: Vec<u64> = hits.iter().map(|h| h.product_id.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn k_bounds_the_result() {
        assert_eq!(index().search("x", 1).unwrap().len(), 1);
        assert!(index().search("x", 0).unwrap().is_empty());
        assert_eq!(index().search("x", 10).unwrap().len(), 2);
    }

    #[test]
    fn orthogonal_rows_are_not_hits() {
        let hits = index().search_vec(&[0.0, 1.0], 10);
        assert_eq!(hits, vec![VectorHit { product_id: ProductId(2), score: 1.0 }]);
        assert!(index().search_vec(&[0.0, -1.0], 10).is_empty());
        assert!(index().search_vec(&[0.0, 0.0], 10).is_empty());
    }
}
