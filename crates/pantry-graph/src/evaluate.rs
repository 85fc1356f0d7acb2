use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

use pantry_core::error::Result;
use pantry_core::traits::KnowledgeGraph;
use pantry_core::types::{
    normalize_category, normalize_tag, EdgeType, GraphMatch, NodeId, NodeKind, NumericField, Predicate, ProductId,
};

/// Resolves structured predicates to the products satisfying all of them.
pub struct GraphConstraintEvaluator<'g, G: KnowledgeGraph + ?Sized> {
    graph: &'g G,
}

impl<'g, G: KnowledgeGraph + ?Sized> GraphConstraintEvaluator<'g, G> {
    pub fn new(graph: &'g G) -> Self { Self { graph } }

    /// Products satisfying every predicate, ascending by id.
    ///
    /// An empty predicate set, or one no product satisfies, yields an empty
    /// vector. Errors from the graph are returned as-is.
    pub fn evaluate(&self, predicates: &BTreeSet<Predicate>) -> Result<Vec<GraphMatch>> {
        if predicates.is_empty() {
            return Ok(Vec::new());
        }
        for predicate in predicates {
            predicate.validate()?;
        }

        let mut matched: Option<BTreeSet<ProductId>> = None;
        for predicate in predicates {
            let products = self.products_matching(predicate)?;
            debug!(predicate = %predicate, products = products.len(), "predicate resolved");
            let narrowed = match matched {
                None => products,
                Some(prev) => prev.intersection(&products).copied().collect(),
            };
            let done = narrowed.is_empty();
            matched = Some(narrowed);
            if done {
                break;
            }
        }

        let satisfied: Vec<Predicate> = predicates.iter().cloned().collect();
        let matches: Vec<GraphMatch> = matched
            .unwrap_or_default()
            .into_iter()
            .map(|product_id| GraphMatch { product_id, satisfied: satisfied.clone() })
            .collect();
        debug!(matches = matches.len(), "graph evaluation finished");
        Ok(matches)
    }

    fn products_matching(&self, predicate: &Predicate) -> Result<BTreeSet<ProductId>> {
        match predicate {
            Predicate::AttributeEquals(tag) => {
                self.products_linked(&NodeId::Attribute(normalize_tag(tag)), EdgeType::HasAttribute)
            }
            Predicate::CategoryEquals(path) => {
                let mut products = BTreeSet::new();
                for category in self.category_and_descendants(&normalize_category(&[path]))? {
                    products.extend(self.products_linked(&category, EdgeType::InCategory)?);
                }
                Ok(products)
            }
            Predicate::NumericComparison { field: NumericField::Price, op, value } => {
                let mut products = BTreeSet::new();
                for node in self.graph.nodes(NodeKind::Price)? {
                    if let NodeId::Price(cents) = node {
                        if op.holds(cents, *value) {
                            products.extend(self.products_linked(&node, EdgeType::Price)?);
                        }
                    }
                }
                Ok(products)
            }
        }
    }

    fn products_linked(&self, node: &NodeId, edge: EdgeType) -> Result<BTreeSet<ProductId>> {
        Ok(self.graph.neighbors(node, edge)?.iter().filter_map(NodeId::as_product).collect())
    }

    /// Breadth-first over SUBCATEGORY_OF, following only edges into paths
    /// below the current one.
    fn category_and_descendants(&self, root: &str) -> Result<BTreeSet<NodeId>> {
        let mut seen = BTreeSet::from([NodeId::Category(root.to_string())]);
        let mut queue = VecDeque::from([root.to_string()]);
        while let Some(current) = queue.pop_front() {
            let prefix = format!("{current}/");
            for neighbor in self.graph.neighbors(&NodeId::Category(current), EdgeType::SubcategoryOf)? {
                if let NodeId::Category(path) = &neighbor {
                    if path.starts_with(&prefix) && seen.insert(neighbor.clone()) {
                        queue.push_back(path.clone());
                    }
                }
            }
        }
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProductGraph;
    use pantry_core::types::{Comparison, Product};

    fn product(id: u64, category: &str, cents: u64, tags: &[&str]) -> Product {
        Product {
            id: ProductId(id),
            name: format!("product {id}"),
            brand: "acme".into(),
            category: category.into(),
            price_cents: cents,
            ingredients: Vec::new(),
            attributes: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn graph() -> ProductGraph {
        let mut g = ProductGraph::new();
        g.add_product(&product(1, "snacks/chips", 299, &["vegan"]));
        g.add_product(&product(2, "snacks/bars/protein", 249, &[]));
        g.add_product(&product(3, "snacksville", 100, &["vegan"]));
        g.add_product(&product(4, "snacks", 500, &["vegan"]));
        g
    }

    fn ids(matches: &[GraphMatch]) -> Vec<u64> { matches.iter().map(|m| m.product_id.0).collect() }

    #[test]
    fn category_includes_descendants_only() {
        let g = graph();
        let eval = GraphConstraintEvaluator::new(&g);
        let preds = BTreeSet::from([Predicate::CategoryEquals("snacks".into())]);
        assert_eq!(ids(&eval.evaluate(&preds).unwrap()), vec![1, 2, 4]);
    }

    #[test]
    fn price_boundaries_follow_the_operator() {
        let g = graph();
        let eval = GraphConstraintEvaluator::new(&g);
        let lt = BTreeSet::from([Predicate::price(Comparison::Lt, 299)]);
        assert_eq!(ids(&eval.evaluate(&lt).unwrap()), vec![2, 3]);
        let le = BTreeSet::from([Predicate::price(Comparison::Le, 299)]);
        assert_eq!(ids(&eval.evaluate(&le).unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn empty_tag_is_rejected() {
        let g = graph();
        let eval = GraphConstraintEvaluator::new(&g);
        let preds = BTreeSet::from([Predicate::AttributeEquals("  ".into())]);
        assert!(matches!(eval.evaluate(&preds), Err(pantry_core::Error::InvalidArgument(_))));
    }
}
