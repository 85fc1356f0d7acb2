use std::collections::BTreeSet;
use std::path::PathBuf;

use pantry_core::catalog::{Catalog, CatalogLoader};
use pantry_core::error::{Error, Result};
use pantry_core::traits::KnowledgeGraph;
use pantry_core::types::{Comparison, EdgeType, NodeId, NodeKind, Predicate, Product, ProductId};
use pantry_graph::{GraphConstraintEvaluator, ProductGraph};
use pantry_query::ConstraintParser;
use proptest::prelude::*;

fn fixture_catalog() -> Catalog {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().join("test_data/catalog");
    CatalogLoader::new().load_dir(&dir).expect("fixture catalog")
}

fn ids(catalog_graph: &ProductGraph, predicates: &BTreeSet<Predicate>) -> Vec<u64> {
    GraphConstraintEvaluator::new(catalog_graph)
        .evaluate(predicates)
        .expect("evaluate")
        .iter()
        .map(|m| m.product_id.0)
        .collect()
}

#[test]
fn graph_from_fixture_has_every_product() {
    let catalog = fixture_catalog();
    let graph = ProductGraph::from_catalog(&catalog);
    let products = graph.nodes(NodeKind::Product).unwrap();
    assert_eq!(products.len(), catalog.len());
    assert!(graph.edge_count() > catalog.len());

    let brand = NodeId::Brand("golden hive".into());
    let made = graph.neighbors(&brand, EdgeType::MadeBy).unwrap();
    assert_eq!(made, BTreeSet::from([NodeId::Product(ProductId(2)), NodeId::Product(ProductId(3))]));
}

#[test]
fn nut_free_under_five_dollars() {
    let graph = ProductGraph::from_catalog(&fixture_catalog());
    let query = ConstraintParser::default().parse("nut-free granola under $5");

    let matches = GraphConstraintEvaluator::new(&graph).evaluate(&query.predicates).unwrap();
    let found: Vec<u64> = matches.iter().map(|m| m.product_id.0).collect();
    assert_eq!(found, vec![1, 4, 6, 8, 13]);
    assert!(!found.contains(&2), "honey granola contains nuts and costs $6.99");
    for m in &matches {
        let satisfied: BTreeSet<Predicate> = m.satisfied.iter().cloned().collect();
        assert_eq!(satisfied, query.predicates);
    }
}

#[test]
fn category_and_attribute_intersect() {
    let graph = ProductGraph::from_catalog(&fixture_catalog());
    let preds = BTreeSet::from([
        Predicate::CategoryEquals("breakfast/granola".into()),
        Predicate::AttributeEquals("nut-free".into()),
    ]);
    assert_eq!(ids(&graph, &preds), vec![1]);

    let dairy = BTreeSet::from([Predicate::CategoryEquals("dairy".into())]);
    assert_eq!(ids(&graph, &dairy), vec![11, 12, 13]);
}

#[test]
fn price_range_from_two_comparisons() {
    let graph = ProductGraph::from_catalog(&fixture_catalog());
    let preds = BTreeSet::from([Predicate::price(Comparison::Ge, 299), Predicate::price(Comparison::Lt, 379)]);
    assert_eq!(ids(&graph, &preds), vec![6, 7, 16]);
}

#[test]
fn unsatisfiable_predicates_yield_empty() {
    let graph = ProductGraph::from_catalog(&fixture_catalog());
    let unknown = BTreeSet::from([Predicate::AttributeEquals("keto".into())]);
    assert!(ids(&graph, &unknown).is_empty());

    let contradiction = BTreeSet::from([Predicate::price(Comparison::Lt, 100), Predicate::price(Comparison::Gt, 900)]);
    assert!(ids(&graph, &contradiction).is_empty());

    assert!(ids(&graph, &BTreeSet::new()).is_empty());
}

struct UnavailableGraph;

impl KnowledgeGraph for UnavailableGraph {
    fn neighbors(&self, _node: &NodeId, _edge: EdgeType) -> Result<BTreeSet<NodeId>> {
        Err(Error::UpstreamUnavailable("graph store offline".into()))
    }

    fn nodes(&self, _kind: NodeKind) -> Result<BTreeSet<NodeId>> {
        Err(Error::UpstreamUnavailable("graph store offline".into()))
    }
}

#[test]
fn upstream_failure_propagates() {
    let preds = BTreeSet::from([Predicate::AttributeEquals("vegan".into())]);
    let err = GraphConstraintEvaluator::new(&UnavailableGraph).evaluate(&preds).unwrap_err();
    assert!(err.is_upstream(), "unexpected error: {err}");

    // no predicates, no graph access
    assert!(GraphConstraintEvaluator::new(&UnavailableGraph).evaluate(&BTreeSet::new()).unwrap().is_empty());
}

fn satisfies(product: &Product, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::AttributeEquals(tag) => product.attributes.contains(tag),
        Predicate::CategoryEquals(path) => {
            product.category == *path || product.category.starts_with(&format!("{path}/"))
        }
        Predicate::NumericComparison { op, value, .. } => op.holds(product.price_cents, *value),
    }
}

fn predicate_strategy() -> impl Strategy<Value = Predicate> {
    let tags = prop::sample::select(vec!["vegan", "nut-free", "gluten-free", "organic", "kids", "contains-nuts"]);
    let cats = prop::sample::select(vec!["snacks", "dairy", "breakfast", "breakfast/granola", "beverages/coffee"]);
    let ops = prop::sample::select(vec![Comparison::Lt, Comparison::Le, Comparison::Gt, Comparison::Ge]);
    prop_oneof![
        tags.prop_map(|t| Predicate::AttributeEquals(t.to_string())),
        cats.prop_map(|c| Predicate::CategoryEquals(c.to_string())),
        (ops, 0u64..900).prop_map(|(op, cents)| Predicate::price(op, cents)),
    ]
}

proptest! {
    #[test]
    fn matches_are_exactly_the_satisfying_products(preds in prop::collection::btree_set(predicate_strategy(), 1..4)) {
        let catalog = fixture_catalog();
        let graph = ProductGraph::from_catalog(&catalog);
        let expected: Vec<u64> = catalog
            .iter()
            .filter(|p| preds.iter().all(|pred| satisfies(p, pred)))
            .map(|p| p.id.0)
            .collect();
        prop_assert_eq!(ids(&graph, &preds), expected);
    }
}
