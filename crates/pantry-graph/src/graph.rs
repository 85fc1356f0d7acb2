use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use pantry_core::catalog::Catalog;
use pantry_core::error::Result;
use pantry_core::traits::KnowledgeGraph;
use pantry_core::types::{EdgeType, NodeId, NodeKind, Product};

type Adjacency = BTreeMap<EdgeType, BTreeSet<NodeId>>;

/// In-memory product knowledge graph.
///
/// Undirected and typed: every edge is stored under both endpoints. Ordered
/// maps keep neighbour iteration stable for a given snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProductGraph {
    nodes: BTreeMap<NodeId, Adjacency>,
    edge_count: usize,
}

impl ProductGraph {
    pub fn new() -> Self { Self::default() }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut graph = Self::new();
        for product in catalog.iter() {
            graph.add_product(product);
        }
        info!(nodes = graph.node_count(), edges = graph.edge_count(), "built product graph");
        graph
    }

    /// Adds the product node and its brand, category chain, ingredient,
    /// attribute and price edges.
    pub fn add_product(&mut self, product: &Product) {
        let node = NodeId::Product(product.id);
        self.add_node(node.clone());

        let brand = product.brand.trim().to_lowercase();
        if !brand.is_empty() {
            self.add_edge(&node, &NodeId::Brand(brand), EdgeType::MadeBy);
        }

        if !product.category.is_empty() {
            self.add_edge(&node, &NodeId::Category(product.category.clone()), EdgeType::InCategory);
            let mut child = product.category.as_str();
            while let Some((parent, _)) = child.rsplit_once('/') {
                self.add_edge(
                    &NodeId::Category(child.to_string()),
                    &NodeId::Category(parent.to_string()),
                    EdgeType::SubcategoryOf,
                );
                child = parent;
            }
        }

        for ingredient in &product.ingredients {
            self.add_edge(&node, &NodeId::Ingredient(ingredient.clone()), EdgeType::HasIngredient);
        }
        for tag in &product.attributes {
            self.add_edge(&node, &NodeId::Attribute(tag.clone()), EdgeType::HasAttribute);
        }
        self.add_edge(&node, &NodeId::Price(product.price_cents), EdgeType::Price);
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.nodes.entry(node).or_default();
    }

    /// Returns `false` when the edge already existed.
    pub fn add_edge(&mut self, a: &NodeId, b: &NodeId, edge: EdgeType) -> bool {
        let inserted = self.nodes.entry(a.clone()).or_default().entry(edge).or_default().insert(b.clone());
        self.nodes.entry(b.clone()).or_default().entry(edge).or_default().insert(a.clone());
        if inserted { self.edge_count += 1; }
        inserted
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }

    pub fn edge_count(&self) -> usize { self.edge_count }

}

impl KnowledgeGraph for ProductGraph {
    fn neighbors(&self, node: &NodeId, edge: EdgeType) -> Result<BTreeSet<NodeId>> {
        Ok(self.nodes.get(node).and_then(|adj| adj.get(&edge)).cloned().unwrap_or_default())
    }

    fn nodes(&self, kind: NodeKind) -> Result<BTreeSet<NodeId>> {
        Ok(self.nodes.keys().filter(|n| n.kind() == kind).cloned().collect())
    }
}
