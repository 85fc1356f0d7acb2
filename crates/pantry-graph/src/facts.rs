use tracing::debug;

use pantry_core::error::Result;
use pantry_core::traits::KnowledgeGraph;
use pantry_core::types::{EdgeType, NodeId, ProductId};

const FACT_EDGES: [EdgeType; 6] = [
    EdgeType::MadeBy,
    EdgeType::InCategory,
    EdgeType::SubcategoryOf,
    EdgeType::HasIngredient,
    EdgeType::HasAttribute,
    EdgeType::Price,
];

/// One-hop facts about a product, one line per edge, e.g.
/// `Product(1) -[HAS_ATTRIBUTE]-> Attribute(nut-free)`.
pub fn product_facts<G: KnowledgeGraph + ?Sized>(graph: &G, product: ProductId) -> Result<Vec<String>> {
    let node = NodeId::Product(product);
    let mut facts = Vec::new();
    for edge in FACT_EDGES {
        for target in graph.neighbors(&node, edge)? {
            facts.push(format!("{node} -[{}]-> {target}", edge.label()));
        }
    }
    Ok(facts)
}

/// Facts for `products` in the given order, stopping at `limit` lines.
pub fn collect_facts<G, I>(graph: &G, products: I, limit: usize) -> Result<Vec<String>>
where
    G: KnowledgeGraph + ?Sized,
    I: IntoIterator<Item = ProductId>,
{
    let mut facts = Vec::new();
    for product in products {
        if facts.len() >= limit {
            break;
        }
        facts.extend(product_facts(graph, product)?);
    }
    facts.truncate(limit);
    debug!(facts = facts.len(), limit, "collected graph facts");
    Ok(facts)
}
