//! Loads the configured catalog and prints ranked results as JSON.
//!
//! cargo run -p pantry-hybrid --example search -- "nut-free granola under $5" 5
use std::path::PathBuf;
use std::sync::Arc;

use pantry_core::catalog::CatalogLoader;
use pantry_core::config::Config;
use pantry_core::telemetry;
use pantry_embed::get_default_embedder;
use pantry_graph::ProductGraph;
use pantry_hybrid::HybridSearchEngine;
use pantry_vector::build_index;

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let settings = config.settings()?;
    telemetry::init(&settings.logging)?;

    let mut args = std::env::args().skip(1);
    let query = args.next().unwrap_or_else(|| "nut-free granola under $5".to_string());
    let k = match args.next() {
        Some(raw) => raw.parse()?,
        None => settings.search.default_k,
    };

    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..");
    let catalog = CatalogLoader::new().load_path(&settings.catalog.resolved_path(&root))?;
    let graph = ProductGraph::from_catalog(&catalog);
    let index = build_index(&catalog, get_default_embedder(&settings.embedding)?)?;

    let engine = HybridSearchEngine::new(Arc::new(index), Arc::new(graph), settings);
    let response = engine.search_with_report(&query, k)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
