use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{normalize_category, normalize_tag, Product, ProductId};

/// Products keyed by id; iteration is in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<ProductId, Product>,
}

impl Catalog {
    pub fn from_products<I: IntoIterator<Item = Product>>(products: I) -> Result<Self> {
        let mut catalog = Self::default();
        for product in products {
            catalog.insert(product)?;
        }
        Ok(catalog)
    }

    fn insert(&mut self, product: Product) -> Result<()> {
        if self.products.contains_key(&product.id) {
            return Err(Error::Catalog(format!("duplicate product id {}", product.id)));
        }
        self.products.insert(product.id, product);
        Ok(())
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> { self.products.get(&id) }

    pub fn len(&self) -> usize { self.products.len() }

    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Product> { self.products.values() }
}

/// One CSV row as found on disk.
///
/// Ingredients are comma separated, attributes `;` or `|` separated.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    product_id: u64,
    name: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    sub_category: String,
    price: String,
    #[serde(default)]
    ingredients: String,
    #[serde(default)]
    attributes: String,
}

impl CatalogRow {
    fn into_product(self) -> Result<Product> {
        let price = self.price.trim();
        if price.starts_with('-') {
            return Err(Error::Catalog(format!("product {}: negative price {}", self.product_id, price)));
        }
        let price_cents = crate::types::parse_amount(price)
            .ok_or_else(|| Error::Catalog(format!("product {}: invalid price '{}'", self.product_id, price)))?;
        let ingredients = self
            .ingredients
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        let attributes: BTreeSet<String> = self
            .attributes
            .split([';', '|'])
            .map(normalize_tag)
            .filter(|s| !s.is_empty())
            .collect();
        Ok(Product {
            id: ProductId(self.product_id),
            name: self.name.trim().to_string(),
            brand: self.brand.trim().to_string(),
            category: normalize_category(&[self.category.as_str(), self.sub_category.as_str()]),
            price_cents,
            ingredients,
            attributes,
        })
    }
}

#[derive(Default)]
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn new() -> Self { Self }

    /// Load a single CSV file, or every `*.csv` below a directory.
    pub fn load_path(&self, path: &Path) -> Result<Catalog> {
        if path.is_dir() {
            self.load_dir(path)
        } else if path.is_file() {
            self.load_file(path)
        } else {
            Err(Error::NotFound(format!("catalog path {}", path.display())))
        }
    }

    pub fn load_file(&self, path: &Path) -> Result<Catalog> {
        let file = fs::File::open(path)?;
        let products = self.read_products(file)?;
        info!(path = %path.display(), products = products.len(), "loaded catalog file");
        Catalog::from_products(products)
    }

    pub fn load_dir(&self, data_dir: &Path) -> Result<Catalog> {
        let files = self.list_csv_files(data_dir);
        if files.is_empty() {
            return Err(Error::NotFound(format!("no .csv files under {}", data_dir.display())));
        }
        let mut all_products = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(file = file_index + 1, total = files.len(), path = %file_path.display(), "reading catalog file");
            let file = fs::File::open(file_path)?;
            all_products.extend(self.read_products(file)?);
        }
        info!(files = files.len(), products = all_products.len(), "loaded catalog directory");
        Catalog::from_products(all_products)
    }

    pub fn read_products<R: Read>(&self, reader: R) -> Result<Vec<Product>> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
        let mut products = Vec::new();
        for row in csv_reader.deserialize::<CatalogRow>() {
            products.push(row?.into_product()?);
        }
        Ok(products)
    }

    fn list_csv_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut csv_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path(); if path.extension().and_then(|s| s.to_str()) == Some("csv") { csv_files.push(path.to_path_buf()); }
        }
        csv_files.sort(); csv_files
    }
}
