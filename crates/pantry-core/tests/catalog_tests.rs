use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

use pantry_core::catalog::CatalogLoader;
use pantry_core::error::Error;
use pantry_core::types::ProductId;

const HEADER: &str = "product_id,name,brand,category,sub_category,price,ingredients,attributes";

fn fixture_dir() -> PathBuf {
    // crates/pantry-core -> crates -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().join("test_data/catalog")
}

#[test]
fn load_file_normalizes_rows() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("products.csv");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "{HEADER}").unwrap();
    writeln!(f, "1,Nut-Free Crunch Granola,Sunny Fields,Breakfast,Granola,4.79,\"Oats, Honey\",Nut_Free; organic").unwrap();

    let catalog = CatalogLoader::new().load_file(&file_path).expect("load");

    assert_eq!(catalog.len(), 1);
    let p = catalog.get(ProductId(1)).expect("product 1");
    assert_eq!(p.category, "breakfast/granola");
    assert_eq!(p.price_cents, 479);
    assert_eq!(p.ingredients, vec!["oats".to_string(), "honey".to_string()]);
    assert!(p.attributes.contains("nut-free"));
    assert!(p.attributes.contains("organic"));
}

#[test]
fn duplicate_ids_are_rejected() {
    let csv = format!("{HEADER}\n7,A,B,Snacks,Chips,1.00,,\n7,C,D,Snacks,Chips,2.00,,\n");
    let products = CatalogLoader::new().read_products(csv.as_bytes()).expect("rows parse");
    let err = pantry_core::catalog::Catalog::from_products(products).unwrap_err();
    assert!(matches!(err, Error::Catalog(ref msg) if msg.contains("duplicate")));
}

#[test]
fn negative_and_malformed_prices_are_rejected() {
    let loader = CatalogLoader::new();
    let negative = format!("{HEADER}\n1,A,B,Snacks,Chips,-1.00,,\n");
    assert!(matches!(loader.read_products(negative.as_bytes()), Err(Error::Catalog(_))));
    let malformed = format!("{HEADER}\n1,A,B,Snacks,Chips,cheap,,\n");
    assert!(matches!(loader.read_products(malformed.as_bytes()), Err(Error::Catalog(_))));
}

#[test]
fn load_dir_reads_every_csv_in_path_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("b.csv"), format!("{HEADER}\n2,Two,B,Dairy,Milk,1.50,,\n")).unwrap();
    fs::create_dir(dir.join("nested")).unwrap();
    fs::write(dir.join("nested/a.csv"), format!("{HEADER}\n1,One,A,Dairy,Milk,1.00,,\n")).unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let catalog = CatalogLoader::new().load_dir(dir).expect("load dir");
    let ids: Vec<u64> = catalog.iter().map(|p| p.id.0).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn missing_path_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = CatalogLoader::new().load_path(&tmp.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn sample_fixture_loads() {
    let catalog = CatalogLoader::new().load_path(&fixture_dir()).expect("fixture");
    assert_eq!(catalog.len(), 16);
    let honey = catalog.get(ProductId(2)).expect("honey granola");
    assert!(honey.attributes.contains("contains-nuts"));
}
