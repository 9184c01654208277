//! Catalog directory loading.

use product_catalog::{Catalog, CatalogError, PlotKind};
use std::fs;

fn write_product(dir: &std::path::Path, name: &str, id: &str) {
    let yaml = format!(
        r#"
id: {id}
title: "Example product"
filename: {id}.hdf
fields:
  - path: Some_Field
geolocation:
  kind: regular
  bbox: "-180,-90,180,90"
plot:
  kind: map
"#
    );
    fs::write(dir.join(name), yaml).unwrap();
}

#[test]
fn load_directory_of_products() {
    let tmp = tempfile::tempdir().unwrap();
    let products = tmp.path().join("products");
    fs::create_dir_all(&products).unwrap();
    write_product(&products, "a.yaml", "PRODUCT_A");
    write_product(&products, "b.yml", "PRODUCT_B");
    fs::write(products.join("notes.txt"), "ignored").unwrap();

    let catalog = Catalog::load_dir(tmp.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.ids(), vec!["PRODUCT_A", "PRODUCT_B"]);

    let spec = catalog.get("PRODUCT_A").unwrap();
    assert_eq!(spec.plot.kind, PlotKind::Map);
    assert_eq!(spec.output_name(), "PRODUCT_A.hdf.png");
}

#[test]
fn empty_directory_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("products")).unwrap();
    assert!(matches!(
        Catalog::load_dir(tmp.path()),
        Err(CatalogError::NoProducts(_))
    ));
}

#[test]
fn duplicate_ids_are_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let products = tmp.path().join("products");
    fs::create_dir_all(&products).unwrap();
    write_product(&products, "a.yaml", "SAME_ID");
    write_product(&products, "b.yaml", "SAME_ID");

    assert!(matches!(
        Catalog::load_dir(tmp.path()),
        Err(CatalogError::Duplicate { .. })
    ));
}

#[test]
fn malformed_yaml_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let products = tmp.path().join("products");
    fs::create_dir_all(&products).unwrap();
    fs::write(products.join("bad.yaml"), "id: [unterminated").unwrap();

    assert!(matches!(
        Catalog::load_dir(tmp.path()),
        Err(CatalogError::Parse { .. })
    ));
}

#[test]
fn invalid_product_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let products = tmp.path().join("products");
    fs::create_dir_all(&products).unwrap();
    // Profile plot without a vertical coordinate
    let yaml = r#"
id: BROKEN
title: "Broken"
filename: broken.h5
fields:
  - path: X
geolocation:
  kind: regular
  bbox: "-180,-90,180,90"
plot:
  kind: profile
"#;
    fs::write(products.join("broken.yaml"), yaml).unwrap();

    assert!(matches!(
        Catalog::load_dir(tmp.path()),
        Err(CatalogError::Invalid { .. })
    ));
}

#[test]
fn resolve_path_is_config_relative() {
    let tmp = tempfile::tempdir().unwrap();
    let products = tmp.path().join("products");
    fs::create_dir_all(&products).unwrap();
    write_product(&products, "a.yaml", "A");

    let catalog = Catalog::load_dir(tmp.path()).unwrap();
    assert_eq!(
        catalog.resolve_path("styles/ozone.json"),
        tmp.path().join("styles/ozone.json")
    );
}
