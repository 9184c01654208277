//! Loading the product table from a config directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{CatalogError, CatalogResult};
use crate::product::ProductSpec;

/// The loaded product table.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: BTreeMap<String, ProductSpec>,
    config_dir: PathBuf,
}

impl Catalog {
    /// Load every `*.yaml` under `<config_dir>/products/`.
    ///
    /// Malformed or invalid definitions are hard errors; the table is the
    /// single source of truth and silently skipping entries would hide
    /// broken products until someone asks for them.
    pub fn load_dir(config_dir: &Path) -> CatalogResult<Self> {
        let products_dir = config_dir.join("products");
        let mut products = BTreeMap::new();

        for entry in WalkDir::new(&products_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_yaml(path) {
                continue;
            }

            let text = std::fs::read_to_string(path)?;
            let spec: ProductSpec =
                serde_yaml::from_str(&text).map_err(|e| CatalogError::Parse {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;

            spec.validate().map_err(|message| CatalogError::Invalid {
                path: path.display().to_string(),
                message,
            })?;

            debug!(id = %spec.id, path = %path.display(), "Loaded product definition");
            let id = spec.id.clone();
            if products.insert(id.clone(), spec).is_some() {
                return Err(CatalogError::Duplicate {
                    id,
                    path: path.display().to_string(),
                });
            }
        }

        if products.is_empty() {
            return Err(CatalogError::NoProducts(products_dir.display().to_string()));
        }

        info!(
            products = products.len(),
            dir = %products_dir.display(),
            "Loaded product catalog"
        );

        Ok(Self {
            products,
            config_dir: config_dir.to_path_buf(),
        })
    }

    /// Look up one product by id.
    pub fn get(&self, id: &str) -> Option<&ProductSpec> {
        self.products.get(id)
    }

    /// All products in id order.
    pub fn products(&self) -> impl Iterator<Item = &ProductSpec> {
        self.products.values()
    }

    /// All product ids in order.
    pub fn ids(&self) -> Vec<&str> {
        self.products.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Resolve a config-relative path (style file, coastline overlay).
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.config_dir.join(relative)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yaml() {
        assert!(is_yaml(Path::new("a/b/MOD08.yaml")));
        assert!(is_yaml(Path::new("x.yml")));
        assert!(!is_yaml(Path::new("x.json")));
        assert!(!is_yaml(Path::new("yaml")));
    }
}
