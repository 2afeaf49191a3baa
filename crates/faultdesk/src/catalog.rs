use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::errors::CatalogError;

/// Default location of the parts file, relative to the working directory
pub const DEFAULT_CATALOG_PATH: &str = "./fixing_parts.json";

/// Replacement parts the model may recommend, keyed by part name.
///
/// Metadata values are kept as loaded and never inspected; only the key set
/// matters downstream. Keys keep the order they have in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartsCatalog {
    parts: Map<String, Value>,
}

impl PartsCatalog {
    pub fn new(parts: Map<String, Value>) -> Self {
        Self { parts }
    }

    /// Load the catalog, degrading to an empty catalog on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::try_load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!("Using empty parts catalog: {}", e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        match value {
            Value::Object(parts) => {
                tracing::debug!("Loaded {} parts from {}", parts.len(), path.display());
                Ok(Self { parts })
            }
            _ => Err(CatalogError::NotAnObject(path.to_path_buf())),
        }
    }

    /// Valid part names, in file order
    pub fn names(&self) -> Vec<&str> {
        self.parts.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
