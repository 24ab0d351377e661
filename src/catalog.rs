//! Function catalog input.
//!
//! A catalog is a JSON document listing functions and their parameters in
//! declaration order:
//!
//! ```json
//! { "functions": [ { "name": "resize", "params": [ { "name": "width", "type": "uint32" } ] } ] }
//! ```
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub functions: Vec<FunctionSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSignature {
    pub name: String,
    /// Declared type text, e.g. `*[3]**int64`.
    #[serde(rename = "type")]
    pub declared: String,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, params: &[(&str, &str)]) -> Self {
        Self {
            name: name.into(),
            params: params
                .iter()
                .map(|(name, declared)| ParamSignature { name: name.to_string(), declared: declared.to_string() })
                .collect(),
        }
    }
}

impl Catalog {
    pub fn from_json_str(source: &str, origin: &str) -> Result<Self, CatalogError> {
        from_str_with_path(source).map_err(|message| CatalogError::Parse { origin: origin.to_string(), message })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&source, &path.to_string_lossy())
    }

    /// Append another catalog's functions after this one's.
    pub fn extend(&mut self, other: Catalog) {
        self.functions.extend(other.functions);
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}
