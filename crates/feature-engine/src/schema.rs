//! Feature Schema

use crate::FeatureError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Ordered list of feature names a model was trained against.
///
/// Cheap to clone; the names are shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    names: Arc<[String]>,
}

impl FeatureSchema {
    /// Create a schema, rejecting empty or duplicated names
    pub fn new<I, S>(names: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(FeatureError::InvalidSchema("schema has no features".to_string()));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.trim().is_empty() {
                return Err(FeatureError::InvalidSchema("empty feature name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(FeatureError::InvalidSchema(format!("duplicate feature {name}")));
            }
        }

        Ok(Self { names: names.into() })
    }

    /// Parse a schema from a JSON array of strings
    pub fn from_json_str(json: &str) -> Result<Self, FeatureError> {
        serde_json::from_str(json).map_err(|e| FeatureError::InvalidSchema(e.to_string()))
    }

    /// Load a schema from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FeatureError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| FeatureError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let schema = Self::from_json_str(&json)?;
        info!("Loaded feature schema from {} ({} features)", path.display(), schema.len());
        Ok(schema)
    }

    /// Feature names in training order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed schema
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a feature in the schema
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = FeatureError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.names.to_vec()
    }
}
