//! Feature Engineering Engine
//!
//! Turns a raw, name-keyed input record into the ordered numeric feature
//! vector a trained model expects. Assembly always walks the feature schema,
//! never the record, so a vector can only come out in training order.

mod derived;
mod features;
mod record;
mod schema;

pub use derived::{derive, DerivedFeature, DerivationRules};
pub use features::{assemble, validate, FeatureAssembler, FeatureVector};
pub use record::{FieldValue, RawRecord};
pub use schema::FeatureSchema;

use thiserror::Error;

/// Errors during feature vector assembly
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// One or more required fields are absent from the record
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A derived feature could not be computed
    #[error("Cannot derive {feature}: {reason}")]
    Derivation { feature: String, reason: String },

    /// A field value cannot be coerced to a number
    #[error("Field {field} has non-numeric value {value}")]
    TypeConversion { field: String, value: String },

    /// The feature schema itself is unusable
    #[error("Invalid feature schema: {0}")]
    InvalidSchema(String),

    /// The input is not a name-keyed record
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Schema file could not be read
    #[error("I/O error reading {path}: {reason}")]
    Io { path: String, reason: String },
}

impl FeatureError {
    /// Whether the caller can fix this by changing the input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FeatureError::MissingFields(_)
                | FeatureError::TypeConversion { .. }
                | FeatureError::MalformedRecord(_)
        )
    }
}
