//! Input Validation and Encoding
//!
//! Boundary checks applied to raw prediction inputs before feature assembly:
//! categorical labels are encoded to the numeric codes a model was trained
//! on, and form values are checked against their allowed ranges.

mod encoding;
mod error;
mod validator;

pub use encoding::{CategoricalEncoder, Encoders};
pub use error::ValidationError;
pub use validator::{FieldRange, ValidationResult, Validator};
