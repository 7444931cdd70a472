//! Data Validator for Range Checking

use crate::error::ValidationError;
use feature_engine::RawRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Allowed closed interval for one input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub field: String,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub fn new(field: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            field: field.into(),
            min,
            max,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// Convert into a `Result`, keeping every error
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Range validator for numeric input fields
#[derive(Debug, Clone, Default)]
pub struct Validator {
    ranges: Vec<FieldRange>,
}

impl Validator {
    /// Create a new validator with given ranges
    pub fn new(ranges: Vec<FieldRange>) -> Self {
        Self { ranges }
    }

    pub fn ranges(&self) -> &[FieldRange] {
        &self.ranges
    }

    /// Validate a single value against a range
    pub fn validate_range(&self, range: &FieldRange, value: f64) -> Result<(), ValidationError> {
        if range.contains(value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field: range.field.clone(),
                value,
                min: range.min,
                max: range.max,
            })
        }
    }

    /// Check every ranged field present in the record.
    ///
    /// Absent fields and non-numeric values are not range errors; feature
    /// assembly reports those.
    pub fn validate(&self, record: &RawRecord) -> ValidationResult {
        let mut errors = Vec::new();
        let mut checked = 0;

        for range in &self.ranges {
            let Some(Ok(value)) = record.number(&range.field) else {
                continue;
            };
            checked += 1;
            if let Err(e) = self.validate_range(range, value) {
                debug!("Range check failed: {}", e);
                errors.push(e);
            }
        }

        if errors.is_empty() {
            ValidationResult::valid(checked)
        } else {
            ValidationResult::invalid(errors, checked)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FieldValue;

    fn validator() -> Validator {
        Validator::new(vec![
            FieldRange::new("Cycle_Time", 15.0, 45.0),
            FieldRange::new("Cooling_Time", 8.0, 20.0),
        ])
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let v = validator();
        let range = &v.ranges()[0];
        assert!(v.validate_range(range, 15.0).is_ok());
        assert!(v.validate_range(range, 45.0).is_ok());
        assert!(v.validate_range(range, 14.99).is_err());
        assert!(v.validate_range(range, 45.01).is_err());
    }

    #[test]
    fn test_collects_every_out_of_range_field() {
        let record: RawRecord = [("Cycle_Time", 50.0), ("Cooling_Time", 2.0)].into_iter().collect();
        let result = validator().validate(&record);

        assert!(!result.valid);
        assert_eq!(result.fields_checked, 2);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(
            result.errors[0],
            ValidationError::OutOfRange {
                field: "Cycle_Time".to_string(),
                value: 50.0,
                min: 15.0,
                max: 45.0,
            }
        );
    }

    #[test]
    fn test_absent_and_non_numeric_fields_are_skipped() {
        let mut record: RawRecord = [("Cycle_Time", 20.0)].into_iter().collect();
        record.insert("Cooling_Time", FieldValue::from("soon"));

        let result = validator().validate(&record);
        assert!(result.valid);
        assert_eq!(result.fields_checked, 1);
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_text_numbers_are_range_checked() {
        let record: RawRecord = [("Cycle_Time", "100")].into_iter().collect();
        assert!(validator().validate(&record).into_result().is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn range_check_agrees_with_bounds(min in -1.0e3..1.0e3f64, width in 0.0..1.0e3f64, value in -3.0e3..3.0e3f64) {
            let range = FieldRange::new("x", min, min + width);
            let validator = Validator::new(vec![range.clone()]);
            let record: RawRecord = [("x", value)].into_iter().collect();

            let result = validator.validate(&record);
            prop_assert_eq!(result.valid, value >= range.min && value <= range.max);
        }
    }
}
