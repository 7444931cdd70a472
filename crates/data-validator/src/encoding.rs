//! Categorical Label Encoding

use crate::error::ValidationError;
use feature_engine::{FieldValue, RawRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maps a human-readable label field onto a numeric model feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    /// Field carrying the label, e.g. `sex_label`
    pub source: String,
    /// Feature receiving the code, e.g. `sex`
    pub target: String,
    /// Label to code pairs, in display order
    pub options: Vec<(String, f64)>,
}

impl CategoricalEncoder {
    /// Create an encoder from `(label, code)` pairs
    pub fn new<L: Into<String>>(
        source: impl Into<String>,
        target: impl Into<String>,
        options: impl IntoIterator<Item = (L, f64)>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            options: options.into_iter().map(|(label, code)| (label.into(), code)).collect(),
        }
    }

    /// Numeric code for a label
    pub fn code(&self, label: &str) -> Option<f64> {
        let label = label.trim();
        self.options
            .iter()
            .find(|(option, _)| option == label)
            .map(|(_, code)| *code)
    }

    /// Option labels in display order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|(label, _)| label.as_str())
    }

    /// Replace the label field with its code. A record without the label is left as is.
    pub fn encode(&self, record: &mut RawRecord) -> Result<(), ValidationError> {
        let Some(value) = record.get(&self.source) else {
            return Ok(());
        };

        let label = match value {
            FieldValue::Text(label) => label.clone(),
            other => other.to_string(),
        };

        let code = self.code(&label).ok_or_else(|| ValidationError::UnknownCategory {
            field: self.source.clone(),
            label: label.clone(),
            allowed: self.labels().map(str::to_string).collect(),
        })?;

        debug!("Encoded {}={:?} as {}={}", self.source, label, self.target, code);
        record.remove(&self.source);
        record.insert(self.target.clone(), code);
        Ok(())
    }
}

/// Ordered set of encoders for one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Encoders {
    encoders: Vec<CategoricalEncoder>,
}

impl Encoders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, encoder: CategoricalEncoder) -> Self {
        self.encoders.push(encoder);
        self
    }

    /// Encoder writing the given target feature
    pub fn for_target(&self, target: &str) -> Option<&CategoricalEncoder> {
        self.encoders.iter().find(|e| e.target == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoricalEncoder> {
        self.encoders.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Apply every encoder, stopping at the first unknown label
    pub fn encode(&self, record: &mut RawRecord) -> Result<(), ValidationError> {
        for encoder in &self.encoders {
            encoder.encode(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sex() -> CategoricalEncoder {
        CategoricalEncoder::new("sex_label", "sex", [("Male", 1.0), ("Female", 0.0)])
    }

    #[test]
    fn test_male_encodes_to_one() {
        let mut record: RawRecord = [("sex_label", "Male")].into_iter().collect();
        sex().encode(&mut record).unwrap();

        assert_eq!(record.get("sex"), Some(&FieldValue::Number(1.0)));
        assert!(!record.contains("sex_label"));
    }

    #[test]
    fn test_female_encodes_to_zero() {
        let mut record: RawRecord = [("sex_label", "Female")].into_iter().collect();
        sex().encode(&mut record).unwrap();
        assert_eq!(record.get("sex"), Some(&FieldValue::Number(0.0)));
    }

    #[test]
    fn test_unknown_label_lists_options() {
        let mut record: RawRecord = [("sex_label", "Other")].into_iter().collect();
        let err = sex().encode(&mut record).unwrap_err();

        assert_eq!(
            err,
            ValidationError::UnknownCategory {
                field: "sex_label".to_string(),
                label: "Other".to_string(),
                allowed: vec!["Male".to_string(), "Female".to_string()],
            }
        );
    }

    #[test]
    fn test_absent_label_leaves_direct_code() {
        let mut record: RawRecord = [("sex", 0.0)].into_iter().collect();
        sex().encode(&mut record).unwrap();
        assert_eq!(record.get("sex"), Some(&FieldValue::Number(0.0)));
    }

    #[test]
    fn test_label_wins_over_supplied_code() {
        let mut record: RawRecord = [("sex", FieldValue::Number(0.0)), ("sex_label", FieldValue::from("Male"))]
            .into_iter()
            .collect();
        sex().encode(&mut record).unwrap();
        assert_eq!(record.get("sex"), Some(&FieldValue::Number(1.0)));
    }

    #[test]
    fn test_encoders_apply_in_order() {
        let encoders = Encoders::new().with(sex()).with(CategoricalEncoder::new(
            "fasting_blood_sugar_label",
            "fasting_blood_sugar",
            [("No (0)", 0.0), ("Yes (1)", 1.0)],
        ));

        let mut record: RawRecord = [("sex_label", "Female"), ("fasting_blood_sugar_label", "Yes (1)")]
            .into_iter()
            .collect();
        encoders.encode(&mut record).unwrap();

        assert_eq!(record.get("sex"), Some(&FieldValue::Number(0.0)));
        assert_eq!(record.get("fasting_blood_sugar"), Some(&FieldValue::Number(1.0)));
        assert!(encoders.for_target("sex").is_some());
    }
}
