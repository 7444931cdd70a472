//! Derived Feature Rules

use crate::record::RawRecord;
use crate::FeatureError;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Pure function from a rule's inputs (in declared order) to its output
pub type Formula = fn(&[f64]) -> f64;

/// A named feature computed from other fields
#[derive(Clone)]
pub struct DerivedFeature {
    name: String,
    inputs: Vec<String>,
    formula: Formula,
}

impl DerivedFeature {
    /// Create a rule producing `name` from `inputs`
    pub fn new<S: Into<String>>(name: impl Into<String>, inputs: impl IntoIterator<Item = S>, formula: Formula) -> Self {
        Self {
            name: name.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            formula,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Evaluate this rule against the record without modifying it
    pub fn evaluate(&self, record: &RawRecord) -> Result<f64, FeatureError> {
        let mut args = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            match record.number(input) {
                Some(value) => args.push(value?),
                None => {
                    return Err(FeatureError::Derivation {
                        feature: self.name.clone(),
                        reason: format!("input {input} is absent"),
                    })
                }
            }
        }

        let value = (self.formula)(&args);
        if !value.is_finite() {
            return Err(FeatureError::Derivation {
                feature: self.name.clone(),
                reason: format!("result is not finite ({value})"),
            });
        }
        Ok(value)
    }
}

impl fmt::Debug for DerivedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedFeature")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// Derived feature rules, applied in declared order
#[derive(Debug, Clone, Default)]
pub struct DerivationRules {
    rules: Vec<DerivedFeature>,
}

impl DerivationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; later rules may read the output of earlier ones
    pub fn with(mut self, rule: DerivedFeature) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &DerivedFeature> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether some rule produces `name`
    pub fn produces(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name == name)
    }

    /// Inputs the caller must supply: rule inputs not produced by an earlier rule
    pub fn external_inputs(&self) -> Vec<String> {
        let mut produced = HashSet::new();
        let mut external = Vec::new();
        for rule in &self.rules {
            for input in &rule.inputs {
                if !produced.contains(input.as_str()) && !external.contains(input) {
                    external.push(input.clone());
                }
            }
            produced.insert(rule.name.as_str());
        }
        external
    }
}

impl FromIterator<DerivedFeature> for DerivationRules {
    fn from_iter<T: IntoIterator<Item = DerivedFeature>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Apply every rule in order, writing each output into the record
pub fn derive(record: &mut RawRecord, rules: &DerivationRules) -> Result<(), FeatureError> {
    for rule in rules.iter() {
        let value = rule.evaluate(record)?;
        if let Some(previous) = record.insert(rule.name.clone(), value) {
            debug!("Derived {} replaced supplied value {}", rule.name, previous);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn sum_rules() -> DerivationRules {
        DerivationRules::new()
            .with(DerivedFeature::new("ab", ["a", "b"], |x| x[0] + x[1]))
            .with(DerivedFeature::new("ab_doubled", ["ab"], |x| x[0] * 2.0))
    }

    #[test]
    fn test_rules_see_earlier_outputs() {
        let mut record: RawRecord = [("a", 1.0), ("b", 2.0)].into_iter().collect();
        derive(&mut record, &sum_rules()).unwrap();

        assert_eq!(record.get("ab"), Some(&FieldValue::Number(3.0)));
        assert_eq!(record.get("ab_doubled"), Some(&FieldValue::Number(6.0)));
    }

    #[test]
    fn test_missing_input_is_derivation_error() {
        let mut record: RawRecord = [("a", 1.0)].into_iter().collect();
        let err = derive(&mut record, &sum_rules()).unwrap_err();

        assert_eq!(
            err,
            FeatureError::Derivation {
                feature: "ab".to_string(),
                reason: "input b is absent".to_string(),
            }
        );
    }

    #[test]
    fn test_non_finite_result_is_rejected() {
        let rules = DerivationRules::new().with(DerivedFeature::new("ratio", ["a", "b"], |x| x[0] / x[1]));
        let mut record: RawRecord = [("a", 1.0), ("b", 0.0)].into_iter().collect();

        let err = derive(&mut record, &rules).unwrap_err();
        assert!(matches!(err, FeatureError::Derivation { .. }));
        assert!(!record.contains("ratio"));
    }

    #[test]
    fn test_derived_value_overrides_supplied_one() {
        let mut record: RawRecord = [("a", 1.0), ("b", 2.0), ("ab", 99.0)].into_iter().collect();
        derive(&mut record, &sum_rules()).unwrap();
        assert_eq!(record.get("ab"), Some(&FieldValue::Number(3.0)));
    }

    #[test]
    fn test_external_inputs_skip_produced_fields() {
        assert_eq!(sum_rules().external_inputs(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let base: RawRecord = [("a", 0.1), ("b", 0.2)].into_iter().collect();
        let mut first = base.clone();
        let mut second = base;
        derive(&mut first, &sum_rules()).unwrap();
        derive(&mut second, &sum_rules()).unwrap();
        assert_eq!(first, second);
    }
}
