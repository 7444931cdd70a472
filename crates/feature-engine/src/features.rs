//! Feature Vector Assembly

use crate::derived::{derive, DerivationRules};
use crate::record::RawRecord;
use crate::schema::FeatureSchema;
use crate::FeatureError;
use serde::{Serialize, Serializer};
use tracing::debug;

/// Ordered numeric input for a model call, one value per schema feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a single feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }

    /// Pair every value with its feature name, in schema order
    pub fn to_named(&self) -> Vec<(&str, f64)> {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
            .collect()
    }

    /// Record holding exactly the schema features, e.g. for forwarding
    pub fn to_record(&self) -> RawRecord {
        self.to_named().into_iter().collect()
    }
}

impl Serialize for FeatureVector {
    /// Serializes as a JSON object keyed by feature name
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.to_named() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Check that every required name is present, reporting all absent ones
pub fn validate<S: AsRef<str>>(record: &RawRecord, required: &[S]) -> Result<(), FeatureError> {
    let missing: Vec<String> = required
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !record.contains(name))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FeatureError::MissingFields(missing))
    }
}

/// Build the vector by walking the schema in order
pub fn assemble(record: &RawRecord, schema: &FeatureSchema) -> Result<FeatureVector, FeatureError> {
    let mut values = Vec::with_capacity(schema.len());
    for name in schema.names() {
        let value = record
            .number(name)
            .ok_or_else(|| FeatureError::MissingFields(vec![name.clone()]))??;
        values.push(value);
    }

    Ok(FeatureVector {
        schema: schema.clone(),
        values,
    })
}

/// Schema plus derived-feature rules for one deployed model
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    schema: FeatureSchema,
    rules: DerivationRules,
    required: Vec<String>,
}

impl FeatureAssembler {
    /// Create an assembler for a schema with no derived features
    pub fn new(schema: FeatureSchema) -> Self {
        Self::with_rules(schema, DerivationRules::new())
    }

    /// Create an assembler that derives features before assembly
    pub fn with_rules(schema: FeatureSchema, rules: DerivationRules) -> Self {
        let mut required: Vec<String> = schema
            .names()
            .iter()
            .filter(|name| !rules.produces(name))
            .cloned()
            .collect();
        for input in rules.external_inputs() {
            if !required.contains(&input) {
                required.push(input);
            }
        }

        debug!(
            "Feature assembler: {} features, {} derived, {} required inputs",
            schema.len(),
            rules.len(),
            required.len()
        );

        Self { schema, rules, required }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rules(&self) -> &DerivationRules {
        &self.rules
    }

    /// Fields the caller has to supply
    pub fn required_inputs(&self) -> &[String] {
        &self.required
    }

    /// Validate, derive, then assemble. Nothing is returned unless all three succeed.
    pub fn assemble_record(&self, mut record: RawRecord) -> Result<FeatureVector, FeatureError> {
        validate(&record, &self.required)?;
        derive(&mut record, &self.rules)?;
        assemble(&record, &self.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::DerivedFeature;
    use crate::record::FieldValue;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(["age", "sex", "cholesterol"]).unwrap()
    }

    #[test]
    fn test_assemble_follows_schema_not_record() {
        let record: RawRecord = [("cholesterol", 240.0), ("age", 61.0), ("sex", 1.0)]
            .into_iter()
            .collect();

        let vector = assemble(&record, &schema()).unwrap();
        assert_eq!(vector.values(), &[61.0, 1.0, 240.0]);
        assert_eq!(vector.get("cholesterol"), Some(240.0));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let record: RawRecord = [("age", 61.0), ("sex", 0.0), ("cholesterol", 180.0), ("notes", 7.0)]
            .into_iter()
            .collect();
        assert_eq!(assemble(&record, &schema()).unwrap().len(), 3);
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let record: RawRecord = [("sex", 1.0)].into_iter().collect();
        let err = validate(&record, schema().names()).unwrap_err();
        assert_eq!(
            err,
            FeatureError::MissingFields(vec!["age".to_string(), "cholesterol".to_string()])
        );
    }

    #[test]
    fn test_missing_cholesterol_only() {
        let record: RawRecord = [("age", 50.0), ("sex", 1.0)].into_iter().collect();
        let err = validate(&record, schema().names()).unwrap_err();
        assert_eq!(err, FeatureError::MissingFields(vec!["cholesterol".to_string()]));
    }

    #[test]
    fn test_non_numeric_value_fails_assembly() {
        let mut record: RawRecord = [("age", 50.0), ("sex", 1.0)].into_iter().collect();
        record.insert("cholesterol", FieldValue::Unsupported("[200]".to_string()));

        let err = assemble(&record, &schema()).unwrap_err();
        assert!(matches!(err, FeatureError::TypeConversion { ref field, .. } if field == "cholesterol"));
    }

    #[test]
    fn test_assembler_requires_raw_inputs_not_derived_outputs() {
        let schema = FeatureSchema::new(["a", "b", "a_plus_b"]).unwrap();
        let rules = DerivationRules::new().with(DerivedFeature::new("a_plus_b", ["a", "b"], |x| x[0] + x[1]));
        let assembler = FeatureAssembler::with_rules(schema, rules);

        assert_eq!(assembler.required_inputs(), &["a", "b"]);

        let record: RawRecord = [("a", 2.0), ("b", 3.0)].into_iter().collect();
        let vector = assembler.assemble_record(record).unwrap();
        assert_eq!(vector.values(), &[2.0, 3.0, 5.0]);
    }

    #[test]
    fn test_assembler_requires_rule_inputs_outside_schema() {
        let schema = FeatureSchema::new(["ratio"]).unwrap();
        let rules = DerivationRules::new().with(DerivedFeature::new("ratio", ["num", "den"], |x| x[0] / x[1]));
        let assembler = FeatureAssembler::with_rules(schema, rules);

        let err = assembler.assemble_record(RawRecord::new()).unwrap_err();
        assert_eq!(
            err,
            FeatureError::MissingFields(vec!["num".to_string(), "den".to_string()])
        );
    }

    #[test]
    fn test_round_trip_to_named() {
        let record: RawRecord = [("age", 44.0), ("sex", 0.0), ("cholesterol", 199.0)]
            .into_iter()
            .collect();
        let vector = assemble(&record, &schema()).unwrap();

        assert_eq!(vector.to_record(), record);
        assert_eq!(
            vector.to_named(),
            vec![("age", 44.0), ("sex", 0.0), ("cholesterol", 199.0)]
        );
    }

    #[test]
    fn test_vector_serializes_in_schema_order() {
        let record: RawRecord = [("cholesterol", 199.0), ("sex", 0.0), ("age", 44.0)]
            .into_iter()
            .collect();
        let vector = assemble(&record, &schema()).unwrap();
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(json, r#"{"age":44.0,"sex":0.0,"cholesterol":199.0}"#);
    }
}
