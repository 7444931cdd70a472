//! Demo Definitions
//!
//! Each demo pairs a set of model artifacts with the form widgets, derived
//! features and label encodings that feed it.

pub mod heart;
pub mod manufacturing;

use crate::error::{ApiError, ServerError};
use crate::settings::DemoSettings;
use data_validator::{CategoricalEncoder, Encoders, FieldRange, Validator};
use feature_engine::{DerivationRules, FeatureAssembler, FeatureSchema};
use inference_engine::{load_model, load_scaler, InferenceEngine, Task};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// The two bundled predictors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoKind {
    Manufacturing,
    Heart,
}

impl DemoKind {
    pub const ALL: [DemoKind; 2] = [DemoKind::Manufacturing, DemoKind::Heart];

    pub fn as_str(&self) -> &'static str {
        match self {
            DemoKind::Manufacturing => "manufacturing",
            DemoKind::Heart => "heart",
        }
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemoKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manufacturing" => Ok(DemoKind::Manufacturing),
            "heart" => Ok(DemoKind::Heart),
            other => Err(ApiError::DemoUnavailable(other.to_string())),
        }
    }
}

/// How a form field is entered
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldInput {
    Number { min: f64, max: f64, step: f64, default: f64 },
    /// Submitted as `<name>_label` and encoded into `name`; the first option is the default
    Select { options: &'static [(&'static str, f64)] },
}

/// One input widget on a demo form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormField {
    /// Feature the field feeds
    pub name: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub input: FieldInput,
}

impl FormField {
    /// Name of the submitted form parameter
    pub fn param(&self) -> String {
        match self.input {
            FieldInput::Number { .. } => self.name.to_string(),
            FieldInput::Select { .. } => format!("{}_label", self.name),
        }
    }

    pub fn default_value(&self) -> String {
        match self.input {
            FieldInput::Number { default, .. } => format_number(default),
            FieldInput::Select { options } => options.first().map(|(label, _)| label.to_string()).unwrap_or_default(),
        }
    }
}

/// Render without a trailing `.0` for whole numbers
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Static description of a demo
#[derive(Debug, Clone)]
pub struct DemoDefinition {
    pub kind: DemoKind,
    pub title: &'static str,
    pub task: Task,
    /// Unit appended to regression results
    pub unit: Option<&'static str>,
    pub fields: &'static [FormField],
    /// Whether the form can forward to a remote prediction API
    pub remote_mode: bool,
    rules: fn() -> DerivationRules,
}

impl DemoDefinition {
    pub fn for_kind(kind: DemoKind) -> Self {
        match kind {
            DemoKind::Manufacturing => Self {
                kind,
                title: "Manufacturing Equipment Output Prediction",
                task: Task::Regression,
                unit: Some("parts/hour"),
                fields: manufacturing::FIELDS,
                remote_mode: false,
                rules: manufacturing::rules,
            },
            DemoKind::Heart => Self {
                kind,
                title: "Heart Disease Predictor",
                task: Task::Classification,
                unit: None,
                fields: heart::FIELDS,
                remote_mode: true,
                rules: DerivationRules::new,
            },
        }
    }

    pub fn rules(&self) -> DerivationRules {
        (self.rules)()
    }

    /// One encoder per select field
    pub fn encoders(&self) -> Encoders {
        self.fields.iter().fold(Encoders::new(), |encoders, field| match field.input {
            FieldInput::Select { options } => {
                encoders.with(CategoricalEncoder::new(field.param(), field.name, options.iter().copied()))
            }
            FieldInput::Number { .. } => encoders,
        })
    }

    /// Widget bounds for numeric fields
    pub fn validator(&self) -> Validator {
        Validator::new(
            self.fields
                .iter()
                .filter_map(|field| match field.input {
                    FieldInput::Number { min, max, .. } => Some(FieldRange::new(field.name, min, max)),
                    FieldInput::Select { .. } => None,
                })
                .collect(),
        )
    }
}

/// A demo with its artifacts loaded
#[derive(Debug)]
pub struct DemoService {
    pub definition: DemoDefinition,
    pub engine: InferenceEngine,
    pub validator: Validator,
}

impl DemoService {
    pub fn new(definition: DemoDefinition, engine: InferenceEngine) -> Self {
        let validator = definition.validator();
        Self {
            definition,
            engine,
            validator,
        }
    }

    /// Load schema, scaler and model from the configured paths
    pub fn load(kind: DemoKind, settings: &DemoSettings) -> Result<Self, ServerError> {
        let definition = DemoDefinition::for_kind(kind);
        let demo = kind.as_str();

        let schema = FeatureSchema::load(&settings.schema_path).map_err(|e| ServerError::demo(demo, e))?;
        let scaler = settings
            .scaler_path
            .as_ref()
            .map(load_scaler)
            .transpose()
            .map_err(|e| ServerError::demo(demo, e))?;
        let model = load_model(&settings.model_path, definition.task, schema.len()).map_err(|e| ServerError::demo(demo, e))?;

        let assembler = FeatureAssembler::with_rules(schema, definition.rules());
        let engine = InferenceEngine::new(demo, definition.encoders(), assembler, scaler, model)
            .map_err(|e| ServerError::demo(demo, e))?;

        info!(
            "Loaded {} demo: {} features, {} required inputs",
            demo,
            engine.assembler().schema().len(),
            engine.assembler().required_inputs().len()
        );
        Ok(Self::new(definition, engine))
    }

    pub fn kind(&self) -> DemoKind {
        self.definition.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_kind_parsing() {
        assert_eq!("heart".parse::<DemoKind>().unwrap(), DemoKind::Heart);
        assert_eq!("manufacturing".parse::<DemoKind>().unwrap(), DemoKind::Manufacturing);
        assert!(matches!("cars".parse::<DemoKind>(), Err(ApiError::DemoUnavailable(name)) if name == "cars"));
    }

    #[test]
    fn test_select_fields_become_encoders() {
        let definition = DemoDefinition::for_kind(DemoKind::Heart);
        let encoders = definition.encoders();
        let sex = encoders.for_target("sex").unwrap();
        assert_eq!(sex.source, "sex_label");
        assert_eq!(sex.code("Male"), Some(1.0));
        assert!(encoders.for_target("age").is_none());
    }

    #[test]
    fn test_numeric_fields_become_ranges() {
        let definition = DemoDefinition::for_kind(DemoKind::Manufacturing);
        let validator = definition.validator();
        assert_eq!(validator.ranges().len(), definition.fields.len());
        assert!(DemoDefinition::for_kind(DemoKind::Manufacturing).encoders().is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(55.0), "55");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_load_missing_artifacts_fails() {
        let settings = DemoSettings::from_dir("/nonexistent", "schema.json", "model.json", None);
        let err = DemoService::load(DemoKind::Heart, &settings).unwrap_err();
        assert!(err.to_string().contains("heart"));
    }
}
