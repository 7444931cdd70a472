//! Heart Disease Classification
//!
//! Categorical clinical measurements are chosen by label in the form and
//! encoded to the integer codes of the training data.

use super::{FieldInput, FormField};

const YES_NO: &[(&str, f64)] = &[("No (0)", 0.0), ("Yes (1)", 1.0)];

pub const FIELDS: &[FormField] = &[
    FormField {
        name: "age",
        label: "Age (years)",
        help: "Patient age in years. Older age increases cardiovascular risk.",
        input: FieldInput::Number {
            min: 1.0,
            max: 100.0,
            step: 1.0,
            default: 55.0,
        },
    },
    FormField {
        name: "sex",
        label: "Sex",
        help: "Male = 1, Female = 0.",
        input: FieldInput::Select {
            options: &[("Male", 1.0), ("Female", 0.0)],
        },
    },
    FormField {
        name: "chest_pain_type",
        label: "Chest pain type",
        help: "1 = typical, 2 = atypical, 3 = non-anginal, 4 = asymptomatic.",
        input: FieldInput::Select {
            options: &[
                ("Typical angina (1)", 1.0),
                ("Atypical angina (2)", 2.0),
                ("Non-anginal pain (3)", 3.0),
                ("Asymptomatic (4)", 4.0),
            ],
        },
    },
    FormField {
        name: "resting_blood_pressure",
        label: "Resting BP (mm Hg)",
        help: "Systolic blood pressure measured at rest. Hypertension is typically above 130-140 mm Hg.",
        input: FieldInput::Number {
            min: 80.0,
            max: 220.0,
            step: 1.0,
            default: 120.0,
        },
    },
    FormField {
        name: "cholesterol",
        label: "Serum cholesterol (mg/dl)",
        help: "Normal is around 125-200 mg/dl; higher values increase risk.",
        input: FieldInput::Number {
            min: 100.0,
            max: 600.0,
            step: 1.0,
            default: 200.0,
        },
    },
    FormField {
        name: "fasting_blood_sugar",
        label: "Fasting blood sugar >120 mg/dl?",
        help: "1 = above 120 mg/dl, 0 = at or below.",
        input: FieldInput::Select { options: YES_NO },
    },
    FormField {
        name: "resting_ecg",
        label: "Resting ECG result",
        help: "0 = normal, 1 = ST-T abnormality, 2 = LV hypertrophy.",
        input: FieldInput::Select {
            options: &[
                ("Normal (0)", 0.0),
                ("ST-T wave abnormality (1)", 1.0),
                ("Left ventricular hypertrophy (2)", 2.0),
            ],
        },
    },
    FormField {
        name: "max_heart_rate",
        label: "Maximum heart rate achieved (bpm)",
        help: "Max heart rate during the exercise test.",
        input: FieldInput::Number {
            min: 60.0,
            max: 220.0,
            step: 1.0,
            default: 150.0,
        },
    },
    FormField {
        name: "exercise_induced_angina",
        label: "Exercise-induced angina?",
        help: "1 = angina during exercise, 0 = none.",
        input: FieldInput::Select { options: YES_NO },
    },
    FormField {
        name: "st_depression",
        label: "ST depression induced by exercise relative to rest",
        help: "ST depression in mm (0.0-6.0); larger values are often worse.",
        input: FieldInput::Number {
            min: 0.0,
            max: 6.0,
            step: 0.1,
            default: 1.0,
        },
    },
    FormField {
        name: "st_slope",
        label: "Slope of the ST segment at peak exercise",
        help: "1 = upsloping, 2 = flat, 3 = downsloping.",
        input: FieldInput::Select {
            options: &[("Upsloping (1)", 1.0), ("Flat (2)", 2.0), ("Downsloping (3)", 3.0)],
        },
    },
    FormField {
        name: "num_major_vessels",
        label: "Number of major vessels colored by fluoroscopy",
        help: "0-3; more vessels may indicate more severe disease.",
        input: FieldInput::Number {
            min: 0.0,
            max: 3.0,
            step: 1.0,
            default: 0.0,
        },
    },
    FormField {
        name: "thalassemia",
        label: "Thalassemia result",
        help: "3 = normal, 6 = fixed defect, 7 = reversible defect.",
        input: FieldInput::Select {
            options: &[("Normal (3)", 3.0), ("Fixed defect (6)", 6.0), ("Reversible defect (7)", 7.0)],
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::{DemoDefinition, DemoKind};
    use feature_engine::RawRecord;

    #[test]
    fn test_sex_label_encoding() {
        let encoders = DemoDefinition::for_kind(DemoKind::Heart).encoders();

        let mut male: RawRecord = [("sex_label", "Male")].into_iter().collect();
        encoders.encode(&mut male).unwrap();
        assert_eq!(male.number("sex").unwrap().unwrap(), 1.0);

        let mut female: RawRecord = [("sex_label", "Female")].into_iter().collect();
        encoders.encode(&mut female).unwrap();
        assert_eq!(female.number("sex").unwrap().unwrap(), 0.0);
    }

    #[test]
    fn test_form_covers_bundled_feature_order() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../artifacts/heart/feature_order.json");
        let schema = feature_engine::FeatureSchema::load(path).unwrap();
        assert_eq!(schema.len(), FIELDS.len());
        for field in FIELDS {
            assert!(schema.contains(field.name), "{} not in feature order", field.name);
        }
    }

    #[test]
    fn test_defaults_within_bounds() {
        let validator = DemoDefinition::for_kind(DemoKind::Heart).validator();
        let record: RawRecord = FIELDS
            .iter()
            .filter(|f| matches!(f.input, FieldInput::Number { .. }))
            .map(|f| (f.name, f.default_value()))
            .collect();
        assert!(validator.validate(&record).valid);
    }
}
