//! Manufacturing Equipment Output
//!
//! Regression on injection-moulding machine settings, predicting parts per
//! hour. Four of the model's features are derived from the submitted ones.

use super::{FieldInput, FormField};
use feature_engine::{DerivationRules, DerivedFeature};

const fn number(name: &'static str, label: &'static str, min: f64, max: f64) -> FormField {
    FormField {
        name,
        label,
        help: "",
        input: FieldInput::Number {
            min,
            max,
            step: 0.01,
            default: min,
        },
    }
}

pub const FIELDS: &[FormField] = &[
    number("Injection_Temperature", "Injection Temperature (°C)", 180.0, 250.0),
    number("Injection_Pressure", "Injection Pressure (bar)", 80.0, 150.0),
    number("Cycle_Time", "Cycle Time (sec)", 15.0, 45.0),
    number("Cooling_Time", "Cooling Time (sec)", 8.0, 20.0),
    number("Material_Viscosity", "Material Viscosity (Pa·s)", 100.0, 400.0),
    number("Ambient_Temperature", "Ambient Temperature (°C)", 18.0, 28.0),
    number("Machine_Age", "Machine Age (years)", 1.0, 15.0),
    number("Operator_Experience", "Operator Experience (months)", 1.0, 120.0),
    number("Maintenance_Hours", "Maintenance Hours", 0.0, 200.0),
];

/// Hours in the maintenance window that utilization is measured against
const MAINTENANCE_WINDOW_HOURS: f64 = 200.0;

pub fn rules() -> DerivationRules {
    DerivationRules::new()
        .with(DerivedFeature::new(
            "Temperature_Pressure_Ratio",
            ["Injection_Temperature", "Injection_Pressure"],
            |v| v[0] / v[1],
        ))
        .with(DerivedFeature::new("Total_Cycle_Time", ["Cycle_Time", "Cooling_Time"], |v| v[0] + v[1]))
        .with(DerivedFeature::new(
            "Efficiency_Score",
            ["Operator_Experience", "Cycle_Time"],
            |v| v[0] / (v[1] + 1.0),
        ))
        .with(DerivedFeature::new("Machine_Utilization", ["Maintenance_Hours"], |v| {
            1.0 - v[0] / MAINTENANCE_WINDOW_HOURS
        }))
}
