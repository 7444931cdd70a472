//! HTML rendering for the demo forms
//!
//! One minijinja template serves both demos. The `.html` name turns on
//! HTML auto-escaping for every interpolated value.

use crate::demos::{format_number, DemoDefinition, FieldInput, FormField};
use crate::error::ApiError;
use minijinja::Environment;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const FORM_TEMPLATE_NAME: &str = "form.html";
const FORM_TEMPLATE: &str = include_str!("../../templates/form.html");

static TEMPLATES: OnceLock<Result<Environment<'static>, String>> = OnceLock::new();

fn templates() -> Result<&'static Environment<'static>, ApiError> {
    TEMPLATES
        .get_or_init(|| {
            let mut env = Environment::new();
            env.add_template(FORM_TEMPLATE_NAME, FORM_TEMPLATE)
                .map_err(|e| e.to_string())?;
            Ok(env)
        })
        .as_ref()
        .map_err(|e| ApiError::Render(e.clone()))
}

/// Which backend a form submission is scored by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Local,
    Api,
}

impl FormMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormMode::Local => "local",
            FormMode::Api => "api",
        }
    }
}

/// Message shown above the form
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(String),
    Failure(String),
}

#[derive(Debug, Serialize)]
struct OutcomeView<'a> {
    class: &'static str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ModeView {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct OptionView {
    label: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct FieldView {
    param: String,
    label: &'static str,
    help: &'static str,
    select: bool,
    options: Vec<OptionView>,
    min: String,
    max: String,
    step: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    title: &'static str,
    demo: &'static str,
    outcome: Option<OutcomeView<'a>>,
    modes: Vec<ModeView>,
    fields: Vec<FieldView>,
}

fn field_view(field: &FormField, submitted: &HashMap<String, String>) -> FieldView {
    let param = field.param();
    let value = submitted.get(&param).cloned().unwrap_or_else(|| field.default_value());

    match field.input {
        FieldInput::Number { min, max, step, .. } => FieldView {
            param,
            label: field.label,
            help: field.help,
            select: false,
            options: Vec::new(),
            min: format_number(min),
            max: format_number(max),
            step: format_number(step),
            value,
        },
        FieldInput::Select { options } => FieldView {
            param,
            label: field.label,
            help: field.help,
            select: true,
            options: options
                .iter()
                .map(|(label, _)| OptionView {
                    label: *label,
                    selected: *label == value,
                })
                .collect(),
            min: String::new(),
            max: String::new(),
            step: String::new(),
            value,
        },
    }
}

/// Full form page, refilled with the submitted values
pub fn render_page(
    definition: &DemoDefinition,
    submitted: &HashMap<String, String>,
    mode: FormMode,
    outcome: Option<&Outcome>,
) -> Result<String, ApiError> {
    let modes = if definition.remote_mode {
        [(FormMode::Local, "Local model"), (FormMode::Api, "Call API")]
            .into_iter()
            .map(|(value, label)| ModeView {
                value: value.as_str(),
                label,
                selected: value == mode,
            })
            .collect()
    } else {
        Vec::new()
    };

    let page = PageView {
        title: definition.title,
        demo: definition.kind.as_str(),
        outcome: outcome.map(|outcome| match outcome {
            Outcome::Success(message) => OutcomeView {
                class: "success",
                message,
            },
            Outcome::Failure(message) => OutcomeView {
                class: "error",
                message,
            },
        }),
        modes,
        fields: definition.fields.iter().map(|field| field_view(field, submitted)).collect(),
    };

    templates()?
        .get_template(FORM_TEMPLATE_NAME)
        .and_then(|template| template.render(&page))
        .map_err(|e| ApiError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::DemoKind;

    #[test]
    fn test_defaults_rendered() {
        let page = render_page(
            &DemoDefinition::for_kind(DemoKind::Heart),
            &HashMap::new(),
            FormMode::Local,
            None,
        )
        .unwrap();
        assert!(page.contains("name=\"age\""));
        assert!(page.contains("value=\"55\""));
        assert!(page.contains("step=\"0.1\""));
        assert!(page.contains("name=\"sex_label\""));
        assert!(page.contains("<option selected>Male</option>"));
        assert!(page.contains("<option value=\"local\" selected>Local model</option>"));
        assert!(!page.contains("class=\"success\""));
    }

    #[test]
    fn test_submitted_values_are_escaped() {
        let submitted = HashMap::from([("Cycle_Time".to_string(), "<20>\"&".to_string())]);
        let page = render_page(
            &DemoDefinition::for_kind(DemoKind::Manufacturing),
            &submitted,
            FormMode::Local,
            Some(&Outcome::Failure("<script>bad</script>".to_string())),
        )
        .unwrap();
        assert!(page.contains("value=\"&lt;20&gt;&quot;&amp;\""));
        assert!(page.contains("<p class=\"error\">&lt;script&gt;"));
        assert!(!page.contains("<script>"));
        assert!(!page.contains("name=\"mode\""));
    }

    #[test]
    fn test_submitted_select_is_kept() {
        let submitted = HashMap::from([("thalassemia_label".to_string(), "Fixed defect (6)".to_string())]);
        let page = render_page(
            &DemoDefinition::for_kind(DemoKind::Heart),
            &submitted,
            FormMode::Api,
            Some(&Outcome::Success("Prediction: 1".to_string())),
        )
        .unwrap();
        assert!(page.contains("<option selected>Fixed defect (6)</option>"));
        assert!(page.contains("<option>Normal (3)</option>"));
        assert!(page.contains("<option value=\"api\" selected>Call API</option>"));
        assert!(page.contains("<p class=\"success\">Prediction: 1</p>"));
    }
}
