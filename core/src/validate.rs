//! Boundary validation for configuration documents.
//!
//! Two layers: [`webhook_gate`] is the blocking pre-save check (the only
//! validation that stops a save before it reaches the network), and
//! [`validate_bundle`] is the full diagnostic sweep that surfaces dangling
//! references and invariant drift without blocking edits.

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::bundle::ConfigBundle;
use crate::error::{Diagnostic, codes};
use crate::forms::{Form, FormMode, FormsConfig};
use crate::tools::{ToolName, ToolsConfig};

/// A save blocked locally, before any network call. Carries the *name* of
/// the offending form, matching what the editing surface reports.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SaveBlocked {
    #[error("Submission webhook URL required for form: {0}")]
    MissingWebhook(String),
    #[error("Submission webhook URL must be a valid URL for form: {0}")]
    InvalidWebhook(String),
}

/// Every submission form must carry a syntactically valid webhook URL.
/// Fails on the first offending form; runs before any document is written.
pub fn webhook_gate(forms: &FormsConfig) -> Result<(), SaveBlocked> {
    if let Some(form) = forms
        .forms
        .iter()
        .find(|f| f.submission_url.as_deref().unwrap_or("").trim().is_empty())
    {
        return Err(SaveBlocked::MissingWebhook(form.name.clone()));
    }
    if let Some(form) = forms.forms.iter().find(|f| {
        f.submission_url
            .as_deref()
            .is_some_and(|u| Url::parse(u).is_err())
    }) {
        return Err(SaveBlocked::InvalidWebhook(form.name.clone()));
    }
    Ok(())
}

/// Full consistency sweep over one bundle. Errors are conditions the runtime
/// cannot execute correctly; warnings are drift the editing surface tolerates
/// (dangling tool/field references are deliberately left in place by the
/// editing rules and reported here instead).
pub fn validate_bundle(bundle: &ConfigBundle) -> Vec<Diagnostic> {
    let mut findings = validate_forms(&bundle.forms, &bundle.tools);

    if bundle.knowledge.max_agentic_passes < 1 {
        findings.push(Diagnostic::error(
            codes::INVALID_RETRIEVAL_PASSES,
            "max_agentic_passes must be at least 1",
        ));
    }

    findings
}

/// Consistency sweep over the forms document alone.
pub fn validate_forms(forms: &FormsConfig, tools: &ToolsConfig) -> Vec<Diagnostic> {
    let mut findings = Vec::new();

    for form in &forms.forms {
        check_webhook(form, &mut findings);
        check_field_order(form, &mut findings);
        check_mode(form, &mut findings);
        check_tool_references(form, tools, &mut findings);
        check_validator_references(form, &mut findings);
    }

    for intent in &forms.intents {
        if forms.form_by_id(&intent.target_form).is_none() {
            findings.push(
                Diagnostic::error(
                    codes::DANGLING_INTENT_TARGET,
                    format!(
                        "intent '{}' targets unknown form '{}'",
                        intent.name, intent.target_form
                    ),
                )
                .with_form(intent.target_form.clone()),
            );
        }
    }

    findings
}

fn check_webhook(form: &Form, findings: &mut Vec<Diagnostic>) {
    match form.submission_url.as_deref().map(str::trim) {
        None | Some("") => findings.push(
            Diagnostic::error(
                codes::MISSING_WEBHOOK,
                format!("form '{}' has no submission webhook URL", form.name),
            )
            .with_form(form.id.clone()),
        ),
        Some(raw) => {
            if Url::parse(raw).is_err() {
                findings.push(
                    Diagnostic::error(
                        codes::INVALID_WEBHOOK,
                        format!("form '{}' has an invalid submission webhook URL", form.name),
                    )
                    .with_form(form.id.clone()),
                );
            }
        }
    }
}

fn check_field_order(form: &Form, findings: &mut Vec<Diagnostic>) {
    let mut field_names = HashSet::new();
    for field in &form.fields {
        if !field_names.insert(field.name.clone()) {
            findings.push(
                Diagnostic::error(
                    codes::DUPLICATE_FIELD_NAME,
                    format!("form '{}' declares field '{}' twice", form.name, field.name),
                )
                .with_form(form.id.clone())
                .with_field(field.name.clone()),
            );
        }
    }

    let mut ordered = HashSet::new();
    for name in &form.field_order {
        if !ordered.insert(name.clone()) {
            findings.push(
                Diagnostic::error(
                    codes::ORDER_MISMATCH,
                    format!("form '{}' orders field '{}' twice", form.name, name),
                )
                .with_form(form.id.clone())
                .with_field(name.clone()),
            );
        }
        if !field_names.contains(name) {
            findings.push(
                Diagnostic::error(
                    codes::ORDER_MISMATCH,
                    format!("form '{}' orders unknown field '{}'", form.name, name),
                )
                .with_form(form.id.clone())
                .with_field(name.clone()),
            );
        }
    }
    for name in &field_names {
        if !ordered.contains(name) {
            findings.push(
                Diagnostic::error(
                    codes::ORDER_MISMATCH,
                    format!("form '{}' never orders field '{}'", form.name, name),
                )
                .with_form(form.id.clone())
                .with_field(name.clone()),
            );
        }
    }
}

fn check_mode(form: &Form, findings: &mut Vec<Diagnostic>) {
    if form.mode != FormMode::StepByStep && form.has_selection_field() {
        findings.push(
            Diagnostic::error(
                codes::MODE_CONFLICT,
                format!(
                    "form '{}' has dropdown fields but is not step-by-step",
                    form.name
                ),
            )
            .with_form(form.id.clone()),
        );
    }
}

fn check_tool_references(form: &Form, tools: &ToolsConfig, findings: &mut Vec<Diagnostic>) {
    let mut report = |tool: &ToolName, field: &crate::forms::Field| {
        if tools.by_name(tool).is_none() {
            findings.push(
                Diagnostic::warning(
                    codes::DANGLING_TOOL_REFERENCE,
                    format!(
                        "field '{}' on form '{}' references unknown tool '{}'",
                        field.name, form.name, tool
                    ),
                )
                .with_form(form.id.clone())
                .with_field(field.name.clone()),
            );
        }
    };

    for field in &form.fields {
        if let Some(tool) = &field.dropdown_tool {
            report(tool, field);
        }
        if let Some(tool) = field.dropdown_tool_config.as_ref().and_then(|b| b.tool_name()) {
            report(tool, field);
        }
        if let Some(tool) = field.tool_hook.as_ref().and_then(|b| b.tool_name()) {
            report(tool, field);
        }
    }

    // Stale input_map keys after a field rename: flagged, never rewritten.
    for field in &form.fields {
        let bindings = field
            .dropdown_tool_config
            .iter()
            .chain(field.tool_hook.iter());
        for binding in bindings {
            for key in binding.input_map.keys() {
                if key.starts_with('$') || key.contains('.') {
                    continue;
                }
                if !form.has_field(key) {
                    findings.push(
                        Diagnostic::warning(
                            codes::DANGLING_FIELD_REFERENCE,
                            format!(
                                "tool binding on field '{}' maps unknown field '{}'",
                                field.name, key
                            ),
                        )
                        .with_form(form.id.clone())
                        .with_field(field.name.clone()),
                    );
                }
            }
        }
    }

    for field in &form.fields {
        for pattern in field
            .pattern
            .iter()
            .chain(field.constraints.iter().filter_map(|c| c.regex.as_ref()))
        {
            if regex::Regex::new(pattern).is_err() {
                findings.push(
                    Diagnostic::error(
                        codes::INVALID_PATTERN,
                        format!(
                            "field '{}' on form '{}' has an invalid pattern",
                            field.name, form.name
                        ),
                    )
                    .with_form(form.id.clone())
                    .with_field(field.name.clone()),
                );
            }
        }
    }
}

fn check_validator_references(form: &Form, findings: &mut Vec<Diagnostic>) {
    for validator in &form.validators {
        for condition in &validator.conditions {
            if !form.has_field(condition.field.as_str()) {
                findings.push(
                    Diagnostic::warning(
                        codes::DANGLING_FIELD_REFERENCE,
                        format!(
                            "validator '{}' on form '{}' references unknown field '{}'",
                            validator.name, form.name, condition.field
                        ),
                    )
                    .with_form(form.id.clone())
                    .with_field(condition.field.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SaveBlocked, validate_forms, webhook_gate};
    use crate::error::codes;
    use crate::forms::{Field, FieldType, Form, FormMode, FormsConfig, Intent};
    use crate::rules::rename_field;
    use crate::tools::{ToolBinding, ToolsConfig};

    fn valid_form(id: &str) -> Form {
        let mut form = Form::new(id.into(), id.to_uppercase());
        form.submission_url = Some("https://example.com/hook".to_string());
        form.fields.push(Field::new("email".into(), "Email"));
        form.field_order.push("email".into());
        form
    }

    fn catalog(forms: Vec<Form>) -> FormsConfig {
        FormsConfig {
            intents: Vec::new(),
            forms,
        }
    }

    #[test]
    fn webhook_gate_passes_valid_urls() {
        assert_eq!(webhook_gate(&catalog(vec![valid_form("a")])), Ok(()));
    }

    #[test]
    fn webhook_gate_names_the_form_missing_a_url() {
        let mut form = valid_form("a");
        form.submission_url = None;
        form.name = "Order pizza".to_string();
        assert_eq!(
            webhook_gate(&catalog(vec![form])),
            Err(SaveBlocked::MissingWebhook("Order pizza".to_string()))
        );
    }

    #[test]
    fn webhook_gate_rejects_unparseable_urls() {
        let mut form = valid_form("a");
        form.submission_url = Some("not a url".to_string());
        let err = webhook_gate(&catalog(vec![form])).unwrap_err();
        assert!(matches!(err, SaveBlocked::InvalidWebhook(name) if name == "A"));
    }

    #[test]
    fn blank_url_counts_as_missing_not_invalid() {
        let mut form = valid_form("a");
        form.submission_url = Some("   ".to_string());
        assert!(matches!(
            webhook_gate(&catalog(vec![form])),
            Err(SaveBlocked::MissingWebhook(_))
        ));
    }

    #[test]
    fn clean_catalog_produces_no_findings() {
        let findings = validate_forms(&catalog(vec![valid_form("a")]), &ToolsConfig::default());
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn order_mismatch_is_reported_both_ways() {
        let mut form = valid_form("a");
        form.field_order.push("ghost".into());
        form.fields.push(Field::new("unordered".into(), "Unordered"));
        let findings = validate_forms(&catalog(vec![form]), &ToolsConfig::default());
        let codes_seen: Vec<_> = findings.iter().map(|d| d.code).collect();
        assert_eq!(codes_seen, [codes::ORDER_MISMATCH, codes::ORDER_MISMATCH]);
    }

    #[test]
    fn one_shot_with_dropdown_is_a_mode_conflict() {
        let mut form = valid_form("a");
        form.fields[0].field_type = FieldType::Dropdown;
        form.mode = FormMode::OneShot;
        let findings = validate_forms(&catalog(vec![form]), &ToolsConfig::default());
        assert!(findings.iter().any(|d| d.code == codes::MODE_CONFLICT));
    }

    #[test]
    fn dangling_intent_target_is_an_error() {
        let mut cfg = catalog(vec![valid_form("a")]);
        cfg.intents.push(Intent {
            id: "route".into(),
            name: "Route".to_string(),
            description: String::new(),
            target_form: "ghost".into(),
        });
        let findings = validate_forms(&cfg, &ToolsConfig::default());
        assert!(
            findings
                .iter()
                .any(|d| d.code == codes::DANGLING_INTENT_TARGET && d.is_error())
        );
    }

    #[test]
    fn unknown_tool_reference_is_a_warning_not_an_error() {
        let mut form = valid_form("a");
        form.fields[0].dropdown_tool = Some("ghost_tool".into());
        let findings = validate_forms(&catalog(vec![form]), &ToolsConfig::default());
        let finding = findings
            .iter()
            .find(|d| d.code == codes::DANGLING_TOOL_REFERENCE)
            .unwrap();
        assert!(!finding.is_error());
    }

    #[test]
    fn rename_leaves_stale_binding_key_flagged_not_fixed() {
        let mut form = valid_form("a");
        let mut binding = ToolBinding::default();
        binding
            .input_map
            .insert("email".to_string(), serde_json::json!("$.value"));
        form.fields[0].tool_hook = Some(binding);

        rename_field(&mut form, "email", "contact_email").unwrap();

        let hook = form.fields[0].tool_hook.as_ref().unwrap();
        assert!(hook.input_map.contains_key("email"), "binding key must stay stale");

        let findings = validate_forms(&catalog(vec![form]), &ToolsConfig::default());
        assert!(
            findings
                .iter()
                .any(|d| d.code == codes::DANGLING_FIELD_REFERENCE)
        );
    }

    #[test]
    fn invalid_regex_pattern_is_an_error() {
        let mut form = valid_form("a");
        form.fields[0].pattern = Some("[unclosed".to_string());
        let findings = validate_forms(&catalog(vec![form]), &ToolsConfig::default());
        assert!(findings.iter().any(|d| d.code == codes::INVALID_PATTERN));
    }
}
