//! Projection of runtime-reported conversation state onto the local form
//! catalog.
//!
//! The external runtime owns the dialogue state machine; after every chat
//! turn it reports where the conversation stands. These pure functions decide
//! what the preview surface should render next — nothing here mutates state
//! or advances the conversation, and the only degradation mode is "no active
//! field" (free-text input).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::forms::{Field, FieldName, FieldType, FormId, FormMode, FormsConfig};

/// The external runtime's record of which form/step/field a conversation
/// thread is currently waiting on. Read-only here; discarded on thread reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_form_id: Option<FormId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awaiting_field: Option<bool>,
    /// Per-field dynamic options reported by the runtime (tool-sourced
    /// values, refreshed each turn).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_options: HashMap<FieldName, Vec<String>>,
    /// Everything else the runtime includes (form_values, completed, ...).
    /// Carried through untouched for inspection surfaces.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// What the chat preview should render for the next user turn.
#[derive(Debug, Clone, PartialEq)]
pub enum InputControl<'a> {
    /// No active field: plain free-text input.
    FreeText,
    /// A selection control for a dropdown/enum field.
    Select {
        field: &'a Field,
        options: Vec<String>,
    },
    /// The fixed yes/no pair for a boolean field.
    YesNo { field: &'a Field },
}

/// Resolve the field the conversation is currently waiting on, if any.
///
/// Returns `None` ("no active field") whenever the state does not line up
/// with the local catalog: not awaiting input, unknown or one-shot form,
/// step index out of range, or an ordered name with no matching field
/// (stale config vs. runtime drift). Never an error.
pub fn current_field<'a>(state: &DialogueState, forms: &'a FormsConfig) -> Option<&'a Field> {
    if !state.awaiting_field.unwrap_or(false) {
        return None;
    }
    let form = forms.form_by_id(state.current_form_id.as_ref()?)?;
    if form.mode != FormMode::StepByStep {
        return None;
    }
    let idx = state.current_step_index.unwrap_or(0);
    let name = form.field_order.get(idx)?;
    form.field_by_name(name.as_str())
}

/// Options to offer for the resolved field.
///
/// Dropdown/enum fields get the union of runtime-reported dynamic options and
/// the field's static `dropdown_options`, de-duplicated, first-seen order,
/// dynamic first. Boolean fields get the fixed yes/no pair regardless of
/// runtime data. Everything else gets no options.
pub fn options_for(field: &Field, state: &DialogueState) -> Vec<String> {
    match field.field_type {
        FieldType::Boolean => vec!["yes".to_string(), "no".to_string()],
        FieldType::Dropdown | FieldType::Enum => {
            let mut merged: Vec<String> = Vec::new();
            let dynamic = state
                .field_options
                .get(field.name.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let fixed = field
                .dropdown_options
                .as_deref()
                .unwrap_or_default();
            for option in dynamic.iter().chain(fixed) {
                if !merged.iter().any(|seen| seen == option) {
                    merged.push(option.clone());
                }
            }
            merged
        }
        _ => Vec::new(),
    }
}

/// Combined projection: which control to render for the next turn.
///
/// Selecting an option becomes the literal outbound chat message; the step
/// index is never advanced locally — the next transition is authoritative
/// from the runtime's next response.
pub fn next_control<'a>(state: &DialogueState, forms: &'a FormsConfig) -> InputControl<'a> {
    let Some(field) = current_field(state, forms) else {
        return InputControl::FreeText;
    };
    match field.field_type {
        FieldType::Boolean => InputControl::YesNo { field },
        FieldType::Dropdown | FieldType::Enum => InputControl::Select {
            field,
            options: options_for(field, state),
        },
        _ => InputControl::FreeText,
    }
}

#[cfg(test)]
mod tests {
    use super::{DialogueState, InputControl, current_field, next_control, options_for};
    use crate::forms::{Field, FieldType, Form, FormMode, FormsConfig};

    fn catalog() -> FormsConfig {
        let mut form = Form::new("order".into(), "Order");
        let mut size = Field::new("size".into(), "Size");
        size.field_type = FieldType::Dropdown;
        size.dropdown_options = Some(vec!["b".to_string(), "c".to_string()]);
        let mut confirm = Field::new("confirm".into(), "Confirm");
        confirm.field_type = FieldType::Boolean;
        form.fields = vec![size, confirm, Field::new("notes".into(), "Notes")];
        form.field_order = vec!["size".into(), "confirm".into(), "notes".into()];
        FormsConfig {
            intents: Vec::new(),
            forms: vec![form],
        }
    }

    fn awaiting(step: Option<usize>) -> DialogueState {
        DialogueState {
            current_form_id: Some("order".into()),
            current_step_index: step,
            awaiting_field: Some(true),
            ..DialogueState::default()
        }
    }

    #[test]
    fn no_active_field_when_not_awaiting() {
        let forms = catalog();
        let mut state = awaiting(Some(0));
        state.awaiting_field = Some(false);
        assert!(current_field(&state, &forms).is_none());
        state.awaiting_field = None;
        assert!(current_field(&state, &forms).is_none());
    }

    #[test]
    fn no_active_field_when_form_is_unknown_or_absent() {
        let forms = catalog();
        let mut state = awaiting(Some(0));
        state.current_form_id = Some("ghost".into());
        assert!(current_field(&state, &forms).is_none());
        state.current_form_id = None;
        assert!(current_field(&state, &forms).is_none());
    }

    #[test]
    fn no_active_field_when_form_is_one_shot() {
        let mut forms = catalog();
        forms.forms[0].fields.retain(|f| f.field_type == FieldType::Text);
        forms.forms[0].field_order.retain(|n| n.as_str() == "notes");
        forms.forms[0].mode = FormMode::OneShot;
        assert!(current_field(&awaiting(Some(0)), &forms).is_none());
    }

    #[test]
    fn no_active_field_when_step_index_is_out_of_range() {
        let forms = catalog();
        assert!(current_field(&awaiting(Some(17)), &forms).is_none());
    }

    #[test]
    fn no_active_field_when_ordered_name_has_no_field() {
        let mut forms = catalog();
        forms.forms[0].field_order[0] = "stale".into();
        assert!(current_field(&awaiting(Some(0)), &forms).is_none());
    }

    #[test]
    fn missing_step_index_defaults_to_first_field() {
        let forms = catalog();
        let field = current_field(&awaiting(None), &forms).unwrap();
        assert_eq!(field.name.as_str(), "size");
    }

    #[test]
    fn options_merge_dynamic_first_with_dedup() {
        let forms = catalog();
        let mut state = awaiting(Some(0));
        state
            .field_options
            .insert("size".into(), vec!["a".to_string(), "b".to_string()]);
        let field = current_field(&state, &forms).unwrap();
        assert_eq!(options_for(field, &state), ["a", "b", "c"]);
    }

    #[test]
    fn options_fall_back_to_static_when_runtime_reports_none() {
        let forms = catalog();
        let state = awaiting(Some(0));
        let field = current_field(&state, &forms).unwrap();
        assert_eq!(options_for(field, &state), ["b", "c"]);
    }

    #[test]
    fn boolean_field_always_offers_yes_no() {
        let forms = catalog();
        let mut state = awaiting(Some(1));
        state
            .field_options
            .insert("confirm".into(), vec!["maybe".to_string()]);
        let field = current_field(&state, &forms).unwrap();
        assert_eq!(options_for(field, &state), ["yes", "no"]);
        assert!(matches!(next_control(&state, &forms), InputControl::YesNo { .. }));
    }

    #[test]
    fn text_field_projects_to_free_text() {
        let forms = catalog();
        let state = awaiting(Some(2));
        assert_eq!(next_control(&state, &forms), InputControl::FreeText);
    }

    #[test]
    fn state_round_trips_with_runtime_extras() {
        let raw = serde_json::json!({
            "current_form_id": "order",
            "current_step_index": 1,
            "awaiting_field": true,
            "field_options": {"size": ["small"]},
            "form_values": {"size": "small"},
            "completed": false
        });
        let state: DialogueState = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(state.current_step_index, Some(1));
        assert_eq!(state.extra["completed"], serde_json::json!(false));
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }
}
