//! Invariant-preserving editing operations for the form catalog.
//!
//! Every operation leaves `field_order` a permutation of `fields[].name`, and
//! never lets a form with dropdown/enum fields out of step-by-step mode.
//! Violations come back as [`RuleViolation`] with the form untouched.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use thiserror::Error;

use crate::forms::{Field, FieldName, FieldType, Form, FormId, FormMode, FormsConfig, Intent, IntentId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleViolation {
    #[error("form '{form}' has no field named '{field}'")]
    UnknownField { form: FormId, field: FieldName },
    #[error("form '{form}' already has a field named '{field}'")]
    DuplicateField { form: FormId, field: FieldName },
    #[error("field name must not be empty")]
    EmptyFieldName,
    #[error("dropdown fields require step-by-step mode")]
    SelectionRequiresStepByStep { form: FormId },
    #[error("no form with id '{0}'")]
    UnknownForm(FormId),
    #[error("no intent with id '{0}'")]
    UnknownIntent(IntentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
        })
    }
}

impl FromStr for MoveDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            other => Err(format!("unknown direction '{other}' (expected up or down)")),
        }
    }
}

fn unique_key(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let millis = Utc::now().timestamp_millis();
    let mut candidate = format!("{prefix}_{millis}");
    let mut suffix = 1;
    while taken(&candidate) {
        suffix += 1;
        candidate = format!("{prefix}_{millis}_{suffix}");
    }
    candidate
}

/// Append a fresh text field with a time-based unique key, registered in both
/// `fields` and `field_order`. Returns the generated key.
pub fn add_field(form: &mut Form) -> FieldName {
    let name = FieldName(unique_key("field", |candidate| form.has_field(candidate)));
    form.fields.push(Field::new(name.clone(), "New field"));
    form.field_order.push(name.clone());
    name
}

/// Rename a field and rewrite every occurrence in `field_order` in one step.
/// The form is left untouched on any error.
pub fn rename_field(form: &mut Form, old: &str, new: &str) -> Result<(), RuleViolation> {
    let new = new.trim();
    if new.is_empty() {
        return Err(RuleViolation::EmptyFieldName);
    }
    if !form.has_field(old) {
        return Err(RuleViolation::UnknownField {
            form: form.id.clone(),
            field: old.into(),
        });
    }
    if new != old && form.has_field(new) {
        return Err(RuleViolation::DuplicateField {
            form: form.id.clone(),
            field: new.into(),
        });
    }

    let renamed = FieldName::from(new);
    if let Some(field) = form.field_by_name_mut(old) {
        field.name = renamed.clone();
    }
    for entry in &mut form.field_order {
        if entry.as_str() == old {
            *entry = renamed.clone();
        }
    }
    Ok(())
}

/// Change a field's type. Switching to dropdown/enum forces the form into
/// step-by-step mode as a side effect; the reverse path is guarded by
/// [`set_mode`].
pub fn retype_field(form: &mut Form, name: &str, new_type: FieldType) -> Result<(), RuleViolation> {
    let form_id = form.id.clone();
    let field = form
        .field_by_name_mut(name)
        .ok_or(RuleViolation::UnknownField {
            form: form_id,
            field: name.into(),
        })?;
    field.field_type = new_type;
    if new_type.requires_step_by_step() {
        form.mode = FormMode::StepByStep;
    }
    Ok(())
}

/// Switch collection mode. Rejected while any dropdown/enum field remains:
/// the mode is forced back to step-by-step and the error carries the
/// blocking message. A hard guard, not a warning.
pub fn set_mode(form: &mut Form, mode: FormMode) -> Result<(), RuleViolation> {
    if mode != FormMode::StepByStep && form.has_selection_field() {
        form.mode = FormMode::StepByStep;
        return Err(RuleViolation::SelectionRequiresStepByStep {
            form: form.id.clone(),
        });
    }
    form.mode = mode;
    Ok(())
}

/// Swap a field with its neighbor in `field_order`. Silently ignored at
/// either boundary and for names not present in the order. Returns whether a
/// swap happened.
pub fn move_field(form: &mut Form, name: &str, direction: MoveDirection) -> bool {
    let Some(idx) = form.field_order.iter().position(|n| n.as_str() == name) else {
        return false;
    };
    let swap_with = match direction {
        MoveDirection::Up => {
            if idx == 0 {
                return false;
            }
            idx - 1
        }
        MoveDirection::Down => {
            if idx + 1 >= form.field_order.len() {
                return false;
            }
            idx + 1
        }
    };
    form.field_order.swap(idx, swap_with);
    true
}

/// Remove a field from both `fields` and `field_order`. Tool hooks and
/// validator conditions referencing the deleted field are left dangling on
/// purpose; validation reports them instead of silently rewriting them.
pub fn delete_field(form: &mut Form, name: &str) -> Result<(), RuleViolation> {
    if !form.has_field(name) {
        return Err(RuleViolation::UnknownField {
            form: form.id.clone(),
            field: name.into(),
        });
    }
    form.fields.retain(|f| f.name.as_str() != name);
    form.field_order.retain(|n| n.as_str() != name);
    Ok(())
}

/// Append an empty step-by-step form with a time-based unique id.
pub fn add_form(catalog: &mut FormsConfig) -> FormId {
    let id = FormId(unique_key("form", |candidate| {
        catalog.forms.iter().any(|f| f.id.as_str() == candidate)
    }));
    catalog.forms.push(Form::new(id.clone(), "New Form"));
    id
}

/// Outcome of a form deletion: how intent targets were kept consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormRemoval {
    /// Intents re-pointed at the first remaining form.
    pub retargeted_intents: usize,
    /// Intents left dangling because no form remains. Validation flags them.
    pub orphaned_intents: usize,
}

/// Delete a form and retarget intents that pointed at it to the first
/// remaining form, keeping the intent invariant intact whenever possible.
pub fn delete_form(catalog: &mut FormsConfig, id: &FormId) -> Result<FormRemoval, RuleViolation> {
    let Some(idx) = catalog.forms.iter().position(|f| &f.id == id) else {
        return Err(RuleViolation::UnknownForm(id.clone()));
    };
    catalog.forms.remove(idx);

    let fallback = catalog.forms.first().map(|f| f.id.clone());
    let mut removal = FormRemoval {
        retargeted_intents: 0,
        orphaned_intents: 0,
    };
    for intent in &mut catalog.intents {
        if &intent.target_form != id {
            continue;
        }
        match &fallback {
            Some(target) => {
                intent.target_form = target.clone();
                removal.retargeted_intents += 1;
            }
            None => removal.orphaned_intents += 1,
        }
    }
    Ok(removal)
}

/// Append a new intent targeting the first form in the catalog.
pub fn add_intent(catalog: &mut FormsConfig) -> IntentId {
    let target = catalog
        .forms
        .first()
        .map(|f| f.id.clone())
        .unwrap_or_else(|| FormId(String::new()));
    let id = IntentId(unique_key("intent", |candidate| {
        catalog.intents.iter().any(|i| i.id.as_str() == candidate)
    }));
    catalog.intents.push(Intent {
        id: id.clone(),
        name: "New Intent".to_string(),
        description: String::new(),
        target_form: target,
    });
    id
}

pub fn delete_intent(catalog: &mut FormsConfig, id: &IntentId) -> Result<(), RuleViolation> {
    let Some(idx) = catalog.intents.iter().position(|i| &i.id == id) else {
        return Err(RuleViolation::UnknownIntent(id.clone()));
    };
    catalog.intents.remove(idx);
    Ok(())
}

/// Point an intent at a different form. The target must exist.
pub fn retarget_intent(
    catalog: &mut FormsConfig,
    intent_id: &IntentId,
    form_id: &FormId,
) -> Result<(), RuleViolation> {
    if catalog.form_by_id(form_id).is_none() {
        return Err(RuleViolation::UnknownForm(form_id.clone()));
    }
    let intent = catalog
        .intents
        .iter_mut()
        .find(|i| &i.id == intent_id)
        .ok_or_else(|| RuleViolation::UnknownIntent(intent_id.clone()))?;
    intent.target_form = form_id.clone();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        FormRemoval, MoveDirection, RuleViolation, add_field, add_form, add_intent, delete_field,
        delete_form, delete_intent, move_field, rename_field, retarget_intent, retype_field,
        set_mode,
    };
    use crate::forms::{Field, FieldType, Form, FormMode, FormsConfig, Intent};

    fn form_with_fields(names: &[&str]) -> Form {
        let mut form = Form::new("order".into(), "Order");
        for name in names {
            form.fields.push(Field::new((*name).into(), *name));
            form.field_order.push((*name).into());
        }
        form
    }

    fn assert_order_is_permutation(form: &Form) {
        assert_eq!(form.field_order.len(), form.fields.len());
        for name in &form.field_order {
            assert!(
                form.has_field(name.as_str()),
                "field_order references missing field '{name}'"
            );
        }
        let mut seen = std::collections::HashSet::new();
        for name in &form.field_order {
            assert!(seen.insert(name.clone()), "duplicate order entry '{name}'");
        }
    }

    #[test]
    fn add_field_registers_name_in_both_collections() {
        let mut form = form_with_fields(&[]);
        let name = add_field(&mut form);
        assert!(form.has_field(name.as_str()));
        assert_eq!(form.field_order, vec![name]);
        assert_order_is_permutation(&form);
    }

    #[test]
    fn add_field_twice_generates_distinct_names() {
        let mut form = form_with_fields(&[]);
        let first = add_field(&mut form);
        let second = add_field(&mut form);
        assert_ne!(first, second);
        assert_order_is_permutation(&form);
    }

    #[test]
    fn rename_field_rewrites_every_order_occurrence() {
        let mut form = form_with_fields(&["email", "city"]);
        rename_field(&mut form, "email", "contact_email").unwrap();
        assert!(form.has_field("contact_email"));
        assert!(!form.has_field("email"));
        assert_eq!(form.field_order[0].as_str(), "contact_email");
        assert_order_is_permutation(&form);
    }

    #[test]
    fn rename_field_rejects_duplicates_and_leaves_form_untouched() {
        let mut form = form_with_fields(&["email", "city"]);
        let before = form.clone();
        let err = rename_field(&mut form, "email", "city").unwrap_err();
        assert!(matches!(err, RuleViolation::DuplicateField { .. }));
        assert_eq!(form, before);
    }

    #[test]
    fn rename_field_rejects_empty_and_unknown_names() {
        let mut form = form_with_fields(&["email"]);
        assert_eq!(
            rename_field(&mut form, "email", "  "),
            Err(RuleViolation::EmptyFieldName)
        );
        assert!(matches!(
            rename_field(&mut form, "missing", "x"),
            Err(RuleViolation::UnknownField { .. })
        ));
        assert_order_is_permutation(&form);
    }

    #[test]
    fn retype_to_dropdown_forces_step_by_step() {
        let mut form = form_with_fields(&["size"]);
        form.mode = FormMode::OneShot;
        retype_field(&mut form, "size", FieldType::Dropdown).unwrap();
        assert_eq!(form.mode, FormMode::StepByStep);
    }

    #[test]
    fn retype_to_text_does_not_touch_mode() {
        let mut form = form_with_fields(&["size"]);
        form.mode = FormMode::OneShot;
        retype_field(&mut form, "size", FieldType::Number).unwrap();
        assert_eq!(form.mode, FormMode::OneShot);
    }

    #[test]
    fn set_mode_one_shot_is_blocked_while_dropdown_remains() {
        let mut form = form_with_fields(&["size"]);
        retype_field(&mut form, "size", FieldType::Dropdown).unwrap();
        let err = set_mode(&mut form, FormMode::OneShot).unwrap_err();
        assert_eq!(form.mode, FormMode::StepByStep);
        assert!(err.to_string().contains("step-by-step"));
    }

    #[test]
    fn set_mode_one_shot_succeeds_after_dropdown_removed() {
        let mut form = form_with_fields(&["size", "notes"]);
        retype_field(&mut form, "size", FieldType::Enum).unwrap();
        delete_field(&mut form, "size").unwrap();
        set_mode(&mut form, FormMode::OneShot).unwrap();
        assert_eq!(form.mode, FormMode::OneShot);
        assert_order_is_permutation(&form);
    }

    #[test]
    fn move_field_swaps_adjacent_entries() {
        let mut form = form_with_fields(&["a", "b", "c"]);
        assert!(move_field(&mut form, "b", MoveDirection::Up));
        let order: Vec<_> = form.field_order.iter().map(|n| n.as_str().to_string()).collect();
        assert_eq!(order, ["b", "a", "c"]);
    }

    #[test]
    fn move_field_is_a_no_op_at_either_boundary() {
        let mut form = form_with_fields(&["a", "b", "c"]);
        let before = form.clone();
        assert!(!move_field(&mut form, "a", MoveDirection::Up));
        assert!(!move_field(&mut form, "c", MoveDirection::Down));
        assert!(!move_field(&mut form, "ghost", MoveDirection::Down));
        assert_eq!(form, before);
    }

    #[test]
    fn delete_field_removes_from_both_collections() {
        let mut form = form_with_fields(&["a", "b"]);
        delete_field(&mut form, "a").unwrap();
        assert!(!form.has_field("a"));
        assert!(form.field_order.iter().all(|n| n.as_str() != "a"));
        assert_order_is_permutation(&form);
    }

    #[test]
    fn invariants_hold_across_a_mixed_edit_sequence() {
        let mut form = form_with_fields(&["email"]);
        let added = add_field(&mut form);
        rename_field(&mut form, added.as_str(), "size").unwrap();
        retype_field(&mut form, "size", FieldType::Dropdown).unwrap();
        move_field(&mut form, "size", MoveDirection::Up);
        assert_order_is_permutation(&form);
        assert_eq!(form.mode, FormMode::StepByStep);

        delete_field(&mut form, "email").unwrap();
        assert_order_is_permutation(&form);
        assert!(set_mode(&mut form, FormMode::OneShot).is_err());
        assert_eq!(form.mode, FormMode::StepByStep);
    }

    #[test]
    fn delete_form_retargets_intents_to_first_remaining() {
        let mut catalog = FormsConfig {
            intents: vec![Intent {
                id: "route".into(),
                name: "Route".to_string(),
                description: String::new(),
                target_form: "b".into(),
            }],
            forms: vec![
                Form::new("a".into(), "A"),
                Form::new("b".into(), "B"),
            ],
        };
        let removal = delete_form(&mut catalog, &"b".into()).unwrap();
        assert_eq!(
            removal,
            FormRemoval {
                retargeted_intents: 1,
                orphaned_intents: 0
            }
        );
        assert_eq!(catalog.intents[0].target_form.as_str(), "a");
    }

    #[test]
    fn delete_last_form_reports_orphaned_intents() {
        let mut catalog = FormsConfig {
            intents: vec![Intent {
                id: "route".into(),
                name: "Route".to_string(),
                description: String::new(),
                target_form: "a".into(),
            }],
            forms: vec![Form::new("a".into(), "A")],
        };
        let removal = delete_form(&mut catalog, &"a".into()).unwrap();
        assert_eq!(removal.orphaned_intents, 1);
        assert_eq!(catalog.intents[0].target_form.as_str(), "a");
    }

    #[test]
    fn add_intent_targets_first_form() {
        let mut catalog = FormsConfig {
            intents: Vec::new(),
            forms: vec![Form::new("a".into(), "A")],
        };
        let id = add_intent(&mut catalog);
        let intent = catalog.intent_by_id(&id).unwrap();
        assert_eq!(intent.target_form.as_str(), "a");
        delete_intent(&mut catalog, &id).unwrap();
        assert!(catalog.intents.is_empty());
    }

    #[test]
    fn retarget_intent_requires_an_existing_form() {
        let mut catalog = FormsConfig {
            intents: Vec::new(),
            forms: vec![Form::new("a".into(), "A")],
        };
        let id = add_intent(&mut catalog);
        assert!(matches!(
            retarget_intent(&mut catalog, &id, &"ghost".into()),
            Err(RuleViolation::UnknownForm(_))
        ));
        retarget_intent(&mut catalog, &id, &"a".into()).unwrap();
    }

    #[test]
    fn add_form_registers_a_selectable_empty_form() {
        let mut catalog = FormsConfig::default();
        let id = add_form(&mut catalog);
        let form = catalog.form_by_id(&id).unwrap();
        assert_eq!(form.mode, FormMode::StepByStep);
        assert!(form.fields.is_empty());
    }
}
