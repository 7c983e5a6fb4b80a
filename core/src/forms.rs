use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tools::{ToolBinding, ToolName};

/// Identifier of a form, referenced by intents and by runtime dialogue state.
/// Kept as a dedicated type so cross-entity references are visible at the
/// boundary instead of drifting as free-form strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub String);

impl FormId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FormId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FormId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of an intent routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(pub String);

impl IntentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IntentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Stable key of a field within a form. Used in `field_order`, in runtime
/// dialogue state, and as the key of dynamic option maps. The display label
/// lives on [`Field::label`]; renaming a field must go through
/// [`crate::rules::rename_field`] so every reference is rewritten together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldName(pub String);

impl FieldName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Routes a recognized user goal to a target form. Matching against user
/// utterances happens in the external runtime; here the description is only
/// a routing hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub id: IntentId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Must reference an existing form id. The editing rules keep this valid
    /// when forms are deleted; validation reports any drift.
    pub target_form: FormId,
}

/// Input kinds a field can collect. `dropdown` and `enum` both render as a
/// selection control and force step-by-step mode on the owning form, since
/// one-shot collection cannot prompt for a choice mid-turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
    Dropdown,
    Enum,
    File,
}

impl FieldType {
    /// Whether a field of this type can only be collected one step at a time.
    pub fn requires_step_by_step(self) -> bool {
        matches!(self, FieldType::Dropdown | FieldType::Enum)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Dropdown => "dropdown",
            FieldType::Enum => "enum",
            FieldType::File => "file",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "date" => Ok(FieldType::Date),
            "boolean" => Ok(FieldType::Boolean),
            "dropdown" => Ok(FieldType::Dropdown),
            "enum" => Ok(FieldType::Enum),
            "file" => Ok(FieldType::File),
            other => Err(format!(
                "unknown field type '{other}' (expected text, number, date, boolean, dropdown, enum, or file)"
            )),
        }
    }
}

/// Optional nested validation constraints carried by later config revisions
/// alongside the flat min/max fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

/// Presentation hints. Display-only; the runtime ignores these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldUi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// A single input collected by a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: FieldName,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Static options for dropdown/enum fields. Runtime-sourced dynamic
    /// options may extend these per turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropdown_options: Option<Vec<String>>,
    /// Name of the tool that populates options at runtime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropdown_tool: Option<ToolName>,
    /// Parameter bindings for the dropdown tool call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropdown_tool_config: Option<ToolBinding>,
    /// Tool invoked when this field is captured (enrichment or validation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_hook: Option<ToolBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<FieldConstraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<FieldUi>,
}

impl Field {
    /// A fresh text field with the given key and a default label.
    pub fn new(name: FieldName, label: impl Into<String>) -> Self {
        Self {
            name,
            label: label.into(),
            field_type: FieldType::Text,
            required: false,
            dropdown_options: None,
            dropdown_tool: None,
            dropdown_tool_config: None,
            tool_hook: None,
            pattern: None,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            constraints: None,
            ui: None,
        }
    }
}

/// Whether the runtime collects a form's fields one at a time or in a single
/// message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormMode {
    StepByStep,
    OneShot,
}

impl Default for FormMode {
    fn default() -> Self {
        FormMode::StepByStep
    }
}

impl FormMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FormMode::StepByStep => "step-by-step",
            FormMode::OneShot => "one-shot",
        }
    }
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "step-by-step" => Ok(FormMode::StepByStep),
            "one-shot" => Ok(FormMode::OneShot),
            other => Err(format!(
                "unknown form mode '{other}' (expected step-by-step or one-shot)"
            )),
        }
    }
}

/// Structured submission override used by later config revisions in place of
/// the plain webhook URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionTarget {
    #[serde(rename = "type")]
    pub kind: SubmissionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<ToolName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<crate::tools::HttpMethod>,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub headers: std::collections::BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub body_template: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Api,
    Tool,
}

/// A cross-field validation rule evaluated by the runtime before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormValidator {
    pub id: String,
    pub name: String,
    /// Message shown when the rule fails.
    pub message: String,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub conditions: Vec<ValidatorCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    All,
    Any,
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::All
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorCondition {
    pub field: FieldName,
    pub operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// A named, ordered set of input fields collected from a user.
///
/// Two invariants hold after every editing operation:
/// - `field_order` is a permutation of `fields[].name` (no duplicates, no
///   dangling names);
/// - if any field is dropdown/enum, `mode` is step-by-step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: FormId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Webhook the runtime calls when the form completes. Required and
    /// URL-checked before any save reaches the network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionTarget>,
    #[serde(default)]
    pub mode: FormMode,
    #[serde(default)]
    pub field_order: Vec<FieldName>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<FormValidator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl Form {
    /// An empty step-by-step form with the given id and name.
    pub fn new(id: FormId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            title: None,
            description: String::new(),
            submission_url: None,
            submission: None,
            mode: FormMode::StepByStep,
            field_order: Vec::new(),
            fields: Vec::new(),
            validators: Vec::new(),
            version: None,
        }
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }

    pub fn field_by_name_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name.as_str() == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_by_name(name).is_some()
    }

    /// Whether any field locks the form into step-by-step mode.
    pub fn has_selection_field(&self) -> bool {
        self.fields
            .iter()
            .any(|f| f.field_type.requires_step_by_step())
    }
}

/// The `forms` configuration document: every intent and form of one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormsConfig {
    #[serde(default)]
    pub intents: Vec<Intent>,
    #[serde(default)]
    pub forms: Vec<Form>,
}

impl FormsConfig {
    pub fn form_by_id(&self, id: &FormId) -> Option<&Form> {
        self.forms.iter().find(|f| &f.id == id)
    }

    pub fn form_by_id_mut(&mut self, id: &FormId) -> Option<&mut Form> {
        self.forms.iter_mut().find(|f| &f.id == id)
    }

    pub fn intent_by_id(&self, id: &IntentId) -> Option<&Intent> {
        self.intents.iter().find(|i| &i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, FieldType, Form, FormMode, FormsConfig};
    use serde_json::json;

    #[test]
    fn field_type_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_value(FieldType::Dropdown).unwrap(), json!("dropdown"));
        assert_eq!(serde_json::to_value(FieldType::Enum).unwrap(), json!("enum"));
        let parsed: FieldType = serde_json::from_value(json!("boolean")).unwrap();
        assert_eq!(parsed, FieldType::Boolean);
    }

    #[test]
    fn form_mode_uses_kebab_case_wire_names() {
        assert_eq!(
            serde_json::to_value(FormMode::StepByStep).unwrap(),
            json!("step-by-step")
        );
        assert_eq!(serde_json::to_value(FormMode::OneShot).unwrap(), json!("one-shot"));
    }

    #[test]
    fn form_deserializes_with_sparse_document() {
        let form: Form = serde_json::from_value(json!({
            "id": "order_pizza",
            "name": "Order pizza",
            "description": "Collect a pizza order"
        }))
        .unwrap();
        assert_eq!(form.mode, FormMode::StepByStep);
        assert!(form.fields.is_empty());
        assert!(form.submission_url.is_none());
    }

    #[test]
    fn field_serializes_type_under_wire_key() {
        let field = Field::new("size".into(), "Size");
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], json!("text"));
        assert_eq!(value["name"], json!("size"));
        assert!(value.get("dropdown_options").is_none());
    }

    #[test]
    fn forms_config_resolves_forms_by_id() {
        let cfg: FormsConfig = serde_json::from_value(json!({
            "intents": [],
            "forms": [{"id": "a", "name": "A", "description": ""}]
        }))
        .unwrap();
        assert!(cfg.form_by_id(&"a".into()).is_some());
        assert!(cfg.form_by_id(&"missing".into()).is_none());
    }
}
