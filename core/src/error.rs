use serde::Serialize;

use crate::forms::{FieldName, FormId};

/// A structured validation finding. Keeps failure *kinds* testable instead of
/// collapsing everything into a display string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Machine-readable code (see [`codes`]).
    pub code: &'static str,
    pub severity: Severity,
    /// Human-readable description of what is inconsistent.
    pub message: String,
    /// Form the finding belongs to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormId>,
    /// Field the finding belongs to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            form: None,
            field: None,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            form: None,
            field: None,
        }
    }

    pub fn with_form(mut self, form: FormId) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_field(mut self, field: FieldName) -> Self {
        self.field = Some(field);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Diagnostic codes used across validation
pub mod codes {
    pub const MISSING_WEBHOOK: &str = "missing_webhook";
    pub const INVALID_WEBHOOK: &str = "invalid_webhook";
    pub const ORDER_MISMATCH: &str = "order_mismatch";
    pub const DUPLICATE_FIELD_NAME: &str = "duplicate_field_name";
    pub const MODE_CONFLICT: &str = "mode_conflict";
    pub const DANGLING_INTENT_TARGET: &str = "dangling_intent_target";
    pub const DANGLING_TOOL_REFERENCE: &str = "dangling_tool_reference";
    pub const DANGLING_FIELD_REFERENCE: &str = "dangling_field_reference";
    pub const INVALID_PATTERN: &str = "invalid_pattern";
    pub const INVALID_RETRIEVAL_PASSES: &str = "invalid_retrieval_passes";
}
