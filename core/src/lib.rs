//! Shared model for Formloom authoring tools.
//!
//! Holds the configuration schema for conversational form agents, the
//! invariant-preserving editing rules, boundary validation, and the pure
//! projection of runtime dialogue state onto the form catalog. All I/O lives
//! in the client and CLI crates; everything here is deterministic and
//! independently testable.

pub mod bundle;
pub mod dialogue;
pub mod error;
pub mod forms;
pub mod rules;
pub mod settings;
pub mod tools;
pub mod validate;
pub mod views;

pub use bundle::{ConfigBundle, ConfigDoc};
pub use dialogue::{DialogueState, InputControl, current_field, next_control, options_for};
pub use error::{Diagnostic, Severity};
pub use forms::{
    Field, FieldName, FieldType, Form, FormId, FormMode, FormsConfig, Intent, IntentId,
};
pub use rules::{MoveDirection, RuleViolation};
pub use tools::{Tool, ToolName, ToolRole, ToolsConfig};
pub use validate::{SaveBlocked, validate_bundle, validate_forms, webhook_gate};
