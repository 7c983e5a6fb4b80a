use serde::{Deserialize, Serialize};
use serde_json::json;

use formloom_client::{ClientError, DEFAULT_BUILDER_URL, DEFAULT_RUNTIME_URL};

/// Exit codes: 0=success (2xx), 1=client error (4xx or local validation),
/// 2=server error (5xx), 3=connection error, 4=usage error
pub const EXIT_OK: i32 = 0;
pub const EXIT_CLIENT_ERROR: i32 = 1;
pub const EXIT_SERVER_ERROR: i32 = 2;
pub const EXIT_CONNECTION_ERROR: i32 = 3;
pub const EXIT_USAGE_ERROR: i32 = 4;

/// Stored defaults for the CLI, written by `formloom use`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_url: Option<String>,
}

pub fn settings_path() -> std::path::PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("formloom")
        .join("config.json")
}

pub fn load_settings() -> Option<StoredSettings> {
    let data = std::fs::read_to_string(settings_path()).ok()?;
    serde_json::from_str(&data).ok()
}

pub fn save_settings(settings: &StoredSettings) -> Result<(), Box<dyn std::error::Error>> {
    let path = settings_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

/// Resolve a base URL: flag/env first, then stored settings, then the
/// built-in default.
pub fn resolve_url(flag: Option<String>, stored: Option<String>, default: &str) -> String {
    let resolved = flag.or(stored).unwrap_or_else(|| default.to_string());
    tracing::debug!(url = %resolved, "resolved base URL");
    resolved
}

pub fn resolve_builder_url(flag: Option<String>) -> String {
    let stored = load_settings().and_then(|s| s.builder_url);
    resolve_url(flag, stored, DEFAULT_BUILDER_URL)
}

pub fn resolve_runtime_url(flag: Option<String>) -> String {
    let stored = load_settings().and_then(|s| s.runtime_url);
    resolve_url(flag, stored, DEFAULT_RUNTIME_URL)
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", serde_json::to_string_pretty(&err).unwrap());
    std::process::exit(EXIT_USAGE_ERROR);
}

/// Print a successful result as pretty JSON and map it to exit code 0, or
/// render the failure on stderr with the structured exit code.
pub fn render<T: Serialize>(result: Result<T, ClientError>) -> i32 {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap());
            EXIT_OK
        }
        Err(err) => render_error(err),
    }
}

pub fn render_error(err: ClientError) -> i32 {
    let code = error_exit_code(&err);
    let body = json!({
        "error": error_kind(&err),
        "message": err.to_string(),
    });
    eprintln!("{}", serde_json::to_string_pretty(&body).unwrap());
    code
}

fn error_kind(err: &ClientError) -> &'static str {
    match err {
        ClientError::Transport(_) => "connection_error",
        ClientError::Status { .. } => "api_error",
        ClientError::Document { .. } => "invalid_document",
        ClientError::SaveBlocked(_) => "validation_failed",
        ClientError::NotLoaded => "cli_error",
    }
}

fn error_exit_code(err: &ClientError) -> i32 {
    match err {
        ClientError::Status { status, .. } => match status {
            400..=499 => EXIT_CLIENT_ERROR,
            _ => EXIT_SERVER_ERROR,
        },
        ClientError::Transport(inner) => match inner.status() {
            Some(status) if status.is_client_error() => EXIT_CLIENT_ERROR,
            Some(_) => EXIT_SERVER_ERROR,
            None => EXIT_CONNECTION_ERROR,
        },
        ClientError::SaveBlocked(_) | ClientError::Document { .. } => EXIT_CLIENT_ERROR,
        ClientError::NotLoaded => EXIT_USAGE_ERROR,
    }
}

/// Read JSON from a file path or stdin (when path is "-").
pub fn read_json_from_file(path: &str) -> Result<serde_json::Value, String> {
    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read file '{path}': {e}"))?
    };
    serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON in '{path}': {e}"))
}
