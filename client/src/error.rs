use formloom_core::bundle::ConfigDoc;
use formloom_core::validate::SaveBlocked;
use thiserror::Error;

/// Failures surfaced by the API clients and the config store. Every failure
/// is local-scope: nothing retries, and the caller recovers by repeating the
/// action.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or unreadable response body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response; the message carries the server's `detail` when the
    /// body is structured, otherwise the raw text.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    /// A config document did not match its schema.
    #[error("invalid {doc} document: {source}")]
    Document {
        doc: ConfigDoc,
        #[source]
        source: serde_json::Error,
    },
    /// Save blocked locally before any network call.
    #[error(transparent)]
    SaveBlocked(#[from] SaveBlocked),
    /// Store operation that needs a loaded bundle.
    #[error("no configuration loaded")]
    NotLoaded,
}

impl ClientError {
    /// HTTP status of the server response, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Pull a useful message out of an error body: FastAPI-style `{"detail": ..}`
/// when present, the raw text otherwise.
pub(crate) fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail") {
            if let Some(text) = detail.as_str() {
                return text.to_string();
            }
            return detail.to_string();
        }
    }
    body.trim().to_string()
}

/// Map a response to an error unless it is 2xx.
pub(crate) async fn expect_ok(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        message: extract_detail(&body),
    })
}

#[cfg(test)]
mod tests {
    use super::extract_detail;

    #[test]
    fn detail_field_wins_over_raw_body() {
        assert_eq!(extract_detail(r#"{"detail": "Unknown config"}"#), "Unknown config");
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        assert_eq!(
            extract_detail(r#"{"detail": {"field": "name"}}"#),
            r#"{"field":"name"}"#
        );
    }

    #[test]
    fn plain_text_bodies_pass_through_trimmed() {
        assert_eq!(extract_detail(" upstream exploded \n"), "upstream exploded");
    }
}
