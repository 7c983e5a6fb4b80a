//! Client for the runtime chat API: the published form catalog and the chat
//! endpoints the preview surface drives.

use formloom_core::forms::FormsConfig;
use formloom_core::views::ChatReply;
use serde_json::{Value, json};

use crate::error::{ClientError, expect_ok};

pub const DEFAULT_RUNTIME_URL: &str = "http://localhost:8001";

/// Async client for the runtime API. The runtime executes chat turns against
/// the latest published config (or an explicit version); this client only
/// submits turns and reads back the reply plus dialogue state.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    base: String,
    client: reqwest::Client,
}

impl RuntimeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(expect_ok(resp).await?.json().await?)
    }

    /// The form catalog of the latest published version (or an explicit one).
    /// 404 means nothing has been published yet.
    pub async fn forms(&self, version: Option<i64>) -> Result<FormsConfig, ClientError> {
        let mut query = Vec::new();
        if let Some(version) = version {
            query.push(("version", version.to_string()));
        }
        let resp = self
            .client
            .get(self.url("/forms"))
            .query(&query)
            .send()
            .await?;
        Ok(expect_ok(resp).await?.json().await?)
    }

    /// Run one chat turn against the published config.
    pub async fn chat(
        &self,
        thread_id: &str,
        message: &str,
        version: Option<i64>,
    ) -> Result<ChatReply, ClientError> {
        self.send_turn("/chat", thread_id, message, version).await
    }

    /// Run one chat turn against the draft config instead of a published
    /// version.
    pub async fn chat_preview(
        &self,
        thread_id: &str,
        message: &str,
        version: Option<i64>,
    ) -> Result<ChatReply, ClientError> {
        self.send_turn("/chat/preview", thread_id, message, version)
            .await
    }

    async fn send_turn(
        &self,
        path: &str,
        thread_id: &str,
        message: &str,
        version: Option<i64>,
    ) -> Result<ChatReply, ClientError> {
        let mut body = json!({
            "thread_id": thread_id,
            "message": message,
        });
        if let Some(version) = version {
            body["version"] = json!(version);
        }
        let resp = self.client.post(self.url(path)).json(&body).send().await?;
        Ok(expect_ok(resp).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::RuntimeClient;

    #[test]
    fn base_url_is_normalized_without_trailing_slash() {
        let client = RuntimeClient::new("http://localhost:8001/");
        assert_eq!(client.url("/chat/preview"), "http://localhost:8001/chat/preview");
    }
}
