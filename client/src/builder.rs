//! Client for the builder API: draft configuration documents, publishing,
//! and the inspection surfaces (versions, threads, traces, submissions,
//! knowledge bases).

use formloom_core::bundle::ConfigDoc;
use formloom_core::settings::KnowledgeProvider;
use formloom_core::views::{
    AgentSummary, KbChunk, KbFile, KbSearchResponse, KnowledgeBaseSummary, PublishReceipt,
    PublishedVersion, SubmissionFilter, SubmissionRecord, ThreadMessage, ThreadSummary, TraceLog,
    UsageStats,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{ClientError, expect_ok};

pub const DEFAULT_BUILDER_URL: &str = "http://localhost:8000";

/// Async client for the builder/config API. One instance per base URL;
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct BuilderClient {
    base: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ThreadsEnvelope {
    #[serde(default)]
    threads: Vec<ThreadSummary>,
}

#[derive(Deserialize)]
struct MessagesEnvelope {
    #[serde(default)]
    messages: Vec<ThreadMessage>,
}

#[derive(Deserialize)]
struct TracesEnvelope {
    #[serde(default)]
    traces: Vec<TraceLog>,
}

#[derive(Deserialize)]
struct VersionsEnvelope {
    #[serde(default)]
    versions: Vec<PublishedVersion>,
}

#[derive(Deserialize)]
struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct AgentsEnvelope {
    #[serde(default)]
    agents: Vec<AgentSummary>,
}

#[derive(Deserialize)]
struct FilesEnvelope {
    #[serde(default)]
    files: Vec<KbFile>,
}

#[derive(Deserialize)]
struct ChunksEnvelope {
    #[serde(default)]
    chunks: Vec<KbChunk>,
}

#[derive(Deserialize)]
struct IdEnvelope {
    id: i64,
}

#[derive(Deserialize)]
struct DeletedEnvelope {
    #[serde(default)]
    deleted: u64,
}

#[derive(Deserialize)]
struct IndexedEnvelope {
    #[serde(default)]
    indexed: u64,
}

impl BuilderClient {
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

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let resp = self.client.get(self.url(path)).query(query).send().await?;
        Ok(expect_ok(resp).await?.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ClientError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Ok(expect_ok(resp).await?.json().await?)
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        self.get_json("/health", &[]).await
    }

    // --- draft configuration -------------------------------------------------

    pub async fn get_config(&self, doc: ConfigDoc) -> Result<Value, ClientError> {
        self.get_json(&format!("/config/{doc}"), &[]).await
    }

    pub async fn put_config(&self, doc: ConfigDoc, value: &Value) -> Result<(), ClientError> {
        let resp = self
            .client
            .put(self.url(&format!("/config/{doc}")))
            .json(value)
            .send()
            .await?;
        expect_ok(resp).await?;
        Ok(())
    }

    /// Snapshot the saved draft into a new immutable version.
    pub async fn publish(&self) -> Result<PublishReceipt, ClientError> {
        let resp = self.client.post(self.url("/publish")).send().await?;
        Ok(expect_ok(resp).await?.json().await?)
    }

    pub async fn versions(&self) -> Result<Vec<PublishedVersion>, ClientError> {
        let envelope: VersionsEnvelope = self.get_json("/versions", &[]).await?;
        Ok(envelope.versions)
    }

    /// Full config snapshot of one published version.
    pub async fn version(&self, version: i64) -> Result<Value, ClientError> {
        self.get_json(&format!("/versions/{version}"), &[]).await
    }

    // --- dashboard -----------------------------------------------------------

    pub async fn agents(&self) -> Result<Vec<AgentSummary>, ClientError> {
        let envelope: AgentsEnvelope = self.get_json("/agents", &[]).await?;
        Ok(envelope.agents)
    }

    pub async fn usage_stats(&self) -> Result<UsageStats, ClientError> {
        self.get_json("/stats/usage", &[]).await
    }

    // --- threads and traces --------------------------------------------------

    pub async fn threads(&self) -> Result<Vec<ThreadSummary>, ClientError> {
        let envelope: ThreadsEnvelope = self.get_json("/threads", &[]).await?;
        Ok(envelope.threads)
    }

    pub async fn thread_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, ClientError> {
        let envelope: MessagesEnvelope = self
            .get_json(&format!("/threads/{thread_id}/messages"), &[])
            .await?;
        Ok(envelope.messages)
    }

    pub async fn traces(&self, thread_id: Option<&str>) -> Result<Vec<TraceLog>, ClientError> {
        let mut query = Vec::new();
        if let Some(thread_id) = thread_id {
            query.push(("thread_id", thread_id.to_string()));
        }
        let envelope: TracesEnvelope = self.get_json("/traces", &query).await?;
        Ok(envelope.traces)
    }

    // --- submissions ---------------------------------------------------------

    pub async fn submissions(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<SubmissionRecord>, ClientError> {
        let envelope: ItemsEnvelope<SubmissionRecord> =
            self.get_json("/submissions", &filter.query_pairs()).await?;
        Ok(envelope.items)
    }

    /// CSV export of submissions matching the filter.
    pub async fn export_submissions(&self, filter: &SubmissionFilter) -> Result<String, ClientError> {
        let resp = self
            .client
            .get(self.url("/submissions/export"))
            .query(&filter.query_pairs())
            .send()
            .await?;
        Ok(expect_ok(resp).await?.text().await?)
    }

    // --- knowledge bases -----------------------------------------------------

    pub async fn knowledge_bases(&self) -> Result<Vec<KnowledgeBaseSummary>, ClientError> {
        let envelope: ItemsEnvelope<KnowledgeBaseSummary> =
            self.get_json("/knowledge-bases", &[]).await?;
        Ok(envelope.items)
    }

    pub async fn create_knowledge_base(
        &self,
        name: &str,
        description: &str,
        provider: KnowledgeProvider,
    ) -> Result<i64, ClientError> {
        let envelope: IdEnvelope = self
            .post_json(
                "/knowledge-bases",
                &json!({
                    "name": name,
                    "description": description,
                    "provider": provider,
                }),
            )
            .await?;
        Ok(envelope.id)
    }

    pub async fn delete_knowledge_base(&self, kb_id: i64) -> Result<(), ClientError> {
        let resp = self
            .client
            .delete(self.url(&format!("/knowledge-bases/{kb_id}")))
            .send()
            .await?;
        expect_ok(resp).await?;
        Ok(())
    }

    pub async fn kb_files(&self, kb_id: i64) -> Result<Vec<KbFile>, ClientError> {
        let envelope: FilesEnvelope = self
            .get_json(&format!("/knowledge-bases/{kb_id}/files"), &[])
            .await?;
        Ok(envelope.files)
    }

    pub async fn kb_file_chunks(
        &self,
        kb_id: i64,
        filename: &str,
        limit: u32,
    ) -> Result<Vec<KbChunk>, ClientError> {
        let envelope: ChunksEnvelope = self
            .get_json(
                &format!("/knowledge-bases/{kb_id}/files/chunks"),
                &[
                    ("filename", filename.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(envelope.chunks)
    }

    /// Delete every chunk ingested from one file. Returns how many were
    /// removed.
    pub async fn delete_kb_file(&self, kb_id: i64, filename: &str) -> Result<u64, ClientError> {
        let resp = self
            .client
            .delete(self.url(&format!("/knowledge-bases/{kb_id}/files")))
            .query(&[("filename", filename)])
            .send()
            .await?;
        let envelope: DeletedEnvelope = expect_ok(resp).await?.json().await?;
        Ok(envelope.deleted)
    }

    pub async fn add_kb_document(
        &self,
        kb_id: i64,
        content: &str,
        metadata: Option<Value>,
    ) -> Result<i64, ClientError> {
        let mut body = json!({ "content": content });
        if let Some(metadata) = metadata {
            body["metadata"] = metadata;
        }
        let envelope: IdEnvelope = self
            .post_json(&format!("/knowledge-bases/{kb_id}/documents"), &body)
            .await?;
        Ok(envelope.id)
    }

    /// Multipart upload of one document file; the server chunks and indexes
    /// it. Returns the number of chunks indexed.
    pub async fn upload_kb_file(
        &self,
        kb_id: i64,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<u64, ClientError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .client
            .post(self.url(&format!("/knowledge-bases/{kb_id}/upload")))
            .multipart(form)
            .send()
            .await?;
        let envelope: IndexedEnvelope = expect_ok(resp).await?.json().await?;
        Ok(envelope.indexed)
    }

    pub async fn search_kb(
        &self,
        kb_id: i64,
        query: &str,
        limit: u32,
    ) -> Result<KbSearchResponse, ClientError> {
        self.post_json(
            &format!("/knowledge-bases/{kb_id}/search"),
            &json!({ "query": query, "limit": limit }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::BuilderClient;

    #[test]
    fn base_url_is_normalized_without_trailing_slash() {
        let client = BuilderClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/config/forms"), "http://localhost:8000/config/forms");
    }
}
