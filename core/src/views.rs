//! Read-only shapes served by the external builder and runtime APIs:
//! thread history, trace logs, submissions, published versions, knowledge
//! base listings, and chat replies. Payload-bearing fields stay
//! semi-structured (`serde_json::Value`) on purpose — the external runtime
//! owns their schemas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dialogue::DialogueState;
use crate::forms::FormId;

/// One conversation thread, newest activity first in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub thread_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

/// One message within a thread, with the dialogue state recorded alongside
/// assistant turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One execution trace. `data` holds the runtime's event timeline, token
/// counts, and before/after state snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLog {
    pub trace_id: String,
    pub thread_id: String,
    pub version: i64,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A published, immutable configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedVersion {
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Receipt returned by the publish endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub version: i64,
}

/// One captured form submission and its delivery outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub form_id: FormId,
    #[serde(default)]
    pub form_name: String,
    pub thread_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_target: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Server-side filters for submission listings and exports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionFilter {
    pub form_id: Option<FormId>,
    pub thread_id: Option<String>,
    pub delivery_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SubmissionFilter {
    /// Query-string pairs for the listing endpoints; unset filters are
    /// omitted entirely.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(form_id) = &self.form_id {
            pairs.push(("form_id", form_id.to_string()));
        }
        if let Some(thread_id) = &self.thread_id {
            pairs.push(("thread_id", thread_id.clone()));
        }
        if let Some(delivery_type) = &self.delivery_type {
            pairs.push(("delivery_type", delivery_type.clone()));
        }
        if let Some(start_date) = &self.start_date {
            pairs.push(("start_date", start_date.clone()));
        }
        if let Some(end_date) = &self.end_date {
            pairs.push(("end_date", end_date.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

/// One agent as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
}

/// Usage counters for the dashboard. Counter names are owned by the server;
/// kept as an open map so new counters render without a client release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(flatten)]
    pub counters: serde_json::Map<String, serde_json::Value>,
}

/// One knowledge base as listed by the builder API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Ingested file summary: chunk count plus the most recent indexing time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbFile {
    pub filename: String,
    pub chunks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_indexed_at: Option<DateTime<Utc>>,
}

/// One stored chunk of an ingested file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbChunk {
    pub id: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One vector-search hit. Lower distance means closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbSearchResult {
    pub id: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// Search results plus whether they came from the server-side cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbSearchResponse {
    #[serde(default)]
    pub results: Vec<KbSearchResult>,
    #[serde(default)]
    pub cached: bool,
}

/// One chat turn's outcome: the assistant reply plus the dialogue state the
/// projector consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub state: DialogueState,
}

#[cfg(test)]
mod tests {
    use super::{ChatReply, SubmissionFilter, TraceLog};
    use serde_json::json;

    #[test]
    fn submission_filter_omits_unset_parameters() {
        let filter = SubmissionFilter {
            form_id: Some("order".into()),
            limit: Some(25),
            ..SubmissionFilter::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![("form_id", "order".to_string()), ("limit", "25".to_string())]
        );
        assert!(SubmissionFilter::default().query_pairs().is_empty());
    }

    #[test]
    fn trace_log_tolerates_arbitrary_data_payloads() {
        let trace: TraceLog = serde_json::from_value(json!({
            "trace_id": "t-1",
            "thread_id": "thread-9",
            "version": 3,
            "data": {"events": [{"node": "intent_router"}], "tokens": {"prompt": 42}}
        }))
        .unwrap();
        assert_eq!(trace.data["tokens"]["prompt"], json!(42));
        assert!(trace.created_at.is_none());
    }

    #[test]
    fn chat_reply_carries_projectable_state() {
        let reply: ChatReply = serde_json::from_value(json!({
            "reply": "Please provide Size (dropdown).",
            "state": {
                "current_form_id": "order",
                "awaiting_field": true,
                "field_options": {"size": ["small", "large"]}
            }
        }))
        .unwrap();
        assert_eq!(reply.state.current_form_id, Some("order".into()));
        assert_eq!(reply.state.field_options["size"], ["small", "large"]);
    }
}
