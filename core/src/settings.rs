use serde::{Deserialize, Serialize};

/// Deployment metadata for hosting the published agent on Azure App Service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureAppService {
    #[serde(default)]
    pub app_name: String,
    #[serde(default)]
    pub resource_group: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub auth_mode: AzureAuthMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AzureAuthMode {
    PublishProfile,
    ManagedIdentity,
}

impl Default for AzureAuthMode {
    fn default() -> Self {
        AzureAuthMode::PublishProfile
    }
}

/// The `project` configuration document: the agent's identity and hosting
/// metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub system_message: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub deploy_to_azure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_app_service: Option<AzureAppService>,
}

/// Vector-store backend used for retrieval during chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeProvider {
    Pgvector,
    AzureAiSearch,
    None,
}

impl Default for KnowledgeProvider {
    fn default() -> Self {
        KnowledgeProvider::Pgvector
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetrievalMode {
    SinglePass,
    Agentic,
}

impl Default for RetrievalMode {
    fn default() -> Self {
        RetrievalMode::SinglePass
    }
}

/// The `knowledge` configuration document: retrieval settings for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    #[serde(default)]
    pub enable_knowledge_base: bool,
    #[serde(default)]
    pub provider: KnowledgeProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Default knowledge base consulted when no explicit one is bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base_id: Option<i64>,
    #[serde(default)]
    pub retrieval_mode: RetrievalMode,
    /// Upper bound on agentic retrieval passes. Must stay >= 1.
    #[serde(default = "default_max_agentic_passes")]
    pub max_agentic_passes: u32,
    #[serde(default)]
    pub use_semantic_ranker: bool,
}

fn default_max_agentic_passes() -> u32 {
    1
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            enable_knowledge_base: false,
            provider: KnowledgeProvider::default(),
            endpoint: None,
            api_key: None,
            index_name: None,
            knowledge_base_id: None,
            retrieval_mode: RetrievalMode::default(),
            max_agentic_passes: default_max_agentic_passes(),
            use_semantic_ranker: false,
        }
    }
}

/// Storage backends the runtime can persist threads and submissions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    None,
    Postgres,
    Mongo,
    Cosmos,
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::None
    }
}

/// The `persistence` configuration document. Pure configuration for the
/// external storage backends; carries no behavior here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub storage_backend: StorageBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres_dsn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongo_uri: Option<String>,
    #[serde(default)]
    pub enable_chat_logs: bool,
    #[serde(default)]
    pub enable_config_versions: bool,
    #[serde(default)]
    pub enable_cosmos: bool,
    #[serde(default)]
    pub use_managed_identity: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cosmos_account_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cosmos_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(default)]
    pub enable_semantic_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_connection_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    Console,
    File,
    Appinsights,
}

impl Default for LogMode {
    fn default() -> Self {
        LogMode::Console
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

/// The `logging` configuration document: how the runtime stores logs and
/// trace events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_emit_trace_logs")]
    pub emit_trace_logs: bool,
    #[serde(default)]
    pub mode: LogMode,
    #[serde(default)]
    pub level: LogLevel,
}

fn default_emit_trace_logs() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            emit_trace_logs: true,
            mode: LogMode::default(),
            level: LogLevel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{KnowledgeBaseConfig, KnowledgeProvider, LogLevel, LoggingConfig, RetrievalMode};
    use serde_json::json;

    #[test]
    fn knowledge_config_defaults_to_one_agentic_pass() {
        let cfg: KnowledgeBaseConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg.max_agentic_passes, 1);
        assert_eq!(cfg.retrieval_mode, RetrievalMode::SinglePass);
        assert_eq!(cfg.provider, KnowledgeProvider::Pgvector);
    }

    #[test]
    fn knowledge_provider_uses_snake_case_wire_names() {
        assert_eq!(
            serde_json::to_value(KnowledgeProvider::AzureAiSearch).unwrap(),
            json!("azure_ai_search")
        );
    }

    #[test]
    fn logging_config_defaults_match_runtime_expectations() {
        let cfg: LoggingConfig = serde_json::from_value(json!({})).unwrap();
        assert!(cfg.emit_trace_logs);
        assert_eq!(cfg.level, LogLevel::Info);
        assert_eq!(serde_json::to_value(cfg.level).unwrap(), json!("INFO"));
    }
}
