use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of an HTTP tool. Fields reference tools by this name; validation
/// reports references that no longer resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolName(pub String);

impl ToolName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!(
                "unknown HTTP method '{other}' (expected GET, POST, PUT, PATCH, or DELETE)"
            )),
        }
    }
}

/// How the runtime authenticates against the tool endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolAuth {
    None,
    ApiKey,
    Bearer,
    ManagedIdentity,
}

impl Default for ToolAuth {
    fn default() -> Self {
        ToolAuth::None
    }
}

/// Where in the form lifecycle a tool participates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolRole {
    PreSubmitValidator,
    DataEnricher,
    SubmitForm,
}

impl ToolRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolRole::PreSubmitValidator => "pre-submit-validator",
            ToolRole::DataEnricher => "data-enricher",
            ToolRole::SubmitForm => "submit-form",
        }
    }
}

impl fmt::Display for ToolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binds form and runtime values to a tool call and the tool's output back
/// into form or plan state. The maps are semi-structured by design: their
/// keys are field/parameter names, their values are JSON expressions the
/// runtime interprets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolName>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub input_map: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub output_map: serde_json::Map<String, serde_json::Value>,
    /// JSON-pointer-style path selecting the relevant part of the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl ToolBinding {
    /// The tool this binding targets, when one is named.
    pub fn tool_name(&self) -> Option<&ToolName> {
        self.tool.as_ref()
    }
}

/// An externally invoked HTTP action usable for validation, enrichment,
/// dropdown population, or final submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: ToolName,
    #[serde(default)]
    pub description: String,
    pub http_method: HttpMethod,
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub query_schema: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub body_schema: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub auth: ToolAuth,
    pub role: ToolRole,
    #[serde(default)]
    pub cache_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_seconds: Option<u64>,
}

/// The `tools` configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl ToolsConfig {
    pub fn by_name(&self, name: &ToolName) -> Option<&Tool> {
        self.tools.iter().find(|t| &t.name == name)
    }

    pub fn by_role(&self, role: ToolRole) -> impl Iterator<Item = &Tool> {
        self.tools.iter().filter(move |t| t.role == role)
    }
}
