use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::forms::FormsConfig;
use crate::settings::{KnowledgeBaseConfig, LoggingConfig, PersistenceConfig, ProjectConfig};
use crate::tools::ToolsConfig;

/// The closed set of configuration documents the external API serves under
/// `/config/{name}`. Order matters: saves write documents in this sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigDoc {
    Project,
    Forms,
    Tools,
    Persistence,
    Logging,
    Knowledge,
}

impl ConfigDoc {
    pub const ALL: [ConfigDoc; 6] = [
        ConfigDoc::Project,
        ConfigDoc::Forms,
        ConfigDoc::Tools,
        ConfigDoc::Persistence,
        ConfigDoc::Logging,
        ConfigDoc::Knowledge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigDoc::Project => "project",
            ConfigDoc::Forms => "forms",
            ConfigDoc::Tools => "tools",
            ConfigDoc::Persistence => "persistence",
            ConfigDoc::Logging => "logging",
            ConfigDoc::Knowledge => "knowledge",
        }
    }
}

impl fmt::Display for ConfigDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigDoc {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "project" => Ok(ConfigDoc::Project),
            "forms" => Ok(ConfigDoc::Forms),
            "tools" => Ok(ConfigDoc::Tools),
            "persistence" => Ok(ConfigDoc::Persistence),
            "logging" => Ok(ConfigDoc::Logging),
            "knowledge" => Ok(ConfigDoc::Knowledge),
            other => Err(format!(
                "unknown config document '{other}' (expected project, forms, tools, persistence, logging, or knowledge)"
            )),
        }
    }
}

/// The full editable configuration graph for one agent: everything one
/// editing session loads, mutates, and saves as whole documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigBundle {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub forms: FormsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub knowledge: KnowledgeBaseConfig,
}

impl ConfigBundle {
    /// Serialize one document for a whole-document PUT.
    pub fn document(&self, doc: ConfigDoc) -> Result<serde_json::Value, serde_json::Error> {
        match doc {
            ConfigDoc::Project => serde_json::to_value(&self.project),
            ConfigDoc::Forms => serde_json::to_value(&self.forms),
            ConfigDoc::Tools => serde_json::to_value(&self.tools),
            ConfigDoc::Persistence => serde_json::to_value(&self.persistence),
            ConfigDoc::Logging => serde_json::to_value(&self.logging),
            ConfigDoc::Knowledge => serde_json::to_value(&self.knowledge),
        }
    }

    /// Replace one document from its wire representation.
    pub fn set_document(
        &mut self,
        doc: ConfigDoc,
        value: serde_json::Value,
    ) -> Result<(), serde_json::Error> {
        match doc {
            ConfigDoc::Project => self.project = serde_json::from_value(value)?,
            ConfigDoc::Forms => self.forms = serde_json::from_value(value)?,
            ConfigDoc::Tools => self.tools = serde_json::from_value(value)?,
            ConfigDoc::Persistence => self.persistence = serde_json::from_value(value)?,
            ConfigDoc::Logging => self.logging = serde_json::from_value(value)?,
            ConfigDoc::Knowledge => self.knowledge = serde_json::from_value(value)?,
        }
        Ok(())
    }
}
