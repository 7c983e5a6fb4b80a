use std::path::{Path, PathBuf};

use clap::Subcommand;
use formloom_client::{BuilderClient, ClientError, ConfigStore};
use formloom_core::bundle::{ConfigBundle, ConfigDoc};
use formloom_core::validate::validate_bundle;
use serde_json::json;

use crate::util::{exit_error, read_json_from_file, render, render_error};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one draft configuration document
    Show {
        /// Document name (project, forms, tools, persistence, logging, knowledge)
        doc: String,
    },
    /// Download all draft documents into a directory as JSON files
    Pull {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Validate local document files, then save them all (sequential PUTs,
    /// no rollback on mid-sequence failure)
    Push {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Replace one draft document from a JSON file (use '-' for stdin)
    Set {
        /// Document name
        doc: String,
        /// JSON file with the document body
        #[arg(long)]
        file: String,
    },
    /// Snapshot the saved draft into a new published version
    Publish,
    /// List published versions
    Versions,
    /// Print the full config snapshot of one published version
    Version { version: i64 },
}

pub async fn run(builder_url: &str, command: ConfigCommands) -> i32 {
    let client = BuilderClient::new(builder_url);
    match command {
        ConfigCommands::Show { doc } => show(&client, &doc).await,
        ConfigCommands::Pull { dir } => pull(&client, &dir).await,
        ConfigCommands::Push { dir } => push(&client, &dir).await,
        ConfigCommands::Set { doc, file } => set(&client, &doc, &file).await,
        ConfigCommands::Publish => render(client.publish().await),
        ConfigCommands::Versions => render(client.versions().await),
        ConfigCommands::Version { version } => render(client.version(version).await),
    }
}

fn parse_doc(raw: &str) -> ConfigDoc {
    raw.parse()
        .unwrap_or_else(|err: String| exit_error(&err, None))
}

async fn show(client: &BuilderClient, doc: &str) -> i32 {
    render(client.get_config(parse_doc(doc)).await)
}

async fn pull(client: &BuilderClient, dir: &Path) -> i32 {
    if let Err(err) = std::fs::create_dir_all(dir) {
        exit_error(&format!("Failed to create '{}': {err}", dir.display()), None);
    }
    for doc in ConfigDoc::ALL {
        let value = match client.get_config(doc).await {
            Ok(value) => value,
            Err(err) => return render_error(err),
        };
        let path = dir.join(format!("{doc}.json"));
        let body = serde_json::to_string_pretty(&value).unwrap();
        if let Err(err) = std::fs::write(&path, body) {
            exit_error(&format!("Failed to write '{}': {err}", path.display()), None);
        }
    }
    render::<serde_json::Value>(Ok(json!({
        "status": "ok",
        "dir": dir.display().to_string(),
        "documents": ConfigDoc::ALL.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
    })))
}

fn read_bundle_from_dir(dir: &Path) -> ConfigBundle {
    let mut bundle = ConfigBundle::default();
    for doc in ConfigDoc::ALL {
        let path = dir.join(format!("{doc}.json"));
        let value = read_json_from_file(&path.display().to_string())
            .unwrap_or_else(|err| exit_error(&err, Some("Run `formloom config pull` first.")));
        if let Err(err) = bundle.set_document(doc, value) {
            exit_error(&format!("Invalid {doc} document: {err}"), None);
        }
    }
    bundle
}

async fn push(client: &BuilderClient, dir: &Path) -> i32 {
    let bundle = read_bundle_from_dir(dir);

    // Non-blocking findings go to stderr; the webhook gate inside save_all
    // is the only thing that stops the push.
    let findings = validate_bundle(&bundle);
    if !findings.is_empty() {
        eprintln!("{}", serde_json::to_string_pretty(&findings).unwrap());
    }

    let mut store = ConfigStore::new(client.clone());
    store.set_bundle(bundle);
    let result = store.save_all().await;
    let status = store.status().unwrap_or_default().to_string();
    match result {
        Ok(()) => render::<serde_json::Value>(Ok(json!({ "status": status }))),
        Err(err) => {
            // The status carries the partial-save detail; surface both.
            eprintln!("{}", serde_json::to_string_pretty(&json!({ "status": status })).unwrap());
            render_error(err)
        }
    }
}

async fn set(client: &BuilderClient, doc: &str, file: &str) -> i32 {
    let doc = parse_doc(doc);
    let value = read_json_from_file(file).unwrap_or_else(|err| exit_error(&err, None));

    // Reject documents that do not match the schema before they reach the
    // server.
    let mut probe = ConfigBundle::default();
    if let Err(source) = probe.set_document(doc, value.clone()) {
        return render_error(ClientError::Document { doc, source });
    }

    match client.put_config(doc, &value).await {
        Ok(()) => render::<serde_json::Value>(Ok(json!({ "status": "ok", "doc": doc.as_str() }))),
        Err(err) => render_error(err),
    }
}

#[cfg(test)]
mod tests {
    use formloom_core::bundle::ConfigDoc;

    #[test]
    fn every_document_gets_a_distinct_file_name() {
        let names: std::collections::HashSet<String> = ConfigDoc::ALL
            .iter()
            .map(|doc| format!("{doc}.json"))
            .collect();
        assert_eq!(names.len(), ConfigDoc::ALL.len());
    }
}
