use std::path::PathBuf;

use clap::Subcommand;
use formloom_client::BuilderClient;
use formloom_core::settings::KnowledgeProvider;
use serde_json::json;

use crate::util::{exit_error, read_json_from_file, render};

#[derive(Subcommand)]
pub enum KbCommands {
    /// List knowledge bases
    List,
    /// Create a knowledge base
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// pgvector, azure_ai_search, or none
        #[arg(long, default_value = "pgvector")]
        provider: String,
    },
    /// Delete a knowledge base and its documents
    Delete { kb_id: i64 },
    /// List ingested files with chunk counts
    Files { kb_id: i64 },
    /// Print stored chunks of one ingested file
    Chunks {
        kb_id: i64,
        #[arg(long)]
        filename: String,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Upload a document file; the server chunks, embeds, and indexes it
    Upload { kb_id: i64, path: PathBuf },
    /// Add one document from text or a JSON file
    AddDoc {
        kb_id: i64,
        /// Document text
        #[arg(long)]
        content: String,
        /// Optional JSON metadata file (use '-' for stdin)
        #[arg(long)]
        metadata_file: Option<String>,
    },
    /// Vector search within a knowledge base
    Search {
        kb_id: i64,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
    /// Delete every chunk ingested from one file
    DeleteFile {
        kb_id: i64,
        #[arg(long)]
        filename: String,
    },
}

fn parse_provider(raw: &str) -> KnowledgeProvider {
    match serde_json::from_value(serde_json::Value::String(raw.to_string())) {
        Ok(provider) => provider,
        Err(_) => exit_error(
            &format!("unknown provider '{raw}'"),
            Some("Expected pgvector, azure_ai_search, or none."),
        ),
    }
}

pub async fn run(builder_url: &str, command: KbCommands) -> i32 {
    let client = BuilderClient::new(builder_url);
    match command {
        KbCommands::List => render(client.knowledge_bases().await),
        KbCommands::Create {
            name,
            description,
            provider,
        } => {
            let provider = parse_provider(&provider);
            render(
                client
                    .create_knowledge_base(&name, &description, provider)
                    .await
                    .map(|id| json!({ "id": id })),
            )
        }
        KbCommands::Delete { kb_id } => render(
            client
                .delete_knowledge_base(kb_id)
                .await
                .map(|()| json!({ "status": "ok" })),
        ),
        KbCommands::Files { kb_id } => render(client.kb_files(kb_id).await),
        KbCommands::Chunks {
            kb_id,
            filename,
            limit,
        } => render(client.kb_file_chunks(kb_id, &filename, limit).await),
        KbCommands::Upload { kb_id, path } => {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    exit_error(&format!("Failed to read '{}': {err}", path.display()), None)
                }
            };
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.txt".to_string());
            render(
                client
                    .upload_kb_file(kb_id, &filename, bytes)
                    .await
                    .map(|indexed| json!({ "indexed": indexed })),
            )
        }
        KbCommands::AddDoc {
            kb_id,
            content,
            metadata_file,
        } => {
            let metadata = metadata_file.map(|path| {
                read_json_from_file(&path).unwrap_or_else(|err| exit_error(&err, None))
            });
            render(
                client
                    .add_kb_document(kb_id, &content, metadata)
                    .await
                    .map(|id| json!({ "id": id })),
            )
        }
        KbCommands::Search {
            kb_id,
            query,
            limit,
        } => render(client.search_kb(kb_id, &query, limit).await),
        KbCommands::DeleteFile { kb_id, filename } => render(
            client
                .delete_kb_file(kb_id, &filename)
                .await
                .map(|deleted| json!({ "deleted": deleted })),
        ),
    }
}
