use std::path::PathBuf;

use clap::{Args, Subcommand};
use formloom_client::BuilderClient;
use formloom_core::views::SubmissionFilter;
use serde_json::json;

use crate::util::{exit_error, render, render_error};

#[derive(Subcommand)]
pub enum SubmissionCommands {
    /// List captured submissions
    List(FilterArgs),
    /// Export matching submissions as CSV (stdout unless --out is given)
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Write the CSV to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct FilterArgs {
    /// Only submissions of this form
    #[arg(long)]
    pub form_id: Option<String>,
    /// Only submissions from this thread
    #[arg(long)]
    pub thread_id: Option<String>,
    /// Only submissions with this delivery type (e.g. webhook, sheets)
    #[arg(long)]
    pub delivery_type: Option<String>,
    /// Only submissions on or after this date (RFC3339)
    #[arg(long)]
    pub start_date: Option<String>,
    /// Only submissions on or before this date (RFC3339)
    #[arg(long)]
    pub end_date: Option<String>,
    /// Maximum number of submissions to return
    #[arg(long)]
    pub limit: Option<u32>,
    /// Listing offset for pagination
    #[arg(long)]
    pub offset: Option<u32>,
}

impl FilterArgs {
    fn into_filter(self) -> SubmissionFilter {
        SubmissionFilter {
            form_id: self.form_id.map(Into::into),
            thread_id: self.thread_id,
            delivery_type: self.delivery_type,
            start_date: self.start_date,
            end_date: self.end_date,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

pub async fn run(builder_url: &str, command: SubmissionCommands) -> i32 {
    let client = BuilderClient::new(builder_url);
    match command {
        SubmissionCommands::List(filter) => {
            render(client.submissions(&filter.into_filter()).await)
        }
        SubmissionCommands::Export { filter, out } => {
            let csv = match client.export_submissions(&filter.into_filter()).await {
                Ok(csv) => csv,
                Err(err) => return render_error(err),
            };
            match out {
                Some(path) => {
                    if let Err(err) = std::fs::write(&path, csv) {
                        exit_error(&format!("Failed to write '{}': {err}", path.display()), None);
                    }
                    render::<serde_json::Value>(Ok(json!({
                        "status": "ok",
                        "out": path.display().to_string(),
                    })))
                }
                None => {
                    print!("{csv}");
                    crate::util::EXIT_OK
                }
            }
        }
    }
}
