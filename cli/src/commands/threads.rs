use clap::Subcommand;
use formloom_client::BuilderClient;

use crate::util::render;

#[derive(Subcommand)]
pub enum ThreadCommands {
    /// List conversation threads, newest activity first
    List,
    /// Print a thread's message history
    Messages { thread_id: String },
}

pub async fn run(builder_url: &str, command: ThreadCommands) -> i32 {
    let client = BuilderClient::new(builder_url);
    match command {
        ThreadCommands::List => render(client.threads().await),
        ThreadCommands::Messages { thread_id } => render(client.thread_messages(&thread_id).await),
    }
}
