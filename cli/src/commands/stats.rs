use clap::Subcommand;
use formloom_client::BuilderClient;

use crate::util::render;

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Usage counters for the dashboard
    Usage,
}

pub async fn agents(builder_url: &str) -> i32 {
    render(BuilderClient::new(builder_url).agents().await)
}

pub async fn run(builder_url: &str, command: StatsCommands) -> i32 {
    let client = BuilderClient::new(builder_url);
    match command {
        StatsCommands::Usage => render(client.usage_stats().await),
    }
}
