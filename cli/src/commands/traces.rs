use clap::Args;
use formloom_client::BuilderClient;

use crate::util::render;

#[derive(Args)]
pub struct TracesArgs {
    /// Only traces for this thread
    #[arg(long)]
    pub thread_id: Option<String>,
}

pub async fn run(builder_url: &str, args: TracesArgs) -> i32 {
    let client = BuilderClient::new(builder_url);
    render(client.traces(args.thread_id.as_deref()).await)
}
