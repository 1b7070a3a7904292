//! Create a dispatch that triggers the collection agent to place a call.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use debt_collector_config::CallerConfig;
use debt_collector_core::CallMetadata;
use debt_collector_worker::{
    sample_metadata, Dispatch, DispatchClient, LoggingDispatchClient,
};

#[derive(Parser)]
#[command(name = "dispatch", about = "Create a call dispatch for the collection agent")]
struct Args {
    /// Path to dispatch metadata JSON; a built-in sample is used when omitted
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Room the dispatched call will be hosted in
    #[arg(long, default_value = "debt-collector-room")]
    room: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = CallerConfig::load()?;

    let metadata = match &args.metadata {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading metadata from {}", path.display()))?;
            CallMetadata::from_json(&json).context("parsing dispatch metadata")?
        }
        None => sample_metadata(),
    };

    let client = LoggingDispatchClient::new();
    let dispatch = Dispatch {
        agent_name: config.agent_name.clone(),
        room: args.room.clone(),
        metadata,
    };

    let info = client.create_dispatch(&dispatch).await?;
    println!("Created dispatch: {}", serde_json::to_string_pretty(&info)?);

    let dispatches = client.list_dispatches(&args.room).await?;
    println!("There are {} dispatches in {}", dispatches.len(), args.room);
    Ok(())
}
