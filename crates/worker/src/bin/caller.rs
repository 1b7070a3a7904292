//! Run one outbound debt collection call end-to-end.
//!
//! The telephony provider and the reasoning engine are stubbed in-process,
//! so this binary rehearses the full call flow: dispatch metadata in,
//! session/dial rendezvous, a scripted negotiation, graceful hangup, and a
//! transcript artifact out.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use debt_collector_agent::{
    collector_instructions, Action, CallDirective, DebtCollectionAgent, IdentityProof,
};
use debt_collector_config::CallerConfig;
use debt_collector_core::{CallMetadata, ConversationSession, EventLogger};
use debt_collector_session::{
    CallContext, CallCoordinator, ChannelSession, TerminationController, TranscriptSink,
};
use debt_collector_telephony::{RoomName, StubTelephony, TrunkId};
use debt_collector_worker::sample_metadata;

#[derive(Parser)]
#[command(name = "caller", about = "Run one outbound debt collection call")]
struct Args {
    /// Path to dispatch metadata JSON; a built-in sample is used when omitted
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Room to host the call in
    #[arg(long, default_value = "debt-collector-room")]
    room: String,
}

fn load_metadata(args: &Args) -> anyhow::Result<CallMetadata> {
    match &args.metadata {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading metadata from {}", path.display()))?;
            CallMetadata::from_json(&json).context("parsing dispatch metadata")
        }
        None => Ok(sample_metadata()),
    }
}

/// Scripted cooperative-customer exchange driven against the agent.
fn scenario(metadata: &CallMetadata) -> Vec<(String, Action)> {
    vec![
        (
            format!("Yes, I am {}", metadata.customer.name),
            Action::VerifyIdentity {
                proof: IdentityProof::LastFour {
                    last_four_digits: metadata.customer.account_last_four(),
                },
            },
        ),
        (
            "I remember this debt, but I can't pay it all at once".to_string(),
            Action::OfferOrStartPlan {
                months: 6,
                start: false,
            },
        ),
        (
            "Yes, that works for me".to_string(),
            Action::OfferOrStartPlan {
                months: 6,
                start: true,
            },
        ),
    ]
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
    let metadata = load_metadata(&args)?;

    let trunk = if config.has_trunk() {
        TrunkId::from(config.outbound_trunk_id.clone())
    } else {
        tracing::warn!("no outbound trunk configured; using the rehearsal trunk");
        TrunkId::from("ST_rehearsal")
    };

    tracing::debug!(
        instructions = %collector_instructions(&metadata),
        "engine instructions prepared"
    );

    let telephony = StubTelephony::new()
        .with_answer_delay(Duration::from_millis(300))
        .with_join_delay(Duration::from_millis(50));
    let session = Arc::new(ChannelSession::new().with_greeting(format!(
        "Hello, this is Alex calling on behalf of {} regarding your account",
        metadata.debt.creditor
    )));

    let ctx = Arc::new(CallContext::new(RoomName::from(args.room)));
    let sink = Arc::new(TranscriptSink::new(
        &config.transcript_dir,
        &config.transcript_prefix,
        ctx.room().clone(),
    ));
    Arc::clone(&sink).register(&ctx, session.clone() as Arc<dyn ConversationSession>);

    let mut agent = DebtCollectionAgent::new(metadata.clone(), EventLogger::tracing());
    let coordinator = CallCoordinator::new(
        trunk,
        Duration::from_secs(config.participant_join_timeout_secs),
        Arc::new(telephony.clone()),
        Arc::new(telephony.clone()),
    );

    let handle = match coordinator
        .start_call(&ctx, session.clone() as Arc<dyn ConversationSession>, metadata)
        .await
    {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("call attempt failed: {e}");
            return Ok(());
        }
    };

    let termination = TerminationController::new(
        Arc::clone(&ctx),
        Arc::new(telephony.clone()),
        Arc::new(telephony.clone()),
        session.clone() as Arc<dyn ConversationSession>,
        handle.metadata.dial.transfer_to.clone(),
    );

    for (user_text, action) in scenario(&handle.metadata) {
        session.push_user(user_text);
        let outcome = agent.execute(action);
        tracing::info!(reply = %outcome.reply, "action completed");
        if let Some(instruction) = &outcome.speak {
            session.generate_reply(instruction).await?;
        }
        if outcome.directive == CallDirective::EndCall {
            break;
        }
    }

    termination.end_call().await?;
    tracing::info!(room = %handle.room, "call finished");
    Ok(())
}
