//! Call termination and transfer
//!
//! Deleting the call's room is the sole hangup mechanism. The controller
//! never cuts off speech already queued for playback, and treats a room that
//! is already gone as a successful hangup.

use std::sync::Arc;

use debt_collector_core::ConversationSession;
use debt_collector_telephony::{
    ParticipantIdentity, RoomService, TelephonyError, TransferService,
};

use crate::context::CallContext;
use crate::SessionError;

/// Result of a transfer attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The provider accepted the transfer; the call now belongs to a human
    Completed,
    /// No transfer target is staffed; the refusal is spoken, the call goes on
    Unavailable,
    /// The provider rejected the transfer; an apology is spoken, the call
    /// goes on
    Failed,
}

impl TransferOutcome {
    /// Text handed back to the reasoning engine.
    pub fn reply(&self) -> &'static str {
        match self {
            TransferOutcome::Completed => "transferring the call to a human agent",
            TransferOutcome::Unavailable => "sorry, cannot transfer the call at the moment",
            TransferOutcome::Failed => "the transfer could not be completed",
        }
    }
}

/// Owns the terminal actions for one call
pub struct TerminationController {
    ctx: Arc<CallContext>,
    rooms: Arc<dyn RoomService>,
    transfers: Arc<dyn TransferService>,
    session: Arc<dyn ConversationSession>,
    transfer_to: Option<String>,
}

impl TerminationController {
    pub fn new(
        ctx: Arc<CallContext>,
        rooms: Arc<dyn RoomService>,
        transfers: Arc<dyn TransferService>,
        session: Arc<dyn ConversationSession>,
        transfer_to: Option<String>,
    ) -> Self {
        Self {
            ctx,
            rooms,
            transfers,
            session,
            transfer_to,
        }
    }

    /// End the call once the agent has finished saying whatever is queued.
    pub async fn end_call(&self) -> Result<(), SessionError> {
        tracing::info!(room = %self.ctx.room(), "ending the call");

        if let Some(speech) = self.session.current_speech() {
            speech.wait_for_playout().await;
        }

        self.hangup().await
    }

    /// The answering party is a machine; hang up immediately.
    pub async fn detected_answering_machine(&self) -> Result<(), SessionError> {
        tracing::info!(room = %self.ctx.room(), "detected answering machine");
        self.hangup().await
    }

    /// Hand the call to the configured human agent.
    ///
    /// Provider errors never terminate the call: the party is told the
    /// transfer failed and the conversation continues.
    pub async fn transfer_call(&self, participant: &ParticipantIdentity) -> TransferOutcome {
        let transfer_to = match self.transfer_to.as_deref() {
            Some(to) if !to.trim().is_empty() => to,
            _ => return TransferOutcome::Unavailable,
        };

        tracing::info!(room = %self.ctx.room(), to = %transfer_to, "transferring call");
        match self
            .transfers
            .transfer_participant(self.ctx.room(), participant, &format!("tel:{transfer_to}"))
            .await
        {
            Ok(()) => {
                tracing::info!(room = %self.ctx.room(), to = %transfer_to, "transferred call");
                TransferOutcome::Completed
            }
            Err(e) => {
                tracing::error!(room = %self.ctx.room(), "error transferring call: {e}");
                if let Err(e) = self
                    .session
                    .generate_reply("there was an error transferring the call")
                    .await
                {
                    tracing::warn!("failed to request transfer apology: {e}");
                }
                TransferOutcome::Failed
            }
        }
    }

    /// Delete the room. A room that is already gone counts as hung up.
    async fn hangup(&self) -> Result<(), SessionError> {
        match self.rooms.delete_room(self.ctx.room()).await {
            Ok(()) => {}
            Err(TelephonyError::RoomNotFound(room)) => {
                tracing::debug!(%room, "room already deleted");
            }
            Err(e) => return Err(e.into()),
        }
        self.ctx.shutdown().await;
        Ok(())
    }
}
