//! Session-dial rendezvous
//!
//! Starting a call means bringing two time-sensitive operations together:
//! the conversational session must be listening before the remote party can
//! possibly speak, and the dial blocks until that party answers. The
//! coordinator launches both before awaiting either, so nothing said in the
//! gap between session start and dial answer is lost.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use debt_collector_core::{CallMetadata, ConversationSession};
use debt_collector_telephony::{
    DialProvider, Participant, ParticipantIdentity, RoomName, RoomService, TelephonyError, TrunkId,
};

use crate::context::CallContext;
use crate::SessionError;

/// A live call: metadata plus the joined remote participant
#[derive(Debug, Clone)]
pub struct CallHandle {
    pub metadata: CallMetadata,
    pub room: RoomName,
    pub participant: Participant,
}

/// Starts outbound calls
pub struct CallCoordinator {
    trunk: TrunkId,
    join_timeout: Duration,
    dial: Arc<dyn DialProvider>,
    rooms: Arc<dyn RoomService>,
}

impl CallCoordinator {
    pub fn new(
        trunk: TrunkId,
        join_timeout: Duration,
        dial: Arc<dyn DialProvider>,
        rooms: Arc<dyn RoomService>,
    ) -> Self {
        Self {
            trunk,
            join_timeout,
            dial,
            rooms,
        }
    }

    /// Start the conversational session and the outbound dial, and resolve
    /// their rendezvous.
    ///
    /// On any failure the call context is shut down and the room released;
    /// no conversation proceeds without a connected party.
    pub async fn start_call(
        &self,
        ctx: &Arc<CallContext>,
        session: Arc<dyn ConversationSession>,
        metadata: CallMetadata,
    ) -> Result<CallHandle, SessionError> {
        metadata.validate()?;
        if self.trunk.as_str().trim().is_empty() {
            return Err(SessionError::NoTrunk);
        }

        let identity = ParticipantIdentity::from(metadata.dial.to.clone());
        tracing::info!(room = %ctx.room(), to = %metadata.dial.to, "starting call");

        // Start the session first: if it were sequenced after the dial, the
        // agent could miss whatever the user says right after picking up.
        let session_started: JoinHandle<debt_collector_core::Result<()>> = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.start().await }
        });

        // Dialing blocks until the remote party answers or the attempt
        // definitively fails.
        if let Err(e) = self
            .dial
            .create_outbound_call(ctx.room(), &self.trunk, &metadata.dial.to, &identity)
            .await
        {
            session_started.abort();
            let err = match e {
                TelephonyError::Dial { status } => {
                    tracing::error!(
                        room = %ctx.room(),
                        sip_status_code = %status.code,
                        sip_status = %status.message,
                        "error dialing remote party"
                    );
                    SessionError::Dial { status }
                }
                other => other.into(),
            };
            self.abandon(ctx).await;
            return Err(err);
        }

        // The dial answered; make sure the session itself came up.
        match session_started.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.abandon(ctx).await;
                return Err(SessionError::SessionStart(e.to_string()));
            }
            Err(e) => {
                self.abandon(ctx).await;
                return Err(SessionError::SessionStart(e.to_string()));
            }
        }

        // Bounded wait for the answered party to appear in the room.
        let participant = match tokio::time::timeout(
            self.join_timeout,
            self.rooms.wait_for_participant(ctx.room(), &identity),
        )
        .await
        {
            Ok(Ok(participant)) => participant,
            Ok(Err(e)) => {
                self.abandon(ctx).await;
                return Err(e.into());
            }
            Err(_) => {
                tracing::error!(room = %ctx.room(), identity = %identity, "participant join timed out");
                self.abandon(ctx).await;
                return Err(SessionError::JoinTimeout { identity });
            }
        };

        tracing::info!(room = %ctx.room(), participant = %participant.identity, "participant joined");
        Ok(CallHandle {
            metadata,
            room: ctx.room().clone(),
            participant,
        })
    }

    /// Failure path: release the room and shut the context down.
    async fn abandon(&self, ctx: &Arc<CallContext>) {
        match self.rooms.delete_room(ctx.room()).await {
            Ok(()) | Err(TelephonyError::RoomNotFound(_)) => {}
            Err(e) => tracing::warn!(room = %ctx.room(), "failed to release room: {e}"),
        }
        ctx.shutdown().await;
    }
}
