//! Conversational session boundary
//!
//! The conversational reasoning engine (LLM, speech recognition, synthesis)
//! is an external collaborator. The core only depends on this surface: start
//! the session, request a spoken reply, observe in-flight speech, and read
//! back the conversation history.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::conversation::Turn;
use crate::error::Result;

/// Events surfaced by a running session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The session is listening; audio/text from the remote party will no
    /// longer be dropped.
    Started,
    /// The reasoning engine was asked to produce a spoken reply.
    ReplyRequested { instruction: String },
}

/// A live conversational session bound to one call
#[async_trait]
pub trait ConversationSession: Send + Sync {
    /// Bring the session up. Resolves once the session is listening.
    async fn start(&self) -> Result<()>;

    /// Ask the reasoning engine to speak a reply following `instruction`.
    async fn generate_reply(&self, instruction: &str) -> Result<()>;

    /// Speech currently queued or playing, if any.
    fn current_speech(&self) -> Option<SpeechHandle>;

    /// Snapshot of the ordered conversation history.
    fn history(&self) -> Vec<Turn>;
}

/// Create a linked speech control/handle pair.
///
/// The engine side holds the [`SpeechControl`] and marks playout finished;
/// any number of observers can wait on cloned [`SpeechHandle`]s.
pub fn speech_channel() -> (SpeechControl, SpeechHandle) {
    let (tx, rx) = watch::channel(false);
    (SpeechControl { done: tx }, SpeechHandle { done: rx })
}

/// Engine-side end of an utterance: marks playout complete
#[derive(Debug)]
pub struct SpeechControl {
    done: watch::Sender<bool>,
}

impl SpeechControl {
    /// Mark the utterance fully played out. Idempotent.
    pub fn mark_played(&self) {
        let _ = self.done.send(true);
    }
}

/// Observer-side handle on an in-flight utterance
#[derive(Debug, Clone)]
pub struct SpeechHandle {
    done: watch::Receiver<bool>,
}

impl SpeechHandle {
    /// True while the utterance has not finished playing.
    pub fn is_playing(&self) -> bool {
        !*self.done.borrow()
    }

    /// Suspend until the utterance has finished playing.
    ///
    /// A dropped [`SpeechControl`] counts as finished; speech whose engine
    /// went away must not wedge call teardown.
    pub async fn wait_for_playout(&self) {
        let mut done = self.done.clone();
        if *done.borrow() {
            return;
        }
        while done.changed().await.is_ok() {
            if *done.borrow() {
                return;
            }
        }
    }
}
