//! In-process conversational session
//!
//! The real reasoning engine lives behind the [`ConversationSession`]
//! boundary. `ChannelSession` is the in-process implementation used for
//! rehearsal runs and tests: it keeps the conversation history, broadcasts
//! session events, and lets the driver simulate in-flight speech. Because no
//! model runs here, a requested reply is recorded as the instruction itself.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use debt_collector_core::{
    speech_channel, ConversationHistory, ConversationSession, Result, SessionEvent, SpeechControl,
    SpeechHandle, Turn,
};

/// Channel-backed session for rehearsal and tests
pub struct ChannelSession {
    history: RwLock<ConversationHistory>,
    events: broadcast::Sender<SessionEvent>,
    current_speech: Mutex<Option<SpeechHandle>>,
    started_at: Mutex<Option<Instant>>,
    start_delay: Duration,
    greeting: Option<String>,
}

impl ChannelSession {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            history: RwLock::new(ConversationHistory::new()),
            events,
            current_speech: Mutex::new(None),
            started_at: Mutex::new(None),
            start_delay: Duration::ZERO,
            greeting: None,
        }
    }

    /// Simulated session startup time.
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// Opening line queued as soon as the session is listening.
    pub fn with_greeting(mut self, text: impl Into<String>) -> Self {
        self.greeting = Some(text.into());
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// When the session finished starting, if it has.
    pub fn started_at(&self) -> Option<Instant> {
        *self.started_at.lock()
    }

    /// Record a turn from the remote party.
    pub fn push_user(&self, text: impl Into<String>) {
        self.history.write().push(Turn::user(text));
    }

    /// Record a turn spoken by the agent.
    pub fn push_assistant(&self, text: impl Into<String>) {
        self.history.write().push(Turn::assistant(text));
    }

    /// Begin an utterance; the returned control marks its playout finished.
    pub fn begin_speech(&self) -> SpeechControl {
        let (control, handle) = speech_channel();
        *self.current_speech.lock() = Some(handle);
        control
    }
}

impl Default for ChannelSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationSession for ChannelSession {
    async fn start(&self) -> Result<()> {
        tokio::time::sleep(self.start_delay).await;
        *self.started_at.lock() = Some(Instant::now());
        if let Some(greeting) = &self.greeting {
            self.history.write().push(Turn::assistant(greeting.clone()));
        }
        let _ = self.events.send(SessionEvent::Started);
        Ok(())
    }

    async fn generate_reply(&self, instruction: &str) -> Result<()> {
        self.history.write().push(Turn::assistant(instruction));
        let _ = self.events.send(SessionEvent::ReplyRequested {
            instruction: instruction.to_string(),
        });
        Ok(())
    }

    fn current_speech(&self) -> Option<SpeechHandle> {
        let mut current = self.current_speech.lock();
        let playing = current.as_ref().is_some_and(|h| h.is_playing());
        if !playing {
            *current = None;
        }
        current.clone()
    }

    fn history(&self) -> Vec<Turn> {
        self.history.read().turns().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_queues_greeting() {
        let session = ChannelSession::new().with_greeting("Hello, this is Alex");
        assert!(session.started_at().is_none());

        session.start().await.unwrap();
        assert!(session.started_at().is_some());
        let history = session.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "Hello, this is Alex");
    }

    #[tokio::test]
    async fn test_finished_speech_is_cleared() {
        let session = ChannelSession::new();
        let control = session.begin_speech();
        assert!(session.current_speech().is_some());

        control.mark_played();
        assert!(session.current_speech().is_none());
    }

    #[tokio::test]
    async fn test_generate_reply_records_turn_and_event() {
        let session = ChannelSession::new();
        let mut events = session.subscribe();

        session.generate_reply("confirm the callback").await.unwrap();

        assert_eq!(session.history()[0].text, "confirm the callback");
        match events.recv().await.unwrap() {
            SessionEvent::ReplyRequested { instruction } => {
                assert_eq!(instruction, "confirm the callback")
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
