//! Core types for the outbound debt collection agent
//!
//! This crate provides foundational types used across all other crates:
//! - Call metadata ingested from a dispatch (customer, debt, dial details)
//! - Audit events and the event logger
//! - Conversation turns and the append-only history
//! - The conversational session boundary (start, reply, speech playout)
//! - Error types

pub mod conversation;
pub mod error;
pub mod event;
pub mod metadata;
pub mod session;

pub use conversation::{ConversationHistory, Turn, TurnRole};
pub use error::{Error, Result};
pub use event::{Event, EventLogger, EventSink, MemoryEventSink, TracingEventSink};
pub use metadata::{CallMetadata, Customer, Debt, DebtStatus, Dial};
pub use session::{
    speech_channel, ConversationSession, SessionEvent, SpeechControl, SpeechHandle,
};
