//! Audit events
//!
//! Every compliance-relevant action produces exactly one [`Event`]. Events are
//! appended synchronously through an [`EventSink`]; a failing sink must never
//! block or fail a call action, so append failures are swallowed with a
//! warning. Amounts in event data are serialized as decimal strings so the
//! audit trail carries no floating-point drift.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// One structured, timestamped audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Name of the action that produced this record
    pub event_type: String,
    /// When the action completed
    pub timestamp: DateTime<Utc>,
    /// Account the action applies to
    pub account_number: String,
    /// The action's inputs (and computed figures, as decimal strings)
    pub data: Map<String, Value>,
}

impl Event {
    pub fn new(
        event_type: impl Into<String>,
        account_number: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: Utc::now(),
            account_number: account_number.into(),
            data,
        }
    }
}

/// Destination for audit records
pub trait EventSink: Send + Sync {
    /// Append one record. Implementations must not retry.
    fn append(&self, event: &Event) -> Result<()>;
}

/// Sink that emits one JSON line per record through `tracing`
///
/// Records land on the `audit` target so operational log tooling can filter
/// them out of the regular application log stream.
#[derive(Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn append(&self, event: &Event) -> Result<()> {
        let line = serde_json::to_string(event)?;
        tracing::info!(
            target: "audit",
            event_type = %event.event_type,
            account_number = %event.account_number,
            "{line}"
        );
        Ok(())
    }
}

/// In-memory sink, drained at shutdown (also used by tests)
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<Event>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Drain all buffered records, leaving the sink empty.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemoryEventSink {
    fn append(&self, event: &Event) -> Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Synchronous, in-process audit logger
///
/// Cheap to clone; all clones share the same sink.
#[derive(Clone)]
pub struct EventLogger {
    sink: Arc<dyn EventSink>,
}

impl EventLogger {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Logger backed by the tracing sink.
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingEventSink))
    }

    /// Append one record. Sink failure is reported as a warning and
    /// otherwise ignored; a call action never fails because of logging.
    pub fn emit(
        &self,
        event_type: impl Into<String>,
        account_number: impl Into<String>,
        data: Map<String, Value>,
    ) {
        let event = Event::new(event_type, account_number, data);
        if let Err(e) = self.sink.append(&event) {
            tracing::warn!(event_type = %event.event_type, "failed to append audit event: {e}");
        }
    }
}

impl std::fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLogger").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FailingSink;

    impl EventSink for FailingSink {
        fn append(&self, _event: &Event) -> Result<()> {
            Err(Error::Session("sink unavailable".into()))
        }
    }

    #[test]
    fn test_memory_sink_appends() {
        let sink = Arc::new(MemoryEventSink::new());
        let logger = EventLogger::new(sink.clone());

        let mut data = Map::new();
        data.insert("months".into(), serde_json::json!(6));
        logger.emit("payment_plan_offered", "5033-4329", data);

        let events = sink.snapshot();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "payment_plan_offered");
        assert_eq!(events[0].account_number, "5033-4329");
        assert_eq!(events[0].data["months"], serde_json::json!(6));
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let logger = EventLogger::new(Arc::new(FailingSink));
        // Must not panic or propagate.
        logger.emit("debt_disputed", "5033-4329", Map::new());
    }

    #[test]
    fn test_drain_empties_sink() {
        let sink = MemoryEventSink::new();
        sink.append(&Event::new("cease_communication", "1111", Map::new()))
            .unwrap();
        assert_eq!(sink.drain().len(), 1);
        assert!(sink.is_empty());
    }
}
