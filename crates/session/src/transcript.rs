//! Transcript persistence
//!
//! The full conversation history is serialized to a uniquely named JSON
//! artifact exactly once per call, when the call context shuts down. The
//! call is already over by then, so a write failure is only a warning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use debt_collector_core::{ConversationSession, Turn};
use debt_collector_telephony::RoomName;

use crate::context::CallContext;

/// Writes the transcript artifact for one call
pub struct TranscriptSink {
    dir: PathBuf,
    prefix: String,
    room: RoomName,
    written: Mutex<bool>,
}

impl TranscriptSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, room: RoomName) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            room,
            written: Mutex::new(false),
        }
    }

    /// Register the sink as a shutdown hook on the call context.
    pub fn register(self: Arc<Self>, ctx: &CallContext, session: Arc<dyn ConversationSession>) {
        ctx.add_shutdown_callback(move || {
            Box::pin(async move {
                self.flush(&session.history());
            })
        });
    }

    /// Serialize the ordered turn sequence to disk. Only the first call
    /// writes; failure is reported as a warning and swallowed.
    pub fn flush(&self, turns: &[Turn]) {
        {
            let mut written = self.written.lock();
            if *written {
                return;
            }
            *written = true;
        }

        let path = self.artifact_path();
        tracing::info!(room = %self.room, path = %path.display(), "saving transcript");
        if let Err(e) = self.write_artifact(&path, turns) {
            tracing::warn!(room = %self.room, "failed to save transcript: {e}");
        }
    }

    fn artifact_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        self.dir
            .join(format!("{}_{}_{stamp}.json", self.prefix, self.room))
    }

    fn write_artifact(&self, path: &Path, turns: &[Turn]) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let artifact = serde_json::json!({
            "room": self.room,
            "saved_at": Utc::now(),
            "turns": turns,
        });
        let json = serde_json::to_vec_pretty(&artifact)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_artifacts(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    #[test]
    fn test_flush_writes_ordered_turns() {
        let dir = tempfile::tempdir().unwrap();
        let sink = TranscriptSink::new(dir.path(), "transcript", RoomName::from("room-1"));
        let turns = vec![Turn::assistant("hello"), Turn::user("who is this?")];

        sink.flush(&turns);

        let files = list_artifacts(dir.path());
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("transcript_room-1_"));
        assert!(name.ends_with(".json"));

        let artifact: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&files[0]).unwrap()).unwrap();
        assert_eq!(artifact["room"], "room-1");
        assert_eq!(artifact["turns"][0]["text"], "hello");
        assert_eq!(artifact["turns"][1]["role"], "user");
    }

    #[test]
    fn test_flush_is_write_once() {
        let dir = tempfile::tempdir().unwrap();
        let sink = TranscriptSink::new(dir.path(), "transcript", RoomName::from("room-1"));

        sink.flush(&[Turn::assistant("hello")]);
        sink.flush(&[Turn::assistant("hello"), Turn::user("more")]);

        assert_eq!(list_artifacts(dir.path()).len(), 1);
    }

    #[test]
    fn test_unwritable_dir_only_warns() {
        let sink = TranscriptSink::new(
            "/proc/definitely-not-writable",
            "transcript",
            RoomName::from("room-1"),
        );
        // Must not panic.
        sink.flush(&[Turn::assistant("hello")]);
    }
}
