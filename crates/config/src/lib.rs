//! Configuration for the outbound debt collection worker
//!
//! Settings are layered: built-in defaults, then an optional `Caller.toml`
//! in the working directory, then `DEBT_COLLECTOR_*` environment variables
//! (e.g. `DEBT_COLLECTOR_OUTBOUND_TRUNK_ID`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Worker configuration for placing outbound calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerConfig {
    /// Agent name the dispatch addresses
    pub agent_name: String,
    /// SIP trunk used for outbound dialing; empty means dialing is not
    /// configured and no call can start
    pub outbound_trunk_id: String,
    /// Directory transcripts are written to at call end
    pub transcript_dir: PathBuf,
    /// Filename prefix for transcript artifacts
    pub transcript_prefix: String,
    /// Bounded wait for the remote participant to join after the dial is
    /// answered
    pub participant_join_timeout_secs: u64,
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            agent_name: "outbound-caller".to_string(),
            outbound_trunk_id: String::new(),
            transcript_dir: PathBuf::from("logs"),
            transcript_prefix: "transcript".to_string(),
            participant_join_timeout_secs: 30,
        }
    }
}

impl CallerConfig {
    /// Load configuration from `Caller.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("Caller")
    }

    /// Load with an explicit file stem (without extension).
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let defaults = CallerConfig::default();
        let settings = config::Config::builder()
            .set_default("agent_name", defaults.agent_name)?
            .set_default("outbound_trunk_id", defaults.outbound_trunk_id)?
            .set_default(
                "transcript_dir",
                defaults.transcript_dir.to_string_lossy().to_string(),
            )?
            .set_default("transcript_prefix", defaults.transcript_prefix)?
            .set_default(
                "participant_join_timeout_secs",
                defaults.participant_join_timeout_secs,
            )?
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix("DEBT_COLLECTOR"))
            .build()?;

        let loaded: CallerConfig = settings.try_deserialize()?;
        tracing::debug!(
            agent_name = %loaded.agent_name,
            join_timeout_secs = loaded.participant_join_timeout_secs,
            "caller configuration loaded"
        );
        Ok(loaded)
    }

    /// Whether an outbound trunk is configured.
    pub fn has_trunk(&self) -> bool {
        !self.outbound_trunk_id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CallerConfig::default();
        assert_eq!(config.agent_name, "outbound-caller");
        assert_eq!(config.transcript_prefix, "transcript");
        assert_eq!(config.participant_join_timeout_secs, 30);
        assert!(!config.has_trunk());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = CallerConfig::load_from("does-not-exist").unwrap();
        assert_eq!(config.agent_name, "outbound-caller");
        assert_eq!(config.transcript_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Caller.toml");
        std::fs::write(
            &path,
            "agent_name = \"collections-1\"\noutbound_trunk_id = \"ST_trunk\"\n",
        )
        .unwrap();

        let stem = dir.path().join("Caller");
        let config = CallerConfig::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(config.agent_name, "collections-1");
        assert!(config.has_trunk());
        // Untouched keys keep their defaults.
        assert_eq!(config.participant_join_timeout_secs, 30);
    }
}
