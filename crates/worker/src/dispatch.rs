//! Dispatch creation boundary
//!
//! A dispatch tells the agent worker to place one call, carrying the call
//! metadata as JSON. The real dispatch service is external; the logging
//! client stands in for it during rehearsal.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use debt_collector_core::CallMetadata;

/// Dispatch service errors
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch provider error: {0}")]
    Provider(String),
}

/// Request for the agent to place one call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatch {
    pub agent_name: String,
    pub room: String,
    pub metadata: CallMetadata,
}

/// A created dispatch, as reported by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchInfo {
    pub id: String,
    pub agent_name: String,
    pub room: String,
}

/// Client for the external dispatch service
#[async_trait]
pub trait DispatchClient: Send + Sync {
    async fn create_dispatch(&self, dispatch: &Dispatch) -> Result<DispatchInfo, DispatchError>;

    async fn list_dispatches(&self, room: &str) -> Result<Vec<DispatchInfo>, DispatchError>;
}

/// In-process client that records dispatches and logs them
#[derive(Default)]
pub struct LoggingDispatchClient {
    created: Mutex<Vec<DispatchInfo>>,
}

impl LoggingDispatchClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DispatchClient for LoggingDispatchClient {
    async fn create_dispatch(&self, dispatch: &Dispatch) -> Result<DispatchInfo, DispatchError> {
        let info = DispatchInfo {
            id: uuid::Uuid::new_v4().to_string(),
            agent_name: dispatch.agent_name.clone(),
            room: dispatch.room.clone(),
        };

        tracing::info!(
            dispatch_id = %info.id,
            agent_name = %info.agent_name,
            room = %info.room,
            account_number = %dispatch.metadata.customer.account_number,
            "created dispatch"
        );
        self.created.lock().push(info.clone());
        Ok(info)
    }

    async fn list_dispatches(&self, room: &str) -> Result<Vec<DispatchInfo>, DispatchError> {
        Ok(self
            .created
            .lock()
            .iter()
            .filter(|d| d.room == room)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_metadata;

    #[tokio::test]
    async fn test_created_dispatches_are_listed_by_room() {
        let client = LoggingDispatchClient::new();
        let dispatch = Dispatch {
            agent_name: "outbound-caller".into(),
            room: "debt-collector-room".into(),
            metadata: sample_metadata(),
        };

        let info = client.create_dispatch(&dispatch).await.unwrap();
        assert!(!info.id.is_empty());

        let listed = client.list_dispatches("debt-collector-room").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(client.list_dispatches("other-room").await.unwrap().is_empty());
    }
}
