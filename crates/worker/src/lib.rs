//! Worker support library
//!
//! The binaries in this crate drive one call end-to-end (`caller`) and
//! create dispatches for the agent to pick up (`dispatch`). The dispatch
//! service itself is an external collaborator reached through
//! [`DispatchClient`].

pub mod dispatch;

pub use dispatch::{Dispatch, DispatchClient, DispatchError, DispatchInfo, LoggingDispatchClient};

use debt_collector_core::CallMetadata;

/// Sample dispatch metadata used when none is supplied.
///
/// The dial targets come from `TWILIO_PHONE_TO` / `TRANSFER_PHONE_NUMBER`
/// when set, mirroring how dispatches are created in production.
pub fn sample_metadata() -> CallMetadata {
    let to = std::env::var("TWILIO_PHONE_TO").unwrap_or_else(|_| "+15551234567".to_string());
    let transfer_to = std::env::var("TRANSFER_PHONE_NUMBER").ok();

    let metadata = serde_json::json!({
        "customer": {"name": "Alex Johnson", "account_number": "5033-4329"},
        "debt": {
            "age": "2 months",
            "amount": 150.75,
            "creditor": "Bank of America",
            "type": "Credit Card"
        },
        "dial": {"to": to, "transfer_to": transfer_to}
    });

    CallMetadata::from_json(&metadata.to_string()).expect("sample metadata is valid")
}
