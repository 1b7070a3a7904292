//! Compliance state machine for debt collection calls
//!
//! Features:
//! - Closed action vocabulary with typed, boundary-validated arguments
//! - Per-call agent state with monotonic compliance flags
//! - Identity verification gate enforced on every account-detail operation
//! - One audit event per completed action
//! - Prompt construction for the collector and the rehearsal customer

pub mod action;
pub mod collector;
pub mod prompt;
pub mod state;

pub use action::{Action, ActionError, IdentityProof};
pub use collector::{ActionOutcome, CallDirective, DebtCollectionAgent};
pub use prompt::{collector_instructions, customer_instructions};
pub use state::AgentState;
