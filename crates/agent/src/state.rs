//! Per-call agent state
//!
//! One value per call, owned exclusively by that call's
//! [`DebtCollectionAgent`](crate::DebtCollectionAgent). Every flag is
//! monotonic: once set it stays set for the life of the call, so the fields
//! are private and the API is set-only.

use serde::Serialize;

/// Compliance flags for one call
#[derive(Debug, Default, Clone, Serialize)]
pub struct AgentState {
    verified: bool,
    debt_disputed: bool,
    hardship_claimed: bool,
    payment_plan_offered: bool,
    payment_plan_started: bool,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity verification has succeeded; account details may be shared.
    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn debt_disputed(&self) -> bool {
        self.debt_disputed
    }

    pub fn hardship_claimed(&self) -> bool {
        self.hardship_claimed
    }

    pub fn payment_plan_offered(&self) -> bool {
        self.payment_plan_offered
    }

    pub fn payment_plan_started(&self) -> bool {
        self.payment_plan_started
    }

    pub(crate) fn mark_verified(&mut self) {
        self.verified = true;
    }

    pub(crate) fn mark_disputed(&mut self) {
        self.debt_disputed = true;
    }

    pub(crate) fn mark_hardship_claimed(&mut self) {
        self.hardship_claimed = true;
    }

    pub(crate) fn mark_plan_offered(&mut self) {
        self.payment_plan_offered = true;
    }

    pub(crate) fn mark_plan_started(&mut self) {
        self.payment_plan_started = true;
    }
}
