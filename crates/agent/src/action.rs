//! The action vocabulary
//!
//! The conversational reasoning engine selects actions by name and supplies
//! JSON arguments; [`Action::from_parts`] is that boundary. Arguments are
//! validated here, before any state machine code runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised at the action boundary
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// How the caller proved (or asserted) the customer's identity
///
/// Digit match and an engine-asserted status are both valid gate-setting
/// mechanisms; which one a deployment uses is decided by the argument shape
/// the engine sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentityProof {
    /// Match the last four digits of the account number
    LastFour { last_four_digits: String },
    /// Status asserted by the reasoning engine
    Asserted {
        verified: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

fn default_plan_months() -> u32 {
    6
}

/// Everything the agent may do on a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Verify the customer's identity; gates all account-detail operations
    VerifyIdentity {
        #[serde(flatten)]
        proof: IdentityProof,
    },
    /// Record a debt dispute
    DisputeDebt,
    /// Send a written validation notice (implies an open dispute)
    SendValidation,
    /// Move the payment to a new date
    ReschedulePayment { new_date: String, reason: String },
    /// Offer a monthly payment plan, or start it on confirmation
    OfferOrStartPlan {
        #[serde(default = "default_plan_months")]
        months: u32,
        #[serde(default)]
        start: bool,
    },
    /// Offer a one-time settlement at a percentage of the debt
    OfferSettlement { settlement_percentage: u32 },
    /// Record a hardship claim and adjust the collection approach
    RecordHardship {
        hardship_type: String,
        description: String,
    },
    /// Schedule a callback for a later date and time
    ScheduleCallback {
        date: String,
        time: String,
        reason: String,
    },
    /// Honor a request to cease communication (FDCPA); ends the call
    CeaseCommunication { reason: String },
    /// Look up the creditor's policy on defaulted accounts
    CreditorPolicyLookup,
}

impl Action {
    /// All action names the engine may dispatch.
    pub const NAMES: &'static [&'static str] = &[
        "verify_identity",
        "dispute_debt",
        "send_validation",
        "reschedule_payment",
        "offer_or_start_plan",
        "offer_settlement",
        "record_hardship",
        "schedule_callback",
        "cease_communication",
        "creditor_policy_lookup",
    ];

    /// Build an action from a dispatched name and JSON arguments.
    pub fn from_parts(name: &str, args: Value) -> Result<Self, ActionError> {
        if !Self::NAMES.contains(&name) {
            return Err(ActionError::UnknownAction(name.to_string()));
        }

        let mut object = match args {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(ActionError::InvalidArguments(format!(
                    "arguments must be a JSON object, got {other}"
                )))
            }
        };
        object.insert("action".to_string(), Value::String(name.to_string()));

        let action: Action = serde_json::from_value(Value::Object(object))
            .map_err(|e| ActionError::InvalidArguments(e.to_string()))?;
        action.validate()?;
        Ok(action)
    }

    /// Name used for dispatch and audit event typing.
    pub fn name(&self) -> &'static str {
        match self {
            Action::VerifyIdentity { .. } => "verify_identity",
            Action::DisputeDebt => "dispute_debt",
            Action::SendValidation => "send_validation",
            Action::ReschedulePayment { .. } => "reschedule_payment",
            Action::OfferOrStartPlan { .. } => "offer_or_start_plan",
            Action::OfferSettlement { .. } => "offer_settlement",
            Action::RecordHardship { .. } => "record_hardship",
            Action::ScheduleCallback { .. } => "schedule_callback",
            Action::CeaseCommunication { .. } => "cease_communication",
            Action::CreditorPolicyLookup => "creditor_policy_lookup",
        }
    }

    /// Whether the identity gate must be open before this action runs.
    pub fn requires_verification(&self) -> bool {
        matches!(
            self,
            Action::ReschedulePayment { .. }
                | Action::OfferOrStartPlan { .. }
                | Action::OfferSettlement { .. }
                | Action::RecordHardship { .. }
        )
    }

    /// Validate argument ranges.
    pub fn validate(&self) -> Result<(), ActionError> {
        match self {
            Action::OfferSettlement {
                settlement_percentage,
            } if *settlement_percentage > 100 => Err(ActionError::InvalidArguments(format!(
                "settlement_percentage must be 0-100, got {settlement_percentage}"
            ))),
            Action::OfferOrStartPlan { months: 0, .. } => Err(ActionError::InvalidArguments(
                "months must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
