//! The debt collection agent state machine
//!
//! One instance per call, driven strictly sequentially by the conversational
//! reasoning engine (at most one action at a time per call, so no internal
//! locking). Every account-detail operation checks the verification gate at
//! entry; every completed action emits exactly one audit event.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Map, Value};

use debt_collector_core::{CallMetadata, EventLogger};

use crate::action::{Action, IdentityProof};
use crate::state::AgentState;

/// What the call should do after an action completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallDirective {
    /// Keep the conversation going
    #[default]
    Continue,
    /// Gracefully terminate once the current reply has been spoken
    EndCall,
}

/// Result of executing one action
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    /// Textual/structured result handed back to the reasoning engine
    pub reply: String,
    /// Instruction for the spoken reply, when the engine should speak one
    pub speak: Option<String>,
    /// Whether and how the call should wind down
    pub directive: CallDirective,
    /// True when the verification gate (or argument validation) refused the
    /// action; the engine must withhold account specifics and either retry
    /// verification or close the call
    pub refused: bool,
}

impl ActionOutcome {
    fn reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            speak: None,
            directive: CallDirective::Continue,
            refused: false,
        }
    }

    fn with_speak(mut self, instruction: impl Into<String>) -> Self {
        self.speak = Some(instruction.into());
        self
    }

    fn ending_call(mut self) -> Self {
        self.directive = CallDirective::EndCall;
        self
    }

    fn refusal(reply: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            speak: Some(instruction.into()),
            directive: CallDirective::Continue,
            refused: true,
        }
    }
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compliance state machine for one call
pub struct DebtCollectionAgent {
    metadata: CallMetadata,
    state: AgentState,
    events: EventLogger,
}

impl DebtCollectionAgent {
    pub fn new(metadata: CallMetadata, events: EventLogger) -> Self {
        Self {
            metadata,
            state: AgentState::new(),
            events,
        }
    }

    pub fn metadata(&self) -> &CallMetadata {
        &self.metadata
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Execute one action, enforcing the verification gate and argument
    /// validation before any state changes.
    pub fn execute(&mut self, action: Action) -> ActionOutcome {
        if let Err(e) = action.validate() {
            tracing::warn!(action = action.name(), "rejected action: {e}");
            return ActionOutcome::refusal(
                format!("{e}"),
                "Apologize that the request could not be processed as stated and ask the \
                 customer to rephrase it",
            );
        }

        if action.requires_verification() && !self.state.verified() {
            return self.refuse_unverified(action.name());
        }

        match action {
            Action::VerifyIdentity { proof } => self.verify_identity(proof),
            Action::DisputeDebt => self.dispute_debt(),
            Action::SendValidation => self.send_validation(),
            Action::ReschedulePayment { new_date, reason } => {
                self.reschedule_payment(new_date, reason)
            }
            Action::OfferOrStartPlan { months, start } => self.offer_or_start_plan(months, start),
            Action::OfferSettlement {
                settlement_percentage,
            } => self.offer_settlement(settlement_percentage),
            Action::RecordHardship {
                hardship_type,
                description,
            } => self.record_hardship(hardship_type, description),
            Action::ScheduleCallback { date, time, reason } => {
                self.schedule_callback(date, time, reason)
            }
            Action::CeaseCommunication { reason } => self.cease_communication(reason),
            Action::CreditorPolicyLookup => self.creditor_policy_lookup(),
        }
    }

    fn emit(&self, event_type: &str, data: Map<String, Value>) {
        self.events
            .emit(event_type, &self.metadata.customer.account_number, data);
    }

    fn refuse_unverified(&self, action: &str) -> ActionOutcome {
        tracing::info!(action, "refusing action before identity verification");
        let mut data = Map::new();
        data.insert("action".into(), json!(action));
        self.emit("verification_refused", data);

        ActionOutcome::refusal(
            "Identity not verified; account details cannot be discussed",
            "Politely explain that account details cannot be discussed until identity is \
             verified, and offer to verify now or end the call",
        )
    }

    fn verify_identity(&mut self, proof: IdentityProof) -> ActionOutcome {
        let mut data = Map::new();
        let matched = match &proof {
            IdentityProof::LastFour { last_four_digits } => {
                data.insert("method".into(), json!("last_four"));
                data.insert("last_four_digits".into(), json!(last_four_digits));
                *last_four_digits == self.metadata.customer.account_last_four()
            }
            IdentityProof::Asserted { verified, notes } => {
                data.insert("method".into(), json!("asserted"));
                data.insert("verified".into(), json!(verified));
                if let Some(notes) = notes {
                    data.insert("notes".into(), json!(notes));
                }
                *verified
            }
        };
        self.emit("identity_verification", data);

        if matched {
            self.state.mark_verified();
            let details = json!({
                "verification_status": "success",
                "customer": self.metadata.customer,
                "debt": self.metadata.debt,
            });
            ActionOutcome::reply(details.to_string())
        } else {
            ActionOutcome::reply("Identity verification failed").with_speak(
                "Politely inform the customer that you cannot discuss account details without \
                 proper verification and offer to try again, have them call back with the \
                 necessary information, or proceed to end the call",
            )
        }
    }

    fn dispute_debt(&mut self) -> ActionOutcome {
        self.state.mark_disputed();
        self.emit("debt_disputed", Map::new());

        ActionOutcome::reply("Debt dispute recorded successfully").with_speak(
            "Acknowledge the debt dispute and inform the customer that it will be processed \
             according to FDCPA regulations",
        )
    }

    fn send_validation(&mut self) -> ActionOutcome {
        // A validation request implies an open dispute on the account.
        self.state.mark_disputed();
        self.emit("validation_sent", Map::new());

        ActionOutcome::reply("Debt validation notice will be mailed to the address on file")
            .with_speak(
                "Confirm that a written validation notice will be mailed and that the disputed \
                 amount will not be pursued until the customer has received it",
            )
    }

    fn reschedule_payment(&mut self, new_date: String, reason: String) -> ActionOutcome {
        tracing::info!(%new_date, %reason, "rescheduling payment");
        let mut data = Map::new();
        data.insert("new_date".into(), json!(new_date));
        data.insert("reason".into(), json!(reason));
        self.emit("payment_rescheduled", data);

        ActionOutcome::reply(format!("Payment rescheduled to {new_date}")).with_speak(format!(
            "Confirm the payment has been rescheduled to {new_date} and provide any additional \
             instructions needed"
        ))
    }

    fn offer_or_start_plan(&mut self, months: u32, start: bool) -> ActionOutcome {
        let debt_amount = self.metadata.debt.amount;
        let monthly_payment = round_cents(debt_amount / Decimal::from(months));

        if start {
            self.state.mark_plan_started();
            let mut data = Map::new();
            data.insert("months".into(), json!(months));
            data.insert("monthly_payment".into(), json!(monthly_payment.to_string()));
            self.emit("payment_plan_started", data);

            ActionOutcome::reply(format!(
                "Payment plan started: ${monthly_payment}/month for {months} months"
            ))
            .with_speak(
                "Confirm the payment plan has been started and provide next steps for payment",
            )
        } else {
            self.state.mark_plan_offered();
            let mut data = Map::new();
            data.insert("months".into(), json!(months));
            data.insert("monthly_payment".into(), json!(monthly_payment.to_string()));
            data.insert("total_amount".into(), json!(debt_amount.to_string()));
            self.emit("payment_plan_offered", data);

            ActionOutcome::reply(format!(
                "Payment plan offered: ${monthly_payment}/month for {months} months"
            ))
            .with_speak(format!(
                "Offer a payment plan of ${monthly_payment} per month for {months} months"
            ))
        }
    }

    fn offer_settlement(&mut self, settlement_percentage: u32) -> ActionOutcome {
        let debt_amount = self.metadata.debt.amount;
        let settlement_amount =
            round_cents(debt_amount * Decimal::from(settlement_percentage) / Decimal::from(100u32));

        tracing::info!(
            %settlement_amount,
            settlement_percentage,
            "offering settlement"
        );
        let mut data = Map::new();
        data.insert("original_amount".into(), json!(debt_amount.to_string()));
        data.insert("settlement_percentage".into(), json!(settlement_percentage));
        data.insert(
            "settlement_amount".into(),
            json!(settlement_amount.to_string()),
        );
        self.emit("settlement_offered", data);

        ActionOutcome::reply(format!(
            "Settlement offered: ${settlement_amount} ({settlement_percentage}%)"
        ))
        .with_speak(format!(
            "Offer a settlement amount of ${settlement_amount} (which is \
             {settlement_percentage}% of the original ${debt_amount}) as a one-time payment \
             option"
        ))
    }

    fn record_hardship(&mut self, hardship_type: String, description: String) -> ActionOutcome {
        tracing::info!(%hardship_type, "recording hardship claim");
        self.state.mark_hardship_claimed();
        let mut data = Map::new();
        data.insert("hardship_type".into(), json!(hardship_type));
        data.insert("description".into(), json!(description));
        self.emit("hardship_claim", data);

        ActionOutcome::reply(format!(
            "Hardship claim for {hardship_type} recorded successfully"
        ))
        .with_speak(format!(
            "Acknowledge the {hardship_type} hardship with empathy and offer to adjust the \
             payment options or timeline accordingly"
        ))
    }

    fn schedule_callback(&mut self, date: String, time: String, reason: String) -> ActionOutcome {
        let formatted_date_time = format!("{date} at {time}");
        tracing::info!(callback = %formatted_date_time, %reason, "scheduling callback");
        let mut data = Map::new();
        data.insert("date".into(), json!(date));
        data.insert("time".into(), json!(time));
        data.insert("reason".into(), json!(reason));
        self.emit("callback_scheduled", data);

        ActionOutcome::reply(format!("Callback scheduled for {formatted_date_time}")).with_speak(
            format!(
                "Confirm the callback has been scheduled for {formatted_date_time} and provide \
                 a professional closing to the call"
            ),
        )
    }

    fn cease_communication(&mut self, reason: String) -> ActionOutcome {
        tracing::info!(%reason, "cease communication requested");
        let mut data = Map::new();
        data.insert("reason".into(), json!(reason));
        self.emit("cease_communication", data);

        ActionOutcome::reply("Cease communication request processed")
            .with_speak(
                "Acknowledge the customer's request to cease communication, confirm that it \
                 will be honored according to FDCPA regulations, and provide a professional \
                 closing to the call",
            )
            .ending_call()
    }

    fn creditor_policy_lookup(&mut self) -> ActionOutcome {
        self.emit("creditor_policy_on_default", Map::new());

        let creditor = &self.metadata.debt.creditor;
        ActionOutcome::reply(format!(
            "{creditor} Policy on Defaulted Accounts:\n\
             1. Accounts are considered delinquent after 30 days of non-payment\n\
             2. After 60 days, accounts enter the collections process\n\
             3. At 90 days, accounts are marked as defaulted\n\
             4. Defaulted accounts may be reported to credit bureaus\n\
             5. After 120 days, accounts may be transferred to third-party collectors\n\
             6. Settlement options may be available based on account history and circumstances\n\
             7. Hardship programs are available for qualifying customers"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debt_collector_core::MemoryEventSink;
    use std::sync::Arc;

    fn test_metadata() -> CallMetadata {
        CallMetadata::from_json(
            r#"{
                "customer": {"name": "Alex Johnson", "account_number": "5033-4329"},
                "debt": {"amount": 150.75, "creditor": "Bank of America", "type": "Credit Card"},
                "dial": {"to": "+15551234567", "transfer_to": "+15557654321"}
            }"#,
        )
        .unwrap()
    }

    fn test_agent() -> (DebtCollectionAgent, Arc<MemoryEventSink>) {
        let sink = Arc::new(MemoryEventSink::new());
        let agent = DebtCollectionAgent::new(test_metadata(), EventLogger::new(sink.clone()));
        (agent, sink)
    }

    fn verify(agent: &mut DebtCollectionAgent) {
        let outcome = agent.execute(Action::VerifyIdentity {
            proof: IdentityProof::LastFour {
                last_four_digits: "4329".into(),
            },
        });
        assert!(!outcome.refused);
        assert!(agent.state().verified());
    }

    #[test]
    fn test_gated_actions_refused_before_verification() {
        let gated = [
            Action::ReschedulePayment {
                new_date: "2026-09-01".into(),
                reason: "payday".into(),
            },
            Action::OfferOrStartPlan {
                months: 6,
                start: false,
            },
            Action::OfferSettlement {
                settlement_percentage: 50,
            },
            Action::RecordHardship {
                hardship_type: "job loss".into(),
                description: "laid off".into(),
            },
        ];

        for action in gated {
            let (mut agent, sink) = test_agent();
            let name = action.name();
            let outcome = agent.execute(action);

            assert!(outcome.refused, "{name} should be refused");
            assert!(outcome.speak.is_some());
            // No flag may move; only the refusal itself is logged.
            assert!(!agent.state().verified());
            assert!(!agent.state().debt_disputed());
            assert!(!agent.state().hardship_claimed());
            assert!(!agent.state().payment_plan_offered());
            assert!(!agent.state().payment_plan_started());

            let events = sink.snapshot();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].event_type, "verification_refused");
            assert_eq!(events[0].data["action"], serde_json::json!(name));
        }
    }

    #[test]
    fn test_verification_failure_keeps_gate_closed() {
        let (mut agent, _sink) = test_agent();
        let outcome = agent.execute(Action::VerifyIdentity {
            proof: IdentityProof::LastFour {
                last_four_digits: "0000".into(),
            },
        });

        assert_eq!(outcome.reply, "Identity verification failed");
        assert!(outcome.speak.is_some());
        assert!(!agent.state().verified());

        // Gated operations must keep refusing.
        let outcome = agent.execute(Action::OfferSettlement {
            settlement_percentage: 50,
        });
        assert!(outcome.refused);
    }

    #[test]
    fn test_verification_success_shares_account_details() {
        let (mut agent, sink) = test_agent();
        let outcome = agent.execute(Action::VerifyIdentity {
            proof: IdentityProof::LastFour {
                last_four_digits: "4329".into(),
            },
        });

        assert!(agent.state().verified());
        let details: serde_json::Value = serde_json::from_str(&outcome.reply).unwrap();
        assert_eq!(details["verification_status"], "success");
        assert_eq!(details["customer"]["name"], "Alex Johnson");
        assert_eq!(details["debt"]["amount"], "150.75");

        let events = sink.snapshot();
        assert_eq!(events[0].event_type, "identity_verification");
        assert_eq!(events[0].data["last_four_digits"], "4329");
    }

    #[test]
    fn test_asserted_verification_opens_gate() {
        let (mut agent, _sink) = test_agent();
        agent.execute(Action::VerifyIdentity {
            proof: IdentityProof::Asserted {
                verified: true,
                notes: Some("confirmed name and address".into()),
            },
        });
        assert!(agent.state().verified());
    }

    #[test]
    fn test_plan_offer_monthly_payment_rounds_to_cents() {
        let (mut agent, sink) = test_agent();
        verify(&mut agent);

        let outcome = agent.execute(Action::OfferOrStartPlan {
            months: 6,
            start: false,
        });
        assert_eq!(
            outcome.reply,
            "Payment plan offered: $25.13/month for 6 months"
        );
        assert!(agent.state().payment_plan_offered());
        assert!(!agent.state().payment_plan_started());

        let events = sink.snapshot();
        let offered = events
            .iter()
            .find(|e| e.event_type == "payment_plan_offered")
            .unwrap();
        assert_eq!(offered.data["monthly_payment"], "25.13");
        assert_eq!(offered.data["total_amount"], "150.75");
    }

    #[test]
    fn test_plan_start_sets_started_flag() {
        let (mut agent, sink) = test_agent();
        verify(&mut agent);

        let outcome = agent.execute(Action::OfferOrStartPlan {
            months: 6,
            start: true,
        });
        assert_eq!(
            outcome.reply,
            "Payment plan started: $25.13/month for 6 months"
        );
        assert!(agent.state().payment_plan_started());
        assert!(sink
            .snapshot()
            .iter()
            .any(|e| e.event_type == "payment_plan_started"));
    }

    #[test]
    fn test_settlement_amount_rounds_to_cents() {
        let (mut agent, sink) = test_agent();
        verify(&mut agent);

        let outcome = agent.execute(Action::OfferSettlement {
            settlement_percentage: 50,
        });
        assert_eq!(outcome.reply, "Settlement offered: $75.38 (50%)");

        let events = sink.snapshot();
        let offered = events
            .iter()
            .find(|e| e.event_type == "settlement_offered")
            .unwrap();
        assert_eq!(offered.data["settlement_amount"], "75.38");
        assert_eq!(offered.data["original_amount"], "150.75");
        assert_eq!(offered.data["settlement_percentage"], 50);
    }

    #[test]
    fn test_dispute_and_validation_flags_are_monotonic() {
        let (mut agent, sink) = test_agent();

        agent.execute(Action::DisputeDebt);
        assert!(agent.state().debt_disputed());

        // Further actions never reset the flag.
        agent.execute(Action::SendValidation);
        agent.execute(Action::ScheduleCallback {
            date: "2026-08-20".into(),
            time: "10:00".into(),
            reason: "follow up".into(),
        });
        assert!(agent.state().debt_disputed());

        let events = sink.snapshot();
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["debt_disputed", "validation_sent", "callback_scheduled"]
        );
    }

    #[test]
    fn test_hardship_recorded_after_verification() {
        let (mut agent, sink) = test_agent();
        verify(&mut agent);

        let outcome = agent.execute(Action::RecordHardship {
            hardship_type: "job loss".into(),
            description: "lost employment recently".into(),
        });
        assert_eq!(
            outcome.reply,
            "Hardship claim for job loss recorded successfully"
        );
        assert!(agent.state().hardship_claimed());

        let events = sink.snapshot();
        let claim = events
            .iter()
            .find(|e| e.event_type == "hardship_claim")
            .unwrap();
        assert_eq!(claim.data["hardship_type"], "job loss");
    }

    #[test]
    fn test_cease_communication_ends_call_after_acknowledgement() {
        let (mut agent, sink) = test_agent();
        let outcome = agent.execute(Action::CeaseCommunication {
            reason: "customer request".into(),
        });

        assert_eq!(outcome.directive, CallDirective::EndCall);
        assert!(outcome.speak.is_some());
        let events = sink.snapshot();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "cease_communication");
        assert_eq!(events[0].data["reason"], "customer request");
    }

    #[test]
    fn test_callback_reply_combines_date_and_time() {
        let (mut agent, _sink) = test_agent();
        let outcome = agent.execute(Action::ScheduleCallback {
            date: "2026-08-20".into(),
            time: "10:00".into(),
            reason: "customer busy".into(),
        });
        assert_eq!(outcome.reply, "Callback scheduled for 2026-08-20 at 10:00");
    }

    #[test]
    fn test_policy_lookup_names_creditor() {
        let (mut agent, sink) = test_agent();
        let outcome = agent.execute(Action::CreditorPolicyLookup);
        assert!(outcome.reply.starts_with("Bank of America Policy"));
        assert_eq!(sink.snapshot()[0].event_type, "creditor_policy_on_default");
    }

    #[test]
    fn test_invalid_arguments_refused_without_event() {
        let (mut agent, sink) = test_agent();
        verify(&mut agent);
        sink.drain();

        let outcome = agent.execute(Action::OfferSettlement {
            settlement_percentage: 150,
        });
        assert!(outcome.refused);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_exactly_one_event_per_completed_action() {
        let (mut agent, sink) = test_agent();
        verify(&mut agent);
        sink.drain();

        agent.execute(Action::OfferOrStartPlan {
            months: 3,
            start: false,
        });
        assert_eq!(sink.len(), 1);

        agent.execute(Action::DisputeDebt);
        assert_eq!(sink.len(), 2);
    }
}
