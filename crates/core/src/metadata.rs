//! Call metadata ingested at dispatch time
//!
//! A dispatch carries a JSON object with `customer`, `debt` and `dial` keys.
//! The metadata is immutable for the lifetime of one call; the core never
//! mutates it. Changes to the debt (disputes, plans) are reflected only
//! through emitted audit events.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The customer being called
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub account_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Customer {
    /// Last four digits of the account number, used for identity verification.
    pub fn account_last_four(&self) -> String {
        let chars: Vec<char> = self.account_number.chars().collect();
        let start = chars.len().saturating_sub(4);
        chars[start..].iter().collect()
    }
}

/// Status of the debt on record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    #[default]
    Unpaid,
    Disputed,
    Settled,
    Plan,
}

/// The outstanding debt being collected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// Outstanding amount, exact to the cent
    pub amount: Decimal,
    /// Original creditor the debt is owed to
    pub creditor: String,
    /// Age of the debt (e.g. "2 months")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    /// Kind of debt (e.g. "Credit Card")
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub debt_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub status: DebtStatus,
}

/// Dialing details for the outbound call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dial {
    /// Phone number to dial
    pub to: String,
    /// Human agent number for transfers, if one is staffed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_to: Option<String>,
}

/// Everything the agent knows about one call, fixed at dispatch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallMetadata {
    pub customer: Customer,
    pub debt: Debt,
    pub dial: Dial,
}

impl CallMetadata {
    /// Parse dispatch metadata from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let metadata: CallMetadata = serde_json::from_str(json)?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Validate boundary constraints before a call may start.
    pub fn validate(&self) -> Result<()> {
        if self.dial.to.trim().is_empty() {
            return Err(Error::InvalidMetadata("dial.to must not be empty".into()));
        }
        if self.customer.account_number.trim().is_empty() {
            return Err(Error::InvalidMetadata(
                "customer.account_number must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "customer": {"name": "Alex Johnson", "account_number": "5033-4329"},
            "debt": {
                "age": "2 months",
                "amount": 150.75,
                "creditor": "Bank of America",
                "type": "Credit Card"
            },
            "dial": {"to": "+15551234567", "transfer_to": "+15557654321"}
        }"#
    }

    #[test]
    fn test_parse_dispatch_metadata() {
        let metadata = CallMetadata::from_json(sample_json()).unwrap();
        assert_eq!(metadata.customer.name, "Alex Johnson");
        assert_eq!(metadata.debt.amount, "150.75".parse::<Decimal>().unwrap());
        assert_eq!(metadata.debt.debt_type.as_deref(), Some("Credit Card"));
        assert_eq!(metadata.debt.status, DebtStatus::Unpaid);
        assert_eq!(metadata.dial.transfer_to.as_deref(), Some("+15557654321"));
    }

    #[test]
    fn test_account_last_four() {
        let metadata = CallMetadata::from_json(sample_json()).unwrap();
        assert_eq!(metadata.customer.account_last_four(), "4329");
    }

    #[test]
    fn test_empty_dial_to_rejected() {
        let mut metadata = CallMetadata::from_json(sample_json()).unwrap();
        metadata.dial.to = "  ".into();
        assert!(matches!(
            metadata.validate(),
            Err(Error::InvalidMetadata(_))
        ));
    }
}
