//! Payment status state machine
//!
//! Statuses form a closed three-variant enumeration. Transition legality is
//! decided by an explicit match over the variant pair; the string forms
//! exist only for the persistence boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Initial status on intake
    Pending,
    /// Terminal: the instruction was processed by the bank
    Processed,
    /// Terminal: the instruction was rejected
    Failed,
}

impl PaymentStatus {
    /// Returns true if this status permits a transition to `next`
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match (self, next) {
            (PaymentStatus::Pending, PaymentStatus::Processed) => true,
            (PaymentStatus::Pending, PaymentStatus::Failed) => true,
            _ => false,
        }
    }

    /// Returns true for terminal statuses
    pub fn is_final(&self) -> bool {
        matches!(self, PaymentStatus::Processed | PaymentStatus::Failed)
    }

    /// Returns the persisted string form
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processed => "PROCESSED",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PROCESSED" => Ok(PaymentStatus::Processed),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(format!("unknown payment status: {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Processed));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
    }

    #[test]
    fn test_illegal_transitions() {
        for terminal in [PaymentStatus::Processed, PaymentStatus::Failed] {
            assert!(!terminal.can_transition_to(PaymentStatus::Pending));
            assert!(!terminal.can_transition_to(PaymentStatus::Processed));
            assert!(!terminal.can_transition_to(PaymentStatus::Failed));
        }
        // Self-transition from the initial status is equally illegal
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn test_finality() {
        assert!(!PaymentStatus::Pending.is_final());
        assert!(PaymentStatus::Processed.is_final());
        assert!(PaymentStatus::Failed.is_final());
    }

    #[test]
    fn test_string_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Processed,
            PaymentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_string_rejected() {
        assert!("COMPLETED".parse::<PaymentStatus>().is_err());
        assert!("pending".parse::<PaymentStatus>().is_err());
    }
}
