//! Billing domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Broad classification of a [`BillingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The value had the wrong shape (not an integer, missing payor)
    Type,
    /// The value had the right shape but broke a business rule
    Range,
    /// The operation referenced a payor, bill or group that is not present
    NotFound,
    /// The persistence collaborator failed to checkpoint a valid mutation
    Storage,
}

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// A loosely typed input could not be read as the expected type
    #[error("Invalid type for {field}: expected {expected}, found {found}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    /// Charges must be zero or more
    #[error("Charge must be non-negative, got {0}")]
    NegativeCharge(i64),

    /// The mutation would leave the bill with a negative total
    #[error("Bill total may not become negative: total={total}, change={change}")]
    NegativeTotal {
        total: i64,
        change: i128,
    },

    /// The mutation would push an amount past the representable range
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Liability weights must be positive
    #[error("Weight must be positive, got {0}")]
    NonPositiveWeight(i64),

    /// Payor is not enrolled in the group
    #[error("Payor not found in group: {0}")]
    PayorNotFound(String),

    /// Payor still has bills attributed to them
    #[error("Payor {payor} still owns {count} bill(s) and must be settled before removal")]
    PayorHasBills {
        payor: String,
        count: usize,
    },

    /// Bill is already a member of the group
    #[error("Bill already in group: {0}")]
    BillAlreadyInGroup(String),

    /// Bill is not a member of the group
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    /// Bill group is not known to the service or the store
    #[error("Bill group not found: {0}")]
    GroupNotFound(String),

    /// The persistence collaborator rejected a checkpoint
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl BillingError {
    /// Returns the broad classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BillingError::InvalidType { .. } => ErrorKind::Type,
            BillingError::NegativeCharge(_)
            | BillingError::NegativeTotal { .. }
            | BillingError::AmountOverflow(_)
            | BillingError::NonPositiveWeight(_)
            | BillingError::PayorHasBills { .. }
            | BillingError::BillAlreadyInGroup(_) => ErrorKind::Range,
            BillingError::PayorNotFound(_)
            | BillingError::BillNotFound(_)
            | BillingError::GroupNotFound(_) => ErrorKind::NotFound,
            BillingError::Storage(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let type_error = BillingError::InvalidType {
            field: "charge",
            expected: "integer",
            found: "float".to_string(),
        };
        assert_eq!(type_error.kind(), ErrorKind::Type);
        assert_eq!(BillingError::NegativeCharge(-40).kind(), ErrorKind::Range);
        assert_eq!(BillingError::PayorNotFound("7".to_string()).kind(), ErrorKind::NotFound);
        assert_eq!(
            BillingError::Storage(PortError::connection("down")).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_messages_name_the_payor() {
        let err = BillingError::PayorHasBills { payor: "USR-1".to_string(), count: 2 };
        assert!(err.to_string().contains("USR-1"));
        assert!(err.to_string().contains('2'));
    }
}
