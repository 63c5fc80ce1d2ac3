//! Ports infrastructure
//!
//! The billing engine is pure in-memory logic. Anything that makes its state
//! durable sits behind a port trait defined in the domain crate, and every
//! adapter reports failures through [`PortError`].
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait BillGroupStore: DomainPort {
//!     async fn commit(&self, group: &BillGroup<UserId>) -> Result<(), PortError>;
//! }
//! ```

use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// Connection to the underlying store failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A snapshot could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl PortError {
    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        PortError::Serialization {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. })
    }
}

/// Marker trait for all domain ports
///
/// Port traits extend this so adapters can be shared across tasks.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_transient() {
        assert!(PortError::connection("store offline").is_transient());
        assert!(!PortError::serialization("bad snapshot").is_transient());
    }

    #[test]
    fn test_port_error_messages() {
        let error = PortError::serialization("Weight must be positive, got 0");
        assert!(error.to_string().starts_with("Serialization error"));
        assert!(error.to_string().contains("got 0"));
    }
}
