//! Error types for broker operations.

use thiserror::Error;

/// Errors surfaced by bind and read operations.
///
/// Queue overflow is deliberately absent: it never fails the publisher and
/// is observable only through the slot's dropped-message counter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// No slot has been registered at this address yet.
    ///
    /// Subscribers treat this as transient during startup and retry.
    #[error("no slot bound at {channel}/{topic}")]
    NotBound {
        /// Channel part of the address.
        channel: String,
        /// Topic part of the address.
        topic: String,
    },

    /// The slot exists but holds a different payload type or delivery mode.
    ///
    /// Fatal for the requesting endpoint; a topic's binding never changes
    /// after first registration.
    #[error("type mismatch at {channel}/{topic}: slot is {bound}, requested {requested}")]
    TypeMismatch {
        channel: String,
        topic: String,
        /// Description of the registered slot (mode + payload type).
        bound: String,
        /// Description of the requested binding.
        requested: String,
    },

    /// A blocking read expired before the first publish arrived.
    #[error("timed out waiting on {channel}/{topic}")]
    Timeout { channel: String, topic: String },
}

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;
