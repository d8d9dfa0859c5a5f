//! Transaction service error types

use thiserror::Error;

/// Result type for txnsrv operations
pub type Result<T> = std::result::Result<T, TxnSrvError>;

/// Transaction service errors
///
/// Expected failure modes surface as values of this enum, never as panics:
/// the composer and dispatcher log them with the correlation id and return
/// them to the caller as negative results.
#[derive(Debug, Error, Clone)]
pub enum TxnSrvError {
    /// Missing or unresolvable request input (asset, node, port)
    #[error("Validation failure: {0}")]
    Validation(String),

    /// Recognized action or payload type with no implemented handling
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// Recognized extension point whose encoding does not exist yet
    #[error("Not yet supported: {0}")]
    NotYetSupported(String),

    /// Payload could not be deserialized or decoded
    #[error("Deserialization failure: {0}")]
    Deserialization(String),

    /// Payload deserialized but could not be mapped to a document
    #[error("Mapping failure: {0}")]
    Mapping(String),

    /// Document could not be persisted
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Asset resolved but is disabled
    #[error("Disabled asset: {0}")]
    DisabledAsset(String),

    /// Collaborator lookup failed
    #[error("Lookup failure: {0}")]
    Lookup(String),

    /// Redis transport errors
    #[error("Redis error: {0}")]
    Redis(String),

    /// Publish failure for one downstream target
    #[error("Publish failure: {0}")]
    Publish(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TxnSrvError {
    /// Create a validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        TxnSrvError::Validation(msg.into())
    }

    /// Create an unsupported-action failure
    pub fn unsupported_action(msg: impl Into<String>) -> Self {
        TxnSrvError::UnsupportedAction(msg.into())
    }

    /// Create a deserialization failure
    pub fn deserialization(msg: impl Into<String>) -> Self {
        TxnSrvError::Deserialization(msg.into())
    }

    /// Create a mapping failure
    pub fn mapping(msg: impl Into<String>) -> Self {
        TxnSrvError::Mapping(msg.into())
    }

    /// Create a persistence failure
    pub fn persistence(msg: impl Into<String>) -> Self {
        TxnSrvError::Persistence(msg.into())
    }

    /// Create a lookup failure
    pub fn lookup(msg: impl Into<String>) -> Self {
        TxnSrvError::Lookup(msg.into())
    }

    /// Create a publish failure
    pub fn publish(msg: impl Into<String>) -> Self {
        TxnSrvError::Publish(msg.into())
    }

    /// Create a configuration failure
    pub fn config(msg: impl Into<String>) -> Self {
        TxnSrvError::Config(msg.into())
    }
}

impl From<redis::RedisError> for TxnSrvError {
    fn from(err: redis::RedisError) -> Self {
        TxnSrvError::Redis(err.to_string())
    }
}

impl From<serde_json::Error> for TxnSrvError {
    fn from(err: serde_json::Error) -> Self {
        TxnSrvError::Deserialization(err.to_string())
    }
}

impl From<wellflow_wire::WireError> for TxnSrvError {
    fn from(err: wellflow_wire::WireError) -> Self {
        TxnSrvError::Deserialization(err.to_string())
    }
}

impl From<figment::Error> for TxnSrvError {
    fn from(err: figment::Error) -> Self {
        TxnSrvError::Config(err.to_string())
    }
}
