//! Error types for the persistence boundary.
//!
//! The simulation core never fails; only storage access does. The
//! [`Garden`](crate::Garden) controller logs these and carries on.

/// Errors that can occur while reading or writing durable state.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No durable store is reachable (private browsing, no window).
    #[error("storage unavailable")]
    Unavailable,

    /// The backing store rejected the operation (quota, security policy).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored blob could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
