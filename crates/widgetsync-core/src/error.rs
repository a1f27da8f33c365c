//! Error types.

/// Failure delivering a frame or resolving a comm target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommError {
    #[error("no kernel installed")]
    NoKernel,
    #[error("a kernel is already installed for this process")]
    KernelAlreadyInstalled,
    #[error("comm target not registered: {0}")]
    UnknownTarget(String),
    #[error("expected a comm_open frame")]
    UnexpectedFrame,
    #[error("kernel channel closed")]
    Closed,
}

/// Failure of a transport operation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport has been moved from")]
    MovedFrom,
    #[error(transparent)]
    Comm(#[from] CommError),
    #[error("state serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Error returned by a custom-message listener.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;
