// Central Error Type for the Instance Control Subsystem

use thiserror::Error;

/// Failure of a single socket command exchange.
///
/// Connection resets while reading are not represented here: they are
/// recovered inside the read loop and never reach the caller.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("connect to {path} failed: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("write deadline of {0}ms exceeded")]
    WriteTimeout(u128),

    #[error("read failed after {received} bytes: {source}")]
    Read {
        received: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("partial response: read deadline exceeded after {received} bytes")]
    PartialResponse { received: usize },

    #[error("encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Control plane error type
///
/// `NotFound`, `AlreadyRunning` and `NotRunning` are the lifecycle variants
/// callers match on; everything else is an opaque failure.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("instance {0} does not exist")]
    NotFound(String),

    #[error("instance {0} is running")]
    AlreadyRunning(String),

    #[error("instance {0} is not running")]
    NotRunning(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ControlError {
    /// True for the variants that describe the instance lifecycle state
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            ControlError::NotFound(_)
                | ControlError::AlreadyRunning(_)
                | ControlError::NotRunning(_)
        )
    }
}

/// Result type alias using ControlError
pub type Result<T> = std::result::Result<T, ControlError>;
