//! RPC Error Types
//!
//! Maps control plane errors to JSON-RPC error codes.

use blasterctl_core::ControlError;
use jsonrpsee::types::ErrorObjectOwned;
use thiserror::Error;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4004;
    pub const ALREADY_RUNNING: i32 = 4009;
    pub const NOT_RUNNING: i32 = 4012;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Server startup failures
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to register method {method}: {reason}")]
    Register {
        method: &'static str,
        reason: String,
    },
}

/// Convert ControlError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: ControlError) -> ErrorObjectOwned {
    let code = match &err {
        ControlError::NotFound(_) => code::NOT_FOUND,
        ControlError::AlreadyRunning(_) => code::ALREADY_RUNNING,
        ControlError::NotRunning(_) => code::NOT_RUNNING,
        ControlError::ExecutionFailed(_) | ControlError::Protocol(_) | ControlError::Io(_) => {
            code::SYSTEM_ERROR
        }
        ControlError::Serialization(_) => code::INTERNAL_ERROR,
    };
    ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
}

pub fn validation_error(msg: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg.into(), None::<()>)
}

pub fn internal_error(msg: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg.into(), None::<()>)
}
