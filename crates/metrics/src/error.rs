// Metrics error types

use blasterctl_core::ControlError;
use thiserror::Error;

/// Errors that can occur while registering or collecting metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Failed to register the collector with Prometheus.
    #[error("failed to register metric: {0}")]
    RegistrationFailed(#[from] prometheus::Error),

    /// Socket command of a metric family failed.
    #[error("{command} on {instance} failed: {source}")]
    Command {
        instance: String,
        command: &'static str,
        #[source]
        source: ControlError,
    },

    /// Response of a metric family did not match its shape.
    #[error("failed to decode {command} of {instance}: {source}")]
    Decode {
        instance: String,
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for metrics operations.
pub type MetricsResult<T> = Result<T, MetricsError>;
