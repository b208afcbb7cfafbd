// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown metric flag: {0}")]
    UnknownMetricFlag(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
