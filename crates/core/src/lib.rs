// blasterctl Core - Domain Types & Ports
// NO infrastructure dependencies (hexagonal architecture)

pub mod domain;
pub mod error;
pub mod port;

pub use error::{ControlError, ProtocolError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
