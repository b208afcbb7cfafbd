// Domain Layer - Instance model, persisted formats and instance wire shapes

pub mod command_line;
pub mod error;
pub mod instance;
pub mod metric_flag;
pub mod network_interface;
pub mod responses;
pub mod running_config;
pub mod socket_command;
pub mod version;

// Re-exports
pub use command_line::command_line;
pub use error::DomainError;
pub use instance::{InstanceLayout, InstancePaths};
pub use metric_flag::MetricFlag;
pub use network_interface::NetworkInterface;
pub use running_config::RunningConfig;
pub use socket_command::SocketCommand;
pub use version::BlasterVersion;
