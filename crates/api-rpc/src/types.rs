//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use blasterctl_core::domain::{NetworkInterface, RunningConfig};
use serde::{Deserialize, Serialize};

/// instance.list.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub instances: Vec<String>,
}

/// instance.create.v1 - Create or overwrite an instance
///
/// A string `config` is stored verbatim, any other JSON value is stored
/// encoded.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub instance_name: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    pub instance_name: String,
    /// false when an existing instance was overwritten
    pub created: bool,
}

/// Requests addressing one instance by name
#[derive(Debug, Deserialize)]
pub struct InstanceRequest {
    pub instance_name: String,
}

/// instance.delete.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub instance_name: String,
}

/// Lifecycle state reported by status and start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Started,
    Stopped,
}

/// instance.status.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub instance_name: String,
    pub status: InstanceStatus,
    pub running_config: Option<RunningConfig>,
}

/// instance.start.v1
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub instance_name: String,
    #[serde(default)]
    pub running_config: RunningConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub instance_name: String,
    pub status: InstanceStatus,
}

/// instance.stop.v1 / instance.kill.v1 - signal delivery is asynchronous
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResponse {
    pub instance_name: String,
    pub accepted: bool,
}

/// instance.command.v1 - the result is the instance's raw JSON response
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub instance_name: String,
    pub command: String,
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// metrics.scrape.v1 - Prometheus text exposition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub text: String,
}

/// controller.interfaces.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfacesResponse {
    pub interfaces: Vec<NetworkInterface>,
}

/// controller.version.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub blaster_version: String,
    pub blaster_compiler: String,
    pub blaster_io_modes: Vec<String>,
}
