//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::{internal_error, to_rpc_error, validation_error};
use crate::names::clean_instance_name;
use crate::types::{
    CommandRequest, CreateRequest, CreateResponse, DeleteResponse, InstanceRequest,
    InstanceStatus, InterfacesResponse, ListResponse, ScrapeResponse, SignalResponse,
    StartRequest, StartResponse, StatusResponse, VersionResponse,
};
use blasterctl_core::domain::SocketCommand;
use blasterctl_core::port::{HostProbe, InstanceRepository};
use blasterctl_core::{ControlError, ProtocolError};
use jsonrpsee::types::ErrorObjectOwned;
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;
use tracing::{info, warn, Span};

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    repository: Arc<dyn InstanceRepository>,
    host: Arc<dyn HostProbe>,
    registry: Registry,
    span: Span,
}

impl RpcHandler {
    pub fn new(
        repository: Arc<dyn InstanceRepository>,
        host: Arc<dyn HostProbe>,
        registry: Registry,
        span: Span,
    ) -> Self {
        Self {
            repository,
            host,
            registry,
            span,
        }
    }

    /// Map a repository failure, logging the ones that are not plain lifecycle state
    fn failure(&self, method: &'static str, err: ControlError) -> ErrorObjectOwned {
        if !err.is_lifecycle() {
            warn!(parent: &self.span, method, error = %err, "Request failed");
        }
        to_rpc_error(err)
    }

    fn name(raw: &str) -> RpcResult<String> {
        clean_instance_name(raw)
            .ok_or_else(|| validation_error(format!("invalid instance name {raw:?}")))
    }

    /// instance.list.v1
    pub async fn list(&self) -> RpcResult<ListResponse> {
        Ok(ListResponse {
            instances: self.repository.instances(),
        })
    }

    /// instance.create.v1
    pub async fn create(&self, params: CreateRequest) -> RpcResult<CreateResponse> {
        let name = Self::name(&params.instance_name)?;
        let config = match params.config {
            serde_json::Value::Null => Vec::new(),
            serde_json::Value::String(raw) => raw.into_bytes(),
            value => serde_json::to_vec(&value).map_err(|e| internal_error(e.to_string()))?,
        };
        if config.is_empty() {
            return Err(validation_error("config must not be empty"));
        }

        let existed = self.repository.exists(&name);
        self.repository
            .create(&name, &config)
            .await
            .map_err(|e| self.failure("instance.create.v1", e))?;
        info!(parent: &self.span, instance = %name, created = !existed, "instance.create.v1");

        Ok(CreateResponse {
            instance_name: name,
            created: !existed,
        })
    }

    /// instance.delete.v1
    pub async fn delete(&self, params: InstanceRequest) -> RpcResult<DeleteResponse> {
        let name = Self::name(&params.instance_name)?;
        self.repository
            .delete(&name)
            .await
            .map_err(|e| self.failure("instance.delete.v1", e))?;
        Ok(DeleteResponse {
            instance_name: name,
        })
    }

    /// instance.status.v1
    pub async fn status(&self, params: InstanceRequest) -> RpcResult<StatusResponse> {
        let name = Self::name(&params.instance_name)?;
        if !self.repository.exists(&name) {
            return Err(self.failure("instance.status.v1", ControlError::NotFound(name)));
        }
        let status = if self.repository.running(&name) {
            InstanceStatus::Started
        } else {
            InstanceStatus::Stopped
        };
        let running_config = self
            .repository
            .running_config(&name)
            .await
            .map_err(|e| self.failure("instance.status.v1", e))?;

        Ok(StatusResponse {
            instance_name: name,
            status,
            running_config,
        })
    }

    /// instance.start.v1
    pub async fn start(&self, params: StartRequest) -> RpcResult<StartResponse> {
        let name = Self::name(&params.instance_name)?;
        self.repository
            .start(&name, &params.running_config)
            .await
            .map_err(|e| self.failure("instance.start.v1", e))?;
        info!(parent: &self.span, instance = %name, "instance.start.v1");

        Ok(StartResponse {
            instance_name: name,
            status: InstanceStatus::Started,
        })
    }

    /// instance.stop.v1
    pub async fn stop(&self, params: InstanceRequest) -> RpcResult<SignalResponse> {
        let name = Self::name(&params.instance_name)?;
        self.repository.stop(&name);
        Ok(SignalResponse {
            instance_name: name,
            accepted: true,
        })
    }

    /// instance.kill.v1
    pub async fn kill(&self, params: InstanceRequest) -> RpcResult<SignalResponse> {
        let name = Self::name(&params.instance_name)?;
        self.repository.kill(&name);
        Ok(SignalResponse {
            instance_name: name,
            accepted: true,
        })
    }

    /// instance.command.v1
    pub async fn command(&self, params: CommandRequest) -> RpcResult<serde_json::Value> {
        let name = Self::name(&params.instance_name)?;
        if params.command.is_empty() {
            return Err(validation_error("command must not be empty"));
        }
        let command = SocketCommand {
            command: params.command,
            arguments: params.arguments,
        };

        let response = self
            .repository
            .command(&name, &command)
            .await
            .map_err(|e| self.failure("instance.command.v1", e))?;
        serde_json::from_slice(&response)
            .map_err(|e| self.failure("instance.command.v1", ProtocolError::Decode(e).into()))
    }

    /// metrics.scrape.v1
    pub async fn scrape(&self) -> RpcResult<ScrapeResponse> {
        // Collectors block on their own workers
        let registry = self.registry.clone();
        let families = tokio::task::spawn_blocking(move || registry.gather())
            .await
            .map_err(|e| internal_error(e.to_string()))?;

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(|e| internal_error(e.to_string()))?;
        let text = String::from_utf8(buffer).map_err(|e| internal_error(e.to_string()))?;
        Ok(ScrapeResponse { text })
    }

    /// controller.interfaces.v1
    pub async fn interfaces(&self) -> RpcResult<InterfacesResponse> {
        Ok(InterfacesResponse {
            interfaces: self.host.interfaces().await,
        })
    }

    /// controller.version.v1
    pub async fn version(&self) -> RpcResult<VersionResponse> {
        let blaster = self.repository.version().await;
        Ok(VersionResponse {
            version: blasterctl_core::VERSION.to_string(),
            blaster_version: blaster.version,
            blaster_compiler: blaster.compiler,
            blaster_io_modes: blaster.io_modes,
        })
    }
}
