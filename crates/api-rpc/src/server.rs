//! JSON-RPC Server
//!
//! Serves the instance control plane as JSON-RPC 2.0 over HTTP.

use crate::error::ServerError;
use crate::handler::RpcHandler;
use crate::types::{CommandRequest, CreateRequest, InstanceRequest, StartRequest};
use blasterctl_core::port::{HostProbe, InstanceRepository};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, Span};

const DEFAULT_RPC_ADDR: &str = "127.0.0.1:8001";

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub addr: String,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_RPC_ADDR.to_string(),
        }
    }
}

/// Register a method taking a parameter object
macro_rules! method {
    ($module:expr, $handler:expr, $name:literal, $request:ty, $call:ident) => {{
        let handler = Arc::clone(&$handler);
        $module
            .register_async_method($name, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: $request = params.parse()?;
                    handler.$call(req).await
                }
            })
            .map_err(|e| ServerError::Register {
                method: $name,
                reason: e.to_string(),
            })?;
    }};
    ($module:expr, $handler:expr, $name:literal, $call:ident) => {{
        let handler = Arc::clone(&$handler);
        $module
            .register_async_method($name, move |_, _, _| {
                let handler = handler.clone();
                async move { handler.$call().await }
            })
            .map_err(|e| ServerError::Register {
                method: $name,
                reason: e.to_string(),
            })?;
    }};
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
    span: Span,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        repository: Arc<dyn InstanceRepository>,
        host: Arc<dyn HostProbe>,
        registry: Registry,
        span: Span,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(repository, host, registry, span.clone())),
            span,
        }
    }

    fn module(&self) -> Result<RpcModule<()>, ServerError> {
        let mut module = RpcModule::new(());

        method!(module, self.handler, "instance.list.v1", list);
        method!(module, self.handler, "instance.create.v1", CreateRequest, create);
        method!(module, self.handler, "instance.delete.v1", InstanceRequest, delete);
        method!(module, self.handler, "instance.status.v1", InstanceRequest, status);
        method!(module, self.handler, "instance.start.v1", StartRequest, start);
        method!(module, self.handler, "instance.stop.v1", InstanceRequest, stop);
        method!(module, self.handler, "instance.kill.v1", InstanceRequest, kill);
        method!(module, self.handler, "instance.command.v1", CommandRequest, command);
        method!(module, self.handler, "metrics.scrape.v1", scrape);
        method!(module, self.handler, "controller.interfaces.v1", interfaces);
        method!(module, self.handler, "controller.version.v1", version);

        Ok(module)
    }

    /// Bind and start serving; returns the bound address and the stop handle
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), ServerError> {
        let bind_error = |source: std::io::Error| ServerError::Bind {
            addr: self.config.addr.clone(),
            source,
        };
        let server = Server::builder()
            .build(&self.config.addr)
            .await
            .map_err(bind_error)?;
        let addr = server.local_addr().map_err(bind_error)?;

        let module = self.module()?;
        info!(parent: &self.span, %addr, "JSON-RPC server started");

        Ok((addr, server.start(module)))
    }
}
