//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server exposing instance lifecycle, socket
//! commands, metrics and version information.

pub mod error;
pub mod handler;
pub mod names;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
