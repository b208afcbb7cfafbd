// blasterctl Infrastructure - System Adapters
// Implements: InstanceRepository on the local filesystem, process table and
// Unix control sockets; HostProbe over the host network stack

pub mod fs_repository;
pub mod host_probe_impl;
pub mod liveness;
pub mod process_runner;
pub mod socket_client;
pub mod version;

pub use fs_repository::{FsInstanceRepository, RepositoryConfig};
pub use host_probe_impl::SystemHostProbe;
pub use socket_client::SocketClient;
