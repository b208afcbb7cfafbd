// Port Layer - Interfaces for external dependencies

pub mod host_probe;
pub mod instance_repository;

// Re-exports
pub use host_probe::HostProbe;
pub use instance_repository::InstanceRepository;
