// Host probe port (local network interfaces)

use crate::domain::NetworkInterface;
use async_trait::async_trait;

/// Read-only view of the host the instances run on
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Network interfaces of the host; empty when they cannot be listed
    async fn interfaces(&self) -> Vec<NetworkInterface>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// HostProbe returning a fixed interface list
    #[derive(Debug, Default)]
    pub struct MockHostProbe {
        interfaces: Vec<NetworkInterface>,
    }

    impl MockHostProbe {
        pub fn new(interfaces: Vec<NetworkInterface>) -> Self {
            Self { interfaces }
        }
    }

    #[async_trait]
    impl HostProbe for MockHostProbe {
        async fn interfaces(&self) -> Vec<NetworkInterface> {
            self.interfaces.clone()
        }
    }
}
