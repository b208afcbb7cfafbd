// Host network interface description

use serde::{Deserialize, Serialize};

/// One network interface of the host running the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub mtu: u32,
    /// Readable flags: up, broadcast, loopback, point-to-point, multicast
    pub flags: Vec<String>,
    /// Colon separated hardware address, empty when the interface has none
    pub mac: String,
}

/// Format a hardware address as `aa:bb:cc:dd:ee:ff`
pub fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
