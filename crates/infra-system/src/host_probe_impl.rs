// Host probe implementation (getifaddrs + sysfs MTU)

use std::path::Path;

use async_trait::async_trait;
use tracing::{warn, Span};

use blasterctl_core::domain::network_interface::{format_mac, NetworkInterface};
use blasterctl_core::port::HostProbe;

const SYS_CLASS_NET: &str = "/sys/class/net";

/// HostProbe over the local network stack
pub struct SystemHostProbe {
    span: Span,
}

impl SystemHostProbe {
    pub fn new(span: Span) -> Self {
        Self { span }
    }
}

#[async_trait]
impl HostProbe for SystemHostProbe {
    async fn interfaces(&self) -> Vec<NetworkInterface> {
        let span = self.span.clone();
        match tokio::task::spawn_blocking(move || list_interfaces(&span)).await {
            Ok(interfaces) => interfaces,
            Err(e) => {
                warn!(parent: &self.span, error = %e, "Interface listing aborted");
                Vec::new()
            }
        }
    }
}

#[cfg(unix)]
fn list_interfaces(span: &Span) -> Vec<NetworkInterface> {
    use nix::ifaddrs::getifaddrs;

    let addrs = match getifaddrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            warn!(parent: span, error = %e, "Failed to list network interfaces");
            return Vec::new();
        }
    };

    // getifaddrs yields one entry per address; merge them per interface
    let mut interfaces: Vec<NetworkInterface> = Vec::new();
    for ifaddr in addrs {
        let mac = ifaddr
            .address
            .as_ref()
            .and_then(|address| address.as_link_addr())
            .and_then(|link| link.addr())
            .map(|bytes| format_mac(&bytes));

        match interfaces
            .iter_mut()
            .find(|iface| iface.name == ifaddr.interface_name)
        {
            Some(iface) => {
                if iface.mac.is_empty() {
                    iface.mac = mac.unwrap_or_default();
                }
            }
            None => interfaces.push(NetworkInterface {
                mtu: read_mtu(Path::new(SYS_CLASS_NET), &ifaddr.interface_name),
                flags: readable_flags(ifaddr.flags),
                mac: mac.unwrap_or_default(),
                name: ifaddr.interface_name,
            }),
        }
    }
    interfaces
}

#[cfg(not(unix))]
fn list_interfaces(_span: &Span) -> Vec<NetworkInterface> {
    Vec::new()
}

#[cfg(unix)]
fn readable_flags(flags: nix::net::if_::InterfaceFlags) -> Vec<String> {
    use nix::net::if_::InterfaceFlags;

    [
        (InterfaceFlags::IFF_UP, "up"),
        (InterfaceFlags::IFF_BROADCAST, "broadcast"),
        (InterfaceFlags::IFF_LOOPBACK, "loopback"),
        (InterfaceFlags::IFF_POINTOPOINT, "point-to-point"),
        (InterfaceFlags::IFF_MULTICAST, "multicast"),
    ]
    .into_iter()
    .filter(|(flag, _)| flags.contains(*flag))
    .map(|(_, name)| name.to_string())
    .collect()
}

/// MTU from `<root>/<name>/mtu`; 0 when unavailable
fn read_mtu(root: &Path, name: &str) -> u32 {
    std::fs::read_to_string(root.join(name).join("mtu"))
        .ok()
        .and_then(|content| content.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_mtu() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("eth1")).unwrap();
        std::fs::write(root.path().join("eth1").join("mtu"), "9000\n").unwrap();

        assert_eq!(read_mtu(root.path(), "eth1"), 9000);
        assert_eq!(read_mtu(root.path(), "missing"), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_readable_flags_in_fixed_order() {
        use nix::net::if_::InterfaceFlags;

        let flags =
            InterfaceFlags::IFF_MULTICAST | InterfaceFlags::IFF_UP | InterfaceFlags::IFF_RUNNING;
        assert_eq!(readable_flags(flags), vec!["up", "multicast"]);
        assert_eq!(
            readable_flags(InterfaceFlags::IFF_LOOPBACK | InterfaceFlags::IFF_UP),
            vec!["up", "loopback"]
        );
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_loopback_is_listed() {
        let interfaces = SystemHostProbe::new(Span::none()).interfaces().await;

        let lo = interfaces
            .iter()
            .find(|iface| iface.name == "lo")
            .expect("loopback interface");
        assert!(lo.flags.contains(&"loopback".to_string()));
        let unique: std::collections::HashSet<&str> =
            interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(unique.len(), interfaces.len());
    }
}
