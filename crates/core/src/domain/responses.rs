// Typed response shapes of the traffic generator's socket commands
//
// Only `code` is meaningful across all commands. The family shapes below are
// schema definitions used by consumers that need typed values; unknown JSON
// fields are ignored and missing ones default to zero.

use serde::Deserialize;

/// `session-counters`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionCountersResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(rename = "session-counters")]
    pub session_counters: SessionCounters,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionCounters {
    pub sessions: u64,
    pub sessions_pppoe: u64,
    pub sessions_ipoe: u64,
    pub sessions_established: u64,
    pub sessions_established_max: u64,
    pub sessions_terminated: u64,
    pub sessions_flapped: u64,
    pub dhcp_sessions: u64,
    pub dhcp_sessions_established: u64,
    pub dhcp_sessions_established_max: u64,
    pub dhcpv6_sessions: u64,
    pub dhcpv6_sessions_established: u64,
    pub dhcpv6_sessions_established_max: u64,
    pub setup_time: u64,
    pub setup_rate: f64,
    pub setup_rate_min: f64,
    pub setup_rate_avg: f64,
    pub setup_rate_max: f64,
    pub session_traffic_flows: u64,
    pub session_traffic_flows_verified: u64,
    pub stream_traffic_flows: u64,
    pub stream_traffic_flows_verified: u64,
}

/// `interfaces`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfacesResponse {
    #[serde(default)]
    pub code: i64,
    pub interfaces: Vec<Interface>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Interface {
    pub name: String,
    #[serde(rename = "ifindex")]
    pub if_index: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
}

/// `access-interfaces`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessInterfacesResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(rename = "access-interfaces")]
    pub interfaces: Vec<TrafficInterface>,
}

/// `network-interfaces`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkInterfacesResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(rename = "network-interfaces")]
    pub interfaces: Vec<TrafficInterface>,
}

/// `a10nsp-interfaces`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct A10nspInterfacesResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(rename = "a10nsp-interfaces")]
    pub interfaces: Vec<TrafficInterface>,
}

/// Interface record of the access, network and a10nsp tables
///
/// The three tables share one record; counters a table does not report stay 0.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TrafficInterface {
    pub name: String,
    #[serde(rename = "ifindex")]
    pub if_index: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub tx_pps: u64,
    pub tx_kbps: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub rx_pps: u64,
    pub rx_kbps: u64,
    pub tx_packets_multicast: u64,
    pub tx_pps_multicast: u64,
    pub rx_packets_multicast: u64,
    pub rx_pps_multicast: u64,
    pub rx_loss_packets_multicast: u64,
    pub tx_packets_session_ipv4: u64,
    pub tx_pps_session_ipv4: u64,
    pub rx_packets_session_ipv4: u64,
    pub rx_pps_session_ipv4: u64,
    pub rx_loss_packets_session_ipv4: u64,
    pub tx_packets_session_ipv6: u64,
    pub tx_pps_session_ipv6: u64,
    pub rx_packets_session_ipv6: u64,
    pub rx_pps_session_ipv6: u64,
    pub rx_loss_packets_session_ipv6: u64,
    pub tx_packets_session_ipv6pd: u64,
    pub tx_pps_session_ipv6pd: u64,
    pub rx_packets_session_ipv6pd: u64,
    pub rx_pps_session_ipv6pd: u64,
    pub rx_loss_packets_session_ipv6pd: u64,
    pub tx_packets_streams: u64,
    pub tx_pps_streams: u64,
    pub rx_packets_streams: u64,
    pub rx_pps_streams: u64,
    pub rx_loss_packets_streams: u64,
}

/// `stream-summary`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamSummaryResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(rename = "stream-summary")]
    pub streams: Vec<StreamSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StreamSummary {
    pub flow_id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sub_type: String,
    pub direction: String,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub rx_loss: u64,
    pub session_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_session_counters() {
        let body = r#"{
            "code": 200,
            "session-counters": {
                "sessions": 3,
                "sessions-pppoe": 2,
                "dhcpv6-sessions-established-max": 1,
                "setup-rate-avg": 12.5,
                "unknown-field": "ignored"
            }
        }"#;
        let response: SessionCountersResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.code, 200);
        assert_eq!(response.session_counters.sessions, 3);
        assert_eq!(response.session_counters.sessions_pppoe, 2);
        assert_eq!(response.session_counters.dhcpv6_sessions_established_max, 1);
        assert_eq!(response.session_counters.setup_rate_avg, 12.5);
        assert_eq!(response.session_counters.sessions_ipoe, 0);
    }

    #[test]
    fn test_missing_family_key_is_an_error() {
        let result = serde_json::from_str::<SessionCountersResponse>(r#"{"code": 404}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_traffic_interfaces() {
        let body = r#"{
            "code": 200,
            "access-interfaces": [{
                "name": "eth1", "ifindex": 4, "type": "access",
                "tx-packets": 10, "rx-loss-packets-session-ipv6pd": 2
            }]
        }"#;
        let response: AccessInterfacesResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.interfaces.len(), 1);
        let iface = &response.interfaces[0];
        assert_eq!(iface.name, "eth1");
        assert_eq!(iface.if_index, 4);
        assert_eq!(iface.kind, "access");
        assert_eq!(iface.tx_packets, 10);
        assert_eq!(iface.rx_loss_packets_session_ipv6pd, 2);
    }

    #[test]
    fn test_decode_stream_summary() {
        let body = r#"{
            "code": 200,
            "stream-summary": [{
                "flow-id": 1, "name": "S1", "type": "unicast", "sub-type": "ipv4",
                "direction": "downstream", "tx-packets": 5, "rx-loss": 1, "session-id": 7
            }]
        }"#;
        let response: StreamSummaryResponse = serde_json::from_str(body).unwrap();

        let stream = &response.streams[0];
        assert_eq!(stream.flow_id, 1);
        assert_eq!(stream.sub_type, "ipv4");
        assert_eq!(stream.session_id, 7);
        assert_eq!(stream.rx_loss, 1);
    }
}
