// Metric family tables
//
// Metric names are `<prefix>_<field>` where the field is the response key with
// dashes replaced by underscores. Session counters carry no prefix.

use blasterctl_core::domain::responses::{
    A10nspInterfacesResponse, AccessInterfacesResponse, Interface, InterfacesResponse,
    NetworkInterfacesResponse, SessionCounters, SessionCountersResponse, StreamSummary,
    StreamSummaryResponse, TrafficInterface,
};
use blasterctl_core::domain::MetricFlag;

pub(crate) const LABEL_HOSTNAME: &str = "hostname";

pub(crate) const METRIC_INSTANCES_TOTAL: &str = "instances_total";
pub(crate) const METRIC_INSTANCES_RUNNING: &str = "instances_running";

const INSTANCE_LABELS: &[&str] = &["instance_name"];
const INTERFACE_LABELS: &[&str] = &["instance_name", "interface_name", "interface_type"];
const STREAM_LABELS: &[&str] = &[
    "instance_name",
    "flow_id",
    "session_id",
    "stream_name",
    "direction",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Counter,
    Gauge,
}

struct Field<T> {
    suffix: &'static str,
    help: &'static str,
    kind: Kind,
    value: fn(&T) -> f64,
}

macro_rules! field {
    ($kind:ident, $field:ident, $help:literal) => {
        Field {
            suffix: stringify!($field),
            help: $help,
            kind: Kind::$kind,
            value: |record| record.$field as f64,
        }
    };
}

const SESSION_COUNTER_FIELDS: &[Field<SessionCounters>] = &[
    field!(Counter, sessions, "The total number of sessions"),
    field!(Counter, sessions_pppoe, "The total number of PPPoE sessions"),
    field!(Counter, sessions_ipoe, "The total number of IPoE sessions"),
    field!(Gauge, sessions_established, "The number of sessions in state established"),
    field!(Counter, sessions_established_max, "The max number of sessions in state established (peak)"),
    field!(Gauge, sessions_terminated, "The number of sessions in state terminated"),
    field!(Counter, sessions_flapped, "The number of sessions flapped"),
    field!(Counter, dhcp_sessions, "The number of DHCP sessions"),
    field!(Gauge, dhcp_sessions_established, "The number of DHCP sessions in state established"),
    field!(Counter, dhcp_sessions_established_max, "The max number of DHCP sessions in state established (peak)"),
    field!(Counter, dhcpv6_sessions, "The number of DHCPv6 sessions"),
    field!(Gauge, dhcpv6_sessions_established, "The number of DHCPv6 sessions in state established"),
    field!(Counter, dhcpv6_sessions_established_max, "The max number of DHCPv6 sessions in state established (peak)"),
    field!(Gauge, setup_time, "The session setup time in milliseconds"),
    field!(Gauge, setup_rate, "The session setup rate in calls per second"),
    field!(Gauge, setup_rate_min, "The minimum session setup rate"),
    field!(Gauge, setup_rate_avg, "The average session setup rate"),
    field!(Gauge, setup_rate_max, "The maximum session setup rate"),
    field!(Gauge, session_traffic_flows, "The number of session traffic flows"),
    field!(Gauge, session_traffic_flows_verified, "The number of verified session traffic flows"),
    field!(Gauge, stream_traffic_flows, "The number of stream traffic flows"),
    field!(Gauge, stream_traffic_flows_verified, "The number of verified stream traffic flows"),
];

const INTERFACE_FIELDS: &[Field<Interface>] = &[
    field!(Counter, tx_packets, "transmitted packets"),
    field!(Counter, tx_bytes, "transmitted bytes"),
    field!(Counter, rx_packets, "received packets"),
    field!(Counter, rx_bytes, "received bytes"),
];

const TRAFFIC_INTERFACE_FIELDS: &[Field<TrafficInterface>] = &[
    field!(Counter, tx_packets, "transmitted packets"),
    field!(Counter, tx_bytes, "transmitted bytes"),
    field!(Gauge, tx_pps, "transmit rate in packets per second"),
    field!(Gauge, tx_kbps, "transmit rate in kbit per second"),
    field!(Counter, rx_packets, "received packets"),
    field!(Counter, rx_bytes, "received bytes"),
    field!(Gauge, rx_pps, "receive rate in packets per second"),
    field!(Gauge, rx_kbps, "receive rate in kbit per second"),
    field!(Gauge, tx_packets_multicast, "transmitted multicast packets"),
    field!(Gauge, tx_pps_multicast, "multicast transmit rate in packets per second"),
    field!(Gauge, rx_packets_multicast, "received multicast packets"),
    field!(Gauge, rx_pps_multicast, "multicast receive rate in packets per second"),
    field!(Gauge, rx_loss_packets_multicast, "lost multicast packets"),
    field!(Gauge, tx_packets_session_ipv4, "transmitted session IPv4 packets"),
    field!(Gauge, tx_pps_session_ipv4, "session IPv4 transmit rate in packets per second"),
    field!(Gauge, rx_packets_session_ipv4, "received session IPv4 packets"),
    field!(Gauge, rx_pps_session_ipv4, "session IPv4 receive rate in packets per second"),
    field!(Gauge, rx_loss_packets_session_ipv4, "lost session IPv4 packets"),
    field!(Gauge, tx_packets_session_ipv6, "transmitted session IPv6 packets"),
    field!(Gauge, tx_pps_session_ipv6, "session IPv6 transmit rate in packets per second"),
    field!(Gauge, rx_packets_session_ipv6, "received session IPv6 packets"),
    field!(Gauge, rx_pps_session_ipv6, "session IPv6 receive rate in packets per second"),
    field!(Gauge, rx_loss_packets_session_ipv6, "lost session IPv6 packets"),
    field!(Gauge, tx_packets_session_ipv6pd, "transmitted session IPv6PD packets"),
    field!(Gauge, tx_pps_session_ipv6pd, "session IPv6PD transmit rate in packets per second"),
    field!(Gauge, rx_packets_session_ipv6pd, "received session IPv6PD packets"),
    field!(Gauge, rx_pps_session_ipv6pd, "session IPv6PD receive rate in packets per second"),
    field!(Gauge, rx_loss_packets_session_ipv6pd, "lost session IPv6PD packets"),
    field!(Gauge, tx_packets_streams, "transmitted stream packets"),
    field!(Gauge, tx_pps_streams, "stream transmit rate in packets per second"),
    field!(Gauge, rx_packets_streams, "received stream packets"),
    field!(Gauge, rx_pps_streams, "stream receive rate in packets per second"),
    field!(Gauge, rx_loss_packets_streams, "lost stream packets"),
];

const STREAM_FIELDS: &[Field<StreamSummary>] = &[
    field!(Counter, tx_packets, "transmitted packets"),
    field!(Counter, tx_bytes, "transmitted bytes"),
    field!(Counter, rx_packets, "received packets"),
    field!(Counter, rx_bytes, "received bytes"),
    field!(Counter, rx_loss, "lost packets"),
];

/// One exported metric
#[derive(Debug, Clone)]
pub(crate) struct MetricDef {
    pub name: String,
    pub help: String,
    pub kind: Kind,
    pub labels: &'static [&'static str],
}

/// One measured value
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Sample {
    pub name: String,
    pub labels: Vec<String>,
    pub value: f64,
}

fn prefix(flag: MetricFlag) -> &'static str {
    match flag {
        MetricFlag::SessionCounters => "",
        MetricFlag::Interfaces => "interfaces",
        MetricFlag::AccessInterfaces => "access_interfaces",
        MetricFlag::NetworkInterfaces => "network_interfaces",
        MetricFlag::A10nspInterfaces => "a10nsp_interfaces",
        MetricFlag::Streams => "stream",
    }
}

fn title(flag: MetricFlag) -> &'static str {
    match flag {
        MetricFlag::SessionCounters => "",
        MetricFlag::Interfaces => "Interface",
        MetricFlag::AccessInterfaces => "Access interface",
        MetricFlag::NetworkInterfaces => "Network interface",
        MetricFlag::A10nspInterfaces => "A10NSP interface",
        MetricFlag::Streams => "Stream",
    }
}

fn metric_name(flag: MetricFlag, suffix: &str) -> String {
    match prefix(flag) {
        "" => suffix.to_string(),
        prefix => format!("{prefix}_{suffix}"),
    }
}

fn defs<'a, T>(
    flag: MetricFlag,
    fields: &'a [Field<T>],
    labels: &'static [&'static str],
) -> impl Iterator<Item = MetricDef> + 'a {
    fields.iter().map(move |field| MetricDef {
        name: metric_name(flag, field.suffix),
        help: match title(flag) {
            "" => field.help.to_string(),
            title => format!("{title} {}", field.help),
        },
        kind: field.kind,
        labels,
    })
}

/// Every metric the collector may emit, header metrics first
pub(crate) fn catalog() -> Vec<MetricDef> {
    let mut catalog = vec![
        MetricDef {
            name: METRIC_INSTANCES_TOTAL.to_string(),
            help: "The total number of instances".to_string(),
            kind: Kind::Gauge,
            labels: &[],
        },
        MetricDef {
            name: METRIC_INSTANCES_RUNNING.to_string(),
            help: "The number of running instances".to_string(),
            kind: Kind::Gauge,
            labels: &[],
        },
    ];
    for flag in MetricFlag::ALL {
        match flag {
            MetricFlag::SessionCounters => {
                catalog.extend(defs(flag, SESSION_COUNTER_FIELDS, INSTANCE_LABELS))
            }
            MetricFlag::Interfaces => catalog.extend(defs(flag, INTERFACE_FIELDS, INTERFACE_LABELS)),
            MetricFlag::AccessInterfaces
            | MetricFlag::NetworkInterfaces
            | MetricFlag::A10nspInterfaces => {
                catalog.extend(defs(flag, TRAFFIC_INTERFACE_FIELDS, INTERFACE_LABELS))
            }
            MetricFlag::Streams => catalog.extend(defs(flag, STREAM_FIELDS, STREAM_LABELS)),
        }
    }
    catalog
}

fn samples<T>(
    flag: MetricFlag,
    fields: &[Field<T>],
    record: &T,
    labels: &[String],
    out: &mut Vec<Sample>,
) {
    for field in fields {
        out.push(Sample {
            name: metric_name(flag, field.suffix),
            labels: labels.to_vec(),
            value: (field.value)(record),
        });
    }
}

fn interface_labels(instance: &str, name: &str, kind: &str) -> Vec<String> {
    vec![instance.to_string(), name.to_string(), kind.to_string()]
}

/// Decode the response of `flag`'s command into samples
pub(crate) fn decode(
    flag: MetricFlag,
    instance: &str,
    body: &[u8],
) -> Result<Vec<Sample>, serde_json::Error> {
    let mut out = Vec::new();
    match flag {
        MetricFlag::SessionCounters => {
            let response: SessionCountersResponse = serde_json::from_slice(body)?;
            let labels = [instance.to_string()];
            samples(flag, SESSION_COUNTER_FIELDS, &response.session_counters, &labels, &mut out);
        }
        MetricFlag::Interfaces => {
            let response: InterfacesResponse = serde_json::from_slice(body)?;
            for iface in &response.interfaces {
                let labels = interface_labels(instance, &iface.name, &iface.kind);
                samples(flag, INTERFACE_FIELDS, iface, &labels, &mut out);
            }
        }
        MetricFlag::AccessInterfaces => {
            let response: AccessInterfacesResponse = serde_json::from_slice(body)?;
            traffic_interfaces(flag, instance, &response.interfaces, &mut out);
        }
        MetricFlag::NetworkInterfaces => {
            let response: NetworkInterfacesResponse = serde_json::from_slice(body)?;
            traffic_interfaces(flag, instance, &response.interfaces, &mut out);
        }
        MetricFlag::A10nspInterfaces => {
            let response: A10nspInterfacesResponse = serde_json::from_slice(body)?;
            traffic_interfaces(flag, instance, &response.interfaces, &mut out);
        }
        MetricFlag::Streams => {
            let response: StreamSummaryResponse = serde_json::from_slice(body)?;
            for stream in &response.streams {
                let labels = vec![
                    instance.to_string(),
                    stream.flow_id.to_string(),
                    stream.session_id.to_string(),
                    stream.name.clone(),
                    stream.direction.clone(),
                ];
                samples(flag, STREAM_FIELDS, stream, &labels, &mut out);
            }
        }
    }
    Ok(out)
}

fn traffic_interfaces(
    flag: MetricFlag,
    instance: &str,
    interfaces: &[TrafficInterface],
    out: &mut Vec<Sample>,
) {
    for iface in interfaces {
        let labels = interface_labels(instance, &iface.name, &iface.kind);
        samples(flag, TRAFFIC_INTERFACE_FIELDS, iface, &labels, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique() {
        let catalog = catalog();
        let names: HashSet<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), catalog.len());
        assert_eq!(catalog[0].name, "instances_total");
        assert_eq!(catalog[1].name, "instances_running");
    }

    #[test]
    fn test_catalog_contains_every_family() {
        let names: HashSet<String> = catalog().into_iter().map(|d| d.name).collect();
        for name in [
            "sessions",
            "setup_rate_avg",
            "interfaces_tx_packets",
            "access_interfaces_rx_loss_packets_session_ipv6pd",
            "network_interfaces_tx_kbps",
            "a10nsp_interfaces_rx_packets_streams",
            "stream_rx_loss",
        ] {
            assert!(names.contains(name), "missing {name}");
        }
    }

    #[test]
    fn test_decode_session_counters() {
        let body = br#"{"code":200,"session-counters":{"sessions":10,"setup-rate":2.5}}"#;
        let samples = decode(MetricFlag::SessionCounters, "bng1", body).unwrap();

        assert_eq!(samples.len(), SESSION_COUNTER_FIELDS.len());
        let sessions = samples.iter().find(|s| s.name == "sessions").unwrap();
        assert_eq!(sessions.labels, vec!["bng1"]);
        assert_eq!(sessions.value, 10.0);
        let rate = samples.iter().find(|s| s.name == "setup_rate").unwrap();
        assert_eq!(rate.value, 2.5);
    }

    #[test]
    fn test_decode_interfaces_labels_each_interface() {
        let body = br#"{"code":200,"interfaces":[
            {"name":"eth1","type":"Interface","tx-packets":5},
            {"name":"eth2","type":"Interface","rx-bytes":9}
        ]}"#;
        let samples = decode(MetricFlag::Interfaces, "bng1", body).unwrap();

        assert_eq!(samples.len(), 2 * INTERFACE_FIELDS.len());
        let rx = samples
            .iter()
            .find(|s| s.name == "interfaces_rx_bytes" && s.labels[1] == "eth2")
            .unwrap();
        assert_eq!(rx.labels, vec!["bng1", "eth2", "Interface"]);
        assert_eq!(rx.value, 9.0);
    }

    #[test]
    fn test_decode_streams_labels() {
        let body = br#"{"code":200,"stream-summary":[
            {"flow-id":3,"session-id":1,"name":"BE","direction":"upstream","rx-loss":4}
        ]}"#;
        let samples = decode(MetricFlag::Streams, "bng1", body).unwrap();

        let loss = samples.iter().find(|s| s.name == "stream_rx_loss").unwrap();
        assert_eq!(loss.labels, vec!["bng1", "3", "1", "BE", "upstream"]);
        assert_eq!(loss.value, 4.0);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(decode(MetricFlag::NetworkInterfaces, "bng1", b"not json").is_err());
        assert!(decode(MetricFlag::NetworkInterfaces, "bng1", br#"{"code":404}"#).is_err());
    }
}
