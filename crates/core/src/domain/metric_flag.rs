// Metric families an instance can be asked to report

use std::fmt;
use std::str::FromStr;

use super::error::DomainError;

/// A metric family requested through `RunningConfig::metric_flags`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFlag {
    SessionCounters,
    Interfaces,
    AccessInterfaces,
    NetworkInterfaces,
    A10nspInterfaces,
    Streams,
}

impl MetricFlag {
    pub const ALL: [MetricFlag; 6] = [
        MetricFlag::SessionCounters,
        MetricFlag::Interfaces,
        MetricFlag::AccessInterfaces,
        MetricFlag::NetworkInterfaces,
        MetricFlag::A10nspInterfaces,
        MetricFlag::Streams,
    ];

    /// Flag as written in the running config
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricFlag::SessionCounters => "session_counters",
            MetricFlag::Interfaces => "interfaces",
            MetricFlag::AccessInterfaces => "access_interfaces",
            MetricFlag::NetworkInterfaces => "network_interfaces",
            MetricFlag::A10nspInterfaces => "a10nsp_interfaces",
            MetricFlag::Streams => "streams",
        }
    }

    /// Socket command issued to collect this family
    pub fn command(&self) -> &'static str {
        match self {
            MetricFlag::SessionCounters => "session-counters",
            MetricFlag::Interfaces => "interfaces",
            MetricFlag::AccessInterfaces => "access-interfaces",
            MetricFlag::NetworkInterfaces => "network-interfaces",
            MetricFlag::A10nspInterfaces => "a10nsp-interfaces",
            MetricFlag::Streams => "stream-summary",
        }
    }
}

impl fmt::Display for MetricFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricFlag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricFlag::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| DomainError::UnknownMetricFlag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_flags() {
        for flag in MetricFlag::ALL {
            assert_eq!(flag.as_str().parse::<MetricFlag>(), Ok(flag));
        }
    }

    #[test]
    fn test_parse_unknown_flag() {
        assert_eq!(
            "bgp".parse::<MetricFlag>(),
            Err(DomainError::UnknownMetricFlag("bgp".into()))
        );
    }

    #[test]
    fn test_streams_use_stream_summary() {
        assert_eq!(MetricFlag::Streams.command(), "stream-summary");
    }
}
