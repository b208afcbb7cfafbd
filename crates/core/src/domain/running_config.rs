// Running Configuration (persisted as run.json)

use serde::{Deserialize, Serialize};

/// Start parameters for one run of an instance
///
/// The JSON field names are a persisted contract: `run.json` is read back by the
/// metrics collector and by external tooling. Every field is optional on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunningConfig {
    /// Generate a report file
    pub report: bool,
    /// What is reported (sessions|streams)
    pub report_flags: Vec<String>,
    /// Write a log file
    pub logging: bool,
    /// What is logged (debug|error|igmp|io|pppoe|info|pcap|ip|loss|l2tp|dhcp|...)
    pub logging_flags: Vec<String>,
    /// Write a packet capture
    pub pcap_capture: bool,
    /// Deprecated: superseded by `session_count`
    pub pppoe_session_count: u32,
    /// Overrides the session count of the static config
    pub session_count: u32,
    /// Stream configuration file (absolute path), empty when unset
    pub stream_config: String,
    /// Metric families collected while the instance runs
    pub metric_flags: Vec<String>,
}

impl RunningConfig {
    /// Effective session count; `session_count` wins over the deprecated field
    pub fn effective_session_count(&self) -> Option<u32> {
        if self.session_count > 0 {
            Some(self.session_count)
        } else if self.pppoe_session_count > 0 {
            Some(self.pppoe_session_count)
        } else {
            None
        }
    }

    /// Stream config path, treating an empty string as unset
    pub fn stream_config_path(&self) -> Option<&str> {
        Some(self.stream_config.as_str()).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_count_priority() {
        let config = RunningConfig {
            session_count: 10,
            pppoe_session_count: 1000,
            ..Default::default()
        };
        assert_eq!(config.effective_session_count(), Some(10));

        let config = RunningConfig {
            pppoe_session_count: 1000,
            ..Default::default()
        };
        assert_eq!(config.effective_session_count(), Some(1000));

        assert_eq!(RunningConfig::default().effective_session_count(), None);
    }

    #[test]
    fn test_partial_json_decodes_with_defaults() {
        let config: RunningConfig =
            serde_json::from_str(r#"{"logging": true, "metric_flags": ["session_counters"]}"#)
                .unwrap();

        assert!(config.logging);
        assert!(!config.report);
        assert_eq!(config.metric_flags, vec!["session_counters"]);
        assert_eq!(config.stream_config, "");
    }

    #[test]
    fn test_empty_stream_config_is_unset() {
        let config = RunningConfig::default();
        assert_eq!(config.stream_config_path(), None);

        let config = RunningConfig {
            stream_config: "/tmp/streams.json".into(),
            ..Default::default()
        };
        assert_eq!(config.stream_config_path(), Some("/tmp/streams.json"));
    }

    #[test]
    fn test_every_key_is_persisted() {
        let value = serde_json::to_value(RunningConfig::default()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["stream_config"], "");
        for key in [
            "report",
            "report_flags",
            "logging",
            "logging_flags",
            "pcap_capture",
            "pppoe_session_count",
            "session_count",
            "metric_flags",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
    }
}
