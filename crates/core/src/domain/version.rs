// Traffic generator version report (`<executable> -v`)

use serde::{Deserialize, Serialize};

const NOT_AVAILABLE: &str = "NA";

/// Parsed version output of the traffic generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlasterVersion {
    pub version: String,
    pub compiler: String,
    pub io_modes: Vec<String>,
}

impl Default for BlasterVersion {
    fn default() -> Self {
        Self {
            version: NOT_AVAILABLE.to_string(),
            compiler: NOT_AVAILABLE.to_string(),
            io_modes: Vec::new(),
        }
    }
}

impl BlasterVersion {
    /// Parse the `Version:`, `Compiler:` and `IO Modes:` lines of `-v` output
    pub fn parse(output: &str) -> Self {
        let mut version = Self::default();
        for line in output.lines() {
            if let Some(value) = line.strip_prefix("Version:") {
                version.version = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix("Compiler:") {
                version.compiler = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix("IO Modes:") {
                version.io_modes = value
                    .replacen(" (default)", "", 1)
                    .trim()
                    .split(", ")
                    .filter(|mode| !mode.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
        version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_output() {
        let output = "\
Version: 0.9.7
Compiler: GNU (11.4.0)
IO Modes: packet_mmap_raw (default), packet_mmap, raw, dpdk
";
        let version = BlasterVersion::parse(output);

        assert_eq!(version.version, "0.9.7");
        assert_eq!(version.compiler, "GNU (11.4.0)");
        assert_eq!(
            version.io_modes,
            vec!["packet_mmap_raw", "packet_mmap", "raw", "dpdk"]
        );
    }

    #[test]
    fn test_parse_garbage_keeps_defaults() {
        assert_eq!(BlasterVersion::parse("usage: ..."), BlasterVersion::default());
    }
}
