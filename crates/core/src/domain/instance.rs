// Instance Store layout (persisted-state contract)
//
// One directory per instance under a configured root. The file names below are
// read by external tooling and must stay stable.

use std::path::{Path, PathBuf};

/// Static configuration supplied at creation time.
pub const CONFIG_FILENAME: &str = "config.json";
/// Process id of the running child, present while a start has not been reaped.
pub const RUN_PID_FILENAME: &str = "run.pid";
/// Log file written by the traffic generator when logging is enabled.
pub const RUN_LOG_FILENAME: &str = "run.log";
/// Running configuration of the most recent start.
pub const RUN_CONFIG_FILENAME: &str = "run.json";
/// Report generated by the traffic generator.
pub const RUN_REPORT_FILENAME: &str = "run_report.json";
/// Packet capture written by the traffic generator.
pub const RUN_PCAP_FILENAME: &str = "run.pcap";
/// Control socket bound by the running child.
pub const RUN_SOCK_FILENAME: &str = "run.sock";
/// Redirected standard error of the child.
pub const RUN_STDERR_FILENAME: &str = "run.stderr";
/// Redirected standard output of the child.
pub const RUN_STDOUT_FILENAME: &str = "run.stdout";

/// Root of the instance store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceLayout {
    root: PathBuf,
}

impl InstanceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths of a single instance (the name is expected to be sanitized)
    pub fn instance(&self, name: &str) -> InstancePaths {
        InstancePaths {
            dir: self.root.join(name),
        }
    }
}

/// File paths belonging to one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePaths {
    dir: PathBuf,
}

impl InstancePaths {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> PathBuf {
        self.dir.join(CONFIG_FILENAME)
    }

    pub fn pid(&self) -> PathBuf {
        self.dir.join(RUN_PID_FILENAME)
    }

    pub fn log(&self) -> PathBuf {
        self.dir.join(RUN_LOG_FILENAME)
    }

    pub fn running_config(&self) -> PathBuf {
        self.dir.join(RUN_CONFIG_FILENAME)
    }

    pub fn report(&self) -> PathBuf {
        self.dir.join(RUN_REPORT_FILENAME)
    }

    pub fn pcap(&self) -> PathBuf {
        self.dir.join(RUN_PCAP_FILENAME)
    }

    pub fn socket(&self) -> PathBuf {
        self.dir.join(RUN_SOCK_FILENAME)
    }

    pub fn stdout(&self) -> PathBuf {
        self.dir.join(RUN_STDOUT_FILENAME)
    }

    pub fn stderr(&self) -> PathBuf {
        self.dir.join(RUN_STDERR_FILENAME)
    }

    /// Artifacts of a previous run that must not leak into the next one.
    ///
    /// The log file is not part of this set; the traffic generator appends to it.
    pub fn run_artifacts(&self) -> [PathBuf; 7] {
        [
            self.pid(),
            self.running_config(),
            self.report(),
            self.pcap(),
            self.socket(),
            self.stderr(),
            self.stdout(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_paths() {
        let layout = InstanceLayout::new("/var/bngblaster");
        let paths = layout.instance("bng1");

        assert_eq!(paths.dir(), Path::new("/var/bngblaster/bng1"));
        assert_eq!(paths.config(), Path::new("/var/bngblaster/bng1/config.json"));
        assert_eq!(paths.pid(), Path::new("/var/bngblaster/bng1/run.pid"));
        assert_eq!(paths.socket(), Path::new("/var/bngblaster/bng1/run.sock"));
        assert_eq!(
            paths.report(),
            Path::new("/var/bngblaster/bng1/run_report.json")
        );
    }

    #[test]
    fn test_run_artifacts_exclude_static_config_and_log() {
        let paths = InstanceLayout::new("td").instance("x");
        let artifacts = paths.run_artifacts();

        assert!(artifacts.contains(&paths.pid()));
        assert!(artifacts.contains(&paths.running_config()));
        assert!(!artifacts.contains(&paths.config()));
        assert!(!artifacts.contains(&paths.log()));
    }
}
