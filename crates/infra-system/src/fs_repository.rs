// Filesystem InstanceRepository (directory per instance)

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, warn, Span};

use blasterctl_core::domain::{
    command_line, BlasterVersion, InstanceLayout, InstancePaths, RunningConfig, SocketCommand,
};
use blasterctl_core::port::InstanceRepository;
use blasterctl_core::{ControlError, Result};

use crate::liveness::{self, StopSignal};
use crate::process_runner::{self, ChildFiles};
use crate::socket_client::{SocketClient, READ_TIMEOUT, WRITE_TIMEOUT};
use crate::version;

/// Default instance root
pub const DEFAULT_CONFIG_FOLDER: &str = "/var/bngblaster";
/// Default traffic generator executable
pub const DEFAULT_EXECUTABLE: &str = "/usr/sbin/bngblaster";

/// Filesystem repository settings
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub config_folder: PathBuf,
    pub executable: PathBuf,
    pub write_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            config_folder: PathBuf::from(DEFAULT_CONFIG_FOLDER),
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            write_timeout: WRITE_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }
}

/// Instance store, process supervisor and socket client over the local filesystem
pub struct FsInstanceRepository {
    layout: InstanceLayout,
    executable: PathBuf,
    client: SocketClient,
    span: Span,
}

impl FsInstanceRepository {
    /// `span` is the parent of every event this repository emits
    pub fn new(config: RepositoryConfig, span: Span) -> Self {
        Self {
            layout: InstanceLayout::new(config.config_folder),
            executable: config.executable,
            client: SocketClient::new(config.write_timeout, config.read_timeout, span.clone()),
            span,
        }
    }

    pub fn config_folder(&self) -> &Path {
        self.layout.root()
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn paths(&self, name: &str) -> InstancePaths {
        self.layout.instance(name)
    }

    // Non-blocking counterparts of `exists`/`running` for the async operations
    async fn exists_async(&self, name: &str) -> bool {
        tokio::fs::try_exists(self.paths(name).dir())
            .await
            .unwrap_or(false)
    }

    async fn running_async(&self, name: &str) -> bool {
        liveness::check_running(self.paths(name).pid(), self.span.clone()).await
    }

    async fn cleanup_run_files(&self, paths: &InstancePaths) -> Result<()> {
        for file in paths.run_artifacts() {
            match tokio::fs::remove_file(&file).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Start an instance and return the reaper handle
    ///
    /// The handle resolves to the exit status once the child is gone and its
    /// pid marker removed.
    pub async fn start_instance(
        &self,
        name: &str,
        config: &RunningConfig,
    ) -> Result<JoinHandle<Option<ExitStatus>>> {
        if !self.exists_async(name).await {
            return Err(ControlError::NotFound(name.to_string()));
        }
        if self.running_async(name).await {
            return Err(ControlError::AlreadyRunning(name.to_string()));
        }
        let paths = self.paths(name);
        self.cleanup_run_files(&paths).await?;

        let encoded = serde_json::to_vec(config)?;
        tokio::fs::write(paths.running_config(), encoded).await?;

        let files = ChildFiles {
            pid: paths.pid(),
            stdout: paths.stdout(),
            stderr: paths.stderr(),
        };
        let span = tracing::info_span!(parent: &self.span, "instance", instance = %name);
        process_runner::spawn(&self.executable, command_line(&paths, config), files, span).await
    }
}

#[async_trait]
impl InstanceRepository for FsInstanceRepository {
    fn instances(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.layout.root()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    async fn create(&self, name: &str, config: &[u8]) -> Result<()> {
        if self.running_async(name).await {
            return Err(ControlError::AlreadyRunning(name.to_string()));
        }
        let paths = self.paths(name);
        tokio::fs::create_dir_all(paths.dir()).await?;
        tokio::fs::write(paths.config(), config).await?;
        self.cleanup_run_files(&paths).await?;

        info!(parent: &self.span, instance = %name, bytes = config.len(), "Instance created");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        if self.running_async(name).await {
            return Err(ControlError::AlreadyRunning(name.to_string()));
        }
        let paths = self.paths(name);
        match tokio::fs::remove_dir_all(paths.dir()).await {
            Ok(()) => info!(parent: &self.span, instance = %name, "Instance deleted"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(parent: &self.span, instance = %name, error = %e, "Instance removal incomplete"),
        }
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.paths(name).dir().exists()
    }

    fn running(&self, name: &str) -> bool {
        liveness::is_running(&self.paths(name).pid(), &self.span)
    }

    async fn start(&self, name: &str, config: &RunningConfig) -> Result<()> {
        self.start_instance(name, config).await.map(|_reaper| ())
    }

    fn stop(&self, name: &str) {
        liveness::send_signal(&self.paths(name).pid(), StopSignal::Interrupt, &self.span);
    }

    fn kill(&self, name: &str) {
        liveness::send_signal(&self.paths(name).pid(), StopSignal::Kill, &self.span);
    }

    async fn command(&self, name: &str, command: &SocketCommand) -> Result<Vec<u8>> {
        if !self.exists_async(name).await {
            return Err(ControlError::NotFound(name.to_string()));
        }
        if !self.running_async(name).await {
            return Err(ControlError::NotRunning(name.to_string()));
        }
        let socket = self.paths(name).socket();
        self.client.request(&socket, command).await.map_err(|e| {
            warn!(parent: &self.span, instance = %name, command = %command.command, error = %e, "Socket command failed");
            ControlError::from(e)
        })
    }

    async fn running_config(&self, name: &str) -> Result<Option<RunningConfig>> {
        match tokio::fs::read(self.paths(name).running_config()).await {
            Ok(content) => Ok(Some(serde_json::from_slice(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn version(&self) -> BlasterVersion {
        version::query(&self.executable, &self.span).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository(root: &Path, executable: &str) -> FsInstanceRepository {
        FsInstanceRepository::new(
            RepositoryConfig {
                config_folder: root.to_path_buf(),
                executable: PathBuf::from(executable),
                write_timeout: Duration::from_secs(1),
                read_timeout: Duration::from_secs(1),
            },
            Span::none(),
        )
    }

    #[tokio::test]
    async fn test_create_exists_delete() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path(), "true");

        repo.create("test", b"{}").await.unwrap();
        assert!(repo.exists("test"));
        assert!(!repo.running("test"));
        assert_eq!(
            std::fs::read(dir.path().join("test/config.json")).unwrap(),
            b"{}"
        );

        repo.delete("test").await.unwrap();
        assert!(!repo.exists("test"));
        // Deleting a missing instance is not an error
        repo.delete("test").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_clears_run_artifacts_but_keeps_log() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path(), "true");
        repo.create("a", b"{}").await.unwrap();

        let instance = dir.path().join("a");
        for file in ["run.json", "run_report.json", "run.pcap", "run.stdout", "run.stderr", "run.log"] {
            std::fs::write(instance.join(file), "x").unwrap();
        }

        repo.create("a", br#"{"interfaces":{}}"#).await.unwrap();
        assert!(!instance.join("run.json").exists());
        assert!(!instance.join("run_report.json").exists());
        assert!(!instance.join("run.stdout").exists());
        assert!(instance.join("run.log").exists());
        assert_eq!(
            std::fs::read(instance.join("config.json")).unwrap(),
            br#"{"interfaces":{}}"#
        );
    }

    #[tokio::test]
    async fn test_instances_sorted_directories_only() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path(), "true");
        repo.create("beta", b"{}").await.unwrap();
        repo.create("alpha", b"{}").await.unwrap();
        std::fs::write(dir.path().join("stray.txt"), "x").unwrap();

        assert_eq!(repo.instances(), vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_instances_of_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(&dir.path().join("missing"), "true");
        assert!(repo.instances().is_empty());
    }

    #[tokio::test]
    async fn test_start_missing_instance() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path(), "true");

        let result = repo.start("nope", &RunningConfig::default()).await;
        assert!(matches!(result, Err(ControlError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_start_writes_running_config_and_reaps() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path(), "echo");
        repo.create("e", b"{}").await.unwrap();

        let config = RunningConfig {
            logging: true,
            logging_flags: vec!["error".into()],
            metric_flags: vec!["session_counters".into()],
            ..Default::default()
        };
        let reaper = repo.start_instance("e", &config).await.unwrap();
        reaper.await.unwrap();

        let instance = dir.path().join("e");
        assert_eq!(
            std::fs::read(instance.join("run.json")).unwrap(),
            serde_json::to_vec(&config).unwrap()
        );
        assert_eq!(repo.running_config("e").await.unwrap(), Some(config));
        assert!(!instance.join("run.pid").exists());

        let stdout = std::fs::read_to_string(instance.join("run.stdout")).unwrap();
        let expected = format!(
            "-C {0}/config.json -S {0}/run.sock -L {0}/run.log -l error\n",
            instance.display()
        );
        assert_eq!(stdout, expected);
    }

    #[tokio::test]
    async fn test_start_failure_is_execution_failed() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path(), "/nonexistent/bngblaster");
        repo.create("f", b"{}").await.unwrap();

        let result = repo.start("f", &RunningConfig::default()).await;
        assert!(matches!(result, Err(ControlError::ExecutionFailed(_))));
        assert!(!dir.path().join("f/run.pid").exists());
        assert!(!repo.running("f"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_running_instance_lifecycle_guards_and_kill() {
        let dir = tempfile::tempdir().unwrap();
        // sh reads -C as its noclobber option and runs config.json as the script
        let repo = repository(dir.path(), "/bin/sh");
        repo.create("s", b"exec sleep 30\n").await.unwrap();

        let reaper = repo
            .start_instance("s", &RunningConfig::default())
            .await
            .unwrap();
        assert!(repo.running("s"));
        let pid = std::fs::read_to_string(dir.path().join("s/run.pid")).unwrap();

        assert!(matches!(
            repo.start("s", &RunningConfig::default()).await,
            Err(ControlError::AlreadyRunning(_))
        ));
        assert!(matches!(
            repo.create("s", b"{}").await,
            Err(ControlError::AlreadyRunning(_))
        ));
        assert!(matches!(
            repo.delete("s").await,
            Err(ControlError::AlreadyRunning(_))
        ));
        // The refused start left the running child alone
        assert_eq!(
            std::fs::read_to_string(dir.path().join("s/run.pid")).unwrap(),
            pid
        );

        repo.kill("s");
        let status = tokio::time::timeout(Duration::from_secs(10), reaper)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(!status.success());
        assert!(!repo.running("s"));
        repo.delete("s").await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_and_kill_without_process_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path(), "true");
        repo.create("idle", b"{}").await.unwrap();

        repo.stop("idle");
        repo.kill("idle");
        repo.stop("missing");
        assert!(!repo.running("idle"));
    }

    #[tokio::test]
    async fn test_command_guards() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path(), "true");
        let command = SocketCommand::new("session-counters");

        assert!(matches!(
            repo.command("missing", &command).await,
            Err(ControlError::NotFound(_))
        ));

        repo.create("idle", b"{}").await.unwrap();
        assert!(matches!(
            repo.command("idle", &command).await,
            Err(ControlError::NotRunning(_))
        ));
    }

    #[tokio::test]
    async fn test_running_config_absent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository(dir.path(), "true");
        repo.create("fresh", b"{}").await.unwrap();

        assert_eq!(repo.running_config("fresh").await.unwrap(), None);
    }
}
