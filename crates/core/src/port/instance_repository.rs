// Instance Repository Port (Interface)

use crate::domain::{BlasterVersion, RunningConfig, SocketCommand};
use crate::error::Result;
use async_trait::async_trait;

/// Lifecycle and command access to named traffic generator instances
///
/// Names are expected to be sanitized by the caller. The check-then-act window
/// between `running` and `start`/`create`/`delete` is not locked: concurrent
/// lifecycle calls for the same name must be serialized by the caller.
#[async_trait]
pub trait InstanceRepository: Send + Sync {
    /// Names of all known instances, sorted
    fn instances(&self) -> Vec<String>;

    /// Create or overwrite an instance with its static configuration
    ///
    /// Clears every run artifact of a previous run. Fails with
    /// `AlreadyRunning` while the instance runs.
    async fn create(&self, name: &str, config: &[u8]) -> Result<()>;

    /// Remove an instance; deleting an unknown name succeeds
    async fn delete(&self, name: &str) -> Result<()>;

    /// True if the instance directory exists
    ///
    /// Blocks briefly on a filesystem lookup.
    fn exists(&self, name: &str) -> bool;

    /// True if the instance has a live child process
    ///
    /// Blocks briefly: reads the pid marker and consults the process table.
    /// Async callers that cannot afford that should use `spawn_blocking`.
    fn running(&self, name: &str) -> bool;

    /// Launch the traffic generator for an existing, stopped instance
    async fn start(&self, name: &str, config: &RunningConfig) -> Result<()>;

    /// Ask the instance to terminate (SIGINT); no-op when not running
    fn stop(&self, name: &str);

    /// Terminate the instance forcefully (SIGKILL); no-op when not running
    fn kill(&self, name: &str);

    /// Send one command over the control socket and return the raw response
    async fn command(&self, name: &str, command: &SocketCommand) -> Result<Vec<u8>>;

    /// Running configuration of the most recent start, if any
    async fn running_config(&self, name: &str) -> Result<Option<RunningConfig>>;

    /// Version of the configured traffic generator executable
    async fn version(&self) -> BlasterVersion;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::{ControlError, ProtocolError};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Canned answer of a mocked socket command
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        /// Reply with these bytes
        Bytes(Vec<u8>),
        /// Reply with these bytes after a delay
        Delayed(Duration, Vec<u8>),
        /// Fail as if the read deadline expired after `received` bytes
        Partial(usize),
    }

    impl MockResponse {
        pub fn json(value: serde_json::Value) -> Self {
            MockResponse::Bytes(value.to_string().into_bytes())
        }
    }

    #[derive(Debug, Default)]
    struct MockInstance {
        config: Vec<u8>,
        running: bool,
        running_config: Option<RunningConfig>,
        responses: HashMap<String, MockResponse>,
    }

    #[derive(Debug, Default)]
    struct MockState {
        instances: BTreeMap<String, MockInstance>,
        command_count: usize,
        signals: Vec<(String, &'static str)>,
    }

    /// In-memory InstanceRepository for testing
    ///
    /// Commands without a canned response are echoed back as their JSON
    /// encoding, like the `fake-blaster` test binary does.
    #[derive(Default)]
    pub struct MockInstanceRepository {
        state: Mutex<MockState>,
        version: BlasterVersion,
    }

    impl MockInstanceRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_version(version: BlasterVersion) -> Self {
            Self {
                state: Mutex::new(MockState::default()),
                version,
            }
        }

        /// Add a running instance started with `config`
        pub fn insert_running(&self, name: &str, config: RunningConfig) {
            let mut state = self.state.lock().unwrap();
            let instance = state.instances.entry(name.to_string()).or_default();
            instance.running = true;
            instance.running_config = Some(config);
        }

        /// Add a stopped instance
        pub fn insert_stopped(&self, name: &str) {
            let mut state = self.state.lock().unwrap();
            state.instances.entry(name.to_string()).or_default().running = false;
        }

        pub fn set_response(&self, name: &str, command: &str, response: MockResponse) {
            let mut state = self.state.lock().unwrap();
            state
                .instances
                .entry(name.to_string())
                .or_default()
                .responses
                .insert(command.to_string(), response);
        }

        /// Static config stored by the last `create`
        pub fn config(&self, name: &str) -> Option<Vec<u8>> {
            let state = self.state.lock().unwrap();
            state.instances.get(name).map(|i| i.config.clone())
        }

        pub fn command_count(&self) -> usize {
            self.state.lock().unwrap().command_count
        }

        /// Signals delivered by `stop`/`kill` as (instance, signal name)
        pub fn signals(&self) -> Vec<(String, &'static str)> {
            self.state.lock().unwrap().signals.clone()
        }

        fn signal(&self, name: &str, signal: &'static str) {
            let mut state = self.state.lock().unwrap();
            if let Some(instance) = state.instances.get_mut(name) {
                if instance.running {
                    instance.running = false;
                    state.signals.push((name.to_string(), signal));
                }
            }
        }
    }

    #[async_trait]
    impl InstanceRepository for MockInstanceRepository {
        fn instances(&self) -> Vec<String> {
            self.state.lock().unwrap().instances.keys().cloned().collect()
        }

        async fn create(&self, name: &str, config: &[u8]) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            let instance = state.instances.entry(name.to_string()).or_default();
            if instance.running {
                return Err(ControlError::AlreadyRunning(name.to_string()));
            }
            instance.config = config.to_vec();
            instance.running_config = None;
            tracing::debug!(instance = %name, "mock instance created");
            Ok(())
        }

        async fn delete(&self, name: &str) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            if state.instances.get(name).is_some_and(|i| i.running) {
                return Err(ControlError::AlreadyRunning(name.to_string()));
            }
            state.instances.remove(name);
            Ok(())
        }

        fn exists(&self, name: &str) -> bool {
            self.state.lock().unwrap().instances.contains_key(name)
        }

        fn running(&self, name: &str) -> bool {
            let state = self.state.lock().unwrap();
            state.instances.get(name).is_some_and(|i| i.running)
        }

        async fn start(&self, name: &str, config: &RunningConfig) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            let instance = state
                .instances
                .get_mut(name)
                .ok_or_else(|| ControlError::NotFound(name.to_string()))?;
            if instance.running {
                return Err(ControlError::AlreadyRunning(name.to_string()));
            }
            instance.running = true;
            instance.running_config = Some(config.clone());
            tracing::debug!(instance = %name, "mock instance started");
            Ok(())
        }

        fn stop(&self, name: &str) {
            self.signal(name, "SIGINT");
        }

        fn kill(&self, name: &str) {
            self.signal(name, "SIGKILL");
        }

        async fn command(&self, name: &str, command: &SocketCommand) -> Result<Vec<u8>> {
            let response = {
                let mut state = self.state.lock().unwrap();
                state.command_count += 1;
                let instance = state
                    .instances
                    .get(name)
                    .ok_or_else(|| ControlError::NotFound(name.to_string()))?;
                if !instance.running {
                    return Err(ControlError::NotRunning(name.to_string()));
                }
                instance.responses.get(&command.command).cloned()
            };

            match response {
                Some(MockResponse::Bytes(bytes)) => Ok(bytes),
                Some(MockResponse::Delayed(delay, bytes)) => {
                    tokio::time::sleep(delay).await;
                    Ok(bytes)
                }
                Some(MockResponse::Partial(received)) => {
                    Err(ProtocolError::PartialResponse { received }.into())
                }
                None => Ok(serde_json::to_vec(command)?),
            }
        }

        async fn running_config(&self, name: &str) -> Result<Option<RunningConfig>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .instances
                .get(name)
                .and_then(|i| i.running_config.clone()))
        }

        async fn version(&self) -> BlasterVersion {
            self.version.clone()
        }
    }
}
