// Child process launch and reaping
// reason: tokio::process so the reaper is an async task instead of a thread

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{info, warn, Span};

use blasterctl_core::{ControlError, Result};

/// Files wired to a launched child
#[derive(Debug, Clone)]
pub struct ChildFiles {
    pub pid: PathBuf,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

/// Launch `executable` detached from our process group
///
/// The pid marker is written as soon as the child exists. The returned handle
/// belongs to the reaper task, which waits for the child, removes the marker
/// and resolves to the exit status.
pub async fn spawn(
    executable: &Path,
    args: Vec<OsString>,
    files: ChildFiles,
    span: Span,
) -> Result<JoinHandle<Option<ExitStatus>>> {
    let stdout = File::create(&files.stdout)?;
    let stderr = File::create(&files.stderr)?;

    let mut command = Command::new(executable);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));
    #[cfg(unix)]
    command.process_group(0);

    info!(parent: &span, executable = %executable.display(), args = ?args, "Starting instance");
    let mut child = command.spawn().map_err(|e| {
        ControlError::ExecutionFailed(format!("{}: {}", executable.display(), e))
    })?;
    // The command still holds our copies of the capture files
    drop(command);

    let Some(pid) = child.id() else {
        return Err(ControlError::ExecutionFailed(
            "child exited before its pid was known".to_string(),
        ));
    };

    if let Err(e) = tokio::fs::write(&files.pid, pid.to_string()).await {
        warn!(parent: &span, pid, error = %e, "Writing pid marker failed, killing child");
        let _ = child.start_kill();
        return Err(e.into());
    }

    let reaper = tokio::spawn(async move {
        let status = match child.wait().await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(parent: &span, pid, error = %e, "Waiting for child failed");
                None
            }
        };
        remove_marker_if_owned(&files.pid, pid).await;
        info!(parent: &span, pid, status = ?status, "Instance stopped");
        status
    });

    Ok(reaper)
}

/// Remove the marker unless it already names another process
async fn remove_marker_if_owned(pid_file: &Path, pid: u32) {
    match tokio::fs::read_to_string(pid_file).await {
        Ok(content) if content.trim() == pid.to_string() => {
            let _ = tokio::fs::remove_file(pid_file).await;
        }
        _ => {}
    }
}
