// Version query of the traffic generator executable

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, Span};

use blasterctl_core::domain::BlasterVersion;

const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `<executable> -v`; any failure yields the `NA` defaults
pub async fn query(executable: &Path, span: &Span) -> BlasterVersion {
    let output = Command::new(executable)
        .arg("-v")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(VERSION_TIMEOUT, output).await {
        Ok(Ok(output)) if output.status.success() => {
            BlasterVersion::parse(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(Ok(output)) => {
            debug!(parent: span, status = ?output.status, "Version query exited unsuccessfully");
            BlasterVersion::default()
        }
        Ok(Err(e)) => {
            debug!(parent: span, executable = %executable.display(), error = %e, "Version query failed");
            BlasterVersion::default()
        }
        Err(_) => {
            debug!(parent: span, executable = %executable.display(), "Version query timed out");
            BlasterVersion::default()
        }
    }
}
