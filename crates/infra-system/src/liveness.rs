// Liveness oracle: pid marker + process table + zero-signal check
//
// Best effort: a recycled pid that happens to belong to a process owned by the
// same user is reported as running.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sysinfo::System;
use tracing::{debug, Span};

/// Content of a pid marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidMarker {
    Absent,
    Invalid,
    Pid(i32),
}

/// Read the pid marker; process ids `<= 0` are invalid
pub fn read_marker(pid_file: &Path) -> PidMarker {
    match std::fs::read_to_string(pid_file) {
        Ok(content) => match content.trim().parse::<i32>() {
            Ok(pid) if pid > 0 => PidMarker::Pid(pid),
            _ => PidMarker::Invalid,
        },
        Err(e) if e.kind() == ErrorKind::NotFound => PidMarker::Absent,
        Err(_) => PidMarker::Invalid,
    }
}

/// True if the marker names a live process this user may signal
///
/// A stale or unparsable marker is removed.
pub fn is_running(pid_file: &Path, span: &Span) -> bool {
    let pid = match read_marker(pid_file) {
        PidMarker::Absent => return false,
        PidMarker::Invalid => None,
        PidMarker::Pid(pid) => Some(pid),
    };

    if let Some(pid) = pid {
        if in_process_table(pid) && signalable(pid) {
            return true;
        }
    }

    debug!(parent: span, marker = %pid_file.display(), pid = ?pid, "Removing stale pid marker");
    let _ = std::fs::remove_file(pid_file);
    false
}

/// `is_running` on the blocking pool, for callers on the async runtime
pub async fn check_running(pid_file: PathBuf, span: Span) -> bool {
    tokio::task::spawn_blocking(move || is_running(&pid_file, &span))
        .await
        .unwrap_or(false)
}

fn in_process_table(pid: i32) -> bool {
    let mut system = System::new();
    system.refresh_process(sysinfo::Pid::from_u32(pid as u32))
}

#[cfg(unix)]
fn signalable(pid: i32) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    // Signal 0 only checks existence and permission
    kill(Pid::from_raw(pid), None::<Signal>).is_ok()
}

#[cfg(not(unix))]
fn signalable(_pid: i32) -> bool {
    true
}

/// Signal sent by Stop/Kill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Kill,
}

/// Deliver `signal` to the pid in the marker; every failure is ignored
pub fn send_signal(pid_file: &Path, signal: StopSignal, span: &Span) {
    let PidMarker::Pid(pid) = read_marker(pid_file) else {
        return;
    };

    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let signal = match signal {
            StopSignal::Interrupt => Signal::SIGINT,
            StopSignal::Kill => Signal::SIGKILL,
        };
        if let Err(e) = kill(Pid::from_raw(pid), signal) {
            debug!(parent: span, pid, signal = ?signal, error = %e, "Signal not delivered");
        } else {
            debug!(parent: span, pid, signal = ?signal, "Signal delivered");
        }
    }

    #[cfg(not(unix))]
    {
        debug!(parent: span, pid, signal = ?signal, "Signals are not supported on this platform");
    }
}
