// Command line derivation for the traffic generator
//
// The flag letters and their order are the invocation contract with the
// external binary.

use std::ffi::OsString;

use super::instance::InstancePaths;
use super::running_config::RunningConfig;

/// Derive the argument list (without the executable) for one start
pub fn command_line(paths: &InstancePaths, config: &RunningConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |flag: &str, value: OsString| {
        args.push(flag.into());
        args.push(value);
    };

    push("-C", paths.config().into_os_string());
    push("-S", paths.socket().into_os_string());
    if config.report {
        push("-J", paths.report().into_os_string());
    }
    for flag in &config.report_flags {
        push("-j", flag.into());
    }
    if config.logging {
        push("-L", paths.log().into_os_string());
    }
    for flag in &config.logging_flags {
        push("-l", flag.into());
    }
    if config.pcap_capture {
        push("-P", paths.pcap().into_os_string());
    }
    if let Some(count) = config.effective_session_count() {
        push("-c", count.to_string().into());
    }
    if let Some(stream_config) = config.stream_config_path() {
        push("-T", stream_config.into());
    }
    args
}
