// Daemon configuration (flags with environment fallbacks)

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use blasterctl_infra_system::fs_repository::{DEFAULT_CONFIG_FOLDER, DEFAULT_EXECUTABLE};
use blasterctl_infra_system::RepositoryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "blasterctld", version, about = "Traffic generator instance control plane")]
pub struct Config {
    /// JSON-RPC listen address
    #[arg(long, env = "BLASTERCTL_ADDR", default_value = "127.0.0.1:8001")]
    pub addr: String,

    /// Instance root directory
    #[arg(short = 'd', long, env = "BLASTERCTL_DIRECTORY", default_value = DEFAULT_CONFIG_FOLDER)]
    pub directory: String,

    /// Traffic generator executable
    #[arg(short = 'e', long, env = "BLASTERCTL_EXECUTABLE", default_value = DEFAULT_EXECUTABLE)]
    pub executable: PathBuf,

    #[arg(long, env = "BLASTERCTL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, env = "BLASTERCTL_DEBUG")]
    pub debug: bool,
}

impl Config {
    pub fn repository(&self) -> RepositoryConfig {
        RepositoryConfig {
            config_folder: PathBuf::from(shellexpand::tilde(&self.directory).into_owned()),
            executable: self.executable.clone(),
            ..Default::default()
        }
    }

    pub fn default_filter(&self) -> &'static str {
        if self.debug {
            "blasterctl=debug"
        } else {
            "blasterctl=info"
        }
    }
}
