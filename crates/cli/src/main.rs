//! blasterctl CLI - Command-line interface for the blasterctl daemon

use anyhow::{Context, Result};
use blasterctl_core::domain::RunningConfig;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8001";

#[derive(Parser)]
#[command(name = "blasterctl")]
#[command(about = "Traffic generator instance control CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "BLASTERCTL_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List instances
    List,

    /// Create or overwrite an instance from a config file
    Create {
        name: String,

        /// Static instance config (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Delete a stopped instance
    Delete { name: String },

    /// Show instance status
    Status { name: String },

    /// Start an instance
    Start {
        name: String,

        #[command(flatten)]
        run: StartArgs,
    },

    /// Interrupt a running instance
    Stop { name: String },

    /// Kill a running instance
    Kill { name: String },

    /// Send a control socket command
    Command {
        name: String,

        /// Command name (e.g. session-counters)
        command: String,

        /// Arguments as JSON object
        #[arg(short, long)]
        arguments: Option<String>,
    },

    /// Print the Prometheus exposition
    Metrics,

    /// List the host network interfaces
    Interfaces,

    /// Show controller and traffic generator versions
    Version,
}

#[derive(Args)]
struct StartArgs {
    /// Generate a report file
    #[arg(long)]
    report: bool,

    #[arg(long, value_delimiter = ',')]
    report_flags: Vec<String>,

    /// Write a log file
    #[arg(long)]
    logging: bool,

    #[arg(long, value_delimiter = ',')]
    logging_flags: Vec<String>,

    /// Write a packet capture
    #[arg(long)]
    pcap_capture: bool,

    /// Deprecated, use --session-count
    #[arg(long, default_value_t = 0)]
    pppoe_session_count: u32,

    #[arg(long, default_value_t = 0)]
    session_count: u32,

    /// Stream config file (absolute path)
    #[arg(long)]
    stream_config: Option<String>,

    /// Metric families to collect (session_counters, interfaces, streams, ...)
    #[arg(long, value_delimiter = ',')]
    metric_flags: Vec<String>,
}

impl From<StartArgs> for RunningConfig {
    fn from(args: StartArgs) -> Self {
        RunningConfig {
            report: args.report,
            report_flags: args.report_flags,
            logging: args.logging,
            logging_flags: args.logging_flags,
            pcap_capture: args.pcap_capture,
            pppoe_session_count: args.pppoe_session_count,
            session_count: args.session_count,
            stream_config: args.stream_config.unwrap_or_default(),
            metric_flags: args.metric_flags,
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct StatusRow {
    instance_name: String,
    status: String,
}

#[derive(Deserialize, Tabled)]
struct VersionRow {
    version: String,
    blaster_version: String,
    blaster_compiler: String,
    #[tabled(display_with = "join_modes")]
    blaster_io_modes: Vec<String>,
}

#[derive(Deserialize, Tabled)]
struct InterfaceRow {
    name: String,
    mtu: u32,
    #[tabled(display_with = "join_modes")]
    flags: Vec<String>,
    mac: String,
}

fn join_modes(modes: &[String]) -> String {
    modes.join(", ")
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

/// Instance config text, sent as-is once it parses as JSON
fn read_config(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str::<serde_json::Value>(&raw).context("Invalid JSON config")?;
    Ok(raw)
}

fn created_message(result: &serde_json::Value, name: &str) -> String {
    let verb = if result["created"].as_bool().unwrap_or(false) {
        "created"
    } else {
        "updated"
    };
    let name = result["instance_name"].as_str().unwrap_or(name);
    format!("✓ Instance {} {}", name, verb)
}

fn parse_arguments(raw: Option<&str>) -> Result<serde_json::Value> {
    match raw {
        None => Ok(json!({})),
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).context("Invalid JSON arguments")?;
            anyhow::ensure!(value.is_object(), "Arguments must be a JSON object");
            Ok(value)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            let result = call_rpc(&cli.rpc_url, "instance.list.v1", json!({})).await?;
            let names: Vec<String> = serde_json::from_value(result["instances"].clone())?;
            if names.is_empty() {
                println!("{}", "No instances".yellow());
            }
            for name in names {
                println!("{}", name);
            }
        }

        Commands::Create { name, config } => {
            let raw = read_config(&config)?;
            let params = json!({ "instance_name": name, "config": raw });
            let result = call_rpc(&cli.rpc_url, "instance.create.v1", params).await?;
            println!("{}", created_message(&result, &name).green().bold());
        }

        Commands::Delete { name } => {
            call_rpc(
                &cli.rpc_url,
                "instance.delete.v1",
                json!({ "instance_name": name }),
            )
            .await?;
            println!("{}", format!("✓ Instance {} deleted", name).green().bold());
        }

        Commands::Status { name } => {
            let result = call_rpc(
                &cli.rpc_url,
                "instance.status.v1",
                json!({ "instance_name": name }),
            )
            .await?;
            let running_config = result["running_config"].clone();
            let row: StatusRow = serde_json::from_value(result)?;

            println!("{}", Table::new(vec![row]));
            if !running_config.is_null() {
                println!();
                println!("{}", "Running config:".cyan().bold());
                println!("{}", serde_json::to_string_pretty(&running_config)?);
            }
        }

        Commands::Start { name, run } => {
            let running_config = RunningConfig::from(run);
            let params = json!({ "instance_name": name, "running_config": running_config });
            call_rpc(&cli.rpc_url, "instance.start.v1", params).await?;
            println!("{}", format!("✓ Instance {} started", name).green().bold());
        }

        Commands::Stop { name } => {
            call_rpc(
                &cli.rpc_url,
                "instance.stop.v1",
                json!({ "instance_name": name }),
            )
            .await?;
            println!("{}", format!("✓ Stop requested for {}", name).green());
        }

        Commands::Kill { name } => {
            call_rpc(
                &cli.rpc_url,
                "instance.kill.v1",
                json!({ "instance_name": name }),
            )
            .await?;
            println!("{}", format!("✓ Kill requested for {}", name).green());
        }

        Commands::Command {
            name,
            command,
            arguments,
        } => {
            let params = json!({
                "instance_name": name,
                "command": command,
                "arguments": parse_arguments(arguments.as_deref())?,
            });
            let result = call_rpc(&cli.rpc_url, "instance.command.v1", params).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Metrics => {
            let result = call_rpc(&cli.rpc_url, "metrics.scrape.v1", json!({})).await?;
            print!("{}", result["text"].as_str().unwrap_or_default());
        }

        Commands::Interfaces => {
            let result = call_rpc(&cli.rpc_url, "controller.interfaces.v1", json!({})).await?;
            let rows: Vec<InterfaceRow> = serde_json::from_value(result["interfaces"].clone())?;
            println!("{}", Table::new(rows));
        }

        Commands::Version => {
            let result = call_rpc(&cli.rpc_url, "controller.version.v1", json!({})).await?;
            let row: VersionRow = serde_json::from_value(result)?;
            println!("{}", Table::new(vec![row]));
        }
    }

    Ok(())
}
