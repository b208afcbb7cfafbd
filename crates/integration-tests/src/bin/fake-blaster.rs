//! fake-blaster - stands in for the traffic generator in end-to-end tests
//!
//! Accepts the generator's command line, binds the control socket and answers
//! one request per connection. Answers come from the `responses` object of the
//! static config (a string is sent verbatim, anything else JSON encoded);
//! commands without an entry get their own request echoed back. An optional
//! `delay_ms` postpones every answer.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

// Output paths and flags are accepted but not acted upon
#[allow(dead_code)]
#[derive(Debug, Parser)]
#[command(name = "fake-blaster")]
struct Args {
    #[arg(short = 'C')]
    config: Option<PathBuf>,
    #[arg(short = 'S')]
    socket: Option<PathBuf>,
    #[arg(short = 'J')]
    report: Option<PathBuf>,
    #[arg(short = 'j')]
    report_flags: Vec<String>,
    #[arg(short = 'L')]
    log: Option<PathBuf>,
    #[arg(short = 'l')]
    logging_flags: Vec<String>,
    #[arg(short = 'P')]
    pcap: Option<PathBuf>,
    #[arg(short = 'c')]
    session_count: Option<u32>,
    #[arg(short = 'T')]
    stream_config: Option<PathBuf>,
    /// Print version information and exit
    #[arg(short = 'v')]
    version: bool,
}

#[derive(Default)]
struct Behavior {
    responses: Map<String, Value>,
    delay: Duration,
}

impl Behavior {
    fn load(config: Option<&PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = config else {
            return Ok(Self::default());
        };
        let value: Value = serde_json::from_slice(&std::fs::read(path)?)?;
        Ok(Self {
            responses: value
                .get("responses")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            delay: Duration::from_millis(value.get("delay_ms").and_then(Value::as_u64).unwrap_or(0)),
        })
    }

    fn answer(&self, request: &[u8]) -> Vec<u8> {
        let command = serde_json::from_slice::<Value>(request)
            .ok()
            .and_then(|v| v.get("command").and_then(Value::as_str).map(str::to_owned));
        match command.and_then(|c| self.responses.get(&c)) {
            Some(Value::String(raw)) => raw.clone().into_bytes(),
            Some(value) => value.to_string().into_bytes(),
            None => request.to_vec(),
        }
    }
}

async fn serve(mut stream: UnixStream, behavior: &Behavior) -> std::io::Result<()> {
    let (reader, mut writer) = stream.split();
    let mut line = Vec::new();
    BufReader::new(reader).read_until(b'\n', &mut line).await?;
    if line.last() == Some(&b'\n') {
        line.pop();
    }

    tokio::time::sleep(behavior.delay).await;
    writer.write_all(&behavior.answer(&line)).await?;
    writer.shutdown().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.version {
        println!("Version: 0.0.0-fake");
        println!("Compiler: GNU (13.2.0)");
        println!("IO Modes: packet_mmap_raw (default), packet_mmap, raw");
        return Ok(());
    }

    let behavior = Behavior::load(args.config.as_ref())?;
    let socket = args.socket.ok_or("missing -S <socket>")?;
    let listener = UnixListener::bind(&socket)?;
    println!("fake-blaster listening on {}", socket.display());

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = accepted?;
                if let Err(e) = serve(stream, &behavior).await {
                    eprintln!("connection failed: {e}");
                }
            }
            _ = &mut interrupt => break,
        }
    }

    std::fs::remove_file(&socket)?;
    Ok(())
}
