//! sockcast command-line entry point
//!
//! `sockcast -s /path/to/socket.sock` runs the relay: stdin is teed to
//! stdout and broadcast to every consumer attached to the socket.
//! `sockcast -c /path/to/socket.sock` attaches as a consumer and
//! streams whatever the relay sends to stdout.

use std::path::PathBuf;
use std::process;

use sockcast::client::ConsumerClient;
use sockcast::error::Result;
use sockcast::pump;
use sockcast::server::{Relay, RelayConfig};

enum Mode {
    Relay,
    Consumer,
}

fn usage_and_exit(cmd: &str) -> ! {
    eprintln!("Usage: {} (-s|-c) /path/to/socket.sock", cmd);
    eprintln!("\t-s: relay mode (tee stdin to stdout and broadcast to the socket)");
    eprintln!("\t-c: consumer mode (stream received bytes to stdout)");
    process::exit(255);
}

/// Exactly one of `-s`/`-c` plus a socket path; anything else is usage
fn parse_args() -> (Mode, PathBuf) {
    let mut args = std::env::args();
    let cmd = args.next().unwrap_or_else(|| "sockcast".into());

    let mut relay_mode = false;
    let mut consumer_mode = false;
    let mut path: Option<PathBuf> = None;

    for arg in args {
        match arg.as_str() {
            "-s" => relay_mode = true,
            "-c" => consumer_mode = true,
            _ if !arg.starts_with('-') && path.is_none() => path = Some(PathBuf::from(arg)),
            _ => usage_and_exit(&cmd),
        }
    }

    if relay_mode == consumer_mode {
        usage_and_exit(&cmd);
    }

    let mode = if relay_mode {
        Mode::Relay
    } else {
        Mode::Consumer
    };

    match path {
        Some(path) => (mode, path),
        None => usage_and_exit(&cmd),
    }
}

async fn run_relay(path: PathBuf) -> Result<()> {
    let config = RelayConfig::new(path).force_reuse(true);
    let mut relay = Relay::bind(config)?;

    let result = pump::run(
        tokio::io::stdin(),
        tokio::io::stdout(),
        &relay,
        pump::DEFAULT_CHUNK_SIZE,
    )
    .await;

    relay.shutdown().await;
    result.map(|_| ())
}

async fn run_consumer(path: PathBuf) -> Result<()> {
    let mut client = ConsumerClient::connect(&path).await?;
    client.copy_to(tokio::io::stdout()).await.map(|_| ())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (mode, path) = parse_args();

    let result = match mode {
        Mode::Relay => run_relay(path).await,
        Mode::Consumer => run_consumer(path).await,
    };

    if let Err(e) = result {
        eprintln!("sockcast: {}", e);
        process::exit(e.os_code().unwrap_or(1));
    }
}
