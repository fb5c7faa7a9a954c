//! Simulated host for trying autostop from a terminal.
//!
//! Reads commands from stdin and feeds them to the runtime as host events:
//!
//! ```text
//! join      a player joins
//! leave     a player leaves (the count is snapshotted before removal)
//! status    print population and countdown
//! quit      tear down without shutting down
//! ```
//!
//! When the countdown elapses the simulated server "stops" and the process exits.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use autostop::{AutoStop, Config, Host, HostEvent, ShutdownError};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Notify, mpsc};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "autostop-sim", about = "Drive autostop with a simulated game server")]
struct Args {
    /// Directory holding AutoStop.json (created with defaults when missing).
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Override the configured delay (milliseconds).
    #[arg(long)]
    delay_ms: Option<i64>,

    /// Players online at startup.
    #[arg(long, default_value_t = 0)]
    players: usize,
}

/// In-memory server standing in for a real host.
struct SimServer {
    online: AtomicUsize,
    stopped: Notify,
}

#[async_trait]
impl Host for SimServer {
    fn active_player_count(&self) -> usize {
        self.online.load(Ordering::SeqCst)
    }

    async fn request_shutdown(&self) -> Result<(), ShutdownError> {
        tracing::info!("server stopping: no players online");
        self.stopped.notify_one();
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls level, default = info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let path = Config::file_path(&args.config_dir);
    let mut config = Config::load_or_init(&path);
    if let Some(delay) = args.delay_ms {
        config = Config { delay, ..config }.validated();
    }
    tracing::info!(path = %path.display(), ?config, "configuration loaded");

    let server = Arc::new(SimServer {
        online: AtomicUsize::new(args.players),
        stopped: Notify::new(),
    });
    let stop = AutoStop::builder(config, server.clone()).build();
    let scheduler = Arc::clone(stop.scheduler());

    let (tx, rx) = mpsc::channel(64);
    tx.send(HostEvent::Ready)
        .await
        .context("runtime stopped before startup")?;
    let runtime = tokio::spawn(stop.run(rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = server.stopped.notified() => break,
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let event = match line.trim() {
                    "join" => {
                        server.online.fetch_add(1, Ordering::SeqCst);
                        HostEvent::PlayerJoined
                    }
                    "leave" => {
                        let population = server.online.load(Ordering::SeqCst);
                        if population == 0 {
                            println!("nobody to remove");
                            continue;
                        }
                        server.online.fetch_sub(1, Ordering::SeqCst);
                        HostEvent::PlayerLeft { population }
                    }
                    "status" => {
                        println!(
                            "online={} state={:?} remaining={:?}",
                            server.active_player_count(),
                            scheduler.state(),
                            scheduler.remaining()
                        );
                        continue;
                    }
                    "quit" => break,
                    "" => continue,
                    other => {
                        println!("unknown command {other:?} (join | leave | status | quit)");
                        continue;
                    }
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        }
    }

    // a closed channel is a teardown
    drop(tx);
    runtime.await.context("runtime task failed")?;
    Ok(())
}
