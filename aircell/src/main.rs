//! main - starts the aircell core (AMF)

use anyhow::Result;
use async_std::channel::Sender;
use async_std::prelude::*;
use aircell::{Aircell, Config, keys};
use clap::Parser;
use signal_hook::consts::signal::*;
use signal_hook_async_std::Signals;
use slog::{Drain, Logger, o};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen address for RAN connections.
    #[arg(long, default_value = "0.0.0.0:3399")]
    bind_addr: SocketAddr,

    /// Human readable AMF name signaled in the setup response.
    #[arg(long, default_value = "AIRCELL-AMF")]
    amf_name: String,

    /// TOML file holding the hex encoded pre-shared subscriber key.
    #[arg(long, default_value = "sim_key.toml")]
    key_file: String,

    /// Seconds without a complete frame before a connection is abandoned.
    #[arg(long, default_value_t = 60)]
    idle_timeout: u64,

    /// Bound in seconds on the outbound fetch performed for a data request.
    #[arg(long, default_value_t = 10)]
    fetch_timeout: u64,

    /// Session type whose establishment accept returns the reveal value
    /// instead of a placeholder address.
    #[arg(long, requires = "reveal_value")]
    reveal_session_type: Option<u8>,

    /// Value returned for the reveal session type.
    #[arg(long)]
    reveal_value: Option<String>,
}

#[async_std::main]
async fn main() -> Result<()> {
    exit_on_panic();
    let logger = init_logging();

    let args = Args::parse();
    let sim_key = keys::load_key_file(&args.key_file, &logger)?;

    let amf = Aircell::start(
        Config {
            bind_addr: args.bind_addr,
            amf_name: args.amf_name,
            sim_key,
            idle_timeout: Duration::from_secs(args.idle_timeout),
            fetch_timeout: Duration::from_secs(args.fetch_timeout),
            reveal_session_type: args.reveal_session_type,
            reveal_value: args.reveal_value,
        },
        logger,
    )
    .await?;

    wait_for_signal().await?;
    amf.graceful_shutdown().await;

    Ok(())
}

fn init_logging() -> Logger {
    // Use info level logging by default
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info") }
    }
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

fn exit_on_panic() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::exit(1);
    }));
}

async fn wait_for_signal() -> Result<i32> {
    let signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])?;
    let handle = signals.handle();
    let (sig_sender, sig_receiver) = async_std::channel::unbounded();
    let signals_task = async_std::task::spawn(handle_signals(signals, sig_sender));
    let signal = sig_receiver.recv().await;
    handle.close();
    signals_task.await;
    Ok(signal?)
}

async fn handle_signals(signals: Signals, sig_sender: Sender<i32>) {
    let mut signals = signals.fuse();
    while let Some(signal) = signals.next().await {
        match signal {
            SIGHUP => {
                // Reload configuration
                // Reopen the log file
            }
            SIGTERM | SIGINT | SIGQUIT => {
                // Shutdown the system;
                let _ = sig_sender.send(signal).await;
            }
            _ => unreachable!(),
        }
    }
}
