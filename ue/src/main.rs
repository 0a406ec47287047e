//! main - starts the subscriber (UE) service

use anyhow::Result;
use async_std::channel::Sender;
use async_std::prelude::*;
use clap::Parser;
use nas::{MobileIdentity, SecurityCapabilities};
use signal_hook::consts::signal::*;
use signal_hook_async_std::Signals;
use slog::{Drain, Logger, o};
use std::net::SocketAddr;
use std::time::Duration;
use ue::{Ue, UeConfig, load_key_file};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen address for the radio leg.
    #[arg(long, default_value = "0.0.0.0:6060")]
    bind_addr: SocketAddr,

    /// TOML file holding the hex encoded pre-shared subscriber key.
    #[arg(long, default_value = "sim_key.toml")]
    key_file: String,

    /// File holding the protected value sent in the location report.
    #[arg(long, default_value = "location.data")]
    location_file: String,

    /// Mobile country code.
    #[arg(long, default_value_t = 1)]
    mcc: u8,

    /// Mobile network code.
    #[arg(long, default_value_t = 1)]
    mnc: u8,

    /// Subscriber number.
    #[arg(long, default_value_t = 628_301_234_567)]
    msin: u64,

    /// Offered integrity algorithm (1-4).
    #[arg(long, default_value_t = 1)]
    integrity: u8,

    /// Offered ciphering algorithm (0 or 1).
    #[arg(long, default_value_t = 0)]
    ciphering: u8,

    /// Session type requested at establishment.
    #[arg(long, default_value_t = 0)]
    session_type: u8,

    /// Resource fetched through the established session.
    #[arg(long, default_value = "gopher://gopher.website.org/")]
    data_target: String,

    /// Seconds without a complete frame before a handshake is abandoned.
    #[arg(long, default_value_t = 60)]
    idle_timeout: u64,
}

#[async_std::main]
async fn main() -> Result<()> {
    exit_on_panic();
    let logger = init_logging();

    let args = Args::parse();
    let sim_key = load_key_file(&args.key_file, &logger)?;

    let ue = Ue::start(
        UeConfig {
            bind_addr: args.bind_addr,
            sim_key,
            location_file: args.location_file,
            identity: MobileIdentity {
                mcc: args.mcc,
                mnc: args.mnc,
                msin: args.msin,
            },
            requested: SecurityCapabilities {
                ciphering: args.ciphering,
                integrity: args.integrity,
            },
            session_type: args.session_type,
            data_target: args.data_target,
            idle_timeout: Duration::from_secs(args.idle_timeout),
        },
        logger,
    )
    .await?;

    wait_for_signal().await?;
    ue.graceful_shutdown().await;

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
            }
            SIGTERM | SIGINT | SIGQUIT => {
                let _ = sig_sender.send(signal).await;
            }
            _ => unreachable!(),
        }
    }
}
