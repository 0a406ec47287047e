//! main - starts a gnb relay for one paired session

use anyhow::Result;
use clap::Parser;
use gnb::{Gnb, GnbConfig};
use slog::{Drain, Logger, o};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address of the core (AMF).
    #[arg(long, default_value = "127.0.0.1:3399")]
    core_addr: String,

    /// Address of the subscriber (UE) listener.
    #[arg(long, default_value = "127.0.0.1:6060")]
    ue_addr: String,

    /// RAN node id signaled in the setup request.
    #[arg(long, default_value_t = 1)]
    ran_id: u32,

    /// Tracking area code.
    #[arg(long, default_value_t = 1)]
    tac: u32,

    /// PLMN id.
    #[arg(long, default_value_t = 0x00ff10)]
    plmn: u32,
}

#[async_std::main]
async fn main() -> Result<()> {
    let logger = init_logging();
    let args = Args::parse();

    let gnb = Gnb::new(
        GnbConfig {
            core_addr: args.core_addr,
            ue_addr: args.ue_addr,
            ran_id: args.ran_id,
            tac: args.tac,
            plmn: args.plmn,
        },
        logger,
    );
    gnb.run().await
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
