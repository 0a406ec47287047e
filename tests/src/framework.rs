use crate::DataNetwork;
use aircell::{Aircell, Config};
use anyhow::Result;
use security::SimKey;
use slog::{Drain, Logger, o};
use std::time::Duration;

pub const TEST_KEY: SimKey = *b"0123456789abcdef0123456789abcdef";

pub async fn init() -> Result<(Aircell, DataNetwork, Logger)> {
    exit_on_panic();
    let logger = test_logger();
    let dn = DataNetwork::new(b"data network says hello".to_vec(), &logger).await?;
    let amf = start_aircell(test_config(), &logger).await?;
    Ok((amf, dn, logger))
}

pub async fn start_aircell(config: Config, logger: &Logger) -> Result<Aircell> {
    Aircell::start(config, logger.new(o!("aircell" => 1))).await
}

pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        amf_name: "AIRCELL-AMF".to_string(),
        sim_key: TEST_KEY,
        idle_timeout: Duration::from_secs(60),
        fetch_timeout: Duration::from_secs(5),
        reveal_session_type: None,
        reveal_value: None,
    }
}

fn exit_on_panic() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::exit(1);
    }));
}

pub fn test_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build();
    let drain = std::sync::Mutex::new(drain).fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}
