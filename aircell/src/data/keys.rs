use anyhow::Result;
use security::SimKey;
use serde::Deserialize;
use slog::{Logger, error, info};
use std::fs;

#[derive(Deserialize, Debug)]
struct KeyFile {
    #[serde(with = "hex")]
    sim_key: SimKey,
}

/// Load the pre-shared subscriber key from file into memory.
pub fn load_key_file(filename: &str, logger: &Logger) -> Result<SimKey> {
    let path = std::env::current_dir()?;
    let contents = fs::read_to_string(filename).inspect_err(|e| {
        error!(
            logger,
            "Failed to load key file {filename} (current directory {}) with error code {e}",
            path.display()
        )
    })?;
    let key = parse_key_file(&contents)?;
    info!(logger, "Loaded subscriber key from {filename}");
    Ok(key)
}

fn parse_key_file(contents: &str) -> Result<SimKey> {
    let key_file: KeyFile = toml::from_str(contents)?;
    Ok(key_file.sim_key)
}
