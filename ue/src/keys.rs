use anyhow::Result;
use security::SimKey;
use serde::Deserialize;
use slog::{Logger, info};
use std::fs;

#[derive(Deserialize, Debug)]
struct KeyFile {
    #[serde(with = "hex")]
    sim_key: SimKey,
}

/// Load the pre-shared subscriber key.  Same file format as the core reads.
pub fn load_key_file(filename: &str, logger: &Logger) -> Result<SimKey> {
    let contents = fs::read_to_string(filename)?;
    let key_file: KeyFile = toml::from_str(&contents)?;
    info!(logger, "Loaded subscriber key from {filename}");
    Ok(key_file.sim_key)
}
