//! fetch - bounded retrieval of the resource named by a DataRequest

use anyhow::{Result, anyhow, bail};
use async_std::future;
use async_std::io::ReadExt;
use async_std::io::WriteExt;
use async_std::net::TcpStream;
use slog::{Logger, debug};
use std::time::Duration;

/// Cap on the bytes read back, so a response always fits one frame.
pub const MAX_FETCH_BYTES: usize = 8192;

const DEFAULT_GOPHER_PORT: u16 = 70;

/// Interpret the request bytes as a gopher URL and retrieve it.  The whole
/// operation is bounded by `timeout`.
pub async fn fetch(target: &[u8], timeout: Duration, logger: &Logger) -> Result<Vec<u8>> {
    let url = std::str::from_utf8(target).map_err(|_| anyhow!("fetch target is not valid UTF-8"))?;
    let (authority, selector) = parse_gopher_url(url)?;
    debug!(logger, "Fetching \"{selector}\" from {authority}");
    future::timeout(timeout, fetch_inner(&authority, &selector))
        .await
        .map_err(|_| anyhow!("data fetch from {authority} timed out"))?
}

async fn fetch_inner(authority: &str, selector: &str) -> Result<Vec<u8>> {
    let mut stream = TcpStream::connect(authority).await?;
    stream.write_all(selector.as_bytes()).await?;
    stream.write_all(b"\r\n").await?;

    let mut payload = vec![0u8; MAX_FETCH_BYTES];
    let mut total = 0;
    while total < MAX_FETCH_BYTES {
        let n = stream.read(&mut payload[total..]).await?;
        if n == 0 {
            break;
        }
        total += n;
    }
    payload.truncate(total);
    Ok(payload)
}

/// `gopher://host[:port]/selector` - the only scheme the data plane speaks.
fn parse_gopher_url(url: &str) -> Result<(String, String)> {
    let Some(rest) = url.strip_prefix("gopher://") else {
        bail!("unsupported fetch target \"{url}\"")
    };
    let (host, selector) = match rest.split_once('/') {
        Some((host, selector)) => (host, selector.to_string()),
        None => (rest, String::new()),
    };
    if host.is_empty() {
        bail!("fetch target has no host");
    }
    let authority = if host.contains(':') {
        host.to_string()
    } else {
        format!("{host}:{DEFAULT_GOPHER_PORT}")
    };
    Ok((authority, selector))
}
