use anyhow::Result;
use async_std::io::{ReadExt, WriteExt};
use async_std::net::{TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::sync::Mutex;
use slog::{Logger, info, o};
use std::net::SocketAddr;
use std::sync::Arc;

/// Mock up a gopher-style server in the DN for the core to fetch from.
/// Records every selector requested.
pub struct DataNetwork {
    logger: Logger,
    local_addr: SocketAddr,
    response: Vec<u8>,
    selectors: Arc<Mutex<Vec<String>>>,
}

impl DataNetwork {
    pub async fn new(response: Vec<u8>, logger: &Logger) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let local_addr = listener.local_addr()?;
        let dn = DataNetwork {
            logger: logger.new(o!("dn" => 1)),
            local_addr,
            response: response.clone(),
            selectors: Arc::new(Mutex::new(Vec::new())),
        };

        let selectors = dn.selectors.clone();
        let served = response;
        let dn_logger = dn.logger.clone();
        async_std::task::spawn(async move {
            let mut incoming = listener.incoming();
            while let Some(Ok(stream)) = incoming.next().await {
                let _ = serve_one(stream, &served, &selectors, &dn_logger).await;
            }
        });
        Ok(dn)
    }

    /// The gopher URL a DataRequest should carry to reach this server.
    pub fn url(&self, selector: &str) -> String {
        format!("gopher://{}/{}", self.local_addr, selector)
    }

    pub fn expected_response(&self) -> &[u8] {
        &self.response
    }

    pub async fn requested_selectors(&self) -> Vec<String> {
        self.selectors.lock().await.clone()
    }
}

async fn serve_one(
    mut stream: TcpStream,
    response: &[u8],
    selectors: &Arc<Mutex<Vec<String>>>,
    logger: &Logger,
) -> Result<()> {
    let mut request = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = stream.read(&mut byte).await?;
        if n == 0 || byte[0] == b'\n' {
            break;
        }
        if byte[0] != b'\r' {
            request.push(byte[0]);
        }
    }
    let selector = String::from_utf8_lossy(&request).to_string();
    info!(logger, "Serving selector \"{selector}\"");
    selectors.lock().await.push(selector);
    stream.write_all(response).await?;
    Ok(())
}
