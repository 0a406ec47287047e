use crate::procedures::RanConnectionHandler;
use crate::{Config, HandlerApi, userplane};
use anyhow::Result;
use async_std::net::TcpListener;
use async_std::prelude::*;
use async_std::sync::Mutex;
use async_std::task::JoinHandle;
use async_trait::async_trait;
use security::SimKey;
use slog::{Logger, info, o, warn};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone)]
pub struct Aircell {
    config: Arc<Config>,
    logger: Logger,
    local_addr: SocketAddr,
    server_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Aircell {
    pub async fn start(config: Config, logger: Logger) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!(&logger, "Listen for RAN connections on {}", local_addr);

        let amf = Self {
            config: Arc::new(config),
            logger,
            local_addr,
            server_task: Arc::new(Mutex::new(None)),
        };
        let task = async_std::task::spawn(Self::serve(amf.clone(), listener));
        *amf.server_task.lock().await = Some(task);
        Ok(amf)
    }

    async fn serve(api: Aircell, listener: TcpListener) {
        let mut incoming = listener.incoming();
        while let Some(stream) = incoming.next().await {
            match stream {
                Ok(stream) => {
                    let conn_id = rand::random::<u32>();
                    let logger = api.logger.new(o!("conn" => conn_id));
                    RanConnectionHandler::spawn(api.clone(), stream, logger);
                }
                Err(e) => warn!(api.logger, "Accept failed - {e}"),
            }
        }
    }

    pub async fn graceful_shutdown(self) {
        info!(&self.logger, "Shutting down");
        if let Some(task) = self.server_task.lock().await.take() {
            task.cancel().await;
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl HandlerApi for Aircell {
    fn config(&self) -> &Config {
        &self.config
    }

    fn sim_key(&self) -> &SimKey {
        &self.config.sim_key
    }

    async fn fetch_data(&self, target: &[u8], logger: &Logger) -> Result<Vec<u8>> {
        userplane::fetch(target, self.config.fetch_timeout, logger).await
    }
}
