use crate::Config;
use anyhow::Result;
use async_trait::async_trait;
use security::SimKey;
use slog::Logger;

/// Trait representing the collection of services needed by aircell handlers.
#[async_trait]
pub trait HandlerApi: Send + Sync + Clone + 'static {
    fn config(&self) -> &Config;

    fn sim_key(&self) -> &SimKey;

    /// Retrieve the resource named by a DataRequest.  Bounded - a stalled
    /// data peer must not pin the connection past its idle budget.
    async fn fetch_data(&self, target: &[u8], logger: &Logger) -> Result<Vec<u8>>;
}
