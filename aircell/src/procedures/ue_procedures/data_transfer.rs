//! data_transfer - session-scoped fetch and relay of a data-plane resource

use super::{HandlerApi, UeProcedure};
use anyhow::{Result, ensure};
use derive_deref::{Deref, DerefMut};
use nas::{DataRequest, DataResponse};
use slog::info;

#[derive(Deref, DerefMut)]
pub struct DataTransferProcedure<'a, A: HandlerApi>(UeProcedure<'a, A>);

impl<'a, A: HandlerApi> DataTransferProcedure<'a, A> {
    pub fn new(inner: UeProcedure<'a, A>) -> Self {
        DataTransferProcedure(inner)
    }

    pub async fn run(self, request: DataRequest) -> Result<()> {
        self.log_message(">> DataRequest");
        ensure!(
            self.ue.sessions.contains_key(&request.session_id),
            "unknown session {} for {}",
            request.session_id,
            self.ue.amf_ue_id
        );

        let payload = self.api.fetch_data(&request.target, self.logger).await?;
        info!(
            self.logger,
            "Fetched {} bytes for session {}",
            payload.len(),
            request.session_id
        );

        let response = DataResponse {
            session_id: request.session_id,
            payload,
        };
        let pdu = self.protect(&response)?;
        self.log_message("<< DataResponse");
        self.send_downlink(&pdu).await
    }
}
