mod authentication;
mod data_transfer;
mod location_report;
mod registration;
mod session_establishment;

use super::HandlerApi;
use crate::UeContext;
use anyhow::{Result, anyhow, bail, ensure};
use async_std::net::TcpStream;
use authentication::AuthenticationProcedure;
use data_transfer::DataTransferProcedure;
use location_report::LocationReportProcedure;
use nas::{MessageType, NasMessage, SecuredMessage, decode_message};
use ngap::{NasTransport, NgapPdu, send_frame};
use session_establishment::SessionEstablishmentProcedure;
use slog::{Logger, debug};

pub use registration::RegistrationProcedure;

/// Services shared by every per-subscriber procedure.
pub struct UeProcedure<'a, A: HandlerApi> {
    pub api: &'a A,
    pub stream: &'a TcpStream,
    pub ue: &'a mut UeContext,
    pub logger: &'a Logger,
}

impl<'a, A: HandlerApi> UeProcedure<'a, A> {
    pub fn new(api: &'a A, stream: &'a TcpStream, ue: &'a mut UeContext, logger: &'a Logger) -> Self {
        UeProcedure {
            api,
            stream,
            ue,
            logger,
        }
    }

    pub fn log_message(&self, s: &str) {
        debug!(self.logger, "{}", s)
    }

    pub async fn send_downlink(&self, pdu: &SecuredMessage) -> Result<()> {
        let transport = NgapPdu::DownlinkNasTransport(NasTransport {
            amf_ue_id: self.ue.amf_ue_id,
            ran_ue_id: self.ue.ran_ue_id,
            nas_pdu: pdu.encode(),
        });
        send_frame(&mut &*self.stream, &transport.encode()?).await?;
        Ok(())
    }

    /// Wrap a downlink message under the selected algorithms.
    pub fn protect<M: NasMessage>(&self, m: &M) -> Result<SecuredMessage> {
        let selected = self
            .ue
            .selected
            .ok_or_else(|| anyhow!("no security algorithms selected"))?;
        Ok(SecuredMessage::protect(
            m,
            selected.integrity,
            selected.ciphering,
            self.api.sim_key(),
        )?)
    }

    /// Gate for every post-SecurityMode uplink message: the subscriber must
    /// be authenticated and the message must verify and decrypt under the
    /// selected algorithms before its payload is trusted.
    pub fn open_uplink(&self, pdu: &SecuredMessage) -> Result<Vec<u8>> {
        ensure!(
            self.ue.authenticated,
            "secured message before authentication completed"
        );
        let selected = self
            .ue
            .selected
            .ok_or_else(|| anyhow!("no security algorithms selected"))?;
        Ok(pdu.open(selected.integrity, selected.ciphering, self.api.sim_key())?)
    }
}

impl<A: HandlerApi> std::ops::Deref for UeProcedure<'_, A> {
    type Target = A;

    fn deref(&self) -> &Self::Target {
        self.api
    }
}

/// Dispatch one uplink NAS message for an existing subscriber context.
pub async fn dispatch_uplink<A: HandlerApi>(
    procedure: UeProcedure<'_, A>,
    pdu: SecuredMessage,
) -> Result<()> {
    match pdu.message_type {
        MessageType::AuthenticationResponse => {
            AuthenticationProcedure::new(procedure).run(&pdu).await
        }
        MessageType::SessionEstablishmentRequest => {
            let body = procedure.open_uplink(&pdu)?;
            SessionEstablishmentProcedure::new(procedure)
                .run(decode_message(&body)?)
                .await
        }
        MessageType::LocationReport => {
            let body = procedure.open_uplink(&pdu)?;
            LocationReportProcedure::new(procedure).report(decode_message(&body)?);
            Ok(())
        }
        MessageType::LocationReportRequest => {
            let body = procedure.open_uplink(&pdu)?;
            decode_message::<nas::LocationReportRequest>(&body)?;
            LocationReportProcedure::new(procedure).query().await
        }
        MessageType::DataRequest => {
            let body = procedure.open_uplink(&pdu)?;
            DataTransferProcedure::new(procedure)
                .run(decode_message(&body)?)
                .await
        }
        other => bail!("invalid uplink message type {other:?}"),
    }
}
