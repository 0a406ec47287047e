//! ran_connection - per-connection dispatch loop owning the RAN context

use super::ng_setup::NgSetupProcedure;
use super::ue_procedures::{RegistrationProcedure, UeProcedure, dispatch_uplink};
use crate::{HandlerApi, RanContext};
use anyhow::{Result, bail, ensure};
use async_std::future;
use async_std::net::TcpStream;
use nas::SecuredMessage;
use ngap::{FrameError, NgapPdu, recv_frame};
use slog::{Logger, warn};

pub struct RanConnectionHandler<A: HandlerApi> {
    api: A,
    stream: TcpStream,
    logger: Logger,
}

impl<A: HandlerApi> RanConnectionHandler<A> {
    pub fn spawn(api: A, stream: TcpStream, logger: Logger) {
        let handler = RanConnectionHandler {
            api,
            stream,
            logger,
        };
        async_std::task::spawn(async move {
            if let Err(e) = handler.run().await {
                // Terminal for the connection.  The error stays on our side;
                // the peer only sees the socket close.
                warn!(handler.logger, "RAN connection handler exiting: {e}");
            }
        });
    }

    async fn run(&self) -> Result<()> {
        // The RAN context lives and dies with this task.
        let mut ctx: Option<RanContext> = None;
        loop {
            let idle_timeout = self.api.config().idle_timeout;
            let frame = match future::timeout(idle_timeout, recv_frame(&mut &self.stream)).await {
                Err(_) => bail!("idle timeout waiting for a frame"),
                Ok(Err(FrameError::Closed)) => return Ok(()),
                Ok(frame) => frame?,
            };
            let pdu = NgapPdu::decode(&frame)?;
            self.handle_pdu(&mut ctx, pdu).await?;
        }
    }

    async fn handle_pdu(&self, ctx: &mut Option<RanContext>, pdu: NgapPdu) -> Result<()> {
        match pdu {
            NgapPdu::SetupRequest(r) => {
                ensure!(ctx.is_none(), "duplicate NG setup on connection");
                *ctx = Some(
                    NgSetupProcedure::new(&self.api, &self.logger)
                        .run(r, &self.stream)
                        .await?,
                );
                Ok(())
            }
            NgapPdu::InitialUeMessage(m) => {
                let Some(ran) = ctx.as_mut() else {
                    bail!("initial UE message before NG setup")
                };
                RegistrationProcedure::new(&self.api, &self.stream, ran, &self.logger)
                    .run(m)
                    .await
            }
            NgapPdu::UplinkNasTransport(m) => {
                let Some(ran) = ctx.as_mut() else {
                    bail!("uplink transport before NG setup")
                };
                // The subscriber context id is the sole lookup key; the
                // RAN-side correlation id is never consulted.
                let Some(ue) = ran.ues.get_mut(&m.amf_ue_id) else {
                    bail!("unknown subscriber context {}", m.amf_ue_id)
                };
                let pdu = SecuredMessage::decode(&m.nas_pdu)?;
                let procedure = UeProcedure::new(&self.api, &self.stream, ue, &self.logger);
                dispatch_uplink(procedure, pdu).await
            }
            NgapPdu::SetupResponse(_) | NgapPdu::DownlinkNasTransport(_) => {
                bail!("downlink-only envelope received from RAN")
            }
        }
    }
}
