//! relay - blind forwarder between the subscriber and core legs
//!
//! Holds no cryptographic state.  Signalling PDUs pass through as opaque
//! bytes; only the correlation envelopes are decoded, to preserve the
//! subscriber context id across the paired session.

use anyhow::{Result, bail};
use async_std::net::TcpStream;
use async_std::sync::Mutex;
use atomic_counter::{AtomicCounter, RelaxedCounter};
use futures::{FutureExt, pin_mut, select};
use ngap::{
    AmfUeId, FrameError, InitialUeMessage, NasTransport, NgapPdu, SetupRequest, recv_frame,
    send_frame,
};
use slog::{Logger, debug, info};
use std::net::Shutdown;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct GnbConfig {
    pub core_addr: String,
    pub ue_addr: String,
    pub ran_id: u32,
    pub tac: u32,
    pub plmn: u32,
}

pub struct Gnb {
    config: GnbConfig,
    correlation: RelaxedCounter,
    logger: Logger,
}

impl Gnb {
    pub fn new(config: GnbConfig, logger: Logger) -> Self {
        Gnb {
            config,
            correlation: RelaxedCounter::new(1),
            logger,
        }
    }

    /// Serve one paired session: NG setup towards the core, then transparent
    /// forwarding between the two legs until either closes.
    pub async fn run(&self) -> Result<()> {
        let core = TcpStream::connect(&self.config.core_addr).await?;
        info!(self.logger, "Connected to core at {}", self.config.core_addr);
        self.perform_ng_setup(&core).await?;

        let ue = TcpStream::connect(&self.config.ue_addr).await?;
        info!(
            self.logger,
            "Connected to subscriber at {}", self.config.ue_addr
        );

        let ran_ue_id = self.correlation.inc() as u32;
        let subscriber_context = Arc::new(Mutex::new(None));

        let uplink = self
            .relay_uplink(&ue, &core, ran_ue_id, subscriber_context.clone())
            .fuse();
        let downlink = self.relay_downlink(&core, &ue, subscriber_context).fuse();
        pin_mut!(uplink, downlink);
        let result = select! {
            r = uplink => r,
            r = downlink => r,
        };

        // Either leg ending tears down the pair.
        let _ = ue.shutdown(Shutdown::Both);
        let _ = core.shutdown(Shutdown::Both);
        result
    }

    async fn perform_ng_setup(&self, core: &TcpStream) -> Result<()> {
        let request = NgapPdu::SetupRequest(SetupRequest {
            ran_id: self.config.ran_id,
            tac: self.config.tac,
            plmn: self.config.plmn,
        });
        send_frame(&mut &*core, &request.encode()?).await?;

        let frame = recv_frame(&mut &*core).await?;
        let NgapPdu::SetupResponse(response) = NgapPdu::decode(&frame)? else {
            bail!("expected setup response from core")
        };
        info!(self.logger, "NG setup complete with {}", response.amf_name);
        Ok(())
    }

    /// Subscriber -> core.  The first frame opens the subscriber context;
    /// later frames carry the context id captured on the downlink leg.
    async fn relay_uplink(
        &self,
        ue: &TcpStream,
        core: &TcpStream,
        ran_ue_id: u32,
        subscriber_context: Arc<Mutex<Option<AmfUeId>>>,
    ) -> Result<()> {
        loop {
            let nas_pdu = match recv_frame(&mut &*ue).await {
                Ok(frame) => frame,
                Err(FrameError::Closed) => {
                    debug!(self.logger, "Subscriber leg closed");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            let pdu = match *subscriber_context.lock().await {
                None => NgapPdu::InitialUeMessage(InitialUeMessage { ran_ue_id, nas_pdu }),
                Some(amf_ue_id) => NgapPdu::UplinkNasTransport(NasTransport {
                    amf_ue_id,
                    ran_ue_id,
                    nas_pdu,
                }),
            };
            send_frame(&mut &*core, &pdu.encode()?).await?;
        }
    }

    /// Core -> subscriber.  Unwraps the transport envelope and forwards the
    /// inner PDU untouched.
    async fn relay_downlink(
        &self,
        core: &TcpStream,
        ue: &TcpStream,
        subscriber_context: Arc<Mutex<Option<AmfUeId>>>,
    ) -> Result<()> {
        loop {
            let frame = match recv_frame(&mut &*core).await {
                Ok(frame) => frame,
                Err(FrameError::Closed) => {
                    debug!(self.logger, "Core leg closed");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            let NgapPdu::DownlinkNasTransport(transport) = NgapPdu::decode(&frame)? else {
                bail!("unexpected envelope from core")
            };
            *subscriber_context.lock().await = Some(transport.amf_ue_id);
            send_frame(&mut &*ue, &transport.nas_pdu).await?;
        }
    }
}
