use anyhow::{Result, anyhow, bail, ensure};
use async_std::future;
use async_std::net::TcpStream;
use nas::{
    AuthenticationRequest, AuthenticationResponse, MessageType, MobileIdentity, NasMessage,
    RegistrationRequest, SecuredMessage, SecurityCapabilities, SecurityModeCommand, decode_message,
};
use ngap::{
    AmfUeId, InitialUeMessage, NasTransport, NgapPdu, SetupRequest, SetupResponse, recv_frame,
    send_frame,
};
use security::SimKey;
use slog::{Logger, info, o};
use std::net::SocketAddr;
use std::time::Duration;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Test driver speaking the raw RAN-side protocol: plays both the relay and
/// the subscriber for one connection to the core.
pub struct MockRan {
    stream: TcpStream,
    key: SimKey,
    ran_ue_id: u32,
    amf_ue_id: Option<AmfUeId>,
    logger: Logger,
}

impl MockRan {
    pub async fn connect(addr: SocketAddr, key: SimKey, logger: &Logger) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(MockRan {
            stream,
            key,
            ran_ue_id: 1,
            amf_ue_id: None,
            logger: logger.new(o!("mock_ran" => 1)),
        })
    }

    pub async fn perform_ng_setup(&mut self) -> Result<SetupResponse> {
        let request = NgapPdu::SetupRequest(SetupRequest {
            ran_id: 1,
            tac: 1,
            plmn: 0x00ff10,
        });
        info!(&self.logger, "SetupRequest >>");
        self.send_pdu(&request).await?;
        match self.recv_pdu().await? {
            NgapPdu::SetupResponse(response) => {
                info!(&self.logger, "SetupResponse <<");
                Ok(response)
            }
            other => bail!("expected setup response, got {other:?}"),
        }
    }

    /// Send a registration carried in an InitialUeMessage, as the relay
    /// would wrap it.
    pub async fn send_registration(&mut self, requested: SecurityCapabilities) -> Result<()> {
        let request = RegistrationRequest {
            identity: MobileIdentity {
                mcc: 1,
                mnc: 1,
                msin: 628_301_234_567,
            },
            requested,
        };
        let nas_pdu = SecuredMessage::plain(&request)?.encode();
        self.send_pdu(&NgapPdu::InitialUeMessage(InitialUeMessage {
            ran_ue_id: self.ran_ue_id,
            nas_pdu,
        }))
        .await
    }

    pub async fn send_uplink(&mut self, pdu: &SecuredMessage) -> Result<()> {
        let amf_ue_id = self
            .amf_ue_id
            .ok_or_else(|| anyhow!("no subscriber context captured yet"))?;
        self.send_pdu(&NgapPdu::UplinkNasTransport(NasTransport {
            amf_ue_id,
            ran_ue_id: self.ran_ue_id,
            nas_pdu: pdu.encode(),
        }))
        .await
    }

    /// Receive a downlink transport, capturing the subscriber context id.
    pub async fn recv_downlink(&mut self) -> Result<SecuredMessage> {
        match self.recv_pdu().await? {
            NgapPdu::DownlinkNasTransport(transport) => {
                self.amf_ue_id = Some(transport.amf_ue_id);
                Ok(SecuredMessage::decode(&transport.nas_pdu)?)
            }
            other => bail!("expected downlink transport, got {other:?}"),
        }
    }

    /// Complete registration and authentication with the given offer,
    /// leaving the connection in the SecurityMode phase.
    pub async fn register_and_authenticate(
        &mut self,
        requested: SecurityCapabilities,
    ) -> Result<SecurityModeCommand> {
        self.send_registration(requested).await?;

        let pdu = self.recv_downlink().await?;
        ensure!(
            pdu.message_type == MessageType::AuthenticationRequest,
            "expected authentication request, got {:?}",
            pdu.message_type
        );
        let request: AuthenticationRequest = decode_message(&pdu.payload)?;

        // The network must answer its own challenge before we answer ours.
        let expected = security::compute_mac(security::AUTH_ALG, &request.auth_challenge, &self.key);
        ensure!(
            request.auth_token == expected,
            "network failed its own authentication"
        );

        let res = security::compute_mac(security::AUTH_ALG, &request.challenge, &self.key);
        info!(&self.logger, "AuthenticationResponse >>");
        self.send_uplink(&SecuredMessage::plain(&AuthenticationResponse { res })?)
            .await?;

        let pdu = self.recv_downlink().await?;
        ensure!(
            pdu.message_type == MessageType::SecurityModeCommand,
            "expected security mode command, got {:?}",
            pdu.message_type
        );
        info!(&self.logger, "SecurityModeCommand <<");
        Ok(decode_message(&pdu.payload)?)
    }

    pub fn protect<M: NasMessage>(
        &self,
        m: &M,
        capabilities: SecurityCapabilities,
    ) -> Result<SecuredMessage> {
        Ok(SecuredMessage::protect(
            m,
            capabilities.integrity,
            capabilities.ciphering,
            &self.key,
        )?)
    }

    pub fn open(
        &self,
        pdu: &SecuredMessage,
        capabilities: SecurityCapabilities,
    ) -> Result<Vec<u8>> {
        Ok(pdu.open(capabilities.integrity, capabilities.ciphering, &self.key)?)
    }

    /// The core never replies to an invalid message; it just closes.
    pub async fn expect_connection_closed(&mut self) -> Result<()> {
        match future::timeout(RECV_TIMEOUT, recv_frame(&mut &self.stream)).await {
            Err(_) => bail!("connection still open after {RECV_TIMEOUT:?}"),
            Ok(Err(_)) => Ok(()),
            Ok(Ok(frame)) => bail!(
                "expected the connection to close, got a {} byte frame",
                frame.len()
            ),
        }
    }

    async fn send_pdu(&mut self, pdu: &NgapPdu) -> Result<()> {
        send_frame(&mut &self.stream, &pdu.encode()?).await?;
        Ok(())
    }

    async fn recv_pdu(&mut self) -> Result<NgapPdu> {
        let frame = future::timeout(RECV_TIMEOUT, recv_frame(&mut &self.stream))
            .await
            .map_err(|_| anyhow!("timed out waiting for a frame from the core"))??;
        Ok(NgapPdu::decode(&frame)?)
    }
}
