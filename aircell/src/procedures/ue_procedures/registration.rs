//! registration - procedure in which a subscriber makes first contact

use super::HandlerApi;
use crate::{RanContext, UeContext, UeState};
use anyhow::{Result, ensure};
use async_std::net::TcpStream;
use nas::{AuthenticationRequest, MessageType, RegistrationRequest, SecuredMessage, decode_message};
use ngap::{InitialUeMessage, NasTransport, NgapPdu, send_frame};
use rand::RngCore;
use slog::{Logger, info};

pub struct RegistrationProcedure<'a, A: HandlerApi> {
    api: &'a A,
    stream: &'a TcpStream,
    ran: &'a mut RanContext,
    logger: &'a Logger,
}

impl<'a, A: HandlerApi> RegistrationProcedure<'a, A> {
    pub fn new(
        api: &'a A,
        stream: &'a TcpStream,
        ran: &'a mut RanContext,
        logger: &'a Logger,
    ) -> Self {
        RegistrationProcedure {
            api,
            stream,
            ran,
            logger,
        }
    }

    pub async fn run(self, m: InitialUeMessage) -> Result<()> {
        let request = self.check_registration_request(&m)?;

        let amf_ue_id = self.ran.mint_ue_id();
        info!(
            self.logger,
            "Registration attempt from imsi-{:03}{:02}{:010} as {}",
            request.identity.mcc,
            request.identity.mnc,
            request.identity.msin,
            amf_ue_id
        );

        let mut challenge = [0u8; 32];
        rand::rng().fill_bytes(&mut challenge);
        let mut auth_challenge = [0u8; 32];
        rand::rng().fill_bytes(&mut auth_challenge);

        // Answer our own challenge up front so the subscriber can check it
        // is talking to a network that holds the key.
        let auth_token = security::compute_mac(security::AUTH_ALG, &auth_challenge, self.api.sim_key());

        let mut ue = UeContext::new(amf_ue_id, m.ran_ue_id, request.requested, challenge);
        ue.state = UeState::Authentication;

        let auth_request = AuthenticationRequest {
            challenge,
            auth_challenge,
            auth_token,
        };
        let transport = NgapPdu::DownlinkNasTransport(NasTransport {
            amf_ue_id,
            ran_ue_id: m.ran_ue_id,
            nas_pdu: SecuredMessage::plain(&auth_request)?.encode(),
        });
        send_frame(&mut &*self.stream, &transport.encode()?).await?;

        self.ran.ues.insert(amf_ue_id, ue);
        Ok(())
    }

    fn check_registration_request(&self, m: &InitialUeMessage) -> Result<RegistrationRequest> {
        let pdu = SecuredMessage::decode(&m.nas_pdu)?;
        ensure!(
            pdu.message_type == MessageType::RegistrationRequest,
            "expected registration request in initial UE message, got {:?}",
            pdu.message_type
        );
        ensure!(
            !pdu.security,
            "registration request cannot claim protection"
        );
        Ok(decode_message(&pdu.payload)?)
    }
}
