//! authentication - challenge-response check and algorithm selection

use super::{HandlerApi, UeProcedure};
use crate::UeState;
use anyhow::{Result, bail, ensure};
use derive_deref::{Deref, DerefMut};
use nas::{AuthenticationResponse, SecuredMessage, SecurityModeCommand, decode_message};
use slog::info;

#[derive(Deref, DerefMut)]
pub struct AuthenticationProcedure<'a, A: HandlerApi>(UeProcedure<'a, A>);

impl<'a, A: HandlerApi> AuthenticationProcedure<'a, A> {
    pub fn new(inner: UeProcedure<'a, A>) -> Self {
        AuthenticationProcedure(inner)
    }

    pub async fn run(mut self, pdu: &SecuredMessage) -> Result<()> {
        self.log_message(">> AuthenticationResponse");
        ensure!(
            self.ue.state == UeState::Authentication,
            "unexpected authentication response in state {:?}",
            self.ue.state
        );
        ensure!(
            !pdu.security,
            "authentication response cannot claim protection"
        );
        let response: AuthenticationResponse = decode_message(&pdu.payload)?;

        // Exact value match against the one outstanding challenge.  A
        // mismatch is terminal with no state change and no reply.
        let expected = security::compute_mac(security::AUTH_ALG, &self.ue.challenge, self.api.sim_key());
        if response.res != expected {
            bail!("cannot authenticate subscriber {}", self.ue.amf_ue_id);
        }

        // Adopt the capabilities as offered.
        let selected = self.ue.requested;
        self.ue.selected = Some(selected);
        self.ue.authenticated = true;
        info!(
            self.logger,
            "Subscriber {} authenticated (integrity {}, ciphering {})",
            self.ue.amf_ue_id,
            selected.integrity,
            selected.ciphering
        );

        let command = SecurityModeCommand {
            integrity: selected.integrity,
            ciphering: selected.ciphering,
            replayed: self.ue.requested,
        };
        self.log_message("<< SecurityModeCommand");
        self.send_downlink(&SecuredMessage::plain(&command)?).await?;
        self.ue.state = UeState::SecurityMode;
        Ok(())
    }
}
