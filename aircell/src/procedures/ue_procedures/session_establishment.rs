//! session_establishment - record a session and assign its address

use super::{HandlerApi, UeProcedure};
use crate::UeState;
use anyhow::Result;
use derive_deref::{Deref, DerefMut};
use nas::{SessionEstablishmentAccept, SessionEstablishmentRequest};
use slog::info;

#[derive(Deref, DerefMut)]
pub struct SessionEstablishmentProcedure<'a, A: HandlerApi>(UeProcedure<'a, A>);

impl<'a, A: HandlerApi> SessionEstablishmentProcedure<'a, A> {
    pub fn new(inner: UeProcedure<'a, A>) -> Self {
        SessionEstablishmentProcedure(inner)
    }

    pub async fn run(mut self, request: SessionEstablishmentRequest) -> Result<()> {
        self.log_message(">> SessionEstablishmentRequest");
        self.ue
            .sessions
            .insert(request.session_id, request.session_type);
        info!(
            self.logger,
            "Session {} (type {}) established for {}",
            request.session_id,
            request.session_type,
            self.ue.amf_ue_id
        );

        let accept = SessionEstablishmentAccept {
            session_id: request.session_id,
            address: self.assign_address(request.session_type),
        };
        let pdu = self.protect(&accept)?;
        self.log_message("<< SessionEstablishmentAccept");
        self.send_downlink(&pdu).await?;
        self.ue.state = UeState::Registered;
        Ok(())
    }

    /// Type-conditional address assignment.  The reveal branch is an
    /// operator decision, off by default.
    fn assign_address(&self, session_type: u8) -> Vec<u8> {
        let config = self.api.config();
        if let (Some(reveal_type), Some(value)) =
            (config.reveal_session_type, config.reveal_value.as_ref())
        {
            if session_type == reveal_type {
                return value.clone().into_bytes();
            }
        }
        match session_type {
            1 => vec![0xff, 0x00, 0x00, 0xff],
            _ => vec![10, 0, 0, 1],
        }
    }
}
