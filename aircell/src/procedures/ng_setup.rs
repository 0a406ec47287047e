//! ng_setup - procedure in which a RAN node makes first contact with the core

use super::HandlerApi;
use crate::RanContext;
use anyhow::Result;
use async_std::net::TcpStream;
use ngap::{NgapPdu, SetupRequest, SetupResponse, send_frame};
use slog::{Logger, info};

// 0x00ff10 = MCC 001, MNC 01
const GUAMI_PLMN: u32 = 0x00ff10;
const AMF_REGION_ID: u16 = 1;
const AMF_SET_ID: u32 = 1;
const AMF_POINTER: u32 = 0;
const AMF_CAPABILITY: u8 = 0xff;

pub struct NgSetupProcedure<'a, A: HandlerApi> {
    api: &'a A,
    logger: &'a Logger,
}

impl<'a, A: HandlerApi> NgSetupProcedure<'a, A> {
    pub fn new(api: &'a A, logger: &'a Logger) -> Self {
        NgSetupProcedure { api, logger }
    }

    pub async fn run(self, r: SetupRequest, stream: &TcpStream) -> Result<RanContext> {
        info!(
            self.logger,
            "NG setup from RAN {} (tac {}, plmn {:06x})", r.ran_id, r.tac, r.plmn
        );
        let response = NgapPdu::SetupResponse(SetupResponse {
            amf_name: self.api.config().amf_name.clone(),
            guami_plmn: GUAMI_PLMN,
            region_id: AMF_REGION_ID,
            set_id: AMF_SET_ID,
            pointer: AMF_POINTER,
            capability: AMF_CAPABILITY,
            plmn: r.plmn,
        });
        send_frame(&mut &*stream, &response.encode()?).await?;
        Ok(RanContext::new(&r))
    }
}
