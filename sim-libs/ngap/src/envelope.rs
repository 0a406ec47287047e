//! envelope - the transport-correlation wrapper around signalling PDUs

use nas::codec::{CodecError, Reader, Writer};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// 128-bit subscriber context identifier, minted by the core.  This is the
/// sole key used to locate a subscriber context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AmfUeId(pub [u8; 16]);

impl fmt::Display for AmfUeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum EnvelopeType {
    SetupRequest = 0,
    SetupResponse = 1,
    InitialUeMessage = 2,
    DownlinkNasTransport = 3,
    UplinkNasTransport = 4,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupRequest {
    pub ran_id: u32,
    pub tac: u32,
    pub plmn: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupResponse {
    pub amf_name: String,
    pub guami_plmn: u32,
    pub region_id: u16,
    pub set_id: u32,
    pub pointer: u32,
    pub capability: u8,
    pub plmn: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitialUeMessage {
    /// Correlation id supplied by the RAN, echoed but never trusted.
    pub ran_ue_id: u32,
    /// Raw encoded SecuredMessage; the relay forwards it blind.
    pub nas_pdu: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NasTransport {
    pub amf_ue_id: AmfUeId,
    pub ran_ue_id: u32,
    pub nas_pdu: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NgapPdu {
    SetupRequest(SetupRequest),
    SetupResponse(SetupResponse),
    InitialUeMessage(InitialUeMessage),
    DownlinkNasTransport(NasTransport),
    UplinkNasTransport(NasTransport),
}

impl NgapPdu {
    pub fn envelope_type(&self) -> EnvelopeType {
        match self {
            NgapPdu::SetupRequest(_) => EnvelopeType::SetupRequest,
            NgapPdu::SetupResponse(_) => EnvelopeType::SetupResponse,
            NgapPdu::InitialUeMessage(_) => EnvelopeType::InitialUeMessage,
            NgapPdu::DownlinkNasTransport(_) => EnvelopeType::DownlinkNasTransport,
            NgapPdu::UplinkNasTransport(_) => EnvelopeType::UplinkNasTransport,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut w = Writer::new();
        w.u8(self.envelope_type().into());
        match self {
            NgapPdu::SetupRequest(m) => {
                w.u32(m.ran_id);
                w.u32(m.tac);
                w.u32(m.plmn);
            }
            NgapPdu::SetupResponse(m) => {
                w.string(&m.amf_name)?;
                w.u32(m.guami_plmn);
                w.u16(m.region_id);
                w.u32(m.set_id);
                w.u32(m.pointer);
                w.u8(m.capability);
                w.u32(m.plmn);
            }
            NgapPdu::InitialUeMessage(m) => {
                w.u32(m.ran_ue_id);
                w.raw(&m.nas_pdu);
            }
            NgapPdu::DownlinkNasTransport(m) | NgapPdu::UplinkNasTransport(m) => {
                w.raw(&m.amf_ue_id.0);
                w.u32(m.ran_ue_id);
                w.raw(&m.nas_pdu);
            }
        }
        Ok(w.into_vec())
    }

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(buf);
        let type_byte = r.u8()?;
        let envelope_type = EnvelopeType::try_from(type_byte)
            .map_err(|_| CodecError::UnknownEnvelopeType(type_byte))?;
        let pdu = match envelope_type {
            EnvelopeType::SetupRequest => NgapPdu::SetupRequest(SetupRequest {
                ran_id: r.u32()?,
                tac: r.u32()?,
                plmn: r.u32()?,
            }),
            EnvelopeType::SetupResponse => NgapPdu::SetupResponse(SetupResponse {
                amf_name: r.string()?,
                guami_plmn: r.u32()?,
                region_id: r.u16()?,
                set_id: r.u32()?,
                pointer: r.u32()?,
                capability: r.u8()?,
                plmn: r.u32()?,
            }),
            EnvelopeType::InitialUeMessage => NgapPdu::InitialUeMessage(InitialUeMessage {
                ran_ue_id: r.u32()?,
                nas_pdu: r.rest(),
            }),
            EnvelopeType::DownlinkNasTransport | EnvelopeType::UplinkNasTransport => {
                let transport = NasTransport {
                    amf_ue_id: AmfUeId(r.array()?),
                    ran_ue_id: r.u32()?,
                    nas_pdu: r.rest(),
                };
                match envelope_type {
                    EnvelopeType::DownlinkNasTransport => NgapPdu::DownlinkNasTransport(transport),
                    _ => NgapPdu::UplinkNasTransport(transport),
                }
            }
        };
        r.finish()?;
        Ok(pdu)
    }
}
