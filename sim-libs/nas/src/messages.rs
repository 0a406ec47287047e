//! messages - the signalling PDU catalogue

use crate::codec::{CodecError, Reader, Writer};
use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum MessageType {
    RegistrationRequest = 0,
    AuthenticationRequest = 1,
    AuthenticationResponse = 2,
    SecurityModeCommand = 3,
    SessionEstablishmentRequest = 4,
    SessionEstablishmentAccept = 5,
    DataRequest = 6,
    DataResponse = 7,
    LocationReport = 8,
    LocationReportRequest = 9,
    LocationReportResponse = 10,
}

pub trait NasMessage: Sized {
    const MESSAGE_TYPE: MessageType;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError>;
    fn decode(r: &mut Reader) -> Result<Self, CodecError>;
}

pub fn encode_message<M: NasMessage>(m: &M) -> Result<Vec<u8>, CodecError> {
    let mut w = Writer::new();
    m.encode(&mut w)?;
    Ok(w.into_vec())
}

pub fn decode_message<M: NasMessage>(buf: &[u8]) -> Result<M, CodecError> {
    let mut r = Reader::new(buf);
    let m = M::decode(&mut r)?;
    r.finish()?;
    Ok(m)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MobileIdentity {
    pub mcc: u8,
    pub mnc: u8,
    pub msin: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecurityCapabilities {
    pub ciphering: u8,
    pub integrity: u8,
}

impl SecurityCapabilities {
    fn encode(&self, w: &mut Writer) {
        w.u8(self.ciphering);
        w.u8(self.integrity);
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(SecurityCapabilities {
            ciphering: r.u8()?,
            integrity: r.u8()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub identity: MobileIdentity,
    pub requested: SecurityCapabilities,
}

impl NasMessage for RegistrationRequest {
    const MESSAGE_TYPE: MessageType = MessageType::RegistrationRequest;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.u8(self.identity.mcc);
        w.u8(self.identity.mnc);
        w.u64(self.identity.msin);
        self.requested.encode(w);
        Ok(())
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(RegistrationRequest {
            identity: MobileIdentity {
                mcc: r.u8()?,
                mnc: r.u8()?,
                msin: r.u64()?,
            },
            requested: SecurityCapabilities::decode(r)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticationRequest {
    /// Challenge the subscriber must answer.
    pub challenge: [u8; 32],
    /// Challenge the network answers up front, proving it holds the key.
    pub auth_challenge: [u8; 32],
    pub auth_token: [u8; 8],
}

impl NasMessage for AuthenticationRequest {
    const MESSAGE_TYPE: MessageType = MessageType::AuthenticationRequest;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.raw(&self.challenge);
        w.raw(&self.auth_challenge);
        w.raw(&self.auth_token);
        Ok(())
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(AuthenticationRequest {
            challenge: r.array()?,
            auth_challenge: r.array()?,
            auth_token: r.array()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticationResponse {
    pub res: [u8; 8],
}

impl NasMessage for AuthenticationResponse {
    const MESSAGE_TYPE: MessageType = MessageType::AuthenticationResponse;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.raw(&self.res);
        Ok(())
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(AuthenticationResponse { res: r.array()? })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityModeCommand {
    pub integrity: u8,
    pub ciphering: u8,
    /// The capabilities the subscriber originally offered, replayed so it
    /// can detect a bidding-down of its offer.
    pub replayed: SecurityCapabilities,
}

impl NasMessage for SecurityModeCommand {
    const MESSAGE_TYPE: MessageType = MessageType::SecurityModeCommand;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.u8(self.integrity);
        w.u8(self.ciphering);
        self.replayed.encode(w);
        Ok(())
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(SecurityModeCommand {
            integrity: r.u8()?,
            ciphering: r.u8()?,
            replayed: SecurityCapabilities::decode(r)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionEstablishmentRequest {
    pub session_id: u8,
    pub session_type: u8,
}

impl NasMessage for SessionEstablishmentRequest {
    const MESSAGE_TYPE: MessageType = MessageType::SessionEstablishmentRequest;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.u8(self.session_id);
        w.u8(self.session_type);
        Ok(())
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(SessionEstablishmentRequest {
            session_id: r.u8()?,
            session_type: r.u8()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionEstablishmentAccept {
    pub session_id: u8,
    pub address: Vec<u8>,
}

impl NasMessage for SessionEstablishmentAccept {
    const MESSAGE_TYPE: MessageType = MessageType::SessionEstablishmentAccept;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.u8(self.session_id);
        w.bytes(&self.address)
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(SessionEstablishmentAccept {
            session_id: r.u8()?,
            address: r.bytes()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataRequest {
    pub session_id: u8,
    pub target: Vec<u8>,
}

impl NasMessage for DataRequest {
    const MESSAGE_TYPE: MessageType = MessageType::DataRequest;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.u8(self.session_id);
        w.bytes(&self.target)
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(DataRequest {
            session_id: r.u8()?,
            target: r.bytes()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataResponse {
    pub session_id: u8,
    pub payload: Vec<u8>,
}

impl NasMessage for DataResponse {
    const MESSAGE_TYPE: MessageType = MessageType::DataResponse;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.u8(self.session_id);
        w.bytes(&self.payload)
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(DataResponse {
            session_id: r.u8()?,
            payload: r.bytes()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationReport {
    pub location: String,
}

impl NasMessage for LocationReport {
    const MESSAGE_TYPE: MessageType = MessageType::LocationReport;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.string(&self.location)
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        Ok(LocationReport {
            location: r.string()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationReportRequest {}

impl NasMessage for LocationReportRequest {
    const MESSAGE_TYPE: MessageType = MessageType::LocationReportRequest;
    fn encode(&self, _w: &mut Writer) -> Result<(), CodecError> {
        Ok(())
    }
    fn decode(_r: &mut Reader) -> Result<Self, CodecError> {
        Ok(LocationReportRequest {})
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationReportResponse {
    pub locations: Vec<String>,
}

impl NasMessage for LocationReportResponse {
    const MESSAGE_TYPE: MessageType = MessageType::LocationReportResponse;
    fn encode(&self, w: &mut Writer) -> Result<(), CodecError> {
        let count =
            u16::try_from(self.locations.len()).map_err(|_| CodecError::ValueTooLong(self.locations.len()))?;
        w.u16(count);
        for location in &self.locations {
            w.string(location)?;
        }
        Ok(())
    }
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let count = r.u16()?;
        let mut locations = Vec::with_capacity(count.min(64) as usize);
        for _ in 0..count {
            locations.push(r.string()?);
        }
        Ok(LocationReportResponse { locations })
    }
}
