//! secured - the security header wrapping every signalling PDU

use crate::codec::{CodecError, Reader, Writer};
use crate::messages::{MessageType, NasMessage, encode_message};
use security::{MAC_LEN, MacTag, SecurityError, SimKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PduError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Security(#[from] SecurityError),
}

/// Security flag, MAC, type tag and payload.  For a protected message the
/// payload is the (optionally encrypted) message body and the MAC is computed
/// over those post-encryption bytes; the type tag stays outside the protected
/// envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecuredMessage {
    pub security: bool,
    pub mac: MacTag,
    pub message_type: MessageType,
    pub payload: Vec<u8>,
}

impl SecuredMessage {
    /// Wrap a pre-security message (registration and authentication).
    pub fn plain<M: NasMessage>(m: &M) -> Result<Self, PduError> {
        Ok(SecuredMessage {
            security: false,
            mac: [0; MAC_LEN],
            message_type: M::MESSAGE_TYPE,
            payload: encode_message(m)?,
        })
    }

    /// Encode, encrypt, then MAC the result.
    pub fn protect<M: NasMessage>(
        m: &M,
        integrity: u8,
        ciphering: u8,
        key: &SimKey,
    ) -> Result<Self, PduError> {
        let body = encode_message(m)?;
        let payload = security::encrypt_by_id(ciphering, &body, key)?;
        let mac = security::compute_mac_by_id(integrity, &payload, key)?;
        Ok(SecuredMessage {
            security: true,
            mac,
            message_type: M::MESSAGE_TYPE,
            payload,
        })
    }

    /// Verify and decrypt a protected message, returning the plaintext body.
    pub fn open(&self, integrity: u8, ciphering: u8, key: &SimKey) -> Result<Vec<u8>, PduError> {
        if !self.security {
            return Err(SecurityError::ProtectionMissing.into());
        }
        if integrity == u8::from(security::IntegrityAlg::Nia0) {
            return Err(SecurityError::NullIntegrityNotAllowed.into());
        }
        security::verify_mac_by_id(integrity, &self.payload, key, &self.mac)?;
        Ok(security::decrypt_by_id(ciphering, &self.payload, key)?)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.bool(self.security);
        w.raw(&self.mac);
        w.u8(self.message_type.into());
        w.raw(&self.payload);
        w.into_vec()
    }

    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(buf);
        let security = r.bool()?;
        let mac = r.array()?;
        let type_byte = r.u8()?;
        let message_type =
            MessageType::try_from(type_byte).map_err(|_| CodecError::UnknownMessageType(type_byte))?;
        let payload = r.rest();
        Ok(SecuredMessage {
            security,
            mac,
            message_type,
            payload,
        })
    }
}
