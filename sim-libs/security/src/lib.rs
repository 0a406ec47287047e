//! security - integrity and ciphering primitives for the aircell control plane

mod cipher;
mod mac;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

pub use cipher::{NONCE_LEN, decrypt, decrypt_by_id, encrypt, encrypt_by_id};
pub use mac::{compute_mac, compute_mac_by_id, verify_mac_by_id};

/// Length of the pre-shared subscriber key.
pub const KEY_LEN: usize = 32;

/// All MACs are truncated to this length on the wire.
pub const MAC_LEN: usize = 8;

pub type SimKey = [u8; KEY_LEN];
pub type MacTag = [u8; MAC_LEN];

/// The algorithm used for the challenge-response exchange, before any
/// negotiation has happened.
pub const AUTH_ALG: IntegrityAlg = IntegrityAlg::Nia2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum IntegrityAlg {
    /// Unkeyed - deterministic but meaningless.  The protocol layer must
    /// never accept it for a message claiming protection.
    Nia0 = 0,
    /// HMAC-SHA-256
    Nia1 = 1,
    /// HMAC-SHA-512
    Nia2 = 2,
    /// HMAC-SHA3-256
    Nia3 = 3,
    /// Keyed BLAKE2b-256
    Nia4 = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CipheringAlg {
    Nea0 = 0,
    /// AES-256-GCM, random nonce carried in front of the ciphertext.
    Nea1 = 1,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SecurityError {
    #[error("integrity algorithm {0} is not implemented")]
    AlgorithmNotImplemented(u8),
    #[error("integrity check failed")]
    IntegrityMismatch,
    #[error("null integrity is not allowed")]
    NullIntegrityNotAllowed,
    #[error("message is not integrity protected")]
    ProtectionMissing,
    #[error("decryption failed")]
    DecryptionFailed,
}
