use crate::{CipheringAlg, KEY_LEN, SecurityError};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;

/// Nonce length for Nea1.  The nonce travels in front of the ciphertext, so
/// the layout `nonce || ciphertext+tag` is self-describing.
pub const NONCE_LEN: usize = 12;

/// Encrypt a payload.  Nea0 is the identity transform.
pub fn encrypt(alg: CipheringAlg, plaintext: &[u8], key: &[u8; KEY_LEN]) -> Vec<u8> {
    match alg {
        CipheringAlg::Nea0 => plaintext.to_vec(),
        CipheringAlg::Nea1 => {
            let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
            let mut nonce = [0u8; NONCE_LEN];
            rand::rng().fill_bytes(&mut nonce);
            let ciphertext = cipher
                .encrypt(Nonce::from_slice(&nonce), plaintext)
                .expect("Can't fail");
            let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
            out.extend_from_slice(&nonce);
            out.extend_from_slice(&ciphertext);
            out
        }
    }
}

pub fn encrypt_by_id(
    alg_id: u8,
    plaintext: &[u8],
    key: &[u8; KEY_LEN],
) -> Result<Vec<u8>, SecurityError> {
    let alg = CipheringAlg::try_from(alg_id)
        .map_err(|_| SecurityError::AlgorithmNotImplemented(alg_id))?;
    Ok(encrypt(alg, plaintext, key))
}

/// Decrypt a payload.  Any tag or layout failure is reported as
/// `DecryptionFailed` - never as corrupted plaintext.
pub fn decrypt(alg: CipheringAlg, data: &[u8], key: &[u8; KEY_LEN]) -> Result<Vec<u8>, SecurityError> {
    match alg {
        CipheringAlg::Nea0 => Ok(data.to_vec()),
        CipheringAlg::Nea1 => {
            if data.len() < NONCE_LEN {
                return Err(SecurityError::DecryptionFailed);
            }
            let (nonce, ciphertext) = data.split_at(NONCE_LEN);
            let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
            cipher
                .decrypt(Nonce::from_slice(nonce), ciphertext)
                .map_err(|_| SecurityError::DecryptionFailed)
        }
    }
}

pub fn decrypt_by_id(
    alg_id: u8,
    data: &[u8],
    key: &[u8; KEY_LEN],
) -> Result<Vec<u8>, SecurityError> {
    let alg = CipheringAlg::try_from(alg_id)
        .map_err(|_| SecurityError::AlgorithmNotImplemented(alg_id))?;
    decrypt(alg, data, key)
}

#[cfg(test)]
const TEST_KEY: [u8; KEY_LEN] = *b"passphrasewhichneedstobe32bytes!";

#[test]
fn nea0_is_identity() {
    let data = b"uplink transport".to_vec();
    assert_eq!(encrypt(CipheringAlg::Nea0, &data, &TEST_KEY), data);
    assert_eq!(decrypt(CipheringAlg::Nea0, &data, &TEST_KEY), Ok(data));
}

#[test]
fn nea1_round_trip() {
    let plaintext = b"location update";
    let ciphertext = encrypt(CipheringAlg::Nea1, plaintext, &TEST_KEY);
    assert!(ciphertext.len() > plaintext.len());
    let decrypted = decrypt(CipheringAlg::Nea1, &ciphertext, &TEST_KEY).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn nea1_round_trip_empty() {
    let ciphertext = encrypt(CipheringAlg::Nea1, b"", &TEST_KEY);
    assert_eq!(decrypt(CipheringAlg::Nea1, &ciphertext, &TEST_KEY), Ok(vec![]));
}

#[test]
fn nea1_nonces_are_fresh() {
    let a = encrypt(CipheringAlg::Nea1, b"msg", &TEST_KEY);
    let b = encrypt(CipheringAlg::Nea1, b"msg", &TEST_KEY);
    assert_ne!(a, b);
}

#[test]
fn nea1_rejects_tampered_ciphertext() {
    let mut ciphertext = encrypt(CipheringAlg::Nea1, b"msg", &TEST_KEY);
    let last = ciphertext.len() - 1;
    ciphertext[last] ^= 0x01;
    assert_eq!(
        decrypt(CipheringAlg::Nea1, &ciphertext, &TEST_KEY),
        Err(SecurityError::DecryptionFailed)
    );
}

#[test]
fn nea1_rejects_wrong_key() {
    let ciphertext = encrypt(CipheringAlg::Nea1, b"msg", &TEST_KEY);
    let other_key = [0x42u8; KEY_LEN];
    assert_eq!(
        decrypt(CipheringAlg::Nea1, &ciphertext, &other_key),
        Err(SecurityError::DecryptionFailed)
    );
}

#[test]
fn nea1_rejects_truncated_ciphertext() {
    assert_eq!(
        decrypt(CipheringAlg::Nea1, &[0u8; 4], &TEST_KEY),
        Err(SecurityError::DecryptionFailed)
    );
}

#[test]
fn unknown_ciphering_algorithm_is_rejected() {
    assert_eq!(
        decrypt_by_id(2, b"data", &TEST_KEY),
        Err(SecurityError::AlgorithmNotImplemented(2))
    );
}
