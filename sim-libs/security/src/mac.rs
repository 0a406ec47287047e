use crate::{IntegrityAlg, KEY_LEN, MAC_LEN, MacTag, SecurityError};
use blake2::Blake2bMac;
use blake2::digest::KeyInit;
use blake2::digest::consts::U32;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use sha3::Sha3_256;

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;
type HmacSha3 = Hmac<Sha3_256>;
type Blake2b256 = Blake2bMac<U32>;

fn keyed_digest<M: Mac + KeyInit>(message: &[u8], key: &[u8; KEY_LEN]) -> Vec<u8> {
    let mut mac = <M as KeyInit>::new_from_slice(key).expect("Can't fail");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Compute the truncated MAC for a message under the given algorithm.
pub fn compute_mac(alg: IntegrityAlg, message: &[u8], key: &[u8; KEY_LEN]) -> MacTag {
    let digest = match alg {
        IntegrityAlg::Nia0 => Sha256::digest(message).to_vec(),
        IntegrityAlg::Nia1 => keyed_digest::<HmacSha256>(message, key),
        IntegrityAlg::Nia2 => keyed_digest::<HmacSha512>(message, key),
        IntegrityAlg::Nia3 => keyed_digest::<HmacSha3>(message, key),
        IntegrityAlg::Nia4 => keyed_digest::<Blake2b256>(message, key),
    };
    digest[..MAC_LEN].try_into().expect("Can't fail")
}

/// As `compute_mac`, for an algorithm index taken from the wire.
pub fn compute_mac_by_id(
    alg_id: u8,
    message: &[u8],
    key: &[u8; KEY_LEN],
) -> Result<MacTag, SecurityError> {
    let alg = IntegrityAlg::try_from(alg_id)
        .map_err(|_| SecurityError::AlgorithmNotImplemented(alg_id))?;
    Ok(compute_mac(alg, message, key))
}

/// Check a received MAC.  Succeeds for any implemented algorithm, including
/// Nia0 - rejecting null integrity for protected messages is the protocol
/// layer's job.
pub fn verify_mac_by_id(
    alg_id: u8,
    message: &[u8],
    key: &[u8; KEY_LEN],
    tag: &MacTag,
) -> Result<(), SecurityError> {
    if compute_mac_by_id(alg_id, message, key)? == *tag {
        Ok(())
    } else {
        Err(SecurityError::IntegrityMismatch)
    }
}

#[cfg(test)]
use hex_literal::hex;

#[cfg(test)]
const TEST_KEY: [u8; KEY_LEN] = *b"passphrasewhichneedstobe32bytes!";

#[test]
fn nia0_is_plain_sha256() {
    // FIPS 180-2 appendix B.1 vector, truncated.
    let mac = compute_mac(IntegrityAlg::Nia0, b"abc", &TEST_KEY);
    assert_eq!(mac, hex!("ba7816bf8f01cfa4"));

    // Nia0 ignores the key.
    let other_key = [0u8; KEY_LEN];
    assert_eq!(mac, compute_mac(IntegrityAlg::Nia0, b"abc", &other_key));
}

#[test]
fn all_algorithms_are_deterministic_and_distinct() {
    let message = b"registration request";
    let algs = [
        IntegrityAlg::Nia0,
        IntegrityAlg::Nia1,
        IntegrityAlg::Nia2,
        IntegrityAlg::Nia3,
        IntegrityAlg::Nia4,
    ];
    let macs: Vec<MacTag> = algs
        .iter()
        .map(|alg| compute_mac(*alg, message, &TEST_KEY))
        .collect();
    for (ii, mac) in macs.iter().enumerate() {
        assert_eq!(*mac, compute_mac(algs[ii], message, &TEST_KEY));
        for other in &macs[ii + 1..] {
            assert_ne!(mac, other);
        }
    }
}

#[test]
fn keyed_algorithms_depend_on_key() {
    let other_key = [0x42u8; KEY_LEN];
    for alg in [
        IntegrityAlg::Nia1,
        IntegrityAlg::Nia2,
        IntegrityAlg::Nia3,
        IntegrityAlg::Nia4,
    ] {
        assert_ne!(
            compute_mac(alg, b"msg", &TEST_KEY),
            compute_mac(alg, b"msg", &other_key)
        );
    }
}

#[test]
fn verify_accepts_good_and_rejects_tampered() {
    // All five indices verify their own MAC, including Nia0 - rejecting
    // null integrity for protected messages happens at the protocol layer.
    for alg_id in 0..=4u8 {
        let mut tag = compute_mac_by_id(alg_id, b"msg", &TEST_KEY).unwrap();
        assert_eq!(verify_mac_by_id(alg_id, b"msg", &TEST_KEY, &tag), Ok(()));
        tag[0] ^= 0x01;
        assert_eq!(
            verify_mac_by_id(alg_id, b"msg", &TEST_KEY, &tag),
            Err(SecurityError::IntegrityMismatch)
        );
    }
}

#[test]
fn unknown_algorithm_is_rejected() {
    assert_eq!(
        compute_mac_by_id(5, b"msg", &TEST_KEY),
        Err(SecurityError::AlgorithmNotImplemented(5))
    );
    assert_eq!(
        verify_mac_by_id(255, b"msg", &TEST_KEY, &[0; MAC_LEN]),
        Err(SecurityError::AlgorithmNotImplemented(255))
    );
}
