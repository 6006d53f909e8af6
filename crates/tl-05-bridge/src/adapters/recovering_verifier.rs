//! secp256k1 signer recovery from compact 64-byte signatures.
//!
//! Wire signatures are `r || s` with the y-parity of the ephemeral point
//! packed into the top bit of `s`. Low-S enforcement keeps that bit free:
//! every canonical `s` is below half the curve order, and any encoding whose
//! masked `s` is not is rejected outright, so each digest has exactly one
//! accepted signature per signer.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use shared_types::{Address, Hash, Signature};

use crate::ports::outbound::SignatureVerifier;

/// Bit carrying the recovery parity inside `s[0]`.
const PARITY_BIT: u8 = 0x80;

/// [`SignatureVerifier`] backed by k256 public-key recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveringVerifier;

impl RecoveringVerifier {
    /// Creates the verifier. Stateless.
    pub fn new() -> Self {
        Self
    }
}

impl SignatureVerifier for RecoveringVerifier {
    fn recover(&self, digest: &Hash, signature: &Signature) -> Option<Address> {
        let y_odd = signature[32] & PARITY_BIT != 0;
        let mut raw = *signature;
        raw[32] &= !PARITY_BIT;
        let sig = EcdsaSignature::from_slice(&raw).ok()?;
        // High-S would admit a second encoding of the same signature.
        if sig.normalize_s().is_some() {
            return None;
        }
        let recovery = RecoveryId::new(y_odd, false);
        let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery).ok()?;
        Some(address_of(&key))
    }
}

/// The 20-byte address of a public key: trailing bytes of the Keccak-256
/// hash of the uncompressed point without its SEC1 tag.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Packs a low-S signature and its recovery parity into the wire form.
pub fn encode_compact(signature: &EcdsaSignature, recovery: RecoveryId) -> Signature {
    let mut out = [0u8; 64];
    out.copy_from_slice(&signature.to_bytes());
    if recovery.is_y_odd() {
        out[32] |= PARITY_BIT;
    }
    out
}

/// Signs a digest and returns the compact wire form. Normalizes high-S
/// output, flipping the recovery parity to match.
pub fn sign_compact(key: &SigningKey, digest: &Hash) -> Option<Signature> {
    let (sig, recovery) = key.sign_prehash_recoverable(digest).ok()?;
    let (sig, recovery) = match sig.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery.is_y_odd(), recovery.is_x_reduced()),
        ),
        None => (sig, recovery),
    };
    Some(encode_compact(&sig, recovery))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_the_signing_address() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let expected = address_of(key.verifying_key());
        let digest = [7u8; 32];
        let sig = sign_compact(&key, &digest).unwrap();

        let verifier = RecoveringVerifier::new();
        assert_eq!(verifier.recover(&digest, &sig), Some(expected));
    }

    #[test]
    fn test_wrong_digest_recovers_someone_else() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let expected = address_of(key.verifying_key());
        let sig = sign_compact(&key, &[7u8; 32]).unwrap();

        let verifier = RecoveringVerifier::new();
        let recovered = verifier.recover(&[8u8; 32], &sig);
        assert_ne!(recovered, Some(expected));
    }

    #[test]
    fn test_flipped_parity_changes_the_signer() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let expected = address_of(key.verifying_key());
        let digest = [7u8; 32];
        let mut sig = sign_compact(&key, &digest).unwrap();
        sig[32] ^= PARITY_BIT;

        let verifier = RecoveringVerifier::new();
        assert_ne!(verifier.recover(&digest, &sig), Some(expected));
    }

    #[test]
    fn test_garbage_bytes_recover_nothing() {
        let verifier = RecoveringVerifier::new();
        assert_eq!(verifier.recover(&[7u8; 32], &[0u8; 64]), None);
        assert_eq!(verifier.recover(&[7u8; 32], &[0xFF; 64]), None);
    }

    #[test]
    fn test_distinct_keys_recover_distinct_addresses() {
        let a = SigningKey::random(&mut rand::thread_rng());
        let b = SigningKey::random(&mut rand::thread_rng());
        assert_ne!(address_of(a.verifying_key()), address_of(b.verifying_key()));
    }
}
