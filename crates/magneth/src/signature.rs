//! Owner signatures over action digests and their concatenated bundles.
//!
//! A signature is the 65-byte `r ‖ s ‖ v` triple produced by signing the raw 32-byte digest (no
//! message prefix). Recovery follows the usual Ethereum rule: the signer address is the last 20
//! bytes of `keccak256` over the uncompressed public key without its `0x04` tag.

use alloc::vec::Vec;

use alloy_primitives::{keccak256, Address, Bytes, B256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::SIGNATURE_LENGTH;

/// Reasons a signature cannot be recovered to a signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The input is not exactly [`SIGNATURE_LENGTH`] bytes.
    #[error("invalid signature length {0}, expected {SIGNATURE_LENGTH}")]
    InvalidLength(usize),
    /// The recovery byte is not one of 0, 1, 27 or 28.
    #[error("invalid recovery byte {0}")]
    InvalidRecoveryByte(u8),
    /// `r` or `s` is zero or not below the curve order.
    #[error("invalid signature scalars")]
    InvalidScalars,
    /// No public key recovers from the signature and digest.
    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// A single owner's endorsement of one digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerSignature {
    /// The `r` scalar.
    pub r: B256,
    /// The `s` scalar.
    pub s: B256,
    /// The recovery byte, 27 or 28 in canonical form.
    pub v: u8,
}

impl OwnerSignature {
    /// Parses a 65-byte `r ‖ s ‖ v` signature. Only the length is checked here; the scalars and
    /// recovery byte are validated on [`recover`](Self::recover).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        Ok(Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        })
    }

    /// Serializes the signature as `r ‖ s ‖ v`.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    /// Signs `digest` with `key`, producing a low-s signature with `v` in `{27, 28}`.
    pub fn sign(key: &SigningKey, digest: &B256) -> Result<Self, SignatureError> {
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|_| SignatureError::InvalidScalars)?;
        let (r, s) = signature.split_bytes();
        Ok(Self {
            r: B256::from_slice(&r),
            s: B256::from_slice(&s),
            v: 27 + recovery_id.to_byte(),
        })
    }

    /// Recovers the address that produced this signature over `digest`.
    ///
    /// Any `s` in `[1, n)` is accepted: a high-s signature recovers the same signer as its low-s
    /// twin.
    pub fn recover(&self, digest: &B256) -> Result<Address, SignatureError> {
        let parity = match self.v {
            0 | 27 => 0,
            1 | 28 => 1,
            v => return Err(SignatureError::InvalidRecoveryByte(v)),
        };
        let recovery_id =
            RecoveryId::from_byte(parity).ok_or(SignatureError::InvalidRecoveryByte(self.v))?;

        let mut scalars = [0u8; 64];
        scalars[..32].copy_from_slice(self.r.as_slice());
        scalars[32..].copy_from_slice(self.s.as_slice());
        let signature =
            Signature::from_slice(&scalars).map_err(|_| SignatureError::InvalidScalars)?;
        // Negating s mirrors R, so the parity flips with it.
        let (signature, recovery_id) = match signature.normalize_s() {
            Some(low) => {
                (low, RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()))
            }
            None => (signature, recovery_id),
        };

        let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)
            .map_err(|_| SignatureError::RecoveryFailed)?;
        Ok(public_key_address(&key))
    }
}

/// Derives the address of a secp256k1 public key.
pub fn public_key_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 tag of the uncompressed encoding.
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Address controlled by a signing key.
pub fn signer_address(key: &SigningKey) -> Address {
    public_key_address(key.verifying_key())
}

/// Splits a concatenated bundle into its signatures.
///
/// Returns `None` when the length is not a multiple of [`SIGNATURE_LENGTH`].
pub fn split_bundle(bundle: &[u8]) -> Option<Vec<OwnerSignature>> {
    if bundle.len() % SIGNATURE_LENGTH != 0 {
        return None;
    }
    bundle
        .chunks_exact(SIGNATURE_LENGTH)
        .map(|chunk| OwnerSignature::from_slice(chunk).ok())
        .collect()
}

/// Concatenates signatures in the given order.
pub fn concat_signatures<'a>(signatures: impl IntoIterator<Item = &'a OwnerSignature>) -> Bytes {
    signatures.into_iter().flat_map(|signature| signature.to_bytes()).collect::<Vec<u8>>().into()
}

/// Builds a canonical bundle: recovers every signer over `digest` and orders the signatures by
/// ascending signer address.
///
/// Returns the bundle together with the ordered signers.
pub fn canonical_bundle(
    digest: &B256,
    signatures: impl IntoIterator<Item = OwnerSignature>,
) -> Result<(Bytes, Vec<Address>), SignatureError> {
    let mut signed = signatures
        .into_iter()
        .map(|signature| signature.recover(digest).map(|signer| (signer, signature)))
        .collect::<Result<Vec<_>, _>>()?;
    signed.sort_by_key(|(signer, _)| *signer);

    let bundle = concat_signatures(signed.iter().map(|(_, signature)| signature));
    Ok((bundle, signed.into_iter().map(|(signer, _)| signer).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{high_s, SECP256K1_ORDER};
    use alloy_primitives::b256;

    fn key(byte: u8) -> SigningKey {
        SigningKey::from_slice(&[byte; 32]).unwrap()
    }

    const DIGEST: B256 =
        b256!("0x1111111111111111111111111111111111111111111111111111111111111111");

    #[test]
    fn test_sign_and_recover() {
        let key = key(7);
        let signature = OwnerSignature::sign(&key, &DIGEST).unwrap();
        assert!(signature.v == 27 || signature.v == 28);
        assert_eq!(signature.recover(&DIGEST).unwrap(), signer_address(&key));
    }

    #[test]
    fn test_recover_accepts_zero_based_parity() {
        let key = key(9);
        let mut signature = OwnerSignature::sign(&key, &DIGEST).unwrap();
        signature.v -= 27;
        assert_eq!(signature.recover(&DIGEST).unwrap(), signer_address(&key));
    }

    #[test]
    fn test_recover_accepts_high_s() {
        let key = key(11);
        let signature = OwnerSignature::sign(&key, &DIGEST).unwrap();
        let high = high_s(&signature);
        assert_ne!(high.s, signature.s);
        assert_ne!(high.v, signature.v);
        assert_eq!(high.recover(&DIGEST).unwrap(), signer_address(&key));

        // Keeping the low-s parity points at the other candidate key.
        let wrong_parity = OwnerSignature { v: signature.v, ..high };
        assert_ne!(wrong_parity.recover(&DIGEST).ok(), Some(signer_address(&key)));
    }

    #[test]
    fn test_recover_rejects_scalar_at_curve_order() {
        let signature = OwnerSignature::sign(&key(2), &DIGEST).unwrap();
        let signature = OwnerSignature { s: SECP256K1_ORDER.into(), ..signature };
        assert_eq!(signature.recover(&DIGEST), Err(SignatureError::InvalidScalars));
    }

    #[test]
    fn test_recover_rejects_bad_recovery_byte() {
        let mut signature = OwnerSignature::sign(&key(3), &DIGEST).unwrap();
        signature.v = 29;
        assert_eq!(signature.recover(&DIGEST), Err(SignatureError::InvalidRecoveryByte(29)));
    }

    #[test]
    fn test_recover_rejects_zero_scalars() {
        let signature = OwnerSignature { r: B256::ZERO, s: B256::ZERO, v: 27 };
        assert_eq!(signature.recover(&DIGEST), Err(SignatureError::InvalidScalars));
    }

    #[test]
    fn test_bytes_layout() {
        let signature = OwnerSignature::sign(&key(5), &DIGEST).unwrap();
        let bytes = signature.to_bytes();
        assert_eq!(&bytes[..32], signature.r.as_slice());
        assert_eq!(&bytes[32..64], signature.s.as_slice());
        assert_eq!(bytes[64], signature.v);
        assert_eq!(OwnerSignature::from_slice(&bytes).unwrap(), signature);
    }

    #[test]
    fn test_split_bundle() {
        assert_eq!(split_bundle(&[]).unwrap().len(), 0);
        assert!(split_bundle(&[0u8; SIGNATURE_LENGTH + 1]).is_none());
        assert_eq!(split_bundle(&[0u8; SIGNATURE_LENGTH * 3]).unwrap().len(), 3);
    }

    #[test]
    fn test_canonical_bundle_orders_signers() {
        let keys = [key(1), key(2), key(3)];
        let signatures =
            keys.iter().map(|key| OwnerSignature::sign(key, &DIGEST).unwrap()).collect::<Vec<_>>();

        let (bundle, signers) = canonical_bundle(&DIGEST, signatures.into_iter().rev()).unwrap();
        assert_eq!(bundle.len(), 3 * SIGNATURE_LENGTH);
        assert!(signers.windows(2).all(|pair| pair[0] < pair[1]));

        let recovered = split_bundle(&bundle)
            .unwrap()
            .iter()
            .map(|signature| signature.recover(&DIGEST).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(recovered, signers);
    }
}
