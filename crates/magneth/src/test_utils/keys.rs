//! Fixture owner keys and bundle signing.

use alloc::vec::Vec;

use alloy_primitives::{b256, uint, Address, Bytes, B256, U256};
use k256::ecdsa::SigningKey;

use crate::{canonical_bundle, concat_signatures, signer_address, OwnerSignature};

/// Private keys of the fixture owners.
pub const OWNER_KEYS: [B256; 5] = [
    b256!("0xced26e4f0ad256777efa4b205ac3003eca7e1befb9f657be58600b7115a6cdf1"),
    b256!("0x3132ce18b38230af1f8d751f5658c97e59d33a9e884676fddfc9cc4434cd36fb"),
    b256!("0x087df46b73931fd31751e80a203bb6be011f3ab2cf1930b2a92db901f0fdffc6"),
    b256!("0xeb558208fc7e52bc018d11414e6e624d0ab44a7cb63dfad9d75f913b45268746"),
    b256!("0xde43de7119a20ee767b39b926058096f95812058ed1c078f35269b5c788a33cf"),
];

/// Order `n` of the secp256k1 group.
pub const SECP256K1_ORDER: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// Signing key of fixture owner `index`.
pub fn owner_key(index: usize) -> SigningKey {
    SigningKey::from_slice(OWNER_KEYS[index].as_slice()).expect("valid fixture key")
}

/// Address of fixture owner `index`.
pub fn owner_address(index: usize) -> Address {
    signer_address(&owner_key(index))
}

/// Signs `digest` with every key and orders the signatures by ascending signer address.
pub fn sign_bundle(keys: &[SigningKey], digest: &B256) -> Bytes {
    let signatures = keys.iter().map(|key| sign(key, digest));
    canonical_bundle(digest, signatures).expect("fixture signatures recover").0
}

/// Signs `digest` with every key, keeping the order of `keys`.
pub fn sign_in_order(keys: &[SigningKey], digest: &B256) -> Bytes {
    let signatures: Vec<_> = keys.iter().map(|key| sign(key, digest)).collect();
    concat_signatures(&signatures)
}

fn sign(key: &SigningKey, digest: &B256) -> OwnerSignature {
    OwnerSignature::sign(key, digest).expect("signing a digest")
}

/// The high-s twin of a low-s signature: `s' = n - s` with the recovery parity flipped.
pub fn high_s(signature: &OwnerSignature) -> OwnerSignature {
    let s = SECP256K1_ORDER - U256::from_be_bytes(signature.s.0);
    let v = if signature.v == 27 || signature.v == 0 { signature.v + 1 } else { signature.v - 1 };
    OwnerSignature { r: signature.r, s: s.into(), v }
}
