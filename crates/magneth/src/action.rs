//! Actions a wallet can be asked to perform and the digest its owners sign.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::EMPTY_PAYLOAD_HASH;

/// Canonical hash binding one [`Action`] to one wallet instance.
pub type ActionDigest = B256;

/// An action proposed to a wallet: send `value` to `destination`, calling it with `payload` when
/// the payload is non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Address of the wallet that will execute the action.
    pub executor: Address,
    /// Recipient of the value and target of the call.
    pub destination: Address,
    /// Native value forwarded with the action.
    pub value: U256,
    /// Calldata. Empty for a plain transfer.
    pub payload: Bytes,
}

impl Action {
    /// Creates a new action executed by `executor`.
    pub const fn new(executor: Address, destination: Address, value: U256, payload: Bytes) -> Self {
        Self { executor, destination, value, payload }
    }

    /// Whether this action is a plain native transfer.
    pub fn is_transfer(&self) -> bool {
        self.payload.is_empty()
    }

    /// Hash of the payload, or [`EMPTY_PAYLOAD_HASH`] for an empty payload.
    pub fn payload_hash(&self) -> B256 {
        payload_hash(&self.payload)
    }

    /// Computes the digest owners sign to approve this action.
    ///
    /// `keccak256(executor ‖ destination ‖ value ‖ payload_hash)`, with both addresses as 20 raw
    /// bytes and the value as a 32-byte big-endian word. This is the packed encoding of
    /// `(address, address, uint256, bytes32)`.
    pub fn digest(&self) -> ActionDigest {
        let mut preimage = [0u8; 20 + 20 + 32 + 32];
        preimage[..20].copy_from_slice(self.executor.as_slice());
        preimage[20..40].copy_from_slice(self.destination.as_slice());
        preimage[40..72].copy_from_slice(&self.value.to_be_bytes::<32>());
        preimage[72..].copy_from_slice(self.payload_hash().as_slice());
        keccak256(preimage)
    }
}

/// Hash of an action payload, substituting [`EMPTY_PAYLOAD_HASH`] for an empty one.
pub fn payload_hash(payload: &[u8]) -> B256 {
    if payload.is_empty() {
        EMPTY_PAYLOAD_HASH
    } else {
        keccak256(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};

    const WALLET: Address = address!("0x1000000000000000000000000000000000000001");
    const OTHER_WALLET: Address = address!("0x1000000000000000000000000000000000000002");
    const DESTINATION: Address = address!("0x2000000000000000000000000000000000000002");

    #[test]
    fn test_empty_payload_sentinel_is_keccak_of_empty() {
        assert_eq!(EMPTY_PAYLOAD_HASH, keccak256([]));
        assert_eq!(payload_hash(&[]), EMPTY_PAYLOAD_HASH);
    }

    #[test]
    fn test_digest_matches_packed_encoding() {
        let payload = bytes!("a9059cbb");
        let action = Action::new(WALLET, DESTINATION, U256::from(7), payload.clone());

        let mut packed = Vec::new();
        packed.extend_from_slice(WALLET.as_slice());
        packed.extend_from_slice(DESTINATION.as_slice());
        packed.extend_from_slice(&U256::from(7).to_be_bytes::<32>());
        packed.extend_from_slice(keccak256(&payload).as_slice());

        assert_eq!(action.digest(), keccak256(packed));
        assert!(!action.is_transfer());
    }

    #[test]
    fn test_digest_binds_executor() {
        let action = Action::new(WALLET, DESTINATION, U256::from(1), Bytes::new());
        let moved = Action { executor: OTHER_WALLET, ..action.clone() };
        assert_ne!(action.digest(), moved.digest());
    }

    #[test]
    fn test_digest_binds_every_field() {
        let base = Action::new(WALLET, DESTINATION, U256::from(1), bytes!("01"));
        let variants = [
            Action { destination: WALLET, ..base.clone() },
            Action { value: U256::from(2), ..base.clone() },
            Action { payload: bytes!("02"), ..base.clone() },
            Action { payload: Bytes::new(), ..base.clone() },
        ];
        for variant in variants {
            assert_ne!(base.digest(), variant.digest(), "{variant:?}");
        }
    }
}
