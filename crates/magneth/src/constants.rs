//! Constants shared by the wallet, the factory and their tooling.

use alloy_primitives::{address, b256, bytes, Address, Bytes, B256};

/// Length in bytes of one serialized owner signature (`r ‖ s ‖ v`).
pub const SIGNATURE_LENGTH: usize = 65;

/// Digest substituted for the payload hash when an action carries no payload.
///
/// Equal to `keccak256("")`, which keeps digests identical to those produced by existing signers.
pub const EMPTY_PAYLOAD_HASH: B256 =
    b256!("0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// Leading byte of the CREATE2 address preimage.
pub const CREATE2_PREFIX: u8 = 0xff;

/// Address of the canonical deterministic deployment proxy.
pub const DETERMINISTIC_DEPLOYMENT_PROXY: Address =
    address!("0x4e59b44847b379578588920ca78fbf26c0b4956c");

/// Runtime code of the deterministic deployment proxy.
///
/// Calldata is `salt (32 bytes) ‖ init code`. The proxy runs CREATE2 forwarding the call value and
/// returns the 20-byte created address, or reverts with empty data if creation failed.
pub const DETERMINISTIC_DEPLOYMENT_PROXY_CODE: Bytes = bytes!(
    "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe03601600081602082378035828234f58015156039578182fd5b8082525050506014600cf3"
);

/// Gas limit of every transaction sent through [`EvmHost`](crate::EvmHost) unless overridden.
pub const DEFAULT_TX_GAS_LIMIT: u64 = 10_000_000;
