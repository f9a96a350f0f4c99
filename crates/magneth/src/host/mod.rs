//! The execution environment a wallet and a factory run against.
//!
//! The wallet logic does not know what sits behind a destination address. It only needs to move
//! native value, invoke an address with calldata and learn whether that succeeded, and record the
//! events it emits. [`Host`] captures exactly that capability; [`EvmHost`] implements it on top of
//! an in-memory `revm` database so calls and contract creations run real EVM bytecode.

use alloc::{string::String, vec::Vec};

use alloy_primitives::{keccak256, Address, Bytes, Log, B256, U256};
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

mod evm;
pub use evm::*;

/// Errors raised by the host when a transaction cannot even be attempted.
///
/// A transaction that runs and reverts is not an error; it yields a [`TxReceipt`] with
/// `status == false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The sender cannot cover the value it is sending.
    #[error("insufficient balance: {available} available, {required} required")]
    InsufficientBalance {
        /// Balance of the sender.
        available: U256,
        /// Value of the transaction.
        required: U256,
    },
    /// The runtime rejected the transaction before execution.
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

/// Record of one transaction executed by a [`Host`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    /// Identifier of the transaction, see [`transaction_hash`].
    pub transaction_hash: B256,
    /// Sender.
    pub from: Address,
    /// Recipient.
    pub to: Address,
    /// Whether execution succeeded.
    pub status: bool,
    /// Gas consumed by execution.
    pub gas_used: u64,
    /// Return data, or revert data when `status` is `false`.
    pub output: Bytes,
    /// Logs emitted during execution.
    pub logs: Vec<Log>,
}

impl TxReceipt {
    /// Whether execution succeeded.
    pub const fn is_success(&self) -> bool {
        self.status
    }
}

/// Identifier of a host transaction: `keccak256(from ‖ nonce ‖ to ‖ value ‖ input)` with the
/// nonce as 8 big-endian bytes.
///
/// The in-memory host has no signed envelopes, so the sender and its nonce stand in for the
/// signature when identifying a transaction.
pub fn transaction_hash(from: Address, nonce: u64, to: Address, value: U256, input: &[u8]) -> B256 {
    let mut preimage = Vec::with_capacity(20 + 8 + 20 + 32 + input.len());
    preimage.extend_from_slice(from.as_slice());
    preimage.extend_from_slice(&nonce.to_be_bytes());
    preimage.extend_from_slice(to.as_slice());
    preimage.extend_from_slice(&value.to_be_bytes::<32>());
    preimage.extend_from_slice(input);
    keccak256(preimage)
}

/// The execution environment capability.
///
/// All mutation goes through `&mut self`, so the host serializes every operation: there is no
/// interleaving between two calls against the same state.
#[auto_impl(&mut, Box)]
pub trait Host {
    /// Native balance of `address`.
    fn balance(&self, address: Address) -> U256;

    /// Nonce of `address`.
    fn nonce(&self, address: Address) -> u64;

    /// Whether an account already occupies `address`, meaning a contract creation there would
    /// collide (non-zero nonce or non-empty code).
    fn is_occupied(&self, address: Address) -> bool;

    /// Places runtime `code` at `address` without running any constructor.
    fn install_code(&mut self, address: Address, code: Bytes);

    /// Sends a transaction from `caller` to `target` carrying `value` and `input`, and commits
    /// its effects when it succeeds.
    fn call(
        &mut self,
        caller: Address,
        target: Address,
        value: U256,
        input: Bytes,
    ) -> Result<TxReceipt, HostError>;

    /// Sends `value` from `from` to `to` with no calldata.
    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<TxReceipt, HostError> {
        self.call(from, to, value, Bytes::new())
    }

    /// Records a log emitted by a component running on this host.
    fn emit(&mut self, log: Log);

    /// Every log recorded so far, in emission order.
    fn logs(&self) -> &[Log];
}
