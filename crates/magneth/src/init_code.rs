//! Init code and runtime of a wallet instance.
//!
//! A wallet's authorization logic lives in [`MultisigWallet`](crate::MultisigWallet), not in EVM
//! bytecode. The deployed runtime only accepts value: any call carrying value emits
//! `Deposit(msg.sender, msg.value)`, so plain transfers and value forwarded by other contracts are
//! both observable.
//!
//! The init code is a constructor that copies the runtime out of itself, the runtime, then the
//! ABI-encoded constructor arguments `(address[] owners, uint256 required)`. The arguments never
//! execute but are part of the CREATE2 preimage, so the instance address commits to the owner set
//! and quorum, and the wallet can be rebuilt from the init code that created it.

use alloc::vec::Vec;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolEvent, SolValue};
use revm::bytecode::opcode::{
    CALLER, CALLVALUE, CODECOPY, DUP1, ISZERO, JUMPDEST, JUMPI, LOG2, MSTORE, PUSH0, PUSH1, PUSH32,
    RETURN, STOP,
};

use crate::{IMagneth, OwnerSet, OwnerSetError};

/// Length of [`wallet_runtime_code`].
pub const WALLET_RUNTIME_LENGTH: usize = 49;

// Offset of the JUMPDEST skipping the log for zero-value calls.
const NO_DEPOSIT: u8 = 0x2f;

/// Constructor prefix of every wallet init code: `CODECOPY` the runtime that follows it to memory
/// and return it.
pub const WALLET_CONSTRUCTOR: [u8; 9] = [
    PUSH1,
    WALLET_RUNTIME_LENGTH as u8,
    DUP1,
    PUSH1,
    9,
    PUSH0,
    CODECOPY,
    PUSH0,
    RETURN,
];

/// Reasons wallet init code cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum InitCodeError {
    /// The code does not start with [`WALLET_CONSTRUCTOR`] followed by the wallet runtime.
    #[error("init code does not start with the wallet constructor")]
    UnknownConstructor,
    /// The constructor arguments are not valid ABI.
    #[error("invalid constructor arguments: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    /// The encoded quorum does not fit a `usize`.
    #[error("quorum {0} out of range")]
    QuorumOutOfRange(U256),
    /// The decoded owners and quorum do not form a valid owner set.
    #[error(transparent)]
    Owners(#[from] OwnerSetError),
}

/// Runtime code of a deployed wallet.
///
/// ```text
/// if callvalue == 0 { stop }
/// mstore(0, callvalue)
/// log2(0, 32, Deposit.selector, caller)
/// ```
pub fn wallet_runtime_code() -> Bytes {
    let mut code = Vec::with_capacity(WALLET_RUNTIME_LENGTH);
    code.extend_from_slice(&[
        CALLVALUE, DUP1, ISZERO, PUSH1, NO_DEPOSIT, JUMPI, PUSH0, MSTORE, CALLER, PUSH32,
    ]);
    code.extend_from_slice(IMagneth::Deposit::SIGNATURE_HASH.as_slice());
    code.extend_from_slice(&[PUSH1, 0x20, PUSH0, LOG2, STOP, JUMPDEST, STOP]);
    debug_assert_eq!(code.len(), WALLET_RUNTIME_LENGTH);
    debug_assert_eq!(code[NO_DEPOSIT as usize], JUMPDEST);
    code.into()
}

/// Builds the init code of a wallet owned by `owners`.
pub fn wallet_init_code(owners: &OwnerSet) -> Bytes {
    let arguments = (owners.owners().to_vec(), U256::from(owners.required())).abi_encode_params();
    [WALLET_CONSTRUCTOR.as_slice(), &wallet_runtime_code(), arguments.as_slice()].concat().into()
}

/// Decodes the owner set committed to by wallet init code.
pub fn decode_wallet_init_code(init_code: &[u8]) -> Result<OwnerSet, InitCodeError> {
    let arguments = init_code
        .strip_prefix(WALLET_CONSTRUCTOR.as_slice())
        .and_then(|rest| rest.strip_prefix(wallet_runtime_code().as_ref()))
        .ok_or(InitCodeError::UnknownConstructor)?;
    let (owners, required) = <(Vec<Address>, U256)>::abi_decode_params(arguments)?;
    let required =
        usize::try_from(required).map_err(|_| InitCodeError::QuorumOutOfRange(required))?;
    Ok(OwnerSet::new(owners, required)?)
}
