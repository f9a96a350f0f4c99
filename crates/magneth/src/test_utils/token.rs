//! A minimal fungible token used as a call destination.
//!
//! The contract implements `transfer(address,uint256)` and `balanceOf(address)` only. The balance
//! of a holder lives in the storage slot equal to the holder's address. A transfer exceeding the
//! sender's balance reverts.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use revm::bytecode::opcode::{
    ADD, CALLDATALOAD, CALLER, DUP1, DUP2, DUP3, EQ, JUMPDEST, JUMPI, LT, SHR, SLOAD, SSTORE, SUB,
    SWAP1,
};

use super::BytecodeBuilder;
use crate::{EvmHost, Host, IToken};

const TRANSFER: u8 = 0x1c;
const BALANCE_OF: u8 = 0x3e;
const FAIL: u8 = 0x49;

/// Runtime code of the token.
pub fn token_code() -> Bytes {
    BytecodeBuilder::default()
        // Dispatch on the selector.
        .push_number(0_u8)
        .append(CALLDATALOAD)
        .push_number(0xe0_u8)
        .append_many([SHR, DUP1])
        .push_bytes(IToken::transferCall::SELECTOR)
        .append(EQ)
        .push_number(TRANSFER)
        .append(JUMPI)
        .push_bytes(IToken::balanceOfCall::SELECTOR)
        .append(EQ)
        .push_number(BALANCE_OF)
        .append(JUMPI)
        .revert()
        // transfer(to, amount)
        .at(TRANSFER)
        .append(JUMPDEST)
        .push_number(0x24_u8)
        .append_many([CALLDATALOAD, CALLER, SLOAD, DUP2, DUP2, LT])
        .push_number(FAIL)
        .append(JUMPI)
        .append_many([DUP2, SWAP1, SUB, CALLER, SSTORE])
        .push_number(0x04_u8)
        .append_many([CALLDATALOAD, DUP1, SLOAD, DUP3, ADD, SWAP1, SSTORE])
        .push_number(1_u8)
        .return_top()
        // balanceOf(owner)
        .at(BALANCE_OF)
        .append(JUMPDEST)
        .push_number(0x04_u8)
        .append_many([CALLDATALOAD, SLOAD])
        .return_top()
        // Insufficient balance.
        .at(FAIL)
        .append(JUMPDEST)
        .revert()
        .build()
}

/// Storage slot holding the balance of `holder`.
pub fn balance_slot(holder: Address) -> U256 {
    U256::from_be_slice(holder.as_slice())
}

/// Places the token at `token` and credits the given balances.
pub fn deploy_token(host: &mut EvmHost, token: Address, balances: &[(Address, U256)]) {
    host.install_code(token, token_code());
    for &(holder, balance) in balances {
        host.set_storage(token, balance_slot(holder), balance);
    }
}

/// Calldata of `transfer(to, amount)`.
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    IToken::transferCall { to, amount }.abi_encode().into()
}

/// Token balance of `holder`, read through a `balanceOf` call sent by `holder`.
pub fn token_balance<H: Host>(host: &mut H, token: Address, holder: Address) -> U256 {
    let input = IToken::balanceOfCall { owner: holder }.abi_encode();
    let receipt = host.call(holder, token, U256::ZERO, input.into()).expect("balanceOf rejected");
    assert!(receipt.is_success(), "balanceOf reverted");
    U256::from_be_slice(&receipt.output)
}
