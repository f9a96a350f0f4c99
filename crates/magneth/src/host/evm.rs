use alloc::{string::ToString, vec::Vec};

use alloy_primitives::{Address, Bytes, Log, TxKind, U256};
use revm::{
    context::TxEnv,
    database::{CacheDB, EmptyDB},
    database_interface::DatabaseRef,
    primitives::KECCAK_EMPTY,
    state::{AccountInfo, Bytecode},
    Context, ExecuteCommitEvm, MainBuilder, MainContext,
};
use tracing::{debug, trace};

use super::{transaction_hash, Host, HostError, TxReceipt};
use crate::DEFAULT_TX_GAS_LIMIT;

/// An in-memory EVM host.
///
/// State lives in a [`CacheDB`] over an empty backend; every [`Host::call`] runs as a mainnet
/// transaction with a zero gas price and is committed immediately. Nonces are taken from state,
/// so any account (including a wallet created by a factory) can send consecutive transactions.
/// EIP-3607 is off: an account with code may be the sender.
#[derive(Debug, Clone, derive_more::Deref, derive_more::DerefMut)]
pub struct EvmHost {
    #[deref]
    #[deref_mut]
    db: CacheDB<EmptyDB>,
    logs: Vec<Log>,
    gas_limit: u64,
}

impl Default for EvmHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EvmHost {
    /// Creates a host with empty state.
    pub fn new() -> Self {
        Self { db: CacheDB::default(), logs: Vec::new(), gas_limit: DEFAULT_TX_GAS_LIMIT }
    }

    /// Sets the gas limit of every transaction sent through this host.
    pub const fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// The gas limit of every transaction sent through this host.
    pub const fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// The account at `address`, or an empty account if none exists.
    pub fn account(&self, address: Address) -> AccountInfo {
        match self.db.basic_ref(address) {
            Ok(info) => info.unwrap_or_default(),
            Err(never) => match never {},
        }
    }

    /// Runtime code at `address`.
    pub fn code(&self, address: Address) -> Bytes {
        let info = self.account(address);
        if info.code_hash == KECCAK_EMPTY {
            return Bytes::new();
        }
        match info.code {
            Some(code) => code.original_bytes(),
            None => match self.db.code_by_hash_ref(info.code_hash) {
                Ok(code) => code.original_bytes(),
                Err(never) => match never {},
            },
        }
    }

    /// Storage value of `address` at `slot`.
    pub fn storage(&self, address: Address, slot: U256) -> U256 {
        match self.db.storage_ref(address, slot) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Sets the native balance of `address`.
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        let mut info = self.account(address);
        info.balance = balance;
        self.db.insert_account_info(address, info);
    }

    /// Sets the balance of `address`, returning `self` for chaining.
    pub fn account_balance(mut self, address: Address, balance: U256) -> Self {
        self.set_balance(address, balance);
        self
    }

    /// Sets a storage slot of `address`.
    pub fn set_storage(&mut self, address: Address, slot: U256, value: U256) {
        match self.db.insert_account_storage(address, slot, value) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Sets the code of `address`, returning `self` for chaining.
    pub fn account_code(mut self, address: Address, code: Bytes) -> Self {
        self.install_code(address, code);
        self
    }
}

impl Host for EvmHost {
    fn balance(&self, address: Address) -> U256 {
        self.account(address).balance
    }

    fn nonce(&self, address: Address) -> u64 {
        self.account(address).nonce
    }

    fn is_occupied(&self, address: Address) -> bool {
        let info = self.account(address);
        info.nonce != 0 || info.code_hash != KECCAK_EMPTY
    }

    fn install_code(&mut self, address: Address, code: Bytes) {
        let bytecode = Bytecode::new_raw(code);
        let mut info = self.account(address);
        info.code_hash = bytecode.hash_slow();
        info.code = Some(bytecode);
        self.db.insert_account_info(address, info);
    }

    fn call(
        &mut self,
        caller: Address,
        target: Address,
        value: U256,
        input: Bytes,
    ) -> Result<TxReceipt, HostError> {
        let sender = self.account(caller);
        if sender.balance < value {
            return Err(HostError::InsufficientBalance {
                available: sender.balance,
                required: value,
            });
        }

        let transaction_hash = transaction_hash(caller, sender.nonce, target, value, &input);
        let tx = TxEnv {
            caller,
            kind: TxKind::Call(target),
            data: input,
            value,
            nonce: sender.nonce,
            gas_limit: self.gas_limit,
            gas_price: 0,
            ..Default::default()
        };
        trace!(%transaction_hash, ?tx, "Executing transaction");

        let result = {
            let mut context = Context::mainnet().with_db(&mut self.db);
            // Deployed wallets carry a deposit runtime and still originate transactions.
            context.modify_cfg(|cfg| cfg.disable_eip3607 = true);
            let mut evm = context.build_mainnet();
            evm.transact_commit(tx).map_err(|err| HostError::Rejected(err.to_string()))?
        };

        let receipt = TxReceipt {
            transaction_hash,
            from: caller,
            to: target,
            status: result.is_success(),
            gas_used: result.gas_used(),
            output: result.output().cloned().unwrap_or_default(),
            logs: result.logs().to_vec(),
        };
        debug!(
            %transaction_hash,
            %caller,
            %target,
            %value,
            status = receipt.status,
            gas_used = receipt.gas_used,
            "Transaction executed"
        );

        self.logs.extend(receipt.logs.iter().cloned());
        Ok(receipt)
    }

    fn emit(&mut self, log: Log) {
        self.logs.push(log);
    }

    fn logs(&self) -> &[Log] {
        &self.logs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};
    use revm::bytecode::opcode::{PUSH0, RETURN, REVERT, SLOAD, SSTORE};

    const ALICE: Address = address!("0x0000000000000000000000000000000000a11ce0");
    const BOB: Address = address!("0x0000000000000000000000000000000000000b0b");
    const CONTRACT: Address = address!("0x00000000000000000000000000000000000c0de0");

    #[test]
    fn test_transfer_moves_value_and_bumps_nonce() {
        let mut host = EvmHost::new().account_balance(ALICE, U256::from(1_000));

        let receipt = host.transfer(ALICE, BOB, U256::from(400)).unwrap();
        assert!(receipt.is_success());
        assert_eq!(host.balance(ALICE), U256::from(600));
        assert_eq!(host.balance(BOB), U256::from(400));
        assert_eq!(host.nonce(ALICE), 1);

        // The next transaction picks up the new nonce.
        let second = host.transfer(ALICE, BOB, U256::from(100)).unwrap();
        assert!(second.is_success());
        assert_ne!(second.transaction_hash, receipt.transaction_hash);
        assert_eq!(host.nonce(ALICE), 2);
    }

    #[test]
    fn test_insufficient_balance_is_rejected_up_front() {
        let mut host = EvmHost::new().account_balance(ALICE, U256::from(10));
        let err = host.transfer(ALICE, BOB, U256::from(11)).unwrap_err();
        assert_eq!(
            err,
            HostError::InsufficientBalance { available: U256::from(10), required: U256::from(11) }
        );
        assert_eq!(host.nonce(ALICE), 0);
    }

    #[test]
    fn test_revert_yields_failed_receipt() {
        let code = Bytes::from(vec![PUSH0, PUSH0, REVERT]);
        let mut host = EvmHost::new().account_code(CONTRACT, code);
        let receipt = host.call(ALICE, CONTRACT, U256::ZERO, bytes!("01")).unwrap();
        assert!(!receipt.is_success());
        assert!(receipt.output.is_empty());
    }

    #[test]
    fn test_storage_is_committed() {
        // SSTORE(0, 42); SLOAD(0) left on the stack; RETURN(0, 0)
        let code = Bytes::from(vec![
            0x60, 42, PUSH0, SSTORE, PUSH0, SLOAD, PUSH0, PUSH0, RETURN,
        ]);
        let mut host = EvmHost::new().account_code(CONTRACT, code);
        assert!(host.call(ALICE, CONTRACT, U256::ZERO, Bytes::new()).unwrap().is_success());
        assert_eq!(host.storage(CONTRACT, U256::ZERO), U256::from(42));
    }

    #[test]
    fn test_account_with_code_can_send() {
        let code = Bytes::from(vec![PUSH0, PUSH0, RETURN]);
        let mut host =
            EvmHost::new().account_code(CONTRACT, code).account_balance(CONTRACT, U256::from(5));
        let receipt = host.transfer(CONTRACT, BOB, U256::from(5)).unwrap();
        assert!(receipt.is_success());
        assert_eq!(host.balance(BOB), U256::from(5));
        assert_eq!(host.nonce(CONTRACT), 1);
    }

    #[test]
    fn test_occupancy() {
        let mut host = EvmHost::new().account_balance(ALICE, U256::from(1));
        // A funded account with no nonce or code does not block a creation.
        assert!(!host.is_occupied(ALICE));
        host.install_code(CONTRACT, bytes!("00"));
        assert!(host.is_occupied(CONTRACT));
        assert_eq!(host.code(CONTRACT), bytes!("00"));
        host.transfer(ALICE, BOB, U256::from(1)).unwrap();
        assert!(host.is_occupied(ALICE));
    }
}
