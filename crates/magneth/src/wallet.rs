//! The multisig authorization and execution engine.

use alloc::vec::Vec;

use alloy_primitives::{map::B256HashSet, Address, Bytes, Log, U256};
use alloy_sol_types::SolEvent;
use tracing::{debug, info, warn};

use crate::{
    decode_wallet_init_code, wallet_runtime_code, Action, ActionDigest, Host, HostError, IMagneth,
    InitCodeError, OwnerSet, OwnerSetError, OwnerSignature, SignatureError, TxReceipt,
    SIGNATURE_LENGTH,
};

/// Why an authorized action failed to execute.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionFailure {
    /// The wallet cannot cover the value of the action.
    #[error("insufficient balance: {available} available, {required} required")]
    InsufficientBalance {
        /// Balance of the wallet.
        available: U256,
        /// Value of the action.
        required: U256,
    },
    /// The destination reverted or halted.
    #[error("call reverted with output {output}")]
    Reverted {
        /// Revert data returned by the destination.
        output: Bytes,
    },
    /// The host refused to run the call.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Reasons [`MultisigWallet::submit`] rejects an action.
///
/// Every variant except [`ExecutionFailed`](Self::ExecutionFailed) leaves the wallet unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// The bundle carries fewer signatures than the quorum.
    #[error("{provided} signatures provided, {required} required")]
    InvalidSignatureCount {
        /// Number of signatures in the bundle.
        provided: usize,
        /// The wallet's quorum.
        required: usize,
    },
    /// A signature cannot be parsed or recovered. A trailing partial signature is reported at
    /// the index it would occupy.
    #[error("malformed signature at index {index}: {source}")]
    MalformedSignature {
        /// Position of the signature in the bundle.
        index: usize,
        /// The underlying failure.
        source: SignatureError,
    },
    /// A signature recovers to an address that is not an owner.
    #[error("signature at index {index} recovers to non-owner {signer}")]
    UnauthorizedSigner {
        /// Position of the signature in the bundle.
        index: usize,
        /// The recovered address.
        signer: Address,
    },
    /// Signers are not strictly ascending, so the bundle repeats or misorders an owner.
    #[error("signer {signer} at index {index} does not follow {previous}")]
    DuplicateOrUnorderedSigner {
        /// Position of the signature in the bundle.
        index: usize,
        /// The recovered address.
        signer: Address,
        /// The signer recovered at the previous position.
        previous: Address,
    },
    /// The action was already executed, or attempted and failed.
    #[error("action {digest} already executed")]
    ReplayedAction {
        /// Digest of the action.
        digest: ActionDigest,
    },
    /// The action was authorized but failed. Its digest stays consumed.
    #[error("action {digest} failed: {reason}")]
    ExecutionFailed {
        /// Digest of the action.
        digest: ActionDigest,
        /// Why execution failed.
        reason: ExecutionFailure,
    },
}

/// A wallet that performs an action once a quorum of its owners signed the action's digest.
///
/// The wallet holds no keys. Owners sign [`Action::digest`] off-line; anyone may relay the
/// resulting bundle through [`submit`](Self::submit). Each digest executes at most once.
#[derive(Debug, Clone)]
pub struct MultisigWallet {
    address: Address,
    owners: OwnerSet,
    executed: B256HashSet,
}

impl MultisigWallet {
    /// Creates a wallet at `address` owned by `owners` with quorum `required`.
    pub fn new(
        address: Address,
        owners: Vec<Address>,
        required: usize,
    ) -> Result<Self, OwnerSetError> {
        Ok(Self::with_owner_set(address, OwnerSet::new(owners, required)?))
    }

    /// Creates a wallet at `address` from a validated owner set.
    pub fn with_owner_set(address: Address, owners: OwnerSet) -> Self {
        Self { address, owners, executed: B256HashSet::default() }
    }

    /// Rebuilds the wallet deployed at `address` from the init code that created it.
    pub fn from_init_code(address: Address, init_code: &[u8]) -> Result<Self, InitCodeError> {
        Ok(Self::with_owner_set(address, decode_wallet_init_code(init_code)?))
    }

    /// Address of this instance. Bound into every action digest.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The owner set.
    pub const fn owners(&self) -> &OwnerSet {
        &self.owners
    }

    /// Number of owner signatures required per action.
    pub const fn required(&self) -> usize {
        self.owners.required()
    }

    /// Whether `address` is an owner.
    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// Whether the action with `digest` was consumed, successfully or not.
    pub fn is_executed(&self, digest: &ActionDigest) -> bool {
        self.executed.contains(digest)
    }

    /// Number of consumed digests.
    pub fn executed_count(&self) -> usize {
        self.executed.len()
    }

    /// Native balance of the wallet on `host`.
    pub fn balance<H: Host>(&self, host: &H) -> U256 {
        host.balance(self.address)
    }

    /// The action this wallet would perform for the given parameters.
    pub fn action(&self, destination: Address, value: U256, payload: Bytes) -> Action {
        Action::new(self.address, destination, value, payload)
    }

    /// The digest owners must sign to authorize the given action on this wallet.
    pub fn digest(&self, destination: Address, value: U256, payload: Bytes) -> ActionDigest {
        self.action(destination, value, payload).digest()
    }

    /// Checks that `signatures` authorize `digest` and returns the signers in bundle order.
    ///
    /// Every signature in the bundle is checked, including any beyond the quorum. Signers must
    /// be owners and strictly ascending by address.
    pub fn verify(
        &self,
        digest: &ActionDigest,
        signatures: &[u8],
    ) -> Result<Vec<Address>, WalletError> {
        let provided = signatures.len() / SIGNATURE_LENGTH;
        let trailing = signatures.len() % SIGNATURE_LENGTH;
        if trailing != 0 {
            return Err(WalletError::MalformedSignature {
                index: provided,
                source: SignatureError::InvalidLength(trailing),
            });
        }
        if provided < self.required() {
            let required = self.required();
            return Err(WalletError::InvalidSignatureCount { provided, required });
        }

        let mut signers: Vec<Address> = Vec::with_capacity(provided);
        for (index, chunk) in signatures.chunks_exact(SIGNATURE_LENGTH).enumerate() {
            let signer = OwnerSignature::from_slice(chunk)
                .and_then(|signature| signature.recover(digest))
                .map_err(|source| WalletError::MalformedSignature { index, source })?;

            if !self.owners.contains(&signer) {
                return Err(WalletError::UnauthorizedSigner { index, signer });
            }
            if let Some(&previous) = signers.last() {
                if signer <= previous {
                    return Err(WalletError::DuplicateOrUnorderedSigner { index, signer, previous });
                }
            }
            debug!(%digest, index, %signer, "Signature verified");
            signers.push(signer);
        }

        Ok(signers)
    }

    /// Verifies and performs an action.
    ///
    /// An empty `payload` is a native transfer of `value` to `destination`; otherwise
    /// `destination` is called with `payload`, forwarding `value`. `caller` is the relaying party
    /// and carries no authority.
    ///
    /// Once the signatures check out the digest is consumed before the action runs. A failure
    /// during execution returns [`WalletError::ExecutionFailed`] and the digest stays consumed.
    pub fn submit<H: Host>(
        &mut self,
        host: &mut H,
        destination: Address,
        value: U256,
        payload: Bytes,
        signatures: &[u8],
        caller: Address,
    ) -> Result<ActionDigest, WalletError> {
        let action = self.action(destination, value, payload);
        let digest = action.digest();
        debug!(wallet = %self.address, %caller, %digest, %destination, %value, "Submitting action");

        let signers = self.verify(&digest, signatures)?;
        if !self.executed.insert(digest) {
            return Err(WalletError::ReplayedAction { digest });
        }

        if let Err(reason) = self.perform(host, &action) {
            warn!(wallet = %self.address, %digest, %reason, "Action failed, digest consumed");
            return Err(WalletError::ExecutionFailed { digest, reason });
        }

        let event = IMagneth::Execution {
            transactionId: digest,
            destination,
            value,
            data: action.payload,
        };
        host.emit(Log { address: self.address, data: event.encode_log_data() });
        info!(wallet = %self.address, %digest, %destination, %value, ?signers, "Action executed");

        Ok(digest)
    }

    fn perform<H: Host>(
        &self,
        host: &mut H,
        action: &Action,
    ) -> Result<TxReceipt, ExecutionFailure> {
        let available = host.balance(self.address);
        if available < action.value {
            return Err(ExecutionFailure::InsufficientBalance { available, required: action.value });
        }

        let receipt = if action.is_transfer() {
            host.transfer(self.address, action.destination, action.value)?
        } else {
            host.call(self.address, action.destination, action.value, action.payload.clone())?
        };
        if !receipt.is_success() {
            return Err(ExecutionFailure::Reverted { output: receipt.output });
        }
        Ok(receipt)
    }

    /// Places the wallet runtime at the wallet's address. Instances deployed through a
    /// [`WalletFactory`](crate::WalletFactory) already carry it.
    pub fn install<H: Host>(&self, host: &mut H) {
        host.install_code(self.address, wallet_runtime_code());
        debug!(wallet = %self.address, "Installed wallet runtime");
    }

    /// Moves `amount` of native value from `source` into the wallet.
    ///
    /// The wallet runtime logs `Deposit(source, amount)` into the receipt and the host, exactly as
    /// it does for value arriving by a plain transfer or forwarded by another contract.
    pub fn deposit<H: Host>(
        &self,
        host: &mut H,
        source: Address,
        amount: U256,
    ) -> Result<TxReceipt, HostError> {
        let receipt = host.transfer(source, self.address, amount)?;
        if receipt.is_success() {
            debug!(wallet = %self.address, %source, %amount, "Deposit received");
        }
        Ok(receipt)
    }
}
