//! Deterministic (CREATE2) deployment of wallet instances.

use alloc::vec::Vec;

use alloy_primitives::{keccak256, Address, Bytes, Log, B256, U256};
use alloy_sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    wallet_init_code, Host, HostError, IMagnethFactory, MultisigWallet, OwnerSet, TxReceipt,
    CREATE2_PREFIX, DETERMINISTIC_DEPLOYMENT_PROXY, DETERMINISTIC_DEPLOYMENT_PROXY_CODE,
};

/// Computes the address CREATE2 assigns to `init_code` deployed by `deployer` with `salt`:
/// `keccak256(0xff ‖ deployer ‖ salt ‖ keccak256(init_code))[12..]`.
pub fn predict_address(deployer: Address, salt: B256, init_code: &[u8]) -> Address {
    let mut preimage = [0u8; 1 + 20 + 32 + 32];
    preimage[0] = CREATE2_PREFIX;
    preimage[1..21].copy_from_slice(deployer.as_slice());
    preimage[21..53].copy_from_slice(salt.as_slice());
    preimage[53..].copy_from_slice(keccak256(init_code).as_slice());
    Address::from_slice(&keccak256(preimage)[12..])
}

/// Reasons a salt cannot be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SaltError {
    /// The big-endian encoding is longer than 32 bytes.
    #[error("salt is {0} bytes, at most 32 allowed")]
    TooLong(usize),
}

/// Encodes an integer salt as a 32-byte big-endian word.
pub fn salt_from_u256(salt: U256) -> B256 {
    B256::from(salt.to_be_bytes::<32>())
}

/// Encodes a big-endian salt of at most 32 bytes, left-padding it with zeros.
pub fn salt_from_be_slice(salt: &[u8]) -> Result<B256, SaltError> {
    if salt.len() > 32 {
        return Err(SaltError::TooLong(salt.len()));
    }
    Ok(B256::left_padding_from(salt))
}

/// Reasons a deployment fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    /// An account already occupies the address the salt and init code map to.
    #[error("salt {salt} already used: {address} is occupied")]
    SaltAlreadyUsed {
        /// The occupied address.
        address: Address,
        /// The salt of the attempt.
        salt: B256,
    },
    /// The instance was created somewhere other than the predicted address.
    #[error("deployed to {actual}, predicted {predicted}")]
    AddressMismatch {
        /// Address computed by [`predict_address`].
        predicted: Address,
        /// Address the runtime reported.
        actual: Address,
    },
    /// Creation failed for a reason other than a collision, typically a reverting constructor,
    /// or the factory returned something other than an address.
    #[error("deployment of {predicted} failed with output {output}")]
    DeploymentFailed {
        /// Address computed by [`predict_address`].
        predicted: Address,
        /// Output of the factory call.
        output: Bytes,
    },
    /// The host refused to run the factory call.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Log entry of one successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Address computed before deployment.
    pub predicted_address: Address,
    /// Sender of the deployment transaction.
    pub deployer: Address,
    /// CREATE2 salt.
    pub salt: B256,
    /// Init code of the instance.
    pub init_code: Bytes,
    /// Address the runtime created.
    pub actual_address: Address,
}

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Address of the new instance.
    pub address: Address,
    /// Receipt of the factory transaction.
    pub receipt: TxReceipt,
}

/// Deploys instances through the deterministic deployment proxy at [`address`](Self::address).
///
/// The created address is a pure function of the factory address, the salt and the init code, so
/// it is computable with [`predict`](Self::predict) before anything runs.
#[derive(Debug, Clone, Default)]
pub struct WalletFactory {
    address: Address,
    records: Vec<DeploymentRecord>,
}

impl WalletFactory {
    /// A factory backed by a proxy already present at `address`.
    pub const fn new(address: Address) -> Self {
        Self { address, records: Vec::new() }
    }

    /// Places the proxy runtime at `address` and returns a factory for it.
    pub fn install<H: Host>(host: &mut H, address: Address) -> Self {
        host.install_code(address, DETERMINISTIC_DEPLOYMENT_PROXY_CODE);
        debug!(factory = %address, "Installed deterministic deployment proxy");
        Self::new(address)
    }

    /// Installs the proxy at its canonical address, [`DETERMINISTIC_DEPLOYMENT_PROXY`].
    pub fn install_canonical<H: Host>(host: &mut H) -> Self {
        Self::install(host, DETERMINISTIC_DEPLOYMENT_PROXY)
    }

    /// Address of the factory.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Address `init_code` deployed through this factory with `salt` will have.
    pub fn predict(&self, salt: B256, init_code: &[u8]) -> Address {
        predict_address(self.address, salt, init_code)
    }

    /// Every successful deployment, in order.
    pub fn records(&self) -> &[DeploymentRecord] {
        &self.records
    }

    /// The record of the instance at `address`, if this factory deployed it.
    pub fn record_for(&self, address: Address) -> Option<&DeploymentRecord> {
        self.records.iter().find(|record| record.actual_address == address)
    }

    /// Creates an instance from `init_code` with `salt`, sending the transaction from `deployer`.
    ///
    /// A realized address differing from the prediction is always logged; with `force_check` it
    /// fails the deployment with [`FactoryError::AddressMismatch`].
    pub fn deploy<H: Host>(
        &mut self,
        host: &mut H,
        deployer: Address,
        init_code: Bytes,
        salt: B256,
        force_check: bool,
    ) -> Result<Deployment, FactoryError> {
        let predicted = self.predict(salt, &init_code);
        debug!(factory = %self.address, %deployer, %salt, %predicted, "Deploying instance");

        let input = [salt.as_slice(), init_code.as_ref()].concat();
        let mut receipt = host.call(deployer, self.address, U256::ZERO, input.into())?;
        if !receipt.is_success() {
            if host.is_occupied(predicted) {
                return Err(FactoryError::SaltAlreadyUsed { address: predicted, salt });
            }
            return Err(FactoryError::DeploymentFailed { predicted, output: receipt.output });
        }

        if receipt.output.len() != 20 {
            return Err(FactoryError::DeploymentFailed { predicted, output: receipt.output });
        }
        let actual = Address::from_slice(&receipt.output);
        if actual != predicted {
            error!(
                factory = %self.address,
                %predicted,
                %actual,
                "Deployed address differs from prediction"
            );
            if force_check {
                return Err(FactoryError::AddressMismatch { predicted, actual });
            }
        }

        let event = IMagnethFactory::Deployed { instance: actual, deployer, salt };
        let log = Log { address: self.address, data: event.encode_log_data() };
        host.emit(log.clone());
        receipt.logs.push(log);

        self.records.push(DeploymentRecord {
            predicted_address: predicted,
            deployer,
            salt,
            init_code,
            actual_address: actual,
        });
        info!(factory = %self.address, instance = %actual, %deployer, %salt, "Instance deployed");

        Ok(Deployment { address: actual, receipt })
    }

    /// Deploys a wallet owned by `owners` and returns it alongside the deployment.
    pub fn deploy_wallet<H: Host>(
        &mut self,
        host: &mut H,
        deployer: Address,
        owners: OwnerSet,
        salt: B256,
        force_check: bool,
    ) -> Result<(MultisigWallet, Deployment), FactoryError> {
        let deployment =
            self.deploy(host, deployer, wallet_init_code(&owners), salt, force_check)?;
        Ok((MultisigWallet::with_owner_set(deployment.address, owners), deployment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes, hex};
    use rstest::rstest;

    // EIP-1014 test vectors.
    #[rstest]
    #[case(
        Address::ZERO,
        B256::ZERO,
        bytes!("00"),
        address!("0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38")
    )]
    #[case(
        address!("0xdeadbeef00000000000000000000000000000000"),
        B256::ZERO,
        bytes!("00"),
        address!("0xB928f69Bb1D91Cd65274e3c79d8986362984fDA3")
    )]
    #[case(
        Address::ZERO,
        B256::ZERO,
        bytes!("deadbeef"),
        address!("0x70f2b2914A2a4b783FaEFb75f459A580616Fcb5e")
    )]
    fn test_predict_address_vectors(
        #[case] deployer: Address,
        #[case] salt: B256,
        #[case] init_code: Bytes,
        #[case] expected: Address,
    ) {
        assert_eq!(predict_address(deployer, salt, &init_code), expected);
    }

    #[test]
    fn test_predict_address_agrees_with_alloy() {
        let deployer = DETERMINISTIC_DEPLOYMENT_PROXY;
        let salt = salt_from_u256(U256::from(7));
        let init_code = bytes!("5f5ff3");
        assert_eq!(
            predict_address(deployer, salt, &init_code),
            deployer.create2_from_code(salt, &init_code)
        );
    }

    #[test]
    fn test_salt_is_left_padded() {
        let salt = salt_from_u256(U256::from(1));
        assert_eq!(salt_from_be_slice(&[1]).unwrap(), salt);
        assert_eq!(salt[..31], [0u8; 31]);
        assert_eq!(salt[31], 1);

        let mut right_padded = [0u8; 32];
        right_padded[0] = 1;
        let init_code = bytes!("5f5ff3");
        assert_ne!(
            predict_address(Address::ZERO, salt, &init_code),
            predict_address(Address::ZERO, B256::from(right_padded), &init_code)
        );
    }

    #[test]
    fn test_salt_too_long() {
        assert_eq!(salt_from_be_slice(&[0xff; 33]), Err(SaltError::TooLong(33)));
        assert_eq!(
            salt_from_be_slice(&hex!("0102")).unwrap(),
            salt_from_u256(U256::from(0x0102))
        );
    }
}
