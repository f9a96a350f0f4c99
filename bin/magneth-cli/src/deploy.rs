//! Commands for wallet init code, address prediction and simulated deployment.

use std::path::PathBuf;

use alloy_primitives::{address, Address, Bytes, U256};
use clap::Parser;
use magneth::{
    decode_wallet_init_code, predict_address, wallet_init_code, Deployment, DeploymentRecord,
    EvmHost, WalletConfig, WalletFactory, DEFAULT_TX_GAS_LIMIT, DETERMINISTIC_DEPLOYMENT_PROXY,
};
use serde::Serialize;
use tracing::info;

use crate::common::{load_hex, load_owner_set, parse_salt, CliError, Result};

/// Default sender of the simulated deployment transaction.
pub const DEFAULT_DEPLOYER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Print the init code of a wallet
#[derive(Parser, Debug)]
pub struct InitCodeCmd {
    /// JSON wallet configuration (`{ "owners": [...], "required": n }`). '-' reads stdin
    #[arg(long = "config")]
    pub config: PathBuf,
}

impl InitCodeCmd {
    /// Build the init code.
    pub fn execute(&self) -> Result<Bytes> {
        Ok(wallet_init_code(&load_owner_set(&self.config)?))
    }

    /// Execute the command and print the init code.
    pub fn run(&self) -> Result<()> {
        println!("{}", self.execute()?);
        Ok(())
    }
}

/// Decode the owners and quorum a wallet init code commits to
#[derive(Parser, Debug)]
pub struct DecodeInitCodeCmd {
    /// Init code as a hex string
    #[arg(long = "init-code")]
    pub init_code: Option<String>,

    /// File containing init code. If '-' is specified, init code is read from stdin
    #[arg(long = "init-code.file", visible_aliases = ["init-code-file"])]
    pub init_code_file: Option<String>,
}

impl DecodeInitCodeCmd {
    /// Decode the wallet configuration.
    pub fn execute(&self) -> Result<WalletConfig> {
        let init_code = load_hex(self.init_code.as_deref(), self.init_code_file.as_deref())?
            .ok_or_else(|| {
                CliError::InvalidInput("one of --init-code or --init-code.file".to_owned())
            })?;
        Ok(WalletConfig::from(&decode_wallet_init_code(&init_code)?))
    }

    /// Execute the command and print the configuration as JSON.
    pub fn run(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&self.execute()?)?);
        Ok(())
    }
}

/// Predict the address a deployment will create
#[derive(Parser, Debug)]
pub struct PredictCmd {
    /// Address of the factory
    #[arg(long = "factory", default_value_t = DETERMINISTIC_DEPLOYMENT_PROXY)]
    pub factory: Address,

    /// CREATE2 salt: decimal, or 0x-prefixed big-endian hex of at most 32 bytes
    #[arg(long = "salt")]
    pub salt: String,

    /// Init code as a hex string
    #[arg(long = "init-code", conflicts_with = "config")]
    pub init_code: Option<String>,

    /// File containing init code. If '-' is specified, init code is read from stdin
    #[arg(long = "init-code.file", visible_aliases = ["init-code-file"], conflicts_with = "config")]
    pub init_code_file: Option<String>,

    /// JSON wallet configuration to derive the init code from
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

impl PredictCmd {
    /// Resolve the init code from the arguments.
    pub fn init_code(&self) -> Result<Bytes> {
        if let Some(config) = &self.config {
            return Ok(wallet_init_code(&load_owner_set(config)?));
        }
        load_hex(self.init_code.as_deref(), self.init_code_file.as_deref())?.ok_or_else(|| {
            CliError::InvalidInput("one of --init-code, --init-code.file or --config".to_owned())
        })
    }

    /// Compute the address.
    pub fn execute(&self) -> Result<Address> {
        let salt = parse_salt(&self.salt)?;
        Ok(predict_address(self.factory, salt, &self.init_code()?))
    }

    /// Execute the command and print the address.
    pub fn run(&self) -> Result<()> {
        println!("{}", self.execute()?);
        Ok(())
    }
}

/// Simulate a wallet deployment on an in-memory EVM
#[derive(Parser, Debug)]
pub struct DeployCmd {
    /// JSON wallet configuration. '-' reads stdin
    #[arg(long = "config")]
    pub config: PathBuf,

    /// CREATE2 salt: decimal, or 0x-prefixed big-endian hex of at most 32 bytes
    #[arg(long = "salt")]
    pub salt: String,

    /// Sender of the deployment transaction
    #[arg(long = "deployer", visible_aliases = ["from"], default_value_t = DEFAULT_DEPLOYER)]
    pub deployer: Address,

    /// Address the factory runtime is installed at
    #[arg(long = "factory", default_value_t = DETERMINISTIC_DEPLOYMENT_PROXY)]
    pub factory: Address,

    /// Native value credited to the predicted address before deployment
    #[arg(long = "prefund", default_value = "0")]
    pub prefund: U256,

    /// Gas limit of the deployment transaction
    #[arg(long = "gas", default_value_t = DEFAULT_TX_GAS_LIMIT)]
    pub gas: u64,

    /// Fail unless the realized address equals the prediction
    #[arg(long = "force-check")]
    pub force_check: bool,
}

/// Result of a simulated deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployOutput {
    /// The deployment and its receipt.
    pub deployment: Deployment,
    /// The factory's record of it.
    pub record: DeploymentRecord,
    /// Native balance of the new wallet.
    pub balance: U256,
}

impl DeployCmd {
    /// Run the deployment.
    pub fn execute(&self) -> Result<DeployOutput> {
        let owners = load_owner_set(&self.config)?;
        let salt = parse_salt(&self.salt)?;

        let mut host = EvmHost::new().with_gas_limit(self.gas);
        let mut factory = WalletFactory::install(&mut host, self.factory);
        if !self.prefund.is_zero() {
            let predicted = factory.predict(salt, &wallet_init_code(&owners));
            host.set_balance(predicted, self.prefund);
        }

        let (wallet, deployment) =
            factory.deploy_wallet(&mut host, self.deployer, owners, salt, self.force_check)?;
        let record = factory
            .record_for(deployment.address)
            .cloned()
            .ok_or_else(|| CliError::InvalidInput("deployment left no record".to_owned()))?;
        info!(wallet = %deployment.address, gas_used = deployment.receipt.gas_used, "Deployed");

        Ok(DeployOutput { balance: wallet.balance(&host), deployment, record })
    }

    /// Execute the command and print the deployment as JSON.
    pub fn run(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&self.execute()?)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = r#"{
        "owners": [
            "0x00000000000000000000000000000000000000a1",
            "0x00000000000000000000000000000000000000b2",
            "0x00000000000000000000000000000000000000c3"
        ],
        "required": 2
    }"#;

    fn config_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();
        file
    }

    fn deploy_cmd(config: PathBuf) -> DeployCmd {
        DeployCmd {
            config,
            salt: "0x01".to_owned(),
            deployer: DEFAULT_DEPLOYER,
            factory: DETERMINISTIC_DEPLOYMENT_PROXY,
            prefund: U256::from(1_000),
            gas: DEFAULT_TX_GAS_LIMIT,
            force_check: true,
        }
    }

    #[test]
    fn test_predict_matches_deploy() {
        let file = config_file();
        let predicted = PredictCmd {
            factory: DETERMINISTIC_DEPLOYMENT_PROXY,
            salt: "1".to_owned(),
            init_code: None,
            init_code_file: None,
            config: Some(file.path().to_path_buf()),
        }
        .execute()
        .unwrap();

        let output = deploy_cmd(file.path().to_path_buf()).execute().unwrap();
        assert_eq!(output.deployment.address, predicted);
        assert_eq!(output.record.predicted_address, predicted);
        assert_eq!(output.balance, U256::from(1_000));
    }

    #[test]
    fn test_predict_from_init_code() {
        let file = config_file();
        let init_code = InitCodeCmd { config: file.path().to_path_buf() }.execute().unwrap();
        let from_code = PredictCmd {
            factory: DETERMINISTIC_DEPLOYMENT_PROXY,
            salt: "7".to_owned(),
            init_code: Some(init_code.to_string()),
            init_code_file: None,
            config: None,
        };
        let from_config = PredictCmd {
            factory: DETERMINISTIC_DEPLOYMENT_PROXY,
            salt: "7".to_owned(),
            init_code: None,
            init_code_file: None,
            config: Some(file.path().to_path_buf()),
        };
        assert_eq!(from_code.execute().unwrap(), from_config.execute().unwrap());
    }

    #[test]
    fn test_decode_init_code_round_trip() {
        let file = config_file();
        let init_code = InitCodeCmd { config: file.path().to_path_buf() }.execute().unwrap();
        let cmd =
            DecodeInitCodeCmd { init_code: Some(init_code.to_string()), init_code_file: None };
        let config = cmd.execute().unwrap();
        assert_eq!(config.required, 2);
        assert_eq!(config.owners.len(), 3);
        assert_eq!(config.owners[0], address!("0x00000000000000000000000000000000000000a1"));
    }

    #[test]
    fn test_decode_rejects_foreign_init_code() {
        let cmd = DecodeInitCodeCmd { init_code: Some("0x6000".to_owned()), init_code_file: None };
        assert!(matches!(cmd.execute(), Err(CliError::InitCode(_))));
    }

    #[test]
    fn test_predict_requires_init_code() {
        let cmd = PredictCmd {
            factory: DETERMINISTIC_DEPLOYMENT_PROXY,
            salt: "1".to_owned(),
            init_code: None,
            init_code_file: None,
            config: None,
        };
        assert!(matches!(cmd.execute(), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_deploy_output_serializes() {
        let file = config_file();
        let output = deploy_cmd(file.path().to_path_buf()).execute().unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["deployment"]["receipt"]["status"], true);
        assert_eq!(
            json["record"]["actualAddress"].as_str().unwrap().to_lowercase(),
            output.deployment.address.to_string().to_lowercase()
        );
    }
}
