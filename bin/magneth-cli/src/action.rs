//! Commands for building action digests and owner signature bundles.

use alloy_primitives::{Address, Bytes, B256, U256};
use clap::Parser;
use k256::ecdsa::SigningKey;
use magneth::{canonical_bundle, signer_address, Action, OwnerSignature};
use serde::Serialize;
use tracing::info;

use crate::common::{decode_hex, load_hex, CliError, Result};

/// Compute the digest owners sign to authorize an action
#[derive(Parser, Debug)]
pub struct DigestCmd {
    /// Address of the wallet executing the action
    #[arg(long = "wallet")]
    pub wallet: Address,

    /// Destination of the action
    #[arg(long = "to")]
    pub to: Address,

    /// Native value sent with the action
    #[arg(long = "value", default_value = "0")]
    pub value: U256,

    /// Calldata as a hex string. Empty means a plain transfer
    #[arg(long = "data")]
    pub data: Option<String>,

    /// File containing calldata. If '-' is specified, calldata is read from stdin
    #[arg(long = "data.file", visible_aliases = ["data-file"])]
    pub data_file: Option<String>,
}

impl DigestCmd {
    /// The action described by the arguments.
    pub fn action(&self) -> Result<Action> {
        let payload =
            load_hex(self.data.as_deref(), self.data_file.as_deref())?.unwrap_or_default();
        Ok(Action::new(self.wallet, self.to, self.value, payload))
    }

    /// Compute the digest.
    pub fn execute(&self) -> Result<B256> {
        let action = self.action()?;
        let digest = action.digest();
        info!(wallet = %action.executor, to = %action.destination, %digest, "Computed digest");
        Ok(digest)
    }

    /// Execute the command and print the digest.
    pub fn run(&self) -> Result<()> {
        println!("{}", self.execute()?);
        Ok(())
    }
}

/// Sign an action digest with an owner key
#[derive(Parser, Debug)]
pub struct SignCmd {
    /// Private key of the owner
    #[arg(long = "key", env = "MAGNETH_PRIVATE_KEY", hide_env_values = true)]
    pub key: B256,

    /// Digest to sign
    #[arg(long = "digest")]
    pub digest: B256,
}

impl SignCmd {
    /// Sign the digest.
    pub fn execute(&self) -> Result<OwnerSignature> {
        let key = SigningKey::from_slice(self.key.as_slice()).map_err(|_| CliError::InvalidKey)?;
        let signature = OwnerSignature::sign(&key, &self.digest)?;
        info!(signer = %signer_address(&key), digest = %self.digest, "Signed digest");
        Ok(signature)
    }

    /// Execute the command and print the 65-byte signature.
    pub fn run(&self) -> Result<()> {
        println!("{}", Bytes::from(self.execute()?.to_bytes()));
        Ok(())
    }
}

/// Order signatures into a bundle a wallet accepts
#[derive(Parser, Debug)]
pub struct BundleCmd {
    /// Digest the signatures were made over
    #[arg(long = "digest")]
    pub digest: B256,

    /// 65-byte hex signatures, in any order
    #[arg(value_name = "SIGNATURE", required = true)]
    pub signatures: Vec<String>,
}

/// A signature bundle in canonical order together with its signers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleOutput {
    /// Concatenated signatures, ascending by signer.
    pub bundle: Bytes,
    /// Recovered signers, ascending.
    pub signers: Vec<Address>,
}

impl BundleCmd {
    /// Recover every signer and sort the signatures.
    pub fn execute(&self) -> Result<BundleOutput> {
        let signatures = self
            .signatures
            .iter()
            .map(|signature| Ok(OwnerSignature::from_slice(&decode_hex(signature)?)?))
            .collect::<Result<Vec<_>>>()?;
        let (bundle, signers) = canonical_bundle(&self.digest, signatures)?;
        if let Some(pair) = signers.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(CliError::InvalidInput(format!("Signer {} appears twice", pair[0])));
        }
        Ok(BundleOutput { bundle, signers })
    }

    /// Execute the command and print the bundle as JSON.
    pub fn run(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&self.execute()?)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, keccak256};

    const KEY_A: B256 = b256!("0xced26e4f0ad256777efa4b205ac3003eca7e1befb9f657be58600b7115a6cdf1");
    const KEY_B: B256 = b256!("0x3132ce18b38230af1f8d751f5658c97e59d33a9e884676fddfc9cc4434cd36fb");

    fn sign(key: B256, digest: B256) -> String {
        let signature = SignCmd { key, digest }.execute().unwrap();
        Bytes::from(signature.to_bytes()).to_string()
    }

    #[test]
    fn test_digest_matches_action() {
        let cmd = DigestCmd {
            wallet: address!("0x1000000000000000000000000000000000000001"),
            to: address!("0x2000000000000000000000000000000000000002"),
            value: U256::from(5),
            data: Some("0xa9059cbb".to_owned()),
            data_file: None,
        };
        let action = cmd.action().unwrap();
        assert_eq!(action.payload, Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]));
        assert_eq!(cmd.execute().unwrap(), action.digest());
    }

    #[test]
    fn test_digest_without_data_is_transfer() {
        let cmd = DigestCmd {
            wallet: Address::ZERO,
            to: Address::ZERO,
            value: U256::ZERO,
            data: None,
            data_file: None,
        };
        assert!(cmd.action().unwrap().is_transfer());
    }

    #[test]
    fn test_bundle_sorts_signers() {
        let digest = keccak256("action");
        let signatures = vec![sign(KEY_B, digest), sign(KEY_A, digest)];
        let output = BundleCmd { digest, signatures }.execute().unwrap();

        assert_eq!(output.bundle.len(), 130);
        assert_eq!(output.signers.len(), 2);
        assert!(output.signers[0] < output.signers[1]);
    }

    #[test]
    fn test_bundle_rejects_repeated_signer() {
        let digest = keccak256("action");
        let signatures = vec![sign(KEY_A, digest), sign(KEY_A, digest)];
        assert!(matches!(
            BundleCmd { digest, signatures }.execute(),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_bundle_rejects_short_signature() {
        let cmd = BundleCmd { digest: B256::ZERO, signatures: vec!["0x0102".to_owned()] };
        assert!(matches!(cmd.execute(), Err(CliError::Signature(_))));
    }

    #[test]
    fn test_invalid_key() {
        let cmd = SignCmd { key: B256::ZERO, digest: B256::ZERO };
        assert!(matches!(cmd.execute(), Err(CliError::InvalidKey)));
    }
}
