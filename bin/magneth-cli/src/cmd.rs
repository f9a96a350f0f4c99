use clap::{Parser, Subcommand};

use crate::{
    action::{BundleCmd, DigestCmd, SignCmd},
    common::{CliError, LogArgs},
    deploy::{DecodeInitCodeCmd, DeployCmd, InitCodeCmd, PredictCmd},
};

/// Main command of the magneth CLI tool
#[derive(Parser, Debug)]
#[command(name = "magneth", infer_subcommands = true, version)]
pub struct MainCmd {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Logging options
    #[command(flatten)]
    pub log: LogArgs,
}

/// Subcommands of the magneth CLI tool
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute an action digest
    Digest(DigestCmd),
    /// Sign a digest with an owner key
    Sign(SignCmd),
    /// Order signatures into a canonical bundle
    Bundle(BundleCmd),
    /// Predict a deployment address
    Predict(PredictCmd),
    /// Print wallet init code
    InitCode(InitCodeCmd),
    /// Decode the owners and quorum of wallet init code
    DecodeInitCode(DecodeInitCodeCmd),
    /// Simulate a wallet deployment
    Deploy(DeployCmd),
}

/// Error types for the main command system
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command error
    #[error("{0}")]
    Cli(#[from] CliError),
}

impl MainCmd {
    /// Execute the main command
    pub fn run(&self) -> Result<(), Error> {
        self.log.init()?;
        match &self.command {
            Command::Digest(cmd) => cmd.run()?,
            Command::Sign(cmd) => cmd.run()?,
            Command::Bundle(cmd) => cmd.run()?,
            Command::Predict(cmd) => cmd.run()?,
            Command::InitCode(cmd) => cmd.run()?,
            Command::DecodeInitCode(cmd) => cmd.run()?,
            Command::Deploy(cmd) => cmd.run()?,
        }
        Ok(())
    }
}
