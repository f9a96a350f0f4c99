//! Multisig wallet authorization and deterministic deployment for the EVM.
//!
//! A [`MultisigWallet`] executes an action (native transfer or arbitrary call) once a quorum of its
//! owners has signed the action's digest off-line. The digest binds the wallet's own address, so
//! an approval can never be replayed against another instance. A [`WalletFactory`] deploys wallet
//! instances with CREATE2 at addresses computable in advance with [`predict_address`].
//!
//! Both components run against a [`Host`], the execution environment capability. [`EvmHost`] is
//! an in-memory implementation backed by `revm`.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use alloy_primitives;
pub use alloy_sol_types;
pub use revm;

mod action;
pub use action::*;

mod constants;
pub use constants::*;

mod factory;
pub use factory::*;

mod host;
pub use host::*;

mod init_code;
pub use init_code::*;

mod interfaces;
pub use interfaces::*;

mod owners;
pub use owners::*;

mod signature;
pub use signature::*;

mod wallet;
pub use wallet::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
