//! Library half of the `magneth` CLI: argument parsing and command execution.

mod cmd;
pub use cmd::*;

pub mod action;
pub mod common;
pub mod deploy;
