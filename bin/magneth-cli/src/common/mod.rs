//! Shared helpers for the magneth CLI commands: errors, hex and salt parsing, configuration
//! files and logging.

mod config;
mod error;
mod hex;
mod logging;

pub use config::*;
pub use error::*;
pub use hex::*;
pub use logging::*;
