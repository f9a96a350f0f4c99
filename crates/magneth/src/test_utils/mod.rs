//! Test utilities: fixture owner keys, bundle signing and a minimal token contract.

mod keys;
mod opcode_gen;
mod token;

pub use keys::*;
pub use opcode_gen::*;
pub use token::*;
