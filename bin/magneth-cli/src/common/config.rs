//! Wallet configuration files.

use std::path::Path;

use magneth::{OwnerSet, WalletConfig};
use tracing::debug;

use super::{read_input, Result};

/// Load a JSON [`WalletConfig`] (`{ "owners": [...], "required": n }`) and validate it into an
/// owner set. A dash (-) reads from stdin.
pub fn load_owner_set(path: &Path) -> Result<OwnerSet> {
    let contents = read_input(&path.to_string_lossy())?;
    let config: WalletConfig = serde_json::from_str(&contents)?;
    debug!(owners = config.owners.len(), required = config.required, "Loaded wallet config");
    Ok(OwnerSet::try_from(config)?)
}
