//! The fixed owner set and quorum of a wallet.

use alloc::vec::Vec;

use alloy_primitives::{map::AddressHashSet, Address};
use delegate::delegate;
use serde::{Deserialize, Serialize};

/// Reasons an owner set or quorum is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnerSetError {
    /// No owners were given.
    #[error("owner set is empty")]
    Empty,
    /// The same owner appears more than once.
    #[error("duplicate owner {0}")]
    DuplicateOwner(Address),
    /// The zero address cannot own a wallet; it is what failed recovery yields on-chain.
    #[error("zero address cannot be an owner")]
    ZeroOwner,
    /// The quorum is zero or larger than the number of owners.
    #[error("invalid quorum {required} for {owners} owners")]
    InvalidQuorum {
        /// The requested quorum.
        required: usize,
        /// The number of owners.
        owners: usize,
    },
}

/// An ordered set of distinct owners together with the number of signatures required to act.
///
/// Immutable once built; changing owners means deploying a new wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSet {
    owners: Vec<Address>,
    lookup: AddressHashSet,
    required: usize,
}

impl OwnerSet {
    /// Validates and builds an owner set.
    pub fn new(owners: Vec<Address>, required: usize) -> Result<Self, OwnerSetError> {
        if owners.is_empty() {
            return Err(OwnerSetError::Empty);
        }

        let mut lookup = AddressHashSet::default();
        for owner in &owners {
            if owner.is_zero() {
                return Err(OwnerSetError::ZeroOwner);
            }
            if !lookup.insert(*owner) {
                return Err(OwnerSetError::DuplicateOwner(*owner));
            }
        }

        if required == 0 || required > owners.len() {
            return Err(OwnerSetError::InvalidQuorum { required, owners: owners.len() });
        }

        Ok(Self { owners, lookup, required })
    }

    /// The owners in construction order.
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    /// The number of distinct owner signatures required to authorize an action.
    pub const fn required(&self) -> usize {
        self.required
    }

    /// Whether `address` is an owner.
    pub fn contains(&self, address: &Address) -> bool {
        self.lookup.contains(address)
    }

    delegate! {
        to self.owners {
            /// The number of owners.
            pub fn len(&self) -> usize;
            /// Always `false` for a constructed set.
            pub fn is_empty(&self) -> bool;
            /// Iterates over the owners in construction order.
            pub fn iter(&self) -> core::slice::Iter<'_, Address>;
        }
    }
}

impl<'a> IntoIterator for &'a OwnerSet {
    type Item = &'a Address;
    type IntoIter = core::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Serializable wallet configuration: the owners and the quorum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Wallet owners.
    pub owners: Vec<Address>,
    /// Number of owner signatures required per action.
    pub required: usize,
}

impl TryFrom<WalletConfig> for OwnerSet {
    type Error = OwnerSetError;

    fn try_from(config: WalletConfig) -> Result<Self, Self::Error> {
        Self::new(config.owners, config.required)
    }
}

impl From<&OwnerSet> for WalletConfig {
    fn from(owners: &OwnerSet) -> Self {
        Self { owners: owners.owners.clone(), required: owners.required }
    }
}
