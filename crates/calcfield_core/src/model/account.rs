//! User/wallet records for the one-to-many association example.
//!
//! # Responsibility
//! - Define the parent (`User`) and child (`Wallet`) record shapes.
//!
//! # Invariants
//! - A wallet's `user_uuid` may be unresolved (`None`); when resolved it must
//!   point at an existing user, which the store enforces via foreign keys.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user row.
pub type UserId = Uuid;

/// Stable identifier for a wallet row.
pub type WalletId = Uuid;

/// Parent record of the association example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    pub name: String,
}

impl User {
    /// Creates a user with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a user with a caller-provided stable ID.
    pub fn with_id(uuid: UserId, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }
}

/// Child record holding an optional reference to its owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub uuid: WalletId,
    /// Owning user. `None` means the reference is not resolved yet.
    pub user_uuid: Option<UserId>,
    pub label: String,
}

impl Wallet {
    /// Creates a wallet with a generated stable ID.
    pub fn new(user_uuid: Option<UserId>, label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), user_uuid, label)
    }

    /// Creates a wallet with a caller-provided stable ID.
    pub fn with_id(uuid: WalletId, user_uuid: Option<UserId>, label: impl Into<String>) -> Self {
        Self {
            uuid,
            user_uuid,
            label: label.into(),
        }
    }

    /// Returns whether the wallet points at a user.
    pub fn is_attached(&self) -> bool {
        self.user_uuid.is_some()
    }
}
