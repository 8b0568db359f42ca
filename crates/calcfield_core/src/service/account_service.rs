//! Account use-case service.
//!
//! # Responsibility
//! - Provide user/wallet create and read entry points.
//! - Delegate persistence to repository implementations.

use crate::model::account::{User, UserId, Wallet};
use crate::repo::account_repo::{AccountRepoResult, AccountRepository, UserWithWallets};

/// Use-case service wrapper for the association example.
pub struct AccountService<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> AccountService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a user and returns the persisted record.
    pub fn create_user(&self, name: impl Into<String>) -> AccountRepoResult<User> {
        let user = User::new(name);
        self.repo.create_user(&user)?;
        Ok(user)
    }

    /// Creates a wallet, optionally attached to a user.
    ///
    /// An unattached wallet (`user_uuid = None`) is permitted; it will not
    /// appear under any user until its reference is resolved.
    pub fn create_wallet(
        &self,
        user_uuid: Option<UserId>,
        label: impl Into<String>,
    ) -> AccountRepoResult<Wallet> {
        let wallet = Wallet::new(user_uuid, label);
        self.repo.create_wallet(&wallet)?;
        Ok(wallet)
    }

    /// Loads a user together with every wallet resolving to it.
    pub fn find_user_with_wallets(&self, name: &str) -> AccountRepoResult<Option<UserWithWallets>> {
        self.repo.find_user_with_wallets(name)
    }
}
