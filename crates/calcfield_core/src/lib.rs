//! Core domain logic for calcfield.
//!
//! Demonstrates derived-field persistence strategies for a SQLite-backed
//! record: eager write-side recompute, computed-on-read, and save-time
//! recompute, selectable per field at record-definition time. This crate is
//! the single source of truth for the derived-value contract.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{User, UserId, Wallet, WalletId};
pub use model::pair::{
    DeriveError, DerivedField, DivisionError, FieldPlan, Materialization, Pair, PairId, PairPlan,
    PairRow, PairValidationError, StoredValues,
};
pub use repo::account_repo::{
    AccountRepoError, AccountRepoResult, AccountRepository, SqliteAccountRepository,
    UserWithWallets,
};
pub use repo::pair_repo::{PairRepoError, PairRepoResult, PairRepository, SqlitePairRepository};
pub use service::account_service::AccountService;
pub use service::pair_service::PairService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
