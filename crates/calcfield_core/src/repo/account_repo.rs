//! User/wallet repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist users and wallets and read a user together with its wallets.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - A wallet with a resolved `user_uuid` must reference an existing user;
//!   the store enforces this via `foreign_keys=ON`, and violations propagate
//!   unchanged as `Db` errors.
//! - Wallet listing is deterministic: `created_at ASC, uuid ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::account::{User, UserId, Wallet, WalletId};
use crate::repo::{schema_version, table_exists, table_has_column};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type AccountRepoResult<T> = Result<T, AccountRepoError>;

/// Errors from user/wallet persistence and query operations.
#[derive(Debug)]
pub enum AccountRepoError {
    /// Underlying SQLite/bootstrap error, propagated unchanged. Constraint
    /// violations (dangling wallet references, duplicate user names) surface
    /// here.
    Db(DbError),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from an expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for AccountRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted account data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "account repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "account repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "account repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for AccountRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for AccountRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for AccountRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// A user together with every wallet whose reference resolves to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithWallets {
    pub user: User,
    pub wallets: Vec<Wallet>,
}

/// Repository interface for the association example.
pub trait AccountRepository {
    fn create_user(&self, user: &User) -> AccountRepoResult<UserId>;
    fn create_wallet(&self, wallet: &Wallet) -> AccountRepoResult<WalletId>;
    fn get_user_by_name(&self, name: &str) -> AccountRepoResult<Option<User>>;
    fn find_user_with_wallets(&self, name: &str) -> AccountRepoResult<Option<UserWithWallets>>;
    fn list_wallets_for_user(&self, user_uuid: UserId) -> AccountRepoResult<Vec<Wallet>>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> AccountRepoResult<Self> {
        ensure_account_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_user(&self, user: &User) -> AccountRepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (uuid, name) VALUES (?1, ?2);",
            params![user.uuid.to_string(), user.name.as_str()],
        )?;

        Ok(user.uuid)
    }

    fn create_wallet(&self, wallet: &Wallet) -> AccountRepoResult<WalletId> {
        self.conn.execute(
            "INSERT INTO wallets (uuid, user_uuid, label) VALUES (?1, ?2, ?3);",
            params![
                wallet.uuid.to_string(),
                wallet.user_uuid.map(|value| value.to_string()),
                wallet.label.as_str(),
            ],
        )?;

        Ok(wallet.uuid)
    }

    fn get_user_by_name(&self, name: &str) -> AccountRepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name FROM users WHERE name = ?1;")?;

        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn find_user_with_wallets(&self, name: &str) -> AccountRepoResult<Option<UserWithWallets>> {
        let user = match self.get_user_by_name(name)? {
            Some(user) => user,
            None => return Ok(None),
        };

        let wallets = self.list_wallets_for_user(user.uuid)?;
        Ok(Some(UserWithWallets { user, wallets }))
    }

    fn list_wallets_for_user(&self, user_uuid: UserId) -> AccountRepoResult<Vec<Wallet>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, user_uuid, label
             FROM wallets
             WHERE user_uuid = ?1
             ORDER BY created_at ASC, uuid ASC;",
        )?;

        let mut rows = stmt.query([user_uuid.to_string()])?;
        let mut wallets = Vec::new();
        while let Some(row) = rows.next()? {
            wallets.push(parse_wallet_row(row)?);
        }

        Ok(wallets)
    }
}

fn parse_user_row(row: &Row<'_>) -> AccountRepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "users.uuid")?;

    Ok(User {
        uuid,
        name: row.get("name")?,
    })
}

fn parse_wallet_row(row: &Row<'_>) -> AccountRepoResult<Wallet> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "wallets.uuid")?;

    let user_uuid = row
        .get::<_, Option<String>>("user_uuid")?
        .map(|value| parse_uuid(&value, "wallets.user_uuid"))
        .transpose()?;

    Ok(Wallet {
        uuid,
        user_uuid,
        label: row.get("label")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> AccountRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| AccountRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_account_connection_ready(conn: &Connection) -> AccountRepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(AccountRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["users", "wallets"] {
        if !table_exists(conn, table)? {
            return Err(AccountRepoError::MissingRequiredTable(table));
        }
    }

    for column in ["uuid", "name"] {
        if !table_has_column(conn, "users", column)? {
            return Err(AccountRepoError::MissingRequiredColumn {
                table: "users",
                column,
            });
        }
    }

    for column in ["uuid", "user_uuid", "label"] {
        if !table_has_column(conn, "wallets", column)? {
            return Err(AccountRepoError::MissingRequiredColumn {
                table: "wallets",
                column,
            });
        }
    }

    Ok(())
}
