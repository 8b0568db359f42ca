//! Pair repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable save/read APIs over the `pairs` table.
//! - Run the save-time recompute step exactly once, immediately before the
//!   row write, inside the save operation itself.
//!
//! # Invariants
//! - Write paths call `Pair::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Read order is deterministic: `created_at ASC, uuid ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::pair::{DeriveError, Pair, PairId, PairPlan, PairRow, PairValidationError};
use crate::repo::{schema_version, table_exists, table_has_column};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PAIR_SELECT_SQL: &str = "SELECT
    uuid,
    a,
    b,
    sum,
    product,
    dividend,
    exponent
FROM pairs";

const PAIR_COLUMNS: &[&str] = &[
    "uuid",
    "a",
    "b",
    "sum",
    "product",
    "dividend",
    "exponent",
    "created_at",
    "updated_at",
];

pub type PairRepoResult<T> = Result<T, PairRepoError>;

/// Errors from pair persistence and query operations.
#[derive(Debug)]
pub enum PairRepoError {
    /// Record rejected before any SQL ran.
    Validation(PairValidationError),
    /// A planned derived value could not be produced for the write.
    Derive(DeriveError),
    /// Underlying SQLite/bootstrap error, propagated unchanged.
    Db(DbError),
    /// Target row does not exist.
    NotFound(PairId),
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

impl Display for PairRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Derive(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "pair not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pair data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "pair repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "pair repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "pair repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for PairRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Derive(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PairValidationError> for PairRepoError {
    fn from(value: PairValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DeriveError> for PairRepoError {
    fn from(value: DeriveError) -> Self {
        Self::Derive(value)
    }
}

impl From<DbError> for PairRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PairRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for pair save/read operations.
pub trait PairRepository {
    /// Record definition this repository hydrates rows with.
    fn plan(&self) -> PairPlan;
    /// Persists the record: validate, run the save-time step, write the row.
    fn save_pair(&self, pair: &mut Pair) -> PairRepoResult<PairId>;
    /// Loads one record by id.
    fn get_pair(&self, id: PairId) -> PairRepoResult<Option<Pair>>;
    /// Loads the first record in deterministic order.
    fn find_first_pair(&self) -> PairRepoResult<Option<Pair>>;
    /// Lists all records in deterministic order.
    fn list_pairs(&self) -> PairRepoResult<Vec<Pair>>;
}

/// SQLite-backed pair repository bound to one record definition.
pub struct SqlitePairRepository<'conn> {
    conn: &'conn Connection,
    plan: PairPlan,
}

impl<'conn> SqlitePairRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection, plan: PairPlan) -> PairRepoResult<Self> {
        ensure_pair_connection_ready(conn)?;
        Ok(Self { conn, plan })
    }
}

impl PairRepository for SqlitePairRepository<'_> {
    fn plan(&self) -> PairPlan {
        self.plan
    }

    fn save_pair(&self, pair: &mut Pair) -> PairRepoResult<PairId> {
        pair.validate()?;
        pair.apply_before_save()?;
        let row = pair.storage_row()?;

        self.conn.execute(
            "INSERT INTO pairs (uuid, a, b, sum, product, dividend, exponent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(uuid) DO UPDATE SET
                a = excluded.a,
                b = excluded.b,
                sum = excluded.sum,
                product = excluded.product,
                dividend = excluded.dividend,
                exponent = excluded.exponent,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                pair.uuid.to_string(),
                row.a,
                row.b,
                row.sum,
                row.product,
                row.dividend,
                row.exponent,
            ],
        )?;

        Ok(pair.uuid)
    }

    fn get_pair(&self, id: PairId) -> PairRepoResult<Option<Pair>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAIR_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_pair_row(row, self.plan)?));
        }

        Ok(None)
    }

    fn find_first_pair(&self) -> PairRepoResult<Option<Pair>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PAIR_SELECT_SQL} ORDER BY created_at ASC, uuid ASC LIMIT 1;"
        ))?;

        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_pair_row(row, self.plan)?));
        }

        Ok(None)
    }

    fn list_pairs(&self) -> PairRepoResult<Vec<Pair>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PAIR_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut pairs = Vec::new();
        while let Some(row) = rows.next()? {
            pairs.push(parse_pair_row(row, self.plan)?);
        }

        Ok(pairs)
    }
}

fn parse_pair_row(row: &Row<'_>, plan: PairPlan) -> PairRepoResult<Pair> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        PairRepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in pairs.uuid"))
    })?;

    let values = PairRow {
        a: row.get("a")?,
        b: row.get("b")?,
        sum: row.get("sum")?,
        product: row.get("product")?,
        dividend: row.get("dividend")?,
        exponent: row.get("exponent")?,
    };

    Ok(Pair::from_storage(uuid, plan, values))
}

fn ensure_pair_connection_ready(conn: &Connection) -> PairRepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(PairRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "pairs")? {
        return Err(PairRepoError::MissingRequiredTable("pairs"));
    }

    for &column in PAIR_COLUMNS {
        if !table_has_column(conn, "pairs", column)? {
            return Err(PairRepoError::MissingRequiredColumn {
                table: "pairs",
                column,
            });
        }
    }

    Ok(())
}
