//! Pair use-case service.
//!
//! # Responsibility
//! - Provide construct-and-save and read-back entry points.
//! - Parse textual operand input before any record is built.

use crate::model::pair::{Pair, PairId};
use crate::repo::pair_repo::{PairRepoResult, PairRepository};

/// Use-case service wrapper for pair operations.
pub struct PairService<R: PairRepository> {
    repo: R,
}

impl<R: PairRepository> PairService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Constructs a record from both operands and persists it.
    ///
    /// # Contract
    /// - Uses the repository's record definition.
    /// - Operand assignment and eager recomputation happen before the save;
    ///   the save-time step runs inside `save_pair`.
    /// - Returns the persisted record with its frozen save-time values.
    pub fn create_pair(&self, a: i64, b: i64) -> PairRepoResult<Pair> {
        let mut pair = Pair::new(self.repo.plan(), a, b);
        self.repo.save_pair(&mut pair)?;
        Ok(pair)
    }

    /// Constructs and persists a record from raw operand text.
    ///
    /// Non-numeric input fails with a validation error before any record
    /// is built.
    pub fn create_pair_from_text(&self, raw_a: &str, raw_b: &str) -> PairRepoResult<Pair> {
        let a = Pair::parse_operand("a", raw_a)?;
        let b = Pair::parse_operand("b", raw_b)?;
        self.create_pair(a, b)
    }

    /// Loads one record by stable ID.
    pub fn get_pair(&self, id: PairId) -> PairRepoResult<Option<Pair>> {
        self.repo.get_pair(id)
    }

    /// Loads the first persisted record in deterministic order.
    pub fn find_first_pair(&self) -> PairRepoResult<Option<Pair>> {
        self.repo.find_first_pair()
    }

    /// Lists all persisted records in deterministic order.
    pub fn list_pairs(&self) -> PairRepoResult<Vec<Pair>> {
        self.repo.list_pairs()
    }
}
