//! Pair domain model and derived-field computation plans.
//!
//! # Responsibility
//! - Define the canonical record holding two integer operands and the four
//!   values derived from them (sum, product, dividend, exponent).
//! - Keep write-triggered derived slots fresh whenever an operand changes.
//! - Provide the save-time recompute step repositories run before a row write.
//!
//! # Invariants
//! - Derived slots never hold stale values: an uncomputable result resets the
//!   slot to its default until the operands allow a fresh computation.
//! - `dividend` is widened to f64 (3/2 reads 1.5); a missing or zero divisor
//!   is an error, never NaN or infinity.
//! - Operand assignment order in constructors is fixed: `a` before `b`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a persisted pair row.
pub type PairId = Uuid;

static OPERAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid operand regex"));

/// Validation failures for base operand input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairValidationError {
    /// Raw text cannot be read as a signed 64-bit integer.
    NonNumeric { field: &'static str, raw: String },
    /// Operand was never assigned before persistence was attempted.
    MissingOperand { field: &'static str },
}

impl Display for PairValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonNumeric { field, raw } => {
                write!(f, "operand `{field}` is not numeric: `{raw}`")
            }
            Self::MissingOperand { field } => write!(f, "operand `{field}` was never assigned"),
        }
    }
}

impl Error for PairValidationError {}

/// Failures specific to the `dividend` computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisionError {
    /// Numerator `a` has not been assigned yet.
    MissingNumerator,
    /// Divisor `b` has not been assigned yet.
    MissingDivisor,
    /// Divisor `b` is zero. The quotient is refused instead of being coerced
    /// to infinity or NaN.
    ZeroDivisor { numerator: i64 },
}

impl Display for DivisionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNumerator => write!(f, "dividend requires operand `a`"),
            Self::MissingDivisor => write!(f, "dividend requires operand `b`"),
            Self::ZeroDivisor { numerator } => {
                write!(f, "division of {numerator} by zero")
            }
        }
    }
}

impl Error for DivisionError {}

/// Identifies one derived field in plans and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedField {
    Sum,
    Product,
    Dividend,
    Exponent,
}

impl DerivedField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Product => "product",
            Self::Dividend => "dividend",
            Self::Exponent => "exponent",
        }
    }
}

impl Display for DerivedField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures while producing a derived value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveError {
    /// Quotient cannot be produced.
    Division(DivisionError),
    /// A required operand has not been assigned yet.
    MissingOperand { field: &'static str },
    /// Checked arithmetic left the i64 range.
    Overflow { field: DerivedField, a: i64, b: i64 },
    /// Integer exponentiation with a negative exponent is refused.
    NegativeExponent { base: i64, exponent: i64 },
    /// The field is absent from this record definition.
    NotInPlan(DerivedField),
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Division(err) => write!(f, "{err}"),
            Self::MissingOperand { field } => write!(f, "operand `{field}` was never assigned"),
            Self::Overflow { field, a, b } => {
                write!(f, "`{field}` of ({a}, {b}) does not fit in 64 bits")
            }
            Self::NegativeExponent { base, exponent } => {
                write!(f, "exponent {base}^{exponent} with negative exponent is undefined")
            }
            Self::NotInPlan(field) => write!(f, "field `{field}` is not part of this record"),
        }
    }
}

impl Error for DeriveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Division(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DivisionError> for DeriveError {
    fn from(value: DivisionError) -> Self {
        Self::Division(value)
    }
}

/// How reads of a derived field are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Materialization {
    /// Reads return the stored slot; the slot is whatever the last
    /// recompute wrote.
    Stored,
    /// Reads recompute from the current operands every time; the stored slot
    /// only holds a frozen copy when a save-time recompute stores one.
    ComputedOnRead,
}

/// Recompute triggers and read behavior for one derived field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPlan {
    /// Recompute whenever `a` or `b` is assigned.
    pub on_write: bool,
    /// Recompute once inside the save step, immediately before the row write.
    pub before_save: bool,
    /// How reads are served.
    pub materialization: Materialization,
}

/// Record-definition-time selection of derived fields and their mechanisms.
///
/// `None` means the field is absent from this record variant: its getter
/// reports [`DeriveError::NotInPlan`] and its column keeps the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairPlan {
    pub sum: Option<FieldPlan>,
    pub product: Option<FieldPlan>,
    pub dividend: Option<FieldPlan>,
    pub exponent: Option<FieldPlan>,
}

impl PairPlan {
    /// All four derived fields with their canonical mechanisms:
    /// sum in the save step, product eager + computed-on-read, dividend
    /// eager only, exponent computed-on-read and frozen at save.
    pub fn full() -> Self {
        Self {
            sum: Some(FieldPlan {
                on_write: false,
                before_save: true,
                materialization: Materialization::Stored,
            }),
            product: Some(FieldPlan {
                on_write: true,
                before_save: false,
                materialization: Materialization::ComputedOnRead,
            }),
            dividend: Some(FieldPlan {
                on_write: true,
                before_save: false,
                materialization: Materialization::Stored,
            }),
            exponent: Some(FieldPlan {
                on_write: false,
                before_save: true,
                materialization: Materialization::ComputedOnRead,
            }),
        }
    }

    /// Reduced variant carrying only `sum` and `product`.
    pub fn sum_product() -> Self {
        Self {
            dividend: None,
            exponent: None,
            ..Self::full()
        }
    }
}

/// Concrete column values for one row write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairRow {
    pub a: i64,
    pub b: i64,
    pub sum: i64,
    pub product: i64,
    pub dividend: f64,
    pub exponent: i64,
}

/// Raw stored-slot values, as they would persist right now.
///
/// Useful for observing the pre-save state: slots owned by the save step
/// still show their defaults here even when the corresponding getter already
/// computes a live value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredValues {
    pub sum: i64,
    pub product: i64,
    pub dividend: Option<f64>,
    pub exponent: i64,
}

/// Canonical record for derived-value demonstrations.
///
/// Operands stay `None` until assigned, so partially constructed records are
/// representable without fake zeroes. All derived state lives in private
/// slots; mutation goes through the setters so dependent recomputation can
/// never be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    /// Stable global ID used for row identity.
    pub uuid: PairId,
    a: Option<i64>,
    b: Option<i64>,
    sum: i64,
    product: i64,
    dividend: Option<f64>,
    exponent: i64,
    plan: PairPlan,
}

impl Pair {
    /// Creates a record and assigns both operands, `a` first.
    ///
    /// Each assignment triggers a dependent recompute, so write-triggered
    /// slots already reflect the operands when this returns.
    pub fn new(plan: PairPlan, a: i64, b: i64) -> Self {
        Self::with_id(Uuid::new_v4(), plan, a, b)
    }

    /// Creates a record with a caller-provided stable ID.
    pub fn with_id(uuid: PairId, plan: PairPlan, a: i64, b: i64) -> Self {
        let mut pair = Self::empty_with_id(uuid, plan);
        pair.set_a(a);
        pair.set_b(b);
        pair
    }

    /// Creates a record with no operands assigned yet.
    pub fn empty(plan: PairPlan) -> Self {
        Self::empty_with_id(Uuid::new_v4(), plan)
    }

    fn empty_with_id(uuid: PairId, plan: PairPlan) -> Self {
        Self {
            uuid,
            a: None,
            b: None,
            sum: 0,
            product: 0,
            dividend: None,
            exponent: 0,
            plan,
        }
    }

    /// Rebuilds a record from persisted column values without recomputation.
    pub fn from_storage(uuid: PairId, plan: PairPlan, row: PairRow) -> Self {
        Self {
            uuid,
            a: Some(row.a),
            b: Some(row.b),
            sum: row.sum,
            product: row.product,
            dividend: plan.dividend.map(|_| row.dividend),
            exponent: row.exponent,
            plan,
        }
    }

    pub fn plan(&self) -> PairPlan {
        self.plan
    }

    pub fn a(&self) -> Option<i64> {
        self.a
    }

    pub fn b(&self) -> Option<i64> {
        self.b
    }

    /// Assigns operand `a` and refreshes write-triggered derived slots.
    pub fn set_a(&mut self, value: i64) {
        self.a = Some(value);
        self.recompute_dependents();
    }

    /// Assigns operand `b` and refreshes write-triggered derived slots.
    pub fn set_b(&mut self, value: i64) {
        self.b = Some(value);
        self.recompute_dependents();
    }

    /// Parses raw operand text into an i64.
    ///
    /// Accepts an optional sign and decimal digits only; anything else is a
    /// validation error carrying the offending field and text.
    pub fn parse_operand(field: &'static str, raw: &str) -> Result<i64, PairValidationError> {
        let trimmed = raw.trim();
        if !OPERAND_RE.is_match(trimmed) {
            return Err(PairValidationError::NonNumeric {
                field,
                raw: raw.to_string(),
            });
        }
        trimmed
            .parse::<i64>()
            .map_err(|_| PairValidationError::NonNumeric {
                field,
                raw: raw.to_string(),
            })
    }

    /// Refreshes every `on_write` derived slot from the current operands.
    ///
    /// Dependency direction is explicit: `a` and `b` feed the derived slots,
    /// never the other way around. An uncomputable value resets its slot to
    /// the default; the error resurfaces on read or at save.
    fn recompute_dependents(&mut self) {
        if self.plan.sum.map_or(false, |plan| plan.on_write) {
            self.sum = self.eval_sum().unwrap_or(0);
        }
        if self.plan.product.map_or(false, |plan| plan.on_write) {
            self.product = self.eval_product().unwrap_or(0);
        }
        if self.plan.dividend.map_or(false, |plan| plan.on_write) {
            self.dividend = self.eval_dividend().ok();
        }
        if self.plan.exponent.map_or(false, |plan| plan.on_write) {
            self.exponent = self.eval_exponent().unwrap_or(0);
        }
    }

    /// Reads `sum` according to its plan.
    pub fn sum(&self) -> Result<i64, DeriveError> {
        let plan = self.plan.sum.ok_or(DeriveError::NotInPlan(DerivedField::Sum))?;
        match plan.materialization {
            Materialization::Stored => Ok(self.sum),
            Materialization::ComputedOnRead => self.eval_sum(),
        }
    }

    /// Reads `product` according to its plan.
    pub fn product(&self) -> Result<i64, DeriveError> {
        let plan = self
            .plan
            .product
            .ok_or(DeriveError::NotInPlan(DerivedField::Product))?;
        match plan.materialization {
            Materialization::Stored => Ok(self.product),
            Materialization::ComputedOnRead => self.eval_product(),
        }
    }

    /// Reads `dividend` according to its plan.
    pub fn dividend(&self) -> Result<f64, DeriveError> {
        let plan = self
            .plan
            .dividend
            .ok_or(DeriveError::NotInPlan(DerivedField::Dividend))?;
        match plan.materialization {
            Materialization::ComputedOnRead => Ok(self.eval_dividend()?),
            Materialization::Stored => match self.dividend {
                Some(value) => Ok(value),
                // The slot is unset exactly when the last recompute failed;
                // re-derive to surface the same error.
                None => Ok(self.eval_dividend()?),
            },
        }
    }

    /// Reads `exponent` according to its plan.
    pub fn exponent(&self) -> Result<i64, DeriveError> {
        let plan = self
            .plan
            .exponent
            .ok_or(DeriveError::NotInPlan(DerivedField::Exponent))?;
        match plan.materialization {
            Materialization::Stored => Ok(self.exponent),
            Materialization::ComputedOnRead => self.eval_exponent(),
        }
    }

    /// Save-time recompute step.
    ///
    /// Repositories run this exactly once per save, immediately before the
    /// row write. Fields whose plan requests a save-time recompute are
    /// refreshed; a computed-on-read field is frozen into its stored slot
    /// through the same path its getter uses, without changing read
    /// semantics.
    pub fn apply_before_save(&mut self) -> Result<(), DeriveError> {
        if self.plan.sum.map_or(false, |plan| plan.before_save) {
            self.sum = self.eval_sum()?;
        }
        if self.plan.product.map_or(false, |plan| plan.before_save) {
            self.product = self.eval_product()?;
        }
        if self.plan.dividend.map_or(false, |plan| plan.before_save) {
            self.dividend = Some(self.eval_dividend()?);
        }
        if self.plan.exponent.map_or(false, |plan| plan.before_save) {
            self.exponent = self.exponent()?;
        }
        Ok(())
    }

    /// Checks that both operands were assigned.
    ///
    /// Repositories call this before any SQL mutation.
    pub fn validate(&self) -> Result<(), PairValidationError> {
        if self.a.is_none() {
            return Err(PairValidationError::MissingOperand { field: "a" });
        }
        if self.b.is_none() {
            return Err(PairValidationError::MissingOperand { field: "b" });
        }
        Ok(())
    }

    /// Produces the concrete column values for a row write.
    ///
    /// A planned field whose value cannot be produced fails the write here;
    /// fields absent from the plan persist their column defaults.
    pub fn storage_row(&self) -> Result<PairRow, DeriveError> {
        let a = self.a.ok_or(DeriveError::MissingOperand { field: "a" })?;
        let b = self.b.ok_or(DeriveError::MissingOperand { field: "b" })?;
        let dividend = match (self.plan.dividend, self.dividend) {
            (None, _) => 0.0,
            (Some(_), Some(value)) => value,
            (Some(_), None) => self.eval_dividend()?,
        };
        Ok(PairRow {
            a,
            b,
            sum: self.sum,
            product: self.product,
            dividend,
            exponent: self.exponent,
        })
    }

    /// Snapshot of the raw stored slots.
    pub fn stored_values(&self) -> StoredValues {
        StoredValues {
            sum: self.sum,
            product: self.product,
            dividend: self.dividend,
            exponent: self.exponent,
        }
    }

    fn operand(value: Option<i64>, field: &'static str) -> Result<i64, DeriveError> {
        value.ok_or(DeriveError::MissingOperand { field })
    }

    fn eval_sum(&self) -> Result<i64, DeriveError> {
        let a = Self::operand(self.a, "a")?;
        let b = Self::operand(self.b, "b")?;
        a.checked_add(b).ok_or(DeriveError::Overflow {
            field: DerivedField::Sum,
            a,
            b,
        })
    }

    fn eval_product(&self) -> Result<i64, DeriveError> {
        let a = Self::operand(self.a, "a")?;
        let b = Self::operand(self.b, "b")?;
        a.checked_mul(b).ok_or(DeriveError::Overflow {
            field: DerivedField::Product,
            a,
            b,
        })
    }

    fn eval_dividend(&self) -> Result<f64, DivisionError> {
        let a = self.a.ok_or(DivisionError::MissingNumerator)?;
        let b = self.b.ok_or(DivisionError::MissingDivisor)?;
        if b == 0 {
            return Err(DivisionError::ZeroDivisor { numerator: a });
        }
        Ok(a as f64 / b as f64)
    }

    fn eval_exponent(&self) -> Result<i64, DeriveError> {
        let a = Self::operand(self.a, "a")?;
        let b = Self::operand(self.b, "b")?;
        if b < 0 {
            return Err(DeriveError::NegativeExponent {
                base: a,
                exponent: b,
            });
        }
        let exponent = u32::try_from(b).map_err(|_| DeriveError::Overflow {
            field: DerivedField::Exponent,
            a,
            b,
        })?;
        a.checked_pow(exponent).ok_or(DeriveError::Overflow {
            field: DerivedField::Exponent,
            a,
            b,
        })
    }
}
