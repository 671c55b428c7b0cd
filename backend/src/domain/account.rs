//! Ledger account data model.
//!
//! One account per user plus a single distinguished system account. Balances
//! are plain integers; the ledger never lets one of its own debits drive a
//! balance negative.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{UserId, uuid_id};

uuid_id! {
    /// Stable ledger account identifier.
    AccountId
}

/// Initial balance seeded into the lazily created system account. Large
/// enough to act as an effectively unlimited counterparty for earn and
/// redeem operations.
pub const SYSTEM_SEED_BALANCE: i64 = 1_000_000_000;

/// Validation errors returned by account constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// A points amount was zero or negative.
    NonPositiveAmount,
    /// An account balance was negative at construction.
    NegativeBalance,
    /// A user account was missing its owner, or the system account had one.
    OwnerMismatch,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "points amount must be greater than zero"),
            Self::NegativeBalance => write!(f, "account balance must not be negative"),
            Self::OwnerMismatch => write!(
                f,
                "user accounts require an owner and the system account must not have one",
            ),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Kind of ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Owned by a single user.
    User,
    /// The distinguished platform pool account.
    System,
}

impl AccountKind {
    /// Parse the stored representation.
    pub fn from_db_value(value: &str) -> Option<Self> {
        match value.trim() {
            "user" => Some(Self::User),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// Stored string representation.
    pub fn as_db_value(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

/// Validated positive number of points.
///
/// Every ledger movement carries a strictly positive amount; direction is
/// expressed by the source and destination accounts, never by sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct PointsAmount(i64);

impl PointsAmount {
    /// Validate and construct a [`PointsAmount`].
    pub fn new(amount: i64) -> Result<Self, AccountValidationError> {
        if amount <= 0 {
            return Err(AccountValidationError::NonPositiveAmount);
        }
        Ok(Self(amount))
    }

    /// The underlying integer amount.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PointsAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<PointsAmount> for i64 {
    fn from(value: PointsAmount) -> Self {
        value.0
    }
}

impl TryFrom<i64> for PointsAmount {
    type Error = AccountValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Ledger account snapshot.
///
/// ## Invariants
/// - `kind == User` implies `owner` is set; `kind == System` implies it is
///   not.
/// - `balance` equals the sum of credits minus debits applied to the
///   account and is never negative at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    id: AccountId,
    owner: Option<UserId>,
    kind: AccountKind,
    balance: i64,
}

impl Account {
    /// Validate and construct an [`Account`].
    pub fn new(
        id: AccountId,
        owner: Option<UserId>,
        kind: AccountKind,
        balance: i64,
    ) -> Result<Self, AccountValidationError> {
        if balance < 0 {
            return Err(AccountValidationError::NegativeBalance);
        }
        match (kind, owner.as_ref()) {
            (AccountKind::User, Some(_)) | (AccountKind::System, None) => {}
            _ => return Err(AccountValidationError::OwnerMismatch),
        }
        Ok(Self {
            id,
            owner,
            kind,
            balance,
        })
    }

    /// Stable account identifier.
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Owning user; `None` for the system account.
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// Account kind.
    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    /// Balance at the time the snapshot was read.
    pub fn balance(&self) -> i64 {
        self.balance
    }
}
