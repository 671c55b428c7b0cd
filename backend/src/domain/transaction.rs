//! Immutable transaction records.
//!
//! A transaction is the system of record for every point movement. Records
//! are created once and never mutated or deleted; balances can always be
//! reconstructed by replaying them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::account::{AccountId, PointsAmount};
use super::user::{UserId, uuid_id};
use uuid::Uuid;

uuid_id! {
    /// Stable transaction identifier.
    TransactionId
}

/// Validation errors returned by [`TransactionRecord::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    /// Source and destination were the same account.
    SameAccount,
    /// The reason was empty once trimmed.
    EmptyReason,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameAccount => {
                write!(f, "transaction source and destination must differ")
            }
            Self::EmptyReason => write!(f, "transaction reason must not be empty"),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

/// Unvalidated field bundle for constructing a [`TransactionRecord`].
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// Stable identifier.
    pub id: TransactionId,
    /// Account the points left.
    pub from_account: AccountId,
    /// Account the points entered.
    pub to_account: AccountId,
    /// Amount moved; always positive, direction implied by the accounts.
    pub amount: PointsAmount,
    /// Short machine-friendly reason, e.g. `recognition` or `reward_redemption`.
    pub reason: String,
    /// Optional free-text description shown to users.
    pub description: Option<String>,
    /// Administrator who initiated the movement, when applicable.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Immutable record of one point movement between two accounts.
///
/// ## Invariants
/// - `from_account != to_account`.
/// - `amount` is strictly positive.
/// - Records are append-only; no mutation API exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[schema(value_type = String)]
    id: TransactionId,
    #[schema(value_type = String)]
    from_account: AccountId,
    #[schema(value_type = String)]
    to_account: AccountId,
    #[schema(value_type = i64, minimum = 1)]
    amount: PointsAmount,
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Validate a draft and construct a [`TransactionRecord`].
    pub fn new(draft: TransactionDraft) -> Result<Self, TransactionValidationError> {
        if draft.from_account == draft.to_account {
            return Err(TransactionValidationError::SameAccount);
        }
        if draft.reason.trim().is_empty() {
            return Err(TransactionValidationError::EmptyReason);
        }
        Ok(Self {
            id: draft.id,
            from_account: draft.from_account,
            to_account: draft.to_account,
            amount: draft.amount,
            reason: draft.reason,
            description: draft.description,
            created_by: draft.created_by,
            created_at: draft.created_at,
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Account the points left.
    pub fn from_account(&self) -> &AccountId {
        &self.from_account
    }

    /// Account the points entered.
    pub fn to_account(&self) -> &AccountId {
        &self.to_account
    }

    /// Amount moved.
    pub fn amount(&self) -> PointsAmount {
        self.amount
    }

    /// Short reason label.
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }

    /// Free-text description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Initiating administrator, when applicable.
    pub fn created_by(&self) -> Option<&UserId> {
        self.created_by.as_ref()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft() -> TransactionDraft {
        TransactionDraft {
            id: TransactionId::random(),
            from_account: AccountId::random(),
            to_account: AccountId::random(),
            amount: PointsAmount::new(100).expect("positive amount"),
            reason: "recognition".into(),
            description: Some("Great incident response".into()),
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn same_account_is_rejected() {
        let mut looped = draft();
        looped.to_account = looped.from_account;
        assert_eq!(
            TransactionRecord::new(looped).expect_err("must reject"),
            TransactionValidationError::SameAccount
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn empty_reason_is_rejected(#[case] reason: &str) {
        let mut blank = draft();
        blank.reason = reason.into();
        assert_eq!(
            TransactionRecord::new(blank).expect_err("must reject"),
            TransactionValidationError::EmptyReason
        );
    }

    #[rstest]
    fn valid_draft_round_trips() {
        let input = draft();
        let record = TransactionRecord::new(input.clone()).expect("valid draft");
        assert_eq!(record.id(), &input.id);
        assert_eq!(record.amount().as_i64(), 100);
        assert_eq!(record.reason(), "recognition");
    }
}
