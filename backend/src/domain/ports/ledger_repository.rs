//! Port for ledger persistence adapters.
//!
//! The repository owns the atomicity contract: a posting's debit, credit,
//! and transaction insert either all become visible or none do. Adapters
//! must also guard debits so a balance the ledger manages never goes
//! negative.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::account::{Account, AccountId, PointsAmount};
use crate::domain::transaction::TransactionRecord;
use crate::domain::user::UserId;

/// Errors raised by ledger repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerRepositoryError {
    /// Repository connection could not be established.
    #[error("ledger repository connection failed: {message}")]
    Connection {
        /// Connection failure detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("ledger repository query failed: {message}")]
    Query {
        /// Query failure detail.
        message: String,
    },
    /// An account referenced by the operation does not exist. Aborts the
    /// whole posting; no partial mutation is visible.
    #[error("ledger account {account_id} not found")]
    AccountNotFound {
        /// The missing account.
        account_id: AccountId,
    },
    /// The source account cannot cover the requested debit. Checked before
    /// any mutation is applied.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Amount the debit asked for.
        requested: i64,
        /// Balance available at check time.
        available: i64,
    },
}

impl LedgerRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// One atomic point movement to apply: debit `from_account`, credit
/// `to_account`, and append the transaction record.
#[derive(Debug, Clone)]
pub struct LedgerPosting {
    /// Account to debit.
    pub from_account: AccountId,
    /// Account to credit.
    pub to_account: AccountId,
    /// Amount to move; strictly positive by construction.
    pub amount: PointsAmount,
    /// Short reason label recorded on the transaction.
    pub reason: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Administrator who initiated the movement, when applicable.
    pub created_by: Option<UserId>,
}

/// Keyset position for transaction-history pagination: strictly older than
/// the given `(created_at, id)` pair.
pub type TransactionKeyset = (DateTime<Utc>, Uuid);

/// Port for ledger account and transaction persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Fetch the account owned by a user, if one exists.
    async fn account_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<Account>, LedgerRepositoryError>;

    /// Fetch the distinguished system account, creating and seeding it on
    /// first access.
    async fn system_account(&self) -> Result<Account, LedgerRepositoryError>;

    /// Apply a posting atomically and return the recorded transaction.
    async fn post(&self, posting: &LedgerPosting)
    -> Result<TransactionRecord, LedgerRepositoryError>;

    /// List transactions touching an account, newest first, strictly older
    /// than `before` when given.
    async fn transactions_for_account(
        &self,
        account: &AccountId,
        before: Option<TransactionKeyset>,
        limit: i64,
    ) -> Result<Vec<TransactionRecord>, LedgerRepositoryError>;
}

mod in_memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::account::{AccountKind, SYSTEM_SEED_BALANCE};
    use crate::domain::transaction::{TransactionDraft, TransactionId};

    #[derive(Default)]
    struct LedgerState {
        accounts: HashMap<AccountId, Account>,
        by_user: HashMap<UserId, AccountId>,
        system: Option<AccountId>,
        transactions: Vec<TransactionRecord>,
    }

    /// In-memory ledger honouring the port's atomicity and balance-guard
    /// contracts. Backs service tests and local development without a
    /// database.
    #[derive(Default)]
    pub struct InMemoryLedger {
        state: Mutex<LedgerState>,
    }

    impl InMemoryLedger {
        /// Create an empty ledger.
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a user account with an initial balance and return `self`.
        ///
        /// # Panics
        /// Panics when `balance` is negative; test setup bug.
        pub fn with_user_account(self, user: UserId, balance: i64) -> Self {
            {
                let mut state = self.lock();
                let id = AccountId::random();
                let account = Account::new(id, Some(user), AccountKind::User, balance)
                    .unwrap_or_else(|err| panic!("seeded account must be valid: {err}"));
                state.accounts.insert(id, account);
                state.by_user.insert(user, id);
            }
            self
        }

        /// Total of all balances currently held, system account included.
        /// Used by conservation assertions in tests.
        pub fn total_points(&self) -> i64 {
            self.lock().accounts.values().map(Account::balance).sum()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
            // Poisoning only happens after a panic in another test thread;
            // propagate it as a panic rather than an Err nobody can handle.
            match self.state.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            }
        }
    }

    impl LedgerState {
        fn account(&self, id: &AccountId) -> Result<&Account, LedgerRepositoryError> {
            self.accounts
                .get(id)
                .ok_or(LedgerRepositoryError::AccountNotFound { account_id: *id })
        }

        fn set_balance(&mut self, id: &AccountId, balance: i64) {
            let Some(existing) = self.accounts.get(id) else {
                return;
            };
            let rebuilt = Account::new(
                *existing.id(),
                existing.owner().copied(),
                existing.kind(),
                balance,
            );
            if let Ok(account) = rebuilt {
                self.accounts.insert(*id, account);
            }
        }
    }

    #[async_trait]
    impl LedgerRepository for InMemoryLedger {
        async fn account_for_user(
            &self,
            user: &UserId,
        ) -> Result<Option<Account>, LedgerRepositoryError> {
            let state = self.lock();
            Ok(state
                .by_user
                .get(user)
                .and_then(|id| state.accounts.get(id))
                .cloned())
        }

        async fn system_account(&self) -> Result<Account, LedgerRepositoryError> {
            let mut state = self.lock();
            if let Some(id) = state.system {
                return state.account(&id).cloned();
            }
            let id = AccountId::random();
            let account = Account::new(id, None, AccountKind::System, SYSTEM_SEED_BALANCE)
                .map_err(|err| LedgerRepositoryError::query(err.to_string()))?;
            state.accounts.insert(id, account.clone());
            state.system = Some(id);
            Ok(account)
        }

        async fn post(
            &self,
            posting: &LedgerPosting,
        ) -> Result<TransactionRecord, LedgerRepositoryError> {
            let mut state = self.lock();
            let amount = posting.amount.as_i64();

            let from_balance = state.account(&posting.from_account)?.balance();
            let to_balance = state.account(&posting.to_account)?.balance();
            if amount > from_balance {
                return Err(LedgerRepositoryError::InsufficientBalance {
                    requested: amount,
                    available: from_balance,
                });
            }

            let record = TransactionRecord::new(TransactionDraft {
                id: TransactionId::random(),
                from_account: posting.from_account,
                to_account: posting.to_account,
                amount: posting.amount,
                reason: posting.reason.clone(),
                description: posting.description.clone(),
                created_by: posting.created_by,
                created_at: Utc::now(),
            })
            .map_err(|err| LedgerRepositoryError::query(err.to_string()))?;

            state.set_balance(&posting.from_account, from_balance - amount);
            state.set_balance(&posting.to_account, to_balance + amount);
            state.transactions.push(record.clone());
            Ok(record)
        }

        async fn transactions_for_account(
            &self,
            account: &AccountId,
            before: Option<TransactionKeyset>,
            limit: i64,
        ) -> Result<Vec<TransactionRecord>, LedgerRepositoryError> {
            let state = self.lock();
            let mut matching: Vec<TransactionRecord> = state
                .transactions
                .iter()
                .filter(|record| {
                    record.from_account() == account || record.to_account() == account
                })
                .filter(|record| match before {
                    Some((created_at, id)) => {
                        let key = (record.created_at(), *record.id().as_uuid());
                        key < (created_at, id)
                    }
                    None => true,
                })
                .cloned()
                .collect();
            matching.sort_by(|a, b| {
                (b.created_at(), b.id().as_uuid()).cmp(&(a.created_at(), a.id().as_uuid()))
            });
            matching.truncate(usize::try_from(limit).unwrap_or(0));
            Ok(matching)
        }
    }
}

pub use in_memory::InMemoryLedger;
