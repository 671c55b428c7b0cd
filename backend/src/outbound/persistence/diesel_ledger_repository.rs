//! PostgreSQL-backed `LedgerRepository` implementation using Diesel.
//!
//! The posting path is the heart of the ledger: debit, credit, and record
//! insert run inside a single database transaction with both account rows
//! locked `FOR UPDATE`. Rows are locked in ascending id order so two
//! concurrent postings over the same pair of accounts cannot deadlock.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::account::{Account, AccountId, SYSTEM_SEED_BALANCE};
use crate::domain::ports::{
    LedgerPosting, LedgerRepository, LedgerRepositoryError, TransactionKeyset,
};
use crate::domain::transaction::TransactionRecord;
use crate::domain::user::UserId;

use super::error_mapping::{DbFailure, classify_diesel_error};
use super::models::{AccountRow, NewAccountRow, NewTransactionRow, TransactionRow};
use super::models::{row_to_account, row_to_transaction};
use super::pool::{DbPool, PoolError};
use super::schema::{accounts, transactions};

/// Diesel-backed implementation of the [`LedgerRepository`] port.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
}

impl DieselLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LedgerRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            LedgerRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> LedgerRepositoryError {
    match classify_diesel_error(error) {
        DbFailure::Connection(message) => LedgerRepositoryError::connection(message),
        DbFailure::Query(message) => LedgerRepositoryError::query(message),
    }
}

/// Failure carried through the posting transaction. Diesel errors must be
/// convertible so `transaction` can roll back on them.
enum PostingFailure {
    Diesel(diesel::result::Error),
    Ledger(LedgerRepositoryError),
}

impl From<diesel::result::Error> for PostingFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<PostingFailure> for LedgerRepositoryError {
    fn from(failure: PostingFailure) -> Self {
        match failure {
            PostingFailure::Diesel(error) => map_diesel_error(error),
            PostingFailure::Ledger(error) => error,
        }
    }
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn account_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<Account>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccountRow> = accounts::table
            .filter(accounts::user_id.eq(user.as_uuid()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_account(row).map_err(LedgerRepositoryError::query))
            .transpose()
    }

    async fn system_account(&self) -> Result<Account, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let existing: Option<AccountRow> = accounts::table
            .filter(accounts::account_type.eq("system"))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        if let Some(row) = existing {
            return row_to_account(row).map_err(LedgerRepositoryError::query);
        }

        // First access seeds the pool account. A concurrent seeder may win
        // the race; the partial unique index turns that into a violation we
        // resolve by re-reading.
        let inserted = diesel::insert_into(accounts::table)
            .values(&NewAccountRow {
                id: Uuid::new_v4(),
                user_id: None,
                account_type: "system",
                balance: SYSTEM_SEED_BALANCE,
            })
            .execute(&mut conn)
            .await;
        match inserted {
            Ok(_) => {}
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => {}
            Err(error) => return Err(map_diesel_error(error)),
        }

        let row: AccountRow = accounts::table
            .filter(accounts::account_type.eq("system"))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_account(row).map_err(LedgerRepositoryError::query)
    }

    async fn post(
        &self,
        posting: &LedgerPosting,
    ) -> Result<TransactionRecord, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let posting = posting.clone();

        let result = conn
            .transaction::<TransactionRecord, PostingFailure, _>(|conn| {
                async move {
                    let mut locked_ids =
                        [*posting.from_account.as_uuid(), *posting.to_account.as_uuid()];
                    locked_ids.sort();

                    let rows: Vec<AccountRow> = accounts::table
                        .filter(accounts::id.eq_any(locked_ids))
                        .order(accounts::id.asc())
                        .select(AccountRow::as_select())
                        .for_update()
                        .load(conn)
                        .await?;

                    let balance_of = |id: &AccountId| {
                        rows.iter()
                            .find(|row| row.id == *id.as_uuid())
                            .map(|row| row.balance)
                            .ok_or(PostingFailure::Ledger(
                                LedgerRepositoryError::AccountNotFound { account_id: *id },
                            ))
                    };
                    let from_balance = balance_of(&posting.from_account)?;
                    let to_balance = balance_of(&posting.to_account)?;

                    let amount = posting.amount.as_i64();
                    if amount > from_balance {
                        return Err(PostingFailure::Ledger(
                            LedgerRepositoryError::InsufficientBalance {
                                requested: amount,
                                available: from_balance,
                            },
                        ));
                    }

                    diesel::update(accounts::table.find(posting.from_account.as_uuid()))
                        .set(accounts::balance.eq(from_balance - amount))
                        .execute(conn)
                        .await?;
                    diesel::update(accounts::table.find(posting.to_account.as_uuid()))
                        .set(accounts::balance.eq(to_balance + amount))
                        .execute(conn)
                        .await?;

                    let row: TransactionRow = diesel::insert_into(transactions::table)
                        .values(&NewTransactionRow {
                            id: Uuid::new_v4(),
                            from_account_id: *posting.from_account.as_uuid(),
                            to_account_id: *posting.to_account.as_uuid(),
                            amount,
                            reason: &posting.reason,
                            description: posting.description.as_deref(),
                            created_by: posting.created_by.map(|user| *user.as_uuid()),
                        })
                        .returning(TransactionRow::as_returning())
                        .get_result(conn)
                        .await?;

                    row_to_transaction(row)
                        .map_err(|message| {
                            PostingFailure::Ledger(LedgerRepositoryError::query(message))
                        })
                }
                .scope_boxed()
            })
            .await;

        result.map_err(Into::into)
    }

    async fn transactions_for_account(
        &self,
        account: &AccountId,
        before: Option<TransactionKeyset>,
        limit: i64,
    ) -> Result<Vec<TransactionRecord>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = transactions::table
            .filter(
                transactions::from_account_id
                    .eq(account.as_uuid())
                    .or(transactions::to_account_id.eq(account.as_uuid())),
            )
            .into_boxed();

        if let Some((created_at, id)) = before {
            query = query.filter(
                transactions::created_at.lt(created_at).or(transactions::created_at
                    .eq(created_at)
                    .and(transactions::id.lt(id))),
            );
        }

        let rows: Vec<TransactionRow> = query
            .order((transactions::created_at.desc(), transactions::id.desc()))
            .limit(limit)
            .select(TransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| row_to_transaction(row).map_err(LedgerRepositoryError::query))
            .collect()
    }
}
