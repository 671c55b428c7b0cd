//! Transfer engine: the points economy's use-case services.
//!
//! Three operation kinds (earn, redeem, transfer), each composed of a debit,
//! a credit, and a transaction record. The repository applies the triplet
//! atomically; this service owns input validation, account resolution,
//! error mapping, and balance-cache maintenance.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::domain::account::Account;
use crate::domain::error::Error;
use crate::domain::ports::{
    Cache, EarnPointsRequest, LedgerPosting, LedgerRepository, LedgerRepositoryError,
    PointsCommand, PointsQuery, RedeemPointsRequest, TransactionHistoryPage,
    TransactionHistoryRequest, TransferPointsRequest,
};
use crate::domain::transaction::TransactionRecord;
use crate::domain::user::UserId;

/// How long a cached balance stays valid without being invalidated.
const BALANCE_TTL: Duration = Duration::from_secs(60);

fn balance_cache_key(user: &UserId) -> String {
    format!("points:balance:user:{user}")
}

fn map_ledger_error(error: LedgerRepositoryError) -> Error {
    match error {
        LedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ledger unavailable: {message}"))
        }
        LedgerRepositoryError::Query { message } => {
            Error::internal(format!("ledger error: {message}"))
        }
        LedgerRepositoryError::AccountNotFound { account_id } => {
            Error::not_found(format!("ledger account {account_id} not found"))
        }
        LedgerRepositoryError::InsufficientBalance {
            requested,
            available,
        } => Error::invalid_request(format!(
            "insufficient balance: requested {requested}, available {available}"
        ))
        .with_details(json!({
            "requested": requested,
            "available": available,
        })),
    }
}

fn validate_reason(reason: &str) -> Result<(), Error> {
    if reason.trim().is_empty() {
        return Err(
            Error::invalid_request("a reason is required").with_details(json!({
                "field": "reason",
            })),
        );
    }
    Ok(())
}

/// Transfer engine implementing the points command and query ports.
#[derive(Clone)]
pub struct PointsService<L> {
    ledger: Arc<L>,
    cache: Arc<dyn Cache>,
}

impl<L> PointsService<L>
where
    L: LedgerRepository,
{
    /// Create a new service over a ledger repository and a cache.
    pub fn new(ledger: Arc<L>, cache: Arc<dyn Cache>) -> Self {
        Self { ledger, cache }
    }

    async fn user_account(&self, user: &UserId) -> Result<Account, Error> {
        self.ledger
            .account_for_user(user)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| Error::not_found(format!("user {user} has no ledger account")))
    }

    /// Drop cached balances touched by a completed posting. Cache failures
    /// are soft: the next read falls through to the ledger.
    async fn invalidate_balances(&self, users: &[&UserId]) {
        for user in users {
            if let Err(error) = self.cache.invalidate(&balance_cache_key(user)).await {
                warn!(%user, %error, "balance cache invalidation failed");
            }
        }
    }

    async fn cached_balance(&self, user: &UserId) -> Option<i64> {
        let key = balance_cache_key(user);
        match self.cache.get(&key).await {
            Ok(Some(raw)) => raw.parse().ok(),
            Ok(None) => None,
            Err(error) => {
                warn!(%user, %error, "balance cache read failed");
                None
            }
        }
    }

    async fn store_balance(&self, user: &UserId, balance: i64) {
        let key = balance_cache_key(user);
        if let Err(error) = self.cache.set(&key, &balance.to_string(), BALANCE_TTL).await {
            warn!(%user, %error, "balance cache write failed");
        }
    }
}

#[async_trait]
impl<L> PointsCommand for PointsService<L>
where
    L: LedgerRepository,
{
    async fn earn(&self, request: EarnPointsRequest) -> Result<TransactionRecord, Error> {
        validate_reason(&request.reason)?;
        let system = self.ledger.system_account().await.map_err(map_ledger_error)?;
        let recipient = self.user_account(&request.recipient).await?;

        let record = self
            .ledger
            .post(&LedgerPosting {
                from_account: *system.id(),
                to_account: *recipient.id(),
                amount: request.amount,
                reason: request.reason,
                description: request.description,
                created_by: request.granted_by,
            })
            .await
            .map_err(map_ledger_error)?;

        self.invalidate_balances(&[&request.recipient]).await;
        Ok(record)
    }

    async fn redeem(&self, request: RedeemPointsRequest) -> Result<TransactionRecord, Error> {
        validate_reason(&request.reason)?;
        let account = self.user_account(&request.user).await?;
        let system = self.ledger.system_account().await.map_err(map_ledger_error)?;

        let record = self
            .ledger
            .post(&LedgerPosting {
                from_account: *account.id(),
                to_account: *system.id(),
                amount: request.amount,
                reason: request.reason,
                description: request.description,
                created_by: None,
            })
            .await
            .map_err(map_ledger_error)?;

        self.invalidate_balances(&[&request.user]).await;
        Ok(record)
    }

    async fn transfer(&self, request: TransferPointsRequest) -> Result<TransactionRecord, Error> {
        validate_reason(&request.reason)?;
        if request.from == request.to {
            return Err(Error::invalid_request(
                "points cannot be transferred to the sending user",
            ));
        }
        let source = self.user_account(&request.from).await?;
        let destination = self.user_account(&request.to).await?;

        let record = self
            .ledger
            .post(&LedgerPosting {
                from_account: *source.id(),
                to_account: *destination.id(),
                amount: request.amount,
                reason: request.reason,
                description: request.description,
                created_by: None,
            })
            .await
            .map_err(map_ledger_error)?;

        self.invalidate_balances(&[&request.from, &request.to]).await;
        Ok(record)
    }
}

#[async_trait]
impl<L> PointsQuery for PointsService<L>
where
    L: LedgerRepository,
{
    async fn balance(&self, user: &UserId) -> Result<i64, Error> {
        if let Some(balance) = self.cached_balance(user).await {
            return Ok(balance);
        }

        // A user without an account simply has nothing yet; absence is 0,
        // never an error.
        let balance = self
            .ledger
            .account_for_user(user)
            .await
            .map_err(map_ledger_error)?
            .map_or(0, |account| account.balance());

        self.store_balance(user, balance).await;
        Ok(balance)
    }

    async fn history(
        &self,
        request: TransactionHistoryRequest,
    ) -> Result<TransactionHistoryPage, Error> {
        let Some(account) = self
            .ledger
            .account_for_user(&request.user)
            .await
            .map_err(map_ledger_error)?
        else {
            return Ok(TransactionHistoryPage {
                transactions: Vec::new(),
                next: None,
            });
        };

        // Fetch one extra row to learn whether another page exists.
        let fetch = i64::from(request.limit).saturating_add(1);
        let mut transactions = self
            .ledger
            .transactions_for_account(account.id(), request.before, fetch)
            .await
            .map_err(map_ledger_error)?;

        let mut next = None;
        if transactions.len() > request.limit as usize {
            transactions.truncate(request.limit as usize);
            next = transactions
                .last()
                .map(|record| (record.created_at(), *record.id().as_uuid()));
        }

        Ok(TransactionHistoryPage { transactions, next })
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
