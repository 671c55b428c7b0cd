//! Driving ports for the points economy.
//!
//! Inbound adapters call these use-case ports; the transfer engine in
//! `ledger_service` implements them on top of the ledger repository.

use async_trait::async_trait;

use crate::domain::account::PointsAmount;
use crate::domain::error::Error;
use crate::domain::transaction::TransactionRecord;
use crate::domain::user::UserId;

use super::ledger_repository::TransactionKeyset;

/// Request to grant points from the system pool to a user.
#[derive(Debug, Clone)]
pub struct EarnPointsRequest {
    /// User receiving the points.
    pub recipient: UserId,
    /// Amount to grant.
    pub amount: PointsAmount,
    /// Short reason label, e.g. `recognition`.
    pub reason: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Administrator who granted the points.
    pub granted_by: Option<UserId>,
}

/// Request to redeem points from a user back to the system pool.
#[derive(Debug, Clone)]
pub struct RedeemPointsRequest {
    /// User spending the points.
    pub user: UserId,
    /// Amount to redeem.
    pub amount: PointsAmount,
    /// Short reason label, e.g. `reward_redemption`.
    pub reason: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// Request to move points between two users.
#[derive(Debug, Clone)]
pub struct TransferPointsRequest {
    /// User giving the points.
    pub from: UserId,
    /// User receiving the points.
    pub to: UserId,
    /// Amount to move.
    pub amount: PointsAmount,
    /// Short reason label, e.g. `peer_recognition`.
    pub reason: String,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// Domain use-case port for mutating the points economy.
#[async_trait]
pub trait PointsCommand: Send + Sync {
    /// Grant points from the system pool to a user.
    async fn earn(&self, request: EarnPointsRequest) -> Result<TransactionRecord, Error>;

    /// Redeem points from a user back to the system pool.
    async fn redeem(&self, request: RedeemPointsRequest) -> Result<TransactionRecord, Error>;

    /// Move points between two users.
    async fn transfer(&self, request: TransferPointsRequest) -> Result<TransactionRecord, Error>;
}

/// Request for one page of a user's transaction history.
#[derive(Debug, Clone)]
pub struct TransactionHistoryRequest {
    /// User whose history to read.
    pub user: UserId,
    /// Return only records strictly older than this keyset position, when
    /// given.
    pub before: Option<TransactionKeyset>,
    /// Maximum number of records to return.
    pub limit: u32,
}

/// One page of transaction history, newest first.
#[derive(Debug, Clone)]
pub struct TransactionHistoryPage {
    /// Records in this page.
    pub transactions: Vec<TransactionRecord>,
    /// Keyset position to resume from; `None` when exhausted.
    pub next: Option<TransactionKeyset>,
}

/// Domain use-case port for reading the points economy.
#[async_trait]
pub trait PointsQuery: Send + Sync {
    /// Current balance for a user. A user with no account yet has balance 0.
    async fn balance(&self, user: &UserId) -> Result<i64, Error>;

    /// One page of the user's transaction history, newest first.
    async fn history(
        &self,
        request: TransactionHistoryRequest,
    ) -> Result<TransactionHistoryPage, Error>;
}
