//! Internal Diesel row structs and row-to-domain conversions.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversion is where lenient parsing
//! happens: unknown role or scope labels degrade rather than fail, while a
//! row that violates a domain invariant outright is a query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::warn;
use uuid::Uuid;

use crate::domain::account::{Account, AccountId, AccountKind, PointsAmount};
use crate::domain::transaction::{TransactionDraft, TransactionId, TransactionRecord};
use crate::domain::user::{
    AdminScope, EmailAddress, RoleType, User, UserDraft, UserId, UserStatus,
};

use super::schema::{accounts, transactions, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub organization_id: Option<Uuid>,
    pub email: String,
    pub display_name: String,
    pub manager_id: Option<Uuid>,
    pub role_type: Option<String>,
    pub is_admin: bool,
    pub admin_scope: Option<String>,
    pub status: String,
    pub department: Option<String>,
}

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub account_type: String,
    pub balance: i64,
}

/// Insertable struct for creating ledger accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub account_type: &'a str,
    pub balance: i64,
}

/// Row struct for reading from the transactions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: i64,
    pub reason: String,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending transaction records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub(crate) struct NewTransactionRow<'a> {
    pub id: Uuid,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: i64,
    pub reason: &'a str,
    pub description: Option<&'a str>,
    pub created_by: Option<Uuid>,
}

/// Convert a users row into the domain entity.
///
/// Role and scope labels parse leniently; a status label we do not know
/// downgrades the user to inactive so the row cannot act.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, String> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| format!("user {}: {err}", row.id))?;
    let status = UserStatus::from_db_value(&row.status).unwrap_or_else(|| {
        warn!(
            user_id = %row.id,
            value = row.status,
            "unrecognised user status, treating as inactive"
        );
        UserStatus::Inactive
    });
    User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        email,
        display_name: row.display_name,
        organization_id: row.organization_id.map(Into::into),
        manager_id: row.manager_id.map(Into::into),
        role_type: RoleType::from_db_value(row.role_type.as_deref()),
        is_admin: row.is_admin,
        admin_scope: AdminScope::from_db_value(row.admin_scope.as_deref()),
        status,
        department: row.department,
    })
    .map_err(|err| format!("user {}: {err}", row.id))
}

/// Convert an accounts row into the domain entity.
pub(crate) fn row_to_account(row: AccountRow) -> Result<Account, String> {
    let kind = AccountKind::from_db_value(&row.account_type)
        .ok_or_else(|| format!("account {}: unknown kind {:?}", row.id, row.account_type))?;
    Account::new(
        AccountId::from_uuid(row.id),
        row.user_id.map(Into::into),
        kind,
        row.balance,
    )
    .map_err(|err| format!("account {}: {err}", row.id))
}

/// Convert a transactions row into the domain record.
pub(crate) fn row_to_transaction(row: TransactionRow) -> Result<TransactionRecord, String> {
    let amount = PointsAmount::new(row.amount)
        .map_err(|err| format!("transaction {}: {err}", row.id))?;
    TransactionRecord::new(TransactionDraft {
        id: TransactionId::from_uuid(row.id),
        from_account: AccountId::from_uuid(row.from_account_id),
        to_account: AccountId::from_uuid(row.to_account_id),
        amount,
        reason: row.reason,
        description: row.description,
        created_by: row.created_by.map(Into::into),
        created_at: row.created_at,
    })
    .map_err(|err| format!("transaction {}: {err}", row.id))
}
