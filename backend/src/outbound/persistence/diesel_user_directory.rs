//! PostgreSQL-backed `UserDirectory` implementation using Diesel.
//!
//! A thin read adapter: every method is one query plus row conversion.
//! Bulk queries take the organization filter from the port signature, so a
//! cross-tenant listing cannot be expressed against this adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::user::{EmailAddress, OrganizationId, User, UserId};

use super::error_mapping::{DbFailure, classify_diesel_error};
use super::models::{UserRow, row_to_user};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserDirectory`] port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserDirectoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserDirectoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserDirectoryError {
    match classify_diesel_error(error) {
        DbFailure::Connection(message) => UserDirectoryError::connection(message),
        DbFailure::Query(message) => UserDirectoryError::query(message),
    }
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserDirectoryError> {
    rows.into_iter()
        .map(|row| row_to_user(row).map_err(UserDirectoryError::query))
        .collect()
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_user(row).map_err(UserDirectoryError::query))
            .transpose()
    }

    async fn find_by_email(
        &self,
        organization: &OrganizationId,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Emails are stored lower-cased, matching EmailAddress normalisation.
        let row: Option<UserRow> = users::table
            .filter(users::organization_id.eq(organization.as_uuid()))
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_user(row).map_err(UserDirectoryError::query))
            .transpose()
    }

    async fn list_in_organization(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<User>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::organization_id.eq(organization.as_uuid()))
            .order(users::display_name.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_users(rows)
    }

    async fn direct_reports_of(
        &self,
        organization: &OrganizationId,
        manager: &UserId,
    ) -> Result<Vec<User>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::organization_id.eq(organization.as_uuid()))
            .filter(users::manager_id.eq(manager.as_uuid()))
            .order(users::display_name.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_users(rows)
    }
}
