//! PostgreSQL-backed `TokenVerifier` implementation using Diesel.
//!
//! Resolves a bearer token through the api_tokens table to its owning user.
//! Revoked tokens read as unknown; a resolved but non-active user is
//! rejected explicitly so the HTTP layer can distinguish the two.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::access::CallerIdentity;
use crate::domain::ports::{TokenVerifier, TokenVerifierError};
use crate::domain::user::UserStatus;

use super::error_mapping::{DbFailure, classify_diesel_error};
use super::models::{UserRow, row_to_user};
use super::pool::{DbPool, PoolError};
use super::schema::{api_tokens, users};

/// Diesel-backed implementation of the [`TokenVerifier`] port.
#[derive(Clone)]
pub struct DieselTokenVerifier {
    pool: DbPool,
}

impl DieselTokenVerifier {
    /// Create a new verifier with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TokenVerifierError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            TokenVerifierError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> TokenVerifierError {
    match classify_diesel_error(error) {
        DbFailure::Connection(message) => TokenVerifierError::connection(message),
        DbFailure::Query(message) => TokenVerifierError::query(message),
    }
}

#[async_trait]
impl TokenVerifier for DieselTokenVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, TokenVerifierError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = api_tokens::table
            .inner_join(users::table)
            .filter(api_tokens::token.eq(token))
            .filter(api_tokens::revoked_at.is_null())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let user = row
            .map(|row| row_to_user(row).map_err(TokenVerifierError::query))
            .transpose()?
            .ok_or(TokenVerifierError::UnknownToken)?;

        if user.status() != UserStatus::Active {
            return Err(TokenVerifierError::InactiveUser);
        }

        Ok(CallerIdentity::from_user(&user))
    }
}
