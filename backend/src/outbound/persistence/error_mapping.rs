//! Shared classification of Diesel failures.
//!
//! Adapters turn a [`DbFailure`] into their own port error via the port's
//! `connection`/`query` constructors, keeping raw driver messages out of the
//! domain while logging them here for diagnosis.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Coarse failure category shared by all persistence adapters.
pub(crate) enum DbFailure {
    /// The connection was unusable.
    Connection(String),
    /// The query itself failed.
    Query(String),
}

/// Classify a Diesel error, logging the driver detail at debug level.
pub(crate) fn classify_diesel_error(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => {
            debug!(error = %other, "diesel operation failed");
        }
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection("database connection error".into())
        }
        DieselError::NotFound => DbFailure::Query("record not found".into()),
        _ => DbFailure::Query("database error".into()),
    }
}
