//! Port for tenant-scoped user lookups.
//!
//! Bulk operations on this port take an explicit [`OrganizationId`]; there
//! is deliberately no way to list users across tenants. Single-entity
//! lookups are unscoped and rely on callers cross-checking the returned
//! entity's organization (see the access gate).

use async_trait::async_trait;

use crate::domain::user::{EmailAddress, OrganizationId, User, UserId};

/// Errors raised by user directory adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserDirectoryError {
    /// Directory connection could not be established.
    #[error("user directory connection failed: {message}")]
    Connection {
        /// Connection failure detail.
        message: String,
    },
    /// Query failed during execution.
    #[error("user directory query failed: {message}")]
    Query {
        /// Query failure detail.
        message: String,
    },
}

impl UserDirectoryError {
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

/// Port for reading users and reporting relationships.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user by identifier. Not tenant-scoped; callers must
    /// cross-check the result's organization.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError>;

    /// Fetch a user by email within one organization.
    async fn find_by_email(
        &self,
        organization: &OrganizationId,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError>;

    /// List every user in one organization.
    async fn list_in_organization(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<User>, UserDirectoryError>;

    /// List users in the organization whose manager is `manager`.
    async fn direct_reports_of(
        &self,
        organization: &OrganizationId,
        manager: &UserId,
    ) -> Result<Vec<User>, UserDirectoryError>;
}

/// In-memory directory over a fixed user set, for tests and local
/// development.
#[derive(Debug, Default, Clone)]
pub struct FixtureUserDirectory {
    users: Vec<User>,
}

impl FixtureUserDirectory {
    /// Build a directory over the given users.
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError> {
        Ok(self.users.iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_email(
        &self,
        organization: &OrganizationId,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError> {
        Ok(self
            .users
            .iter()
            .find(|user| {
                user.organization_id() == Some(organization) && user.email() == email
            })
            .cloned())
    }

    async fn list_in_organization(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<User>, UserDirectoryError> {
        Ok(self
            .users
            .iter()
            .filter(|user| user.organization_id() == Some(organization))
            .cloned()
            .collect())
    }

    async fn direct_reports_of(
        &self,
        organization: &OrganizationId,
        manager: &UserId,
    ) -> Result<Vec<User>, UserDirectoryError> {
        Ok(self
            .users
            .iter()
            .filter(|user| {
                user.organization_id() == Some(organization) && user.manager_id() == Some(manager)
            })
            .cloned()
            .collect())
    }
}
