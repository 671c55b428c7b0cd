//! User directory use-cases gated by tenant scope.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::access::{self, CallerIdentity};
use crate::domain::error::Error;
use crate::domain::ports::{UserDirectory, UserDirectoryError, UsersQuery};
use crate::domain::user::{OrganizationId, User, UserId};

fn map_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory error: {message}"))
        }
    }
}

/// Directory service implementing the [`UsersQuery`] driving port.
///
/// Every listing runs through the access gate first, so the repository only
/// ever sees queries pinned to one organization. Single-entity fetches are
/// cross-checked against the caller's tenant after the fact.
#[derive(Clone)]
pub struct DirectoryUsersService<D> {
    directory: Arc<D>,
}

impl<D> DirectoryUsersService<D>
where
    D: UserDirectory,
{
    /// Create a new service over a user directory.
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<D> UsersQuery for DirectoryUsersService<D>
where
    D: UserDirectory,
{
    async fn list_users(
        &self,
        caller: &CallerIdentity,
        organization: Option<OrganizationId>,
    ) -> Result<Vec<User>, Error> {
        let scope = access::require_tenant_scope(caller, organization)?;
        self.directory
            .list_in_organization(&scope)
            .await
            .map_err(map_directory_error)
    }

    async fn get_user(&self, caller: &CallerIdentity, id: &UserId) -> Result<User, Error> {
        let user = self
            .directory
            .find_by_id(id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
        // Hide foreign-tenant rows as not-found rather than forbidden so the
        // response does not confirm the id exists.
        access::require_same_tenant(caller, user.organization_id())
            .map_err(|_| Error::not_found(format!("user {id} not found")))?;
        Ok(user)
    }
}
