//! Driving port for user-facing directory queries.
//!
//! Inbound adapters use this port so handlers depend on use-cases, not on
//! outbound persistence. All implementations must route bulk listings
//! through the access gate.

use async_trait::async_trait;

use crate::domain::access::CallerIdentity;
use crate::domain::error::Error;
use crate::domain::user::{OrganizationId, User, UserId};

/// Domain use-case port for listing and fetching users.
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// List users visible to the caller.
    ///
    /// Regular callers list their own organization; corporate admins must
    /// name one via `organization`. Listing without a resolvable scope
    /// fails rather than spanning tenants.
    async fn list_users(
        &self,
        caller: &CallerIdentity,
        organization: Option<OrganizationId>,
    ) -> Result<Vec<User>, Error>;

    /// Fetch one user, cross-checked against the caller's tenant.
    async fn get_user(&self, caller: &CallerIdentity, id: &UserId) -> Result<User, Error>;
}
