//! Organization hierarchy resolver.
//!
//! Resolves reporting relationships over the tenant-scoped user set: manager
//! and skip-manager upward, direct and indirect reports downward, peers
//! sideways, plus a cycle-safe manager chain and a depth-bounded reporting
//! tree. Resolution issues one directory query per level; fine at the
//! hundreds-of-employees scale this serves.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::warn;

use crate::domain::error::Error;
use crate::domain::ports::{
    HierarchyQuery, MAX_TREE_DEPTH, ReportingTreeNode, TreeMember, UserDirectory,
    UserDirectoryError,
};
use crate::domain::user::{OrganizationId, User, UserId};

/// Upper bound on manager-chain hops, applied alongside the visited set.
/// No legitimate org chart is this deep; hitting it means corrupt data.
const MAX_CHAIN_HOPS: usize = 64;

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

/// Hierarchy resolver implementing the [`HierarchyQuery`] driving port.
#[derive(Clone)]
pub struct HierarchyService<D> {
    directory: Arc<D>,
}

impl<D> HierarchyService<D>
where
    D: UserDirectory,
{
    /// Create a new resolver over a user directory.
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Fetch the subject and pin it to the organization the query runs in.
    async fn subject(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<User, Error> {
        self.directory
            .find_by_id(subject)
            .await
            .map_err(map_directory_error)?
            .filter(|user| user.organization_id() == Some(organization))
            .ok_or_else(|| {
                Error::not_found(format!("user {subject} not found in organization"))
            })
    }

    /// Resolve a user's manager within the same organization.
    async fn manager_of(
        &self,
        organization: &OrganizationId,
        user: &User,
    ) -> Result<Option<User>, Error> {
        let Some(manager_id) = user.manager_id() else {
            return Ok(None);
        };
        let manager = self
            .directory
            .find_by_id(manager_id)
            .await
            .map_err(map_directory_error)?
            .filter(|candidate| candidate.organization_id() == Some(organization));
        if manager.is_none() {
            warn!(
                user_id = %user.id(),
                manager_id = %manager_id,
                "manager reference does not resolve within the organization"
            );
        }
        Ok(manager)
    }

    fn subtree(
        &self,
        organization: OrganizationId,
        user: User,
        depth: u32,
        max_depth: u32,
    ) -> BoxFuture<'_, Result<ReportingTreeNode, Error>> {
        async move {
            let mut node = ReportingTreeNode {
                member: TreeMember::from(&user),
                children: Vec::new(),
            };
            if depth >= max_depth {
                return Ok(node);
            }
            let reports = self
                .directory
                .direct_reports_of(&organization, user.id())
                .await
                .map_err(map_directory_error)?;
            for report in reports {
                let child = self
                    .subtree(organization, report, depth + 1, max_depth)
                    .await?;
                node.children.push(child);
            }
            Ok(node)
        }
        .boxed()
    }
}

#[async_trait]
impl<D> HierarchyQuery for HierarchyService<D>
where
    D: UserDirectory,
{
    async fn manager(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Option<User>, Error> {
        let user = self.subject(organization, subject).await?;
        self.manager_of(organization, &user).await
    }

    async fn skip_manager(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Option<User>, Error> {
        let user = self.subject(organization, subject).await?;
        let Some(manager) = self.manager_of(organization, &user).await? else {
            return Ok(None);
        };
        self.manager_of(organization, &manager).await
    }

    async fn direct_reports(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Vec<User>, Error> {
        let user = self.subject(organization, subject).await?;
        self.directory
            .direct_reports_of(organization, user.id())
            .await
            .map_err(map_directory_error)
    }

    async fn indirect_reports(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Vec<User>, Error> {
        // One level below the direct reports only, not the full closure.
        let directs = self.direct_reports(organization, subject).await?;
        let mut indirect = Vec::new();
        for direct in &directs {
            let mut reports = self
                .directory
                .direct_reports_of(organization, direct.id())
                .await
                .map_err(map_directory_error)?;
            indirect.append(&mut reports);
        }
        Ok(indirect)
    }

    async fn peers(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Vec<User>, Error> {
        let user = self.subject(organization, subject).await?;
        let Some(manager) = self.manager_of(organization, &user).await? else {
            return Ok(Vec::new());
        };
        let mut peers = self
            .directory
            .direct_reports_of(organization, manager.id())
            .await
            .map_err(map_directory_error)?;
        peers.retain(|peer| peer.id() != subject);
        Ok(peers)
    }

    async fn manager_chain(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Vec<User>, Error> {
        let user = self.subject(organization, subject).await?;
        let mut visited: HashSet<UserId> = HashSet::from([*user.id()]);
        let mut chain = Vec::new();
        let mut current = user;

        while chain.len() < MAX_CHAIN_HOPS {
            let Some(manager_id) = current.manager_id().copied() else {
                break;
            };
            if !visited.insert(manager_id) {
                warn!(
                    subject = %subject,
                    repeated = %manager_id,
                    "manager chain contains a cycle; truncating"
                );
                break;
            }
            let Some(manager) = self.manager_of(organization, &current).await? else {
                break;
            };
            chain.push(manager.clone());
            current = manager;
        }
        Ok(chain)
    }

    async fn reporting_tree(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
        max_depth: u32,
    ) -> Result<ReportingTreeNode, Error> {
        let user = self.subject(organization, subject).await?;
        let bounded = max_depth.min(MAX_TREE_DEPTH);
        self.subtree(*organization, user, 0, bounded).await
    }
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;
