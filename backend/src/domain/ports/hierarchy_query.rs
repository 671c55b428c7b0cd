//! Driving port for organization hierarchy queries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::error::Error;
use crate::domain::user::{OrganizationId, User, UserId};

/// Default depth bound for [`HierarchyQuery::reporting_tree`].
pub const DEFAULT_TREE_DEPTH: u32 = 3;

/// Hard ceiling on reporting-tree depth, whatever the client asks for.
pub const MAX_TREE_DEPTH: u32 = 6;

/// Identity fields carried on each reporting-tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreeMember {
    /// User identifier.
    #[schema(value_type = String)]
    pub id: UserId,
    /// Email address.
    #[schema(value_type = String)]
    pub email: String,
    /// Name shown to colleagues.
    pub display_name: String,
    /// Free-text department label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl From<&User> for TreeMember {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            email: user.email().as_ref().to_owned(),
            display_name: user.display_name().to_owned(),
            department: user.department().map(ToOwned::to_owned),
        }
    }
}

/// One node of a reporting tree: a user and their bounded-depth reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportingTreeNode {
    /// The user at this node.
    #[serde(flatten)]
    pub member: TreeMember,
    /// Direct reports, recursively; empty once the depth bound is reached.
    #[schema(no_recursion)]
    pub children: Vec<ReportingTreeNode>,
}

impl ReportingTreeNode {
    /// Deepest nesting level present in this tree; a leaf root is depth 0.
    pub fn depth(&self) -> u32 {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Domain use-case port for resolving reporting relationships.
///
/// Every operation runs inside one organization; the subject user must
/// belong to it.
#[async_trait]
pub trait HierarchyQuery: Send + Sync {
    /// The subject's manager (N+1), if any.
    async fn manager(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Option<User>, Error>;

    /// The manager's manager (N+2), if any.
    async fn skip_manager(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Option<User>, Error>;

    /// Users reporting directly to the subject (N-1).
    async fn direct_reports(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Vec<User>, Error>;

    /// Reports of the subject's direct reports (N-2); exactly one level
    /// deeper, not the transitive closure.
    async fn indirect_reports(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Vec<User>, Error>;

    /// Users sharing the subject's manager, excluding the subject; empty
    /// when the subject has no manager.
    async fn peers(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Vec<User>, Error>;

    /// Managers upward from the subject, nearest first. Terminates on a
    /// missing manager or a cycle.
    async fn manager_chain(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
    ) -> Result<Vec<User>, Error>;

    /// Reporting tree rooted at the subject, bounded by `max_depth`.
    async fn reporting_tree(
        &self,
        organization: &OrganizationId,
        subject: &UserId,
        max_depth: u32,
    ) -> Result<ReportingTreeNode, Error>;
}
