//! Multi-tenant access gate.
//!
//! Every bulk query must be scoped to exactly one organization before it
//! reaches a repository; admin checks require both the raw flag and an
//! admin-capable role. Denials are logged with the mismatched fields so
//! operators can see *why* a caller was refused.

use serde_json::json;
use tracing::{error, warn};

use super::error::Error;
use super::user::{AdminScope, OrganizationId, RoleType, User, UserId};

/// Authenticated caller derived from a bearer token.
///
/// Carries only what authorisation decisions need; handlers fetch the full
/// [`User`] when they need profile fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
    /// Acting user's id.
    pub user_id: UserId,
    /// Tenant scope; `None` only for corporate admins.
    pub organization_id: Option<OrganizationId>,
    /// Raw admin flag as stored. Grants nothing without a matching role.
    pub is_admin: bool,
    /// Assigned role, if any.
    pub role_type: Option<RoleType>,
    /// Elevated scope for administrators.
    pub admin_scope: Option<AdminScope>,
}

impl CallerIdentity {
    /// Derive a caller identity from a stored user.
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: *user.id(),
            organization_id: user.organization_id().copied(),
            is_admin: user.is_admin(),
            role_type: user.role_type(),
            admin_scope: user.admin_scope(),
        }
    }

    /// Whether this caller operates across all tenants.
    pub fn is_corporate_admin(&self) -> bool {
        matches!(self.role_type, Some(RoleType::CorporateAdmin))
    }
}

/// Two-factor admin predicate.
///
/// `is_admin` alone is insufficient: the role must also be drawn from the
/// admin-capable set. A missing, empty, or `employee` role is simply
/// non-admin, never an error.
pub fn is_admin(identity: &CallerIdentity) -> bool {
    let role_is_admin_capable = matches!(
        identity.role_type,
        Some(RoleType::Admin | RoleType::ClientAdmin | RoleType::CorporateAdmin)
    );
    identity.is_admin && role_is_admin_capable
}

/// Require admin access, logging the mismatched fields on denial.
pub fn require_admin(identity: &CallerIdentity) -> Result<(), Error> {
    if is_admin(identity) {
        return Ok(());
    }
    warn!(
        user_id = %identity.user_id,
        is_admin = identity.is_admin,
        role_type = ?identity.role_type,
        "admin access denied"
    );
    Err(Error::forbidden("admin access required").with_details(json!({
        "isAdmin": identity.is_admin,
        "roleType": identity.role_type,
    })))
}

/// Resolve the tenant scope a bulk query must run under.
///
/// Regular callers are pinned to their own organization; corporate admins
/// must name one explicitly. A query with no resolvable scope fails fast
/// rather than silently spanning all tenants.
pub fn require_tenant_scope(
    identity: &CallerIdentity,
    requested: Option<OrganizationId>,
) -> Result<OrganizationId, Error> {
    match (identity.organization_id, requested) {
        // Callers never escape their own tenant, whatever they ask for.
        (Some(own), Some(asked)) if asked != own => Err(wrong_tenant(identity)),
        (Some(own), _) => Ok(own),
        (None, Some(asked)) if identity.is_corporate_admin() && is_admin(identity) => Ok(asked),
        (None, _) => Err(missing_tenant_scope()),
    }
}

/// Error raised when a bulk operation has no organization scope.
pub fn missing_tenant_scope() -> Error {
    Error::forbidden("organization scope is required for this operation")
        .with_details(json!({ "code": "missing_tenant_scope" }))
}

fn wrong_tenant(identity: &CallerIdentity) -> Error {
    warn!(
        user_id = %identity.user_id,
        organization_id = ?identity.organization_id,
        "cross-tenant access denied"
    );
    Error::forbidden("access to another organization is not permitted")
}

/// Cross-check a fetched entity's tenant against the caller's.
///
/// Single-entity lookups are not implicitly scoped by repositories, so every
/// caller must apply this check to whatever it fetched.
pub fn require_same_tenant(
    identity: &CallerIdentity,
    resource_org: Option<&OrganizationId>,
) -> Result<(), Error> {
    if identity.is_corporate_admin() && is_admin(identity) {
        return Ok(());
    }
    match (identity.organization_id.as_ref(), resource_org) {
        (Some(own), Some(other)) if own == other => Ok(()),
        _ => Err(wrong_tenant(identity)),
    }
}

/// Enforce the corporate-admin invariant on an admitted identity.
///
/// A corporate admin carrying an organization id is a security defect: the
/// row was written in violation of the data model. Reject the caller and
/// log loudly.
pub fn check_corporate_admin_invariant(identity: &CallerIdentity) -> Result<(), Error> {
    if identity.is_corporate_admin() && identity.organization_id.is_some() {
        error!(
            user_id = %identity.user_id,
            organization_id = ?identity.organization_id,
            role_type = ?identity.role_type,
            "corporate admin carries a tenant scope; treating as a security defect"
        );
        return Err(
            Error::forbidden("corporate admin identity is misconfigured").with_details(json!({
                "code": "corporate_admin_invariant",
                "roleType": RoleType::CorporateAdmin,
            })),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn identity(
        organization_id: Option<OrganizationId>,
        admin_flag: bool,
        role_type: Option<RoleType>,
    ) -> CallerIdentity {
        CallerIdentity {
            user_id: UserId::random(),
            organization_id,
            is_admin: admin_flag,
            role_type,
            admin_scope: None,
        }
    }

    fn org() -> OrganizationId {
        OrganizationId::random()
    }

    #[rstest]
    #[case(true, Some(RoleType::Admin), true)]
    #[case(true, Some(RoleType::ClientAdmin), true)]
    #[case(true, Some(RoleType::CorporateAdmin), true)]
    #[case(true, Some(RoleType::Employee), false)]
    #[case(true, None, false)]
    #[case(false, Some(RoleType::Admin), false)]
    #[case(false, None, false)]
    fn admin_predicate_requires_flag_and_role(
        #[case] flag: bool,
        #[case] role: Option<RoleType>,
        #[case] expected: bool,
    ) {
        let caller = identity(Some(org()), flag, role);
        assert_eq!(is_admin(&caller), expected);
    }

    #[rstest]
    fn admin_denial_reports_mismatched_fields() {
        let caller = identity(Some(org()), true, Some(RoleType::Employee));
        let error = require_admin(&caller).expect_err("must deny");
        let details = error.details().expect("details present");
        assert_eq!(details.get("isAdmin"), Some(&serde_json::json!(true)));
        assert_eq!(
            details.get("roleType"),
            Some(&serde_json::json!("employee"))
        );
    }

    #[rstest]
    fn tenant_scope_defaults_to_caller_organization() {
        let own = org();
        let caller = identity(Some(own), false, Some(RoleType::Employee));
        assert_eq!(
            require_tenant_scope(&caller, None).expect("scope"),
            own
        );
    }

    #[rstest]
    fn tenant_scope_rejects_foreign_request() {
        let caller = identity(Some(org()), false, Some(RoleType::Employee));
        let error = require_tenant_scope(&caller, Some(org())).expect_err("must deny");
        assert_eq!(error.code(), crate::domain::ErrorCode::Forbidden);
    }

    #[rstest]
    fn unscoped_caller_without_request_fails_fast() {
        let caller = identity(None, true, Some(RoleType::CorporateAdmin));
        let error = require_tenant_scope(&caller, None).expect_err("must deny");
        let details = error.details().expect("details present");
        assert_eq!(
            details.get("code"),
            Some(&serde_json::json!("missing_tenant_scope"))
        );
    }

    #[rstest]
    fn corporate_admin_may_name_a_tenant() {
        let target = org();
        let caller = identity(None, true, Some(RoleType::CorporateAdmin));
        assert_eq!(
            require_tenant_scope(&caller, Some(target)).expect("scope"),
            target
        );
    }

    #[rstest]
    fn corporate_role_without_flag_cannot_name_a_tenant() {
        let caller = identity(None, false, Some(RoleType::CorporateAdmin));
        assert!(require_tenant_scope(&caller, Some(org())).is_err());
    }

    #[rstest]
    fn same_tenant_check_accepts_matching_organization() {
        let own = org();
        let caller = identity(Some(own), false, Some(RoleType::Employee));
        assert!(require_same_tenant(&caller, Some(&own)).is_ok());
    }

    #[rstest]
    fn same_tenant_check_rejects_foreign_resource() {
        let caller = identity(Some(org()), false, Some(RoleType::Employee));
        assert!(require_same_tenant(&caller, Some(&org())).is_err());
    }

    #[rstest]
    fn corporate_admin_invariant_rejects_scoped_identity() {
        let caller = identity(Some(org()), true, Some(RoleType::CorporateAdmin));
        let error = check_corporate_admin_invariant(&caller).expect_err("must deny");
        assert_eq!(error.code(), crate::domain::ErrorCode::Forbidden);
    }

    #[rstest]
    fn corporate_admin_invariant_accepts_null_scope() {
        let caller = identity(None, true, Some(RoleType::CorporateAdmin));
        assert!(check_corporate_admin_invariant(&caller).is_ok());
    }
}
