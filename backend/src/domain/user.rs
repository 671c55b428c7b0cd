//! User and organization data model.
//!
//! Purpose: strongly typed identities and the tenant-scoped user entity used
//! by the ledger, the hierarchy resolver, and the access gate. Types are
//! immutable once constructed; invariants are enforced in the constructors.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The email is empty, padded, or missing an `@` separator.
    InvalidEmail,
    /// The display name is empty once trimmed.
    EmptyDisplayName,
    /// A corporate admin carried a tenant scope. This is a security defect,
    /// not a recoverable input problem.
    CorporateAdminWithTenant,
    /// A non-corporate user carried no tenant scope.
    MissingTenant,
    /// A user was declared as their own manager.
    SelfManaged,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a non-empty address"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::CorporateAdminWithTenant => {
                write!(f, "corporate admins must not carry an organization id")
            }
            Self::MissingTenant => write!(f, "non-corporate users must carry an organization id"),
            Self::SelfManaged => write!(f, "a user cannot be their own manager"),
        }
    }
}

impl std::error::Error for UserValidationError {}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id! {
    /// Stable user identifier.
    UserId
}

uuid_id! {
    /// Tenant boundary identifier. Every user and most records belong to
    /// exactly one organization; corporate admins belong to none.
    OrganizationId
}

pub(crate) use uuid_id;

/// Validated email address.
///
/// Stored lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = email.as_ref();
        if raw.trim() != raw || raw.is_empty() {
            return Err(UserValidationError::InvalidEmail);
        }
        let Some((local, domain)) = raw.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role assigned to a user within (or across) tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Regular member with no administrative reach.
    Employee,
    /// Tenant-level administrator.
    Admin,
    /// Administrator for a client organization.
    ClientAdmin,
    /// Cross-tenant administrator; must carry no organization id.
    CorporateAdmin,
}

impl RoleType {
    /// Parse the stored representation leniently.
    ///
    /// Unknown or empty values map to `None` rather than an error: an
    /// unrecognised role must degrade to "no role" (and therefore no admin
    /// access), never to a failure that blocks the whole row.
    pub fn from_db_value(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            Some("employee") => Some(Self::Employee),
            Some("admin") => Some(Self::Admin),
            Some("client_admin") => Some(Self::ClientAdmin),
            Some("corporate_admin") => Some(Self::CorporateAdmin),
            _ => None,
        }
    }

    /// Stored string representation.
    pub fn as_db_value(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Admin => "admin",
            Self::ClientAdmin => "client_admin",
            Self::CorporateAdmin => "corporate_admin",
        }
    }
}

/// Lifecycle status of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Fully onboarded and allowed to act.
    Active,
    /// Invited but not yet onboarded.
    Pending,
    /// Temporarily disabled.
    Inactive,
    /// Permanently offboarded. Accounts and transactions are retained.
    Terminated,
}

impl UserStatus {
    /// Parse the stored representation.
    pub fn from_db_value(value: &str) -> Option<Self> {
        match value.trim() {
            "active" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            "inactive" => Some(Self::Inactive),
            "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }

    /// Stored string representation.
    pub fn as_db_value(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Inactive => "inactive",
            Self::Terminated => "terminated",
        }
    }
}

/// Elevated scope for administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminScope {
    /// Unrestricted administrative scope.
    Super,
}

impl AdminScope {
    /// Parse the stored representation leniently; unknown values map to `None`.
    pub fn from_db_value(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            Some("super") => Some(Self::Super),
            _ => None,
        }
    }

    /// Stored string representation.
    pub fn as_db_value(&self) -> &'static str {
        match self {
            Self::Super => "super",
        }
    }
}

/// Unvalidated field bundle for constructing a [`User`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    /// Stable identifier.
    pub id: UserId,
    /// Unique-per-tenant email address.
    pub email: EmailAddress,
    /// Name shown to colleagues.
    pub display_name: String,
    /// Tenant scope; `None` only for corporate admins.
    pub organization_id: Option<OrganizationId>,
    /// Reporting line: the manager this user reports to.
    pub manager_id: Option<UserId>,
    /// Assigned role, if any.
    pub role_type: Option<RoleType>,
    /// Raw admin flag. Grants nothing on its own; see the access gate.
    pub is_admin: bool,
    /// Elevated scope for administrators.
    pub admin_scope: Option<AdminScope>,
    /// Lifecycle status.
    pub status: UserStatus,
    /// Free-text department label.
    pub department: Option<String>,
}

/// Platform user.
///
/// ## Invariants
/// - `role_type == CorporateAdmin` implies `organization_id` is `None`,
///   and every other user carries exactly one organization id.
/// - `manager_id` never references the user itself.
/// - `display_name` is non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "ada@example.com")]
    email: EmailAddress,
    display_name: String,
    #[schema(value_type = Option<String>)]
    organization_id: Option<OrganizationId>,
    #[schema(value_type = Option<String>)]
    manager_id: Option<UserId>,
    role_type: Option<RoleType>,
    is_admin: bool,
    admin_scope: Option<AdminScope>,
    status: UserStatus,
    department: Option<String>,
}

impl User {
    /// Validate a draft and construct a [`User`].
    pub fn new(draft: UserDraft) -> Result<Self, UserValidationError> {
        if draft.display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        match (draft.role_type, draft.organization_id) {
            (Some(RoleType::CorporateAdmin), Some(_)) => {
                return Err(UserValidationError::CorporateAdminWithTenant);
            }
            (Some(RoleType::CorporateAdmin), None) => {}
            (_, None) => return Err(UserValidationError::MissingTenant),
            (_, Some(_)) => {}
        }
        if draft.manager_id.is_some_and(|manager| manager == draft.id) {
            return Err(UserValidationError::SelfManaged);
        }
        Ok(Self {
            id: draft.id,
            email: draft.email,
            display_name: draft.display_name,
            organization_id: draft.organization_id,
            manager_id: draft.manager_id,
            role_type: draft.role_type,
            is_admin: draft.is_admin,
            admin_scope: draft.admin_scope,
            status: draft.status,
            department: draft.department,
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique-per-tenant email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Name shown to colleagues.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Tenant scope; `None` only for corporate admins.
    pub fn organization_id(&self) -> Option<&OrganizationId> {
        self.organization_id.as_ref()
    }

    /// The manager this user reports to, if any.
    pub fn manager_id(&self) -> Option<&UserId> {
        self.manager_id.as_ref()
    }

    /// Assigned role, if any.
    pub fn role_type(&self) -> Option<RoleType> {
        self.role_type
    }

    /// Raw admin flag. Grants nothing without a matching role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Elevated scope for administrators.
    pub fn admin_scope(&self) -> Option<AdminScope> {
        self.admin_scope
    }

    /// Lifecycle status.
    pub fn status(&self) -> UserStatus {
        self.status
    }

    /// Free-text department label.
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }
}
