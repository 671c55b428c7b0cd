//! Domain layer: entities, validation, use-case services, and the ports
//! that adapters implement. Nothing in here knows about HTTP or the
//! database.

pub mod access;
pub mod account;
pub mod directory_service;
pub mod error;
pub mod hierarchy;
pub mod ledger_service;
pub mod ports;
pub mod transaction;
pub mod user;

pub use access::CallerIdentity;
pub use account::{Account, AccountId, AccountKind, PointsAmount, SYSTEM_SEED_BALANCE};
pub use directory_service::DirectoryUsersService;
pub use error::{Error, ErrorCode};
pub use hierarchy::HierarchyService;
pub use ledger_service::PointsService;
pub use transaction::{TransactionDraft, TransactionId, TransactionRecord};
pub use user::{
    AdminScope, EmailAddress, OrganizationId, RoleType, User, UserDraft, UserId, UserStatus,
    UserValidationError,
};
