//! Domain ports and supporting types for the hexagonal boundary.

mod cache;
mod hierarchy_query;
mod ledger_repository;
mod points;
mod token_verifier;
mod user_directory;
mod users_query;

pub use cache::{Cache, CacheError, InMemoryCache, NoOpCache};
#[cfg(test)]
pub use cache::MockCache;
pub use hierarchy_query::{
    DEFAULT_TREE_DEPTH, HierarchyQuery, MAX_TREE_DEPTH, ReportingTreeNode, TreeMember,
};
pub use ledger_repository::{
    InMemoryLedger, LedgerPosting, LedgerRepository, LedgerRepositoryError, TransactionKeyset,
};
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use points::{
    EarnPointsRequest, PointsCommand, PointsQuery, RedeemPointsRequest, TransactionHistoryPage,
    TransactionHistoryRequest, TransferPointsRequest,
};
pub use token_verifier::{FixtureTokenVerifier, TokenVerifier, TokenVerifierError};
pub use user_directory::{FixtureUserDirectory, UserDirectory, UserDirectoryError};
pub use users_query::UsersQuery;
