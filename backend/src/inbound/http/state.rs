//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    HierarchyQuery, PointsCommand, PointsQuery, TokenVerifier, UsersQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Transfer engine command side: earn, redeem, transfer.
    pub points: Arc<dyn PointsCommand>,
    /// Transfer engine query side: balance, history.
    pub points_query: Arc<dyn PointsQuery>,
    /// Organization hierarchy resolver.
    pub hierarchy: Arc<dyn HierarchyQuery>,
    /// Tenant-gated user directory queries.
    pub users: Arc<dyn UsersQuery>,
    /// Bearer-token verifier used by the identity extractor.
    pub tokens: Arc<dyn TokenVerifier>,
}
