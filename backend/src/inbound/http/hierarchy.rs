//! Organization hierarchy handlers.
//!
//! All operations resolve relationships for the authenticated caller within
//! their own tenant. `?skip=true` on the manager route walks one extra level
//! up (N+2); `?indirect=true` on the reports route walks one extra level
//! down (N-2).

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::ports::{DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH, ReportingTreeNode};
use crate::domain::user::User;
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::Caller;
use crate::inbound::http::state::HttpState;

/// Query parameters for `GET /api/v1/hierarchy/manager`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ManagerParams {
    /// When true, resolve the manager's manager instead.
    #[serde(default)]
    pub skip: bool,
}

/// Query parameters for `GET /api/v1/hierarchy/reports`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportsParams {
    /// When true, resolve reports of direct reports instead.
    #[serde(default)]
    pub indirect: bool,
}

/// Query parameters for `GET /api/v1/hierarchy/tree`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TreeParams {
    /// Depth bound; defaults to 3 and is capped at 6.
    pub max_depth: Option<u32>,
}

/// The caller's manager, or their manager's manager with `?skip=true`.
#[utoipa::path(
    get,
    path = "/api/v1/hierarchy/manager",
    params(ManagerParams),
    responses(
        (status = 200, description = "The resolved manager, or null at the top of the chain"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller has no tenant scope", body = Error),
        (status = 404, description = "Caller is not in the organization", body = Error)
    ),
    tags = ["hierarchy"],
    operation_id = "hierarchyManager"
)]
#[get("/hierarchy/manager")]
pub async fn manager(
    caller: Caller,
    state: web::Data<HttpState>,
    query: web::Query<ManagerParams>,
) -> ApiResult<web::Json<Option<User>>> {
    let organization = caller.own_organization()?;
    let subject = caller.identity().user_id;
    let resolved = if query.skip {
        state.hierarchy.skip_manager(&organization, &subject).await?
    } else {
        state.hierarchy.manager(&organization, &subject).await?
    };
    Ok(web::Json(resolved))
}

/// The caller's reports, one level down by default.
#[utoipa::path(
    get,
    path = "/api/v1/hierarchy/reports",
    params(ReportsParams),
    responses(
        (status = 200, description = "The resolved reports"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller has no tenant scope", body = Error),
        (status = 404, description = "Caller is not in the organization", body = Error)
    ),
    tags = ["hierarchy"],
    operation_id = "hierarchyReports"
)]
#[get("/hierarchy/reports")]
pub async fn reports(
    caller: Caller,
    state: web::Data<HttpState>,
    query: web::Query<ReportsParams>,
) -> ApiResult<web::Json<Vec<User>>> {
    let organization = caller.own_organization()?;
    let subject = caller.identity().user_id;
    let resolved = if query.indirect {
        state
            .hierarchy
            .indirect_reports(&organization, &subject)
            .await?
    } else {
        state
            .hierarchy
            .direct_reports(&organization, &subject)
            .await?
    };
    Ok(web::Json(resolved))
}

/// Users sharing the caller's manager.
#[utoipa::path(
    get,
    path = "/api/v1/hierarchy/peers",
    responses(
        (status = 200, description = "The caller's peers; empty for unmanaged users"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller has no tenant scope", body = Error),
        (status = 404, description = "Caller is not in the organization", body = Error)
    ),
    tags = ["hierarchy"],
    operation_id = "hierarchyPeers"
)]
#[get("/hierarchy/peers")]
pub async fn peers(
    caller: Caller,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<User>>> {
    let organization = caller.own_organization()?;
    let resolved = state
        .hierarchy
        .peers(&organization, &caller.identity().user_id)
        .await?;
    Ok(web::Json(resolved))
}

/// Managers upward from the caller, nearest first.
#[utoipa::path(
    get,
    path = "/api/v1/hierarchy/chain",
    responses(
        (status = 200, description = "The management chain, nearest manager first"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller has no tenant scope", body = Error),
        (status = 404, description = "Caller is not in the organization", body = Error)
    ),
    tags = ["hierarchy"],
    operation_id = "hierarchyChain"
)]
#[get("/hierarchy/chain")]
pub async fn chain(
    caller: Caller,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<User>>> {
    let organization = caller.own_organization()?;
    let resolved = state
        .hierarchy
        .manager_chain(&organization, &caller.identity().user_id)
        .await?;
    Ok(web::Json(resolved))
}

/// Reporting tree rooted at the caller, bounded by `maxDepth`.
#[utoipa::path(
    get,
    path = "/api/v1/hierarchy/tree",
    params(TreeParams),
    responses(
        (status = 200, description = "The bounded reporting tree", body = ReportingTreeNode),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller has no tenant scope", body = Error),
        (status = 404, description = "Caller is not in the organization", body = Error)
    ),
    tags = ["hierarchy"],
    operation_id = "hierarchyTree"
)]
#[get("/hierarchy/tree")]
pub async fn tree(
    caller: Caller,
    state: web::Data<HttpState>,
    query: web::Query<TreeParams>,
) -> ApiResult<web::Json<ReportingTreeNode>> {
    let organization = caller.own_organization()?;
    let max_depth = query
        .max_depth
        .unwrap_or(DEFAULT_TREE_DEPTH)
        .min(MAX_TREE_DEPTH);
    let resolved = state
        .hierarchy
        .reporting_tree(&organization, &caller.identity().user_id, max_depth)
        .await?;
    Ok(web::Json(resolved))
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;
