//! Tenant-gated user directory handlers.

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::user::{OrganizationId, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::Caller;
use crate::inbound::http::state::HttpState;

/// Query parameters for `GET /api/v1/users`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Tenant to list; only corporate admins may name one.
    pub organization_id: Option<Uuid>,
}

/// List users visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListParams),
    responses(
        (status = 200, description = "Users in the resolved tenant"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Caller may not list that tenant", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list(
    caller: Caller,
    state: web::Data<HttpState>,
    query: web::Query<ListParams>,
) -> ApiResult<web::Json<Vec<User>>> {
    let organization = query.into_inner().organization_id.map(OrganizationId::from);
    let users = state
        .users
        .list_users(caller.identity(), organization)
        .await?;
    Ok(web::Json(users))
}

/// Fetch one user in the caller's tenant.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "The requested user", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such user in the caller's tenant", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get(
    caller: Caller,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<User>> {
    let id = UserId::from_uuid(path.into_inner());
    let user = state.users.get_user(caller.identity(), &id).await?;
    Ok(web::Json(user))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
