//! Points API handlers.
//!
//! ```text
//! POST /api/v1/points/earn      {"recipientId":"...","points":500,"reason":"recognition"}
//! POST /api/v1/points/redeem    {"points":200,"reason":"reward_redemption"}
//! POST /api/v1/points/transfer  {"recipientId":"...","points":50,"reason":"peer_recognition"}
//! GET  /api/v1/points/balance
//! GET  /api/v1/points/transactions?cursor=&limit=
//! ```
//!
//! Earn is admin-only; redeem and transfer act on the caller's own account.
//! Recipients are resolved through the tenant-gated users port, so granting
//! or transferring across organizations reads as not-found.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use pagination::{Cursor, Page, clamp_limit};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::account::PointsAmount;
use crate::domain::ports::{
    EarnPointsRequest, RedeemPointsRequest, TransactionHistoryRequest, TransferPointsRequest,
};
use crate::domain::transaction::TransactionRecord;
use crate::domain::user::UserId;
use crate::domain::{Error, access};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::Caller;
use crate::inbound::http::state::HttpState;

const DEFAULT_HISTORY_LIMIT: u32 = 20;
const MAX_HISTORY_LIMIT: u32 = 100;

/// Request body for `POST /api/v1/points/earn`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EarnRequest {
    /// User receiving the points.
    #[schema(value_type = String)]
    pub recipient_id: UserId,
    /// Amount to grant; strictly positive.
    #[schema(value_type = i64, minimum = 1)]
    pub points: PointsAmount,
    /// Short reason label.
    pub reason: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request body for `POST /api/v1/points/redeem`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RedeemRequest {
    /// Amount to redeem; strictly positive.
    #[schema(value_type = i64, minimum = 1)]
    pub points: PointsAmount,
    /// Short reason label.
    pub reason: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request body for `POST /api/v1/points/transfer`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransferRequest {
    /// User receiving the points.
    #[schema(value_type = String)]
    pub recipient_id: UserId,
    /// Amount to move; strictly positive.
    #[schema(value_type = i64, minimum = 1)]
    pub points: PointsAmount,
    /// Short reason label.
    pub reason: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response body for `GET /api/v1/points/balance`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// The caller's current balance.
    pub balance: i64,
}

/// Opaque-cursor payload for transaction history pagination.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryToken {
    created_at: DateTime<Utc>,
    id: Uuid,
}

/// Query parameters for `GET /api/v1/points/transactions`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Continuation token from a previous page.
    pub cursor: Option<String>,
    /// Page size; clamped to `1..=100`, default 20.
    pub limit: Option<u32>,
}

/// Grant points from the system pool to a user in the caller's tenant.
#[utoipa::path(
    post,
    path = "/api/v1/points/earn",
    request_body = EarnRequest,
    responses(
        (status = 201, description = "Points granted", body = TransactionRecord),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Unknown recipient", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["points"],
    operation_id = "earnPoints"
)]
#[post("/points/earn")]
pub async fn earn(
    caller: Caller,
    state: web::Data<HttpState>,
    payload: web::Json<EarnRequest>,
) -> ApiResult<HttpResponse> {
    access::require_admin(caller.identity())?;
    let request = payload.into_inner();
    let recipient = state
        .users
        .get_user(caller.identity(), &request.recipient_id)
        .await?;
    let record = state
        .points
        .earn(EarnPointsRequest {
            recipient: *recipient.id(),
            amount: request.points,
            reason: request.reason,
            description: request.description,
            granted_by: Some(caller.identity().user_id),
        })
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// Redeem points from the caller's own account.
#[utoipa::path(
    post,
    path = "/api/v1/points/redeem",
    request_body = RedeemRequest,
    responses(
        (status = 201, description = "Points redeemed", body = TransactionRecord),
        (status = 400, description = "Invalid request or insufficient balance", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Caller has no account", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["points"],
    operation_id = "redeemPoints"
)]
#[post("/points/redeem")]
pub async fn redeem(
    caller: Caller,
    state: web::Data<HttpState>,
    payload: web::Json<RedeemRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let record = state
        .points
        .redeem(RedeemPointsRequest {
            user: caller.identity().user_id,
            amount: request.points,
            reason: request.reason,
            description: request.description,
        })
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// Transfer points from the caller to another user in the same tenant.
#[utoipa::path(
    post,
    path = "/api/v1/points/transfer",
    request_body = TransferRequest,
    responses(
        (status = 201, description = "Points transferred", body = TransactionRecord),
        (status = 400, description = "Invalid request or insufficient balance", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown recipient", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["points"],
    operation_id = "transferPoints"
)]
#[post("/points/transfer")]
pub async fn transfer(
    caller: Caller,
    state: web::Data<HttpState>,
    payload: web::Json<TransferRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let recipient = state
        .users
        .get_user(caller.identity(), &request.recipient_id)
        .await?;
    let record = state
        .points
        .transfer(TransferPointsRequest {
            from: caller.identity().user_id,
            to: *recipient.id(),
            amount: request.points,
            reason: request.reason,
            description: request.description,
        })
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// The caller's current points balance.
#[utoipa::path(
    get,
    path = "/api/v1/points/balance",
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["points"],
    operation_id = "pointsBalance"
)]
#[get("/points/balance")]
pub async fn balance(
    caller: Caller,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<BalanceResponse>> {
    let balance = state
        .points_query
        .balance(&caller.identity().user_id)
        .await?;
    Ok(web::Json(BalanceResponse { balance }))
}

/// The caller's transaction history, newest first, cursor-paginated.
#[utoipa::path(
    get,
    path = "/api/v1/points/transactions",
    params(HistoryParams),
    responses(
        (status = 200, description = "One page of transactions, newest first"),
        (status = 400, description = "Malformed cursor", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["points"],
    operation_id = "pointsTransactions"
)]
#[get("/points/transactions")]
pub async fn transactions(
    caller: Caller,
    state: web::Data<HttpState>,
    query: web::Query<HistoryParams>,
) -> ApiResult<web::Json<Page<TransactionRecord>>> {
    let params = query.into_inner();
    let before = params
        .cursor
        .map(|raw| Cursor::from_raw(raw).decode::<HistoryToken>())
        .transpose()
        .map_err(|_| Error::invalid_request("malformed continuation cursor"))?
        .map(|token| (token.created_at, token.id));
    let limit = clamp_limit(params.limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);

    let page = state
        .points_query
        .history(TransactionHistoryRequest {
            user: caller.identity().user_id,
            before,
            limit,
        })
        .await?;

    let next_cursor = page
        .next
        .map(|(created_at, id)| Cursor::encode(&HistoryToken { created_at, id }))
        .transpose()
        .map_err(|err| Error::internal(format!("cursor encoding failed: {err}")))?;

    Ok(web::Json(Page {
        items: page.transactions,
        next_cursor,
    }))
}

#[cfg(test)]
#[path = "points_tests.rs"]
mod tests;
