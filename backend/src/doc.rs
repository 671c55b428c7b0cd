//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API: every
//! HTTP path from the inbound layer, the shared schema components, and the
//! bearer-token security scheme. The document backs Swagger UI in debug
//! builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{ReportingTreeNode, TreeMember};
use crate::domain::transaction::TransactionRecord;
use crate::domain::user::{AdminScope, RoleType, User, UserStatus};
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::points::{
    BalanceResponse, EarnRequest, RedeemRequest, TransferRequest,
};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Per-user API token sent as `Authorization: Bearer`."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Engagement backend API",
        description = "Multi-tenant points economy and organization hierarchy API."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::points::earn,
        crate::inbound::http::points::redeem,
        crate::inbound::http::points::transfer,
        crate::inbound::http::points::balance,
        crate::inbound::http::points::transactions,
        crate::inbound::http::hierarchy::manager,
        crate::inbound::http::hierarchy::reports,
        crate::inbound::http::hierarchy::peers,
        crate::inbound::http::hierarchy::chain,
        crate::inbound::http::hierarchy::tree,
        crate::inbound::http::users::list,
        crate::inbound::http::users::get,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        UserStatus,
        RoleType,
        AdminScope,
        TransactionRecord,
        EarnRequest,
        RedeemRequest,
        TransferRequest,
        BalanceResponse,
        ReportingTreeNode,
        TreeMember,
    )),
    tags(
        (name = "points", description = "Points economy: grants, redemptions, transfers, history"),
        (name = "hierarchy", description = "Reporting relationship queries"),
        (name = "users", description = "Tenant-scoped user directory"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/points/earn",
            "/api/v1/points/redeem",
            "/api/v1/points/transfer",
            "/api/v1/points/balance",
            "/api/v1/points/transactions",
            "/api/v1/hierarchy/manager",
            "/api/v1/hierarchy/reports",
            "/api/v1/hierarchy/peers",
            "/api/v1/hierarchy/chain",
            "/api/v1/hierarchy/tree",
            "/api/v1/users",
            "/api/v1/users/{id}",
            "/healthz/live",
            "/healthz/ready",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing OpenAPI path {path}"
            );
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("Error"));
        assert!(schemas.contains_key("TransactionRecord"));
    }
}
