//! Bearer-token identity extraction.
//!
//! [`Caller`] is the handler-side proof of authentication: extracting it
//! resolves the `Authorization: Bearer` header through the token verifier
//! port and admits the identity through the corporate-admin invariant
//! check. Handlers that take a `Caller` cannot run unauthenticated.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::access::{self, CallerIdentity};
use crate::domain::ports::TokenVerifierError;
use crate::domain::{Error, OrganizationId};
use crate::inbound::http::state::HttpState;

/// Authenticated caller extracted from the request's bearer token.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerIdentity);

impl Caller {
    /// The underlying identity.
    pub fn identity(&self) -> &CallerIdentity {
        &self.0
    }

    /// The caller's own tenant scope, required.
    ///
    /// Hierarchy and points operations act on the caller's organization;
    /// an unscoped (corporate admin) caller has no standing there.
    pub fn own_organization(&self) -> Result<OrganizationId, Error> {
        self.0
            .organization_id
            .ok_or_else(access::missing_tenant_scope)
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("bearer token required"))?;
    let raw = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    raw.strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| Error::unauthorized("bearer token required"))
}

fn map_verifier_error(error: TokenVerifierError) -> Error {
    match error {
        TokenVerifierError::UnknownToken => Error::unauthorized("invalid bearer token"),
        TokenVerifierError::InactiveUser => {
            Error::unauthorized("token owner is not an active user")
        }
        TokenVerifierError::Connection { message } => {
            Error::service_unavailable(format!("token verifier unavailable: {message}"))
        }
        TokenVerifierError::Query { message } => {
            Error::internal(format!("token verifier error: {message}"))
        }
    }
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("http state is not configured"))?;
            let identity = state
                .tokens
                .verify(&token?)
                .await
                .map_err(map_verifier_error)?;
            access::check_corporate_admin_invariant(&identity)?;
            Ok(Self(identity))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;

    use crate::inbound::http::test_utils::TestWorld;

    fn whoami_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).route(
            "/whoami",
            web::get().to(|caller: Caller| async move {
                Ok::<_, crate::domain::Error>(
                    HttpResponse::Ok().body(caller.identity().user_id.to_string()),
                )
            }),
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn valid_token_resolves_the_caller() {
        let world = TestWorld::new();
        let app = actix_test::init_service(whoami_app(world.state.clone())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header(("Authorization", "Bearer alice"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = actix_test::read_body(response).await;
        assert_eq!(body, world.alice.id().to_string().as_bytes());
    }

    #[rstest]
    #[case::no_header(None)]
    #[case::wrong_scheme(Some("Basic alice"))]
    #[case::empty_token(Some("Bearer "))]
    #[case::unknown_token(Some("Bearer nobody"))]
    #[actix_web::test]
    async fn missing_or_invalid_tokens_are_unauthorised(#[case] header: Option<&str>) {
        let world = TestWorld::new();
        let app = actix_test::init_service(whoami_app(world.state.clone())).await;

        let mut request = actix_test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            request = request.insert_header(("Authorization", value));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn misconfigured_corporate_admin_is_forbidden() {
        let world = TestWorld::with_scoped_corporate_admin();
        let app = actix_test::init_service(whoami_app(world.state.clone())).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header(("Authorization", "Bearer rogue"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
