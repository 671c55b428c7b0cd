use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::Value;

use crate::inbound::http::test_utils::{TestWorld, api_app};

async fn get_as(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    token: &str,
    uri: &str,
) -> (StatusCode, Value) {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::get()
            .uri(uri)
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    let status = response.status();
    (status, actix_test::read_body_json(response).await)
}

#[rstest]
#[actix_web::test]
async fn listing_is_pinned_to_the_callers_tenant() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state.clone())).await;

    let (status, body) = get_as(&app, "alice", "/api/v1/users").await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().expect("array body");
    assert_eq!(users.len(), 4);
    assert!(
        users
            .iter()
            .all(|user| user["organizationId"] == world.org_a.to_string())
    );
}

#[rstest]
#[actix_web::test]
async fn naming_a_foreign_tenant_is_forbidden() {
    let world = TestWorld::new();
    let uri = format!("/api/v1/users?organizationId={}", world.org_b);
    let app = actix_test::init_service(api_app(world.state)).await;

    let (status, body) = get_as(&app, "alice", &uri).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[actix_web::test]
async fn fetching_a_colleague_succeeds() {
    let world = TestWorld::new();
    let uri = format!("/api/v1/users/{}", world.bob.id());
    let app = actix_test::init_service(api_app(world.state)).await;

    let (status, body) = get_as(&app, "alice", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], world.bob.id().to_string());
    assert_eq!(body["displayName"], "bob");
}

#[rstest]
#[actix_web::test]
async fn foreign_tenant_users_read_as_not_found() {
    let world = TestWorld::new();
    let uri = format!("/api/v1/users/{}", world.dana.id());
    let app = actix_test::init_service(api_app(world.state)).await;

    let (status, body) = get_as(&app, "alice", &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn unknown_user_ids_read_as_not_found() {
    let world = TestWorld::new();
    let uri = format!("/api/v1/users/{}", uuid::Uuid::new_v4());
    let app = actix_test::init_service(api_app(world.state)).await;

    let (status, _) = get_as(&app, "alice", &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
