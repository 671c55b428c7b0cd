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

fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array body")
        .iter()
        .map(|user| user["id"].as_str().expect("user id").to_owned())
        .collect()
}

#[rstest]
#[actix_web::test]
async fn manager_resolves_one_level_up() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state.clone())).await;

    let (status, body) = get_as(&app, "bob", "/api/v1/hierarchy/manager").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], world.alice.id().to_string());
}

#[rstest]
#[actix_web::test]
async fn unmanaged_caller_has_a_null_manager() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state)).await;

    let (status, body) = get_as(&app, "alice", "/api/v1/hierarchy/manager").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[rstest]
#[actix_web::test]
async fn skip_manager_walks_past_a_chain_top() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state)).await;

    // Bob's manager is alice, who has no manager herself.
    let (status, body) = get_as(&app, "bob", "/api/v1/hierarchy/manager?skip=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[rstest]
#[actix_web::test]
async fn direct_reports_list_the_immediate_team() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state.clone())).await;

    let (status, body) = get_as(&app, "alice", "/api/v1/hierarchy/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ids(&body),
        vec![world.bob.id().to_string(), world.carol.id().to_string()]
    );
}

#[rstest]
#[actix_web::test]
async fn indirect_reports_are_empty_for_a_flat_team() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state)).await;

    let (status, body) = get_as(&app, "alice", "/api/v1/hierarchy/reports?indirect=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(Vec::new()));
}

#[rstest]
#[actix_web::test]
async fn peers_share_a_manager_and_exclude_the_caller() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state.clone())).await;

    let (status, body) = get_as(&app, "bob", "/api/v1/hierarchy/peers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![world.carol.id().to_string()]);
}

#[rstest]
#[actix_web::test]
async fn chain_lists_managers_nearest_first() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state.clone())).await;

    let (status, body) = get_as(&app, "bob", "/api/v1/hierarchy/chain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![world.alice.id().to_string()]);
}

#[rstest]
#[actix_web::test]
async fn tree_nests_reports_under_the_caller() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state.clone())).await;

    let (status, body) = get_as(&app, "alice", "/api/v1/hierarchy/tree").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], world.alice.id().to_string());
    let children = body["children"].as_array().expect("children array");
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["id"], world.bob.id().to_string());
    assert_eq!(children[0]["children"], Value::Array(Vec::new()));
}

#[rstest]
#[actix_web::test]
async fn tree_depth_zero_returns_a_bare_root() {
    let world = TestWorld::new();
    let app = actix_test::init_service(api_app(world.state.clone())).await;

    let (status, body) = get_as(&app, "alice", "/api/v1/hierarchy/tree?maxDepth=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], world.alice.id().to_string());
    assert_eq!(body["children"], Value::Array(Vec::new()));
}
