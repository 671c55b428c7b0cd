//! Liveness and readiness probes.
//!
//! Registered outside the `/api/v1` scope so probes never pass through the
//! bearer-token extractor.

use actix_web::{HttpResponse, get};
use serde_json::json;

/// Process is up and serving requests.
#[utoipa::path(
    get,
    path = "/healthz/live",
    responses((status = 200, description = "Process is live")),
    tags = ["health"],
    operation_id = "healthLive"
)]
#[get("/healthz/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Process is ready to take traffic.
#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses((status = 200, description = "Process is ready")),
    tags = ["health"],
    operation_id = "healthReady"
)]
#[get("/healthz/ready")]
pub async fn ready() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    #[rstest]
    #[case::live("/healthz/live")]
    #[case::ready("/healthz/ready")]
    #[actix_web::test]
    async fn probes_answer_without_authentication(#[case] uri: &str) {
        let app = actix_test::init_service(
            App::new().service(super::live).service(super::ready),
        )
        .await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
