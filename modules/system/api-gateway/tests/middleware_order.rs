#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Validates the actual middleware execution order of `ApiGateway::build_router`:
//! set request id -> propagate request id -> trace -> push request id to extensions
//! -> timeout -> body limit -> CORS -> error mapping -> tenant -> access control -> router

mod common;

use api_gateway::ApiGatewayConfig;
use api_gateway::config::Defaults;
use axum::body::Body;
use http::{Request, StatusCode};
use tower::ServiceExt;

use common::{json_body, single_tenant, tenant};

#[tokio::test]
async fn request_id_is_echoed_and_stamped_on_auth_failures() {
    let app = single_tenant(ApiGatewayConfig::default(), tenant(&[]));

    let resp = app
        .oneshot(
            Request::get("/github/contents/README.md")
                .header("x-request-id", "fixed-req-1")
                .header("origin", "https://cms.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()["x-request-id"], "fixed-req-1");
    assert!(
        resp.headers().get("access-control-allow-origin").is_some(),
        "CORS wraps access control"
    );
    assert_eq!(
        resp.headers()["content-type"],
        "application/problem+json"
    );
    assert_eq!(json_body(resp).await["request_id"], "fixed-req-1");
}

#[tokio::test]
async fn request_id_is_generated_when_absent() {
    let app = single_tenant(ApiGatewayConfig::default(), tenant(&[]));

    let resp = app
        .oneshot(Request::get("/settings").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let rid = resp.headers()["x-request-id"].to_str().unwrap().to_owned();
    assert!(uuid::Uuid::parse_str(&rid).is_ok());
    assert_eq!(json_body(resp).await["request_id"], rid.as_str());
}

#[tokio::test]
async fn oversized_body_is_rejected_before_access_control() {
    let config = ApiGatewayConfig {
        defaults: Defaults {
            body_limit_bytes: 16,
        },
        ..ApiGatewayConfig::default()
    };
    let app = single_tenant(config, tenant(&[]));

    let resp = app
        .oneshot(
            Request::post("/github/git/blobs")
                .header("x-request-id", "big-1")
                .header("content-type", "application/json")
                .header("content-length", "64")
                .body(Body::from(vec![b'a'; 64]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(resp.headers()["x-request-id"], "big-1");
}

#[tokio::test]
async fn unknown_path_is_a_problem_not_found() {
    let app = single_tenant(ApiGatewayConfig::default(), tenant(&[]));

    let resp = app
        .oneshot(
            Request::get("/nowhere")
                .header("x-request-id", "nf-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["request_id"], "nf-1");
}
