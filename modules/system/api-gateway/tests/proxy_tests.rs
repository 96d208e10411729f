#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Full-stack proxying against a fake provider.

mod common;

use api_gateway::ApiGatewayConfig;
use axum::body::Body;
use http::{Request, StatusCode};
use httpmock::prelude::*;
use serde_json::json;
use tower::ServiceExt;

use common::{SITE_SECRET, client_token, json_body, single_tenant, text_body};

#[tokio::test]
async fn github_readme_round_trip() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/acme/site/contents/README.md")
                .header("authorization", "Bearer gh-token");
            then.status(200)
                .header("content-type", "application/json")
                .header(
                    "link",
                    format!(
                        "<{}/repos/acme/site/contents?page=2>; rel=\"next\"",
                        server.base_url()
                    ),
                )
                .json_body(json!({ "name": "README.md", "content": "IyBBY21l" }));
        })
        .await;

    let app = single_tenant(
        ApiGatewayConfig::default(),
        json!({
            "jwt": { "secret": SITE_SECRET },
            "github": {
                "access_token": "gh-token",
                "endpoint": server.base_url(),
                "repo": "acme/site"
            },
            "roles": ["admin"]
        }),
    );
    let token = client_token(SITE_SECRET, &["admin"]);

    let resp = app
        .oneshot(
            Request::get("/github/contents/README.md")
                .header("authorization", format!("Bearer {token}"))
                .header("origin", "https://cms.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["link"], "</contents?page=2>; rel=\"next\"");
    // The gateway's own CORS policy replaces the provider's.
    assert_eq!(
        resp.headers()["access-control-allow-origin"],
        "https://cms.example.com"
    );
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(json_body(resp).await["name"], "README.md");
    assert_eq!(upstream.hits_async().await, 1);
}

#[tokio::test]
async fn gitlab_encoded_path_is_preserved() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/projects/acme%2Fsite/repository/files/docs%2Findex.md")
                .header("authorization", "Bearer gl-oauth");
            then.status(200).body("ok");
        })
        .await;

    let app = single_tenant(
        ApiGatewayConfig::default(),
        json!({
            "jwt": { "secret": SITE_SECRET },
            "gitlab": {
                "access_token": "gl-oauth",
                "endpoint": server.base_url(),
                "repo": "acme/site"
            }
        }),
    );
    let token = client_token(SITE_SECRET, &[]);

    let resp = app
        .oneshot(
            Request::get("/gitlab/repository/files/docs%2Findex.md")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text_body(resp).await, "ok");
    assert_eq!(upstream.hits_async().await, 1);
}

#[tokio::test]
async fn unauthenticated_bitbucket_request_never_reaches_upstream() {
    let server = MockServer::start_async().await;
    let token_endpoint = server
        .mock_async(|when, then| {
            when.method(POST).path("/token");
            then.status(200)
                .json_body(json!({ "access_token": "bb", "expires_in": 3600 }));
        })
        .await;
    let upstream = server
        .mock_async(|when, then| {
            when.path("/repositories/acme/site/src/README.md");
            then.status(200);
        })
        .await;

    let app = single_tenant(
        ApiGatewayConfig::default(),
        json!({
            "jwt": { "secret": SITE_SECRET },
            "bitbucket": {
                "client_id": "cid",
                "refresh_token": "rt",
                "endpoint": server.base_url(),
                "token_url": server.url("/token"),
                "repo": "acme/site"
            }
        }),
    );

    let resp = app
        .oneshot(
            Request::get("/bitbucket/src/README.md")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(token_endpoint.hits_async().await, 0);
    assert_eq!(upstream.hits_async().await, 0);
}

#[tokio::test]
async fn unreachable_provider_is_bad_gateway() {
    let app = single_tenant(
        ApiGatewayConfig::default(),
        json!({
            "jwt": { "secret": SITE_SECRET },
            "github": {
                "access_token": "gh-token",
                "endpoint": "http://127.0.0.1:1",
                "repo": "acme/site"
            }
        }),
    );
    let token = client_token(SITE_SECRET, &[]);

    let resp = app
        .oneshot(
            Request::get("/github/pulls")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(resp).await;
    assert_eq!(body["detail"], "GitHub is unavailable");
    assert!(!body["detail"].as_str().unwrap().contains("127.0.0.1"));
}
