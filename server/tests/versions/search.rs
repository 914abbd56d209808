use axum::http::StatusCode;
use test_log::test;
use versions_server_dtos::{errors::ErrorCode, version::VersionOutDto};

use crate::infrastructure::{assert_error, Infrastructure};

async fn search(infrastructure: &Infrastructure, text: &str) -> Vec<String> {
    infrastructure
        .server()
        .get("/versions/search")
        .add_query_param("text", text)
        .expect_success()
        .await
        .json::<Vec<VersionOutDto>>()
        .into_iter()
        .map(|version| version.name)
        .collect()
}

#[test(tokio::test)]
async fn should_match_name_and_description() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            infrastructure
                .create_described("v1.0", "Stable release")
                .await;
            infrastructure.create_described("v2.0-beta", "Preview").await;
            infrastructure
                .create_described("v2.0", "Stable, replaces the beta")
                .await;

            assert_eq!(search(infrastructure, "beta").await, ["v2.0-beta", "v2.0"]);
            assert_eq!(search(infrastructure, "STABLE").await, ["v1.0", "v2.0"]);
            assert_eq!(search(infrastructure, "preview").await, ["v2.0-beta"]);
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_require_every_term() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            infrastructure
                .create_described("v1.0", "Stable release")
                .await;
            infrastructure
                .create_described("v2.0", "Stable, replaces the beta")
                .await;

            assert_eq!(search(infrastructure, "stable  beta").await, ["v2.0"]);
            assert_eq!(search(infrastructure, "v1 beta").await, Vec::<String>::new());
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_return_everything_for_blank_text() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            infrastructure.create("v1.0").await;
            infrastructure.create("v2.0").await;

            assert_eq!(search(infrastructure, "").await, ["v1.0", "v2.0"]);
            assert_eq!(search(infrastructure, "   ").await, ["v1.0", "v2.0"]);
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_return_nothing_when_nothing_matches() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            infrastructure.create("v1.0").await;

            let response = infrastructure
                .server()
                .get("/versions/search")
                .add_query_param("text", "nightly")
                .expect_success()
                .await;

            response.assert_status(StatusCode::OK);
            assert!(response.json::<Vec<VersionOutDto>>().is_empty());
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_match_wildcards_literally() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            infrastructure.create("v1.0").await;
            infrastructure.create("v1_0").await;
            infrastructure.create("100% stable").await;

            assert_eq!(search(infrastructure, "_").await, ["v1_0"]);
            assert_eq!(search(infrastructure, "%").await, ["100% stable"]);
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_require_the_text() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let response = infrastructure
                .server()
                .get("/versions/search")
                .expect_failure()
                .await;

            assert_error(&response, StatusCode::BAD_REQUEST, ErrorCode::InvalidQuery);
        })
    })
    .await;
}
