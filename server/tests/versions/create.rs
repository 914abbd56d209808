use axum::http::StatusCode;
use serde_json::{json, Value};
use test_log::test;
use versions_server_dtos::errors::ErrorCode;

use crate::infrastructure::{assert_error, Infrastructure};

#[test(tokio::test)]
async fn should_create_a_version() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let response = infrastructure
                .server()
                .post("/versions")
                .json(&json!({
                    "name": "v1.0",
                    "description": "First release",
                    "release_date": "2024-03-01",
                    "deprecation_date": "2025-03-01",
                }))
                .expect_success()
                .await;

            response.assert_status(StatusCode::CREATED);
            response.assert_json_contains(&json!({
                "name": "v1.0",
                "description": "First release",
                "release_date": "2024-03-01",
                "deprecation_date": "2025-03-01",
            }));

            assert_eq!(infrastructure.list().await.len(), 1);
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_normalize_the_text() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let created = infrastructure
                .create_from(json!({ "name": "  v1.0\n", "description": " \t " }))
                .await;

            assert_eq!(created.name, "v1.0");
            assert_eq!(created.description, None);
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_refuse_duplicate_names() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            infrastructure.create("v1.0").await;

            let response = infrastructure
                .server()
                .post("/versions")
                .json(&json!({ "name": " v1.0 " }))
                .expect_failure()
                .await;

            assert_error(
                &response,
                StatusCode::BAD_REQUEST,
                ErrorCode::VersionNameAlreadyExists,
            );
            assert_eq!(infrastructure.list().await.len(), 1);
        })
    })
    .await;
}

async fn assert_rejected(infrastructure: &Infrastructure, body: Value, code: ErrorCode) {
    let response = infrastructure
        .server()
        .post("/versions")
        .json(&body)
        .expect_failure()
        .await;

    assert_error(&response, StatusCode::BAD_REQUEST, code);
    assert!(
        infrastructure.list().await.is_empty(),
        "an invalid version was stored"
    );
}

#[test(tokio::test)]
async fn should_validate_the_body() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            assert_rejected(
                infrastructure,
                json!({ "name": "   " }),
                ErrorCode::BlankVersionName,
            )
            .await;
            assert_rejected(
                infrastructure,
                json!({ "name": "v1\nv2" }),
                ErrorCode::VersionNameContainsNewline,
            )
            .await;
            assert_rejected(
                infrastructure,
                json!({ "name": "v".repeat(256) }),
                ErrorCode::VersionNameTooLong,
            )
            .await;
            assert_rejected(
                infrastructure,
                json!({ "name": "v1.0", "description": "d".repeat(4097) }),
                ErrorCode::VersionDescriptionTooLong,
            )
            .await;
            assert_rejected(
                infrastructure,
                json!({
                    "name": "v1.0",
                    "release_date": "2024-03-01",
                    "deprecation_date": "2024-02-29",
                }),
                ErrorCode::DeprecatedBeforeRelease,
            )
            .await;
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_refuse_malformed_json() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            assert_rejected(
                infrastructure,
                json!({ "description": "no name" }),
                ErrorCode::InvalidJson,
            )
            .await;
            assert_rejected(
                infrastructure,
                json!({ "name": "v1.0", "release_date": "yesterday" }),
                ErrorCode::InvalidJson,
            )
            .await;
        })
    })
    .await;
}
