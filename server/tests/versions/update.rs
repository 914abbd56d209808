use axum::http::StatusCode;
use serde_json::json;
use test_log::test;
use versions_server_dtos::{errors::ErrorCode, version::VersionOutDto};

use crate::infrastructure::{assert_error, Infrastructure};

#[test(tokio::test)]
async fn should_replace_the_version() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let version = infrastructure
                .create_from(json!({
                    "name": "v1.0",
                    "description": "First release",
                    "release_date": "2024-03-01",
                }))
                .await;

            let response = infrastructure
                .server()
                .put(&format!("/versions/{}", version.id))
                .json(&json!({
                    "name": "v1.0.1",
                    "deprecation_date": "2024-06-01",
                }))
                .expect_success()
                .await;

            response.assert_status(StatusCode::OK);
            let expected = json!({
                "id": version.id,
                "name": "v1.0.1",
                "description": null,
                "release_date": null,
                "deprecation_date": "2024-06-01",
            });
            response.assert_json(&expected);

            infrastructure
                .server()
                .get(&format!("/versions/{}", version.id))
                .await
                .assert_json(&expected);
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_follow_the_naming_rules() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let first = infrastructure.create("v1.0").await;
            let second = infrastructure.create("v2.0").await;

            // taking the name of another version
            let response = infrastructure
                .server()
                .put(&format!("/versions/{}", first.id))
                .json(&json!({ "name": "v2.0" }))
                .expect_failure()
                .await;
            assert_error(
                &response,
                StatusCode::BAD_REQUEST,
                ErrorCode::VersionNameAlreadyExists,
            );
            assert_eq!(infrastructure.list().await, [first.clone(), second.clone()]);

            // renaming to a free name
            let response = infrastructure
                .server()
                .put(&format!("/versions/{}", first.id))
                .json(&json!({ "name": "v1.1" }))
                .expect_success()
                .await;
            response.assert_status(StatusCode::OK);
            response.assert_json_contains(&json!({ "id": first.id, "name": "v1.1" }));

            // the other version is untouched
            infrastructure
                .server()
                .get(&format!("/versions/{}", second.id))
                .expect_success()
                .await
                .assert_json_contains(&json!({ "id": second.id, "name": "v2.0" }));

            infrastructure
                .server()
                .delete(&format!("/versions/{}", second.id))
                .expect_success()
                .await;
            let response = infrastructure
                .server()
                .get(&format!("/versions/{}", second.id))
                .expect_failure()
                .await;
            assert_error(&response, StatusCode::NOT_FOUND, ErrorCode::VersionNotFound);
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_allow_keeping_the_name() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let version = infrastructure.create("v1.0").await;

            let updated: VersionOutDto = infrastructure
                .server()
                .put(&format!("/versions/{}", version.id))
                .json(&json!({ "name": "v1.0", "description": "Now described" }))
                .expect_success()
                .await
                .json();

            assert_eq!(updated.name, "v1.0");
            assert_eq!(updated.description.as_deref(), Some("Now described"));
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_not_find_missing_ids() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let version = infrastructure.create("v1.0").await;

            let response = infrastructure
                .server()
                .put(&format!("/versions/{}", version.id + 1))
                .json(&json!({ "name": "v1.1" }))
                .expect_failure()
                .await;

            assert_error(&response, StatusCode::NOT_FOUND, ErrorCode::VersionNotFound);
            assert_eq!(infrastructure.list().await, [version]);
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_validate_before_anything_else() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let version = infrastructure.create("v1.0").await;

            // the id does not exist, but the body is checked first
            let response = infrastructure
                .server()
                .put(&format!("/versions/{}", version.id + 1))
                .json(&json!({ "name": "" }))
                .expect_failure()
                .await;
            assert_error(&response, StatusCode::BAD_REQUEST, ErrorCode::BlankVersionName);

            let response = infrastructure
                .server()
                .put(&format!("/versions/{}", version.id))
                .json(&json!({
                    "name": "v1.0",
                    "release_date": "2024-03-01",
                    "deprecation_date": "2024-01-01",
                }))
                .expect_failure()
                .await;
            assert_error(
                &response,
                StatusCode::BAD_REQUEST,
                ErrorCode::DeprecatedBeforeRelease,
            );

            assert_eq!(infrastructure.list().await, [version]);
        })
    })
    .await;
}
