use axum::http::StatusCode;
use serde_json::json;
use test_log::test;

use crate::infrastructure::Infrastructure;

#[test(tokio::test)]
async fn should_be_empty_at_start() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let response = infrastructure
                .server()
                .get("/versions")
                .expect_success()
                .await;

            response.assert_status(StatusCode::OK);
            response.assert_json(&json!([]));
        })
    })
    .await;
}

#[test(tokio::test)]
async fn should_list_every_version_by_id() {
    Infrastructure::with(|infrastructure| {
        Box::pin(async move {
            let created = [
                infrastructure.create("v1.0").await,
                infrastructure.create("v2.0").await,
                infrastructure.create("v1.1").await,
            ];

            let listed = infrastructure.list().await;

            assert_eq!(listed.len(), created.len());
            assert_eq!(listed, created);
            assert!(listed.windows(2).all(|pair| pair[0].id < pair[1].id));
        })
    })
    .await;
}
