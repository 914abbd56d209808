use axum::extract::FromRef;
use sea_orm::DatabaseConnection;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

mod versions;

#[derive(OpenApi)]
struct Api;

pub(super) fn router<S: Clone + Send + Sync + 'static>() -> OpenApiRouter<S>
where
    DatabaseConnection: FromRef<S>,
{
    OpenApiRouter::with_openapi(Api::openapi()).nest("/versions", versions::router())
}

/// Tag all the paths of an api
fn tag_api(openapi: &mut utoipa::openapi::OpenApi, tag: &str) {
    for path in openapi.paths.paths.values_mut() {
        for op in [
            &mut path.get,
            &mut path.head,
            &mut path.trace,
            &mut path.put,
            &mut path.post,
            &mut path.patch,
            &mut path.delete,
        ]
        .into_iter()
        .flatten()
        {
            op.tags.get_or_insert_default().push(tag.to_string());
        }
    }
}
