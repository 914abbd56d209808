//! # `/versions`: Versions
//!
//! Management of the stored versions: listing, lookup, creation, full
//! replacement, deletion and fulltext search.

use axum::{
    debug_handler,
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    DeleteResult, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use versions_server_dtos::{
    errors::ErrorResponseDto,
    valid::Valid,
    version::{
        VersionCreateError, VersionCreatedDto, VersionDeleteError, VersionGetError, VersionInDto,
        VersionListError, VersionOutDto, VersionPathData, VersionSearchError,
        VersionSearchParams, VersionUpdateError,
    },
};
use versions_server_entities::{
    prelude::Version,
    version::{self, VersionId},
};

/// Check if a version other than `except` is already named `name`
async fn name_taken<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<VersionId>,
) -> Result<bool, DbErr> {
    let mut query = Version::find().filter(version::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(version::Column::Id.ne(id));
    }
    Ok(query.count(conn).await? > 0)
}

/// Escape the wildcards of a `LIKE` pattern, using `\` as the escape character
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Every whitespace separated term of `text` must appear in the name or in the description
fn search_condition(text: &str) -> Condition {
    text.split_whitespace()
        .fold(Condition::all(), |condition, term| {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            let contains = |column: version::Column| {
                Expr::expr(Func::lower(Expr::col(column)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            condition.add(
                Condition::any()
                    .add(contains(version::Column::Name))
                    .add(contains(version::Column::Description)),
            )
        })
}

#[utoipa::path(
    get, path = "/",
    responses(
        (status = OK, description = "All the versions, ordered by id", body = [VersionOutDto]),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponseDto),
    )
)]
#[debug_handler(state = crate::app::App)]
/// List all versions
async fn version_list(
    State(db): State<DatabaseConnection>,
) -> Result<Json<Vec<VersionOutDto>>, VersionListError> {
    let versions = Version::find()
        .order_by_asc(version::Column::Id)
        .all(&db)
        .await?;
    Ok(Json(versions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post, path = "/",
    request_body = VersionInDto,
    responses(
        (status = CREATED, description = "The version was created", body = VersionOutDto),
        (status = BAD_REQUEST, description = "Invalid version, or name already in use", body = ErrorResponseDto),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponseDto),
    )
)]
#[debug_handler(state = crate::app::App)]
/// Create a version
///
/// The name must not be used by any other version.
async fn version_create(
    State(db): State<DatabaseConnection>,
    Valid(dto): Valid<VersionInDto>,
) -> Result<VersionCreatedDto, VersionCreateError> {
    let txn = db.begin().await?;

    if name_taken(&txn, &dto.name, None).await? {
        return Err(VersionCreateError::NameAlreadyExists { name: dto.name });
    }

    let name = dto.name.clone();
    let created = version::ActiveModel::from(dto)
        .insert(&txn)
        .await
        .map_err(|err| VersionCreateError::from_write(err, &name))?;

    txn.commit().await?;
    tracing::info!(id = created.id, %name, "Created version");
    Ok(VersionCreatedDto(created.into()))
}

#[utoipa::path(
    get, path = "/{id}",
    params(VersionPathData),
    responses(
        (status = OK, description = "The requested version", body = VersionOutDto),
        (status = NOT_FOUND, description = "No version with this id", body = ErrorResponseDto),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponseDto),
    )
)]
#[debug_handler(state = crate::app::App)]
/// Get a version
async fn version_get(
    State(db): State<DatabaseConnection>,
    VersionPathData { id }: VersionPathData,
) -> Result<VersionOutDto, VersionGetError> {
    match Version::find_by_id(id).one(&db).await? {
        Some(found) => Ok(found.into()),
        None => Err(VersionGetError::NotFound(id)),
    }
}

#[utoipa::path(
    put, path = "/{id}",
    params(VersionPathData),
    request_body = VersionInDto,
    responses(
        (status = OK, description = "The updated version", body = VersionOutDto),
        (status = BAD_REQUEST, description = "Invalid version, or name used by another version", body = ErrorResponseDto),
        (status = NOT_FOUND, description = "No version with this id", body = ErrorResponseDto),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponseDto),
    )
)]
#[debug_handler(state = crate::app::App)]
/// Replace a version
///
/// All the fields are overwritten: the optional ones that are not given are cleared.
/// Keeping the current name is allowed, taking the name of another version is not.
async fn version_update(
    State(db): State<DatabaseConnection>,
    VersionPathData { id }: VersionPathData,
    Valid(dto): Valid<VersionInDto>,
) -> Result<VersionOutDto, VersionUpdateError> {
    let txn = db.begin().await?;

    if Version::find_by_id(id).one(&txn).await?.is_none() {
        return Err(VersionUpdateError::NotFound(id));
    }
    if name_taken(&txn, &dto.name, Some(id)).await? {
        return Err(VersionUpdateError::NameAlreadyExists { name: dto.name });
    }

    let name = dto.name.clone();
    let mut model = version::ActiveModel::from(dto);
    model.id = Set(id);
    let updated = model
        .update(&txn)
        .await
        .map_err(|err| VersionUpdateError::from_write(err, &name))?;

    txn.commit().await?;
    tracing::info!(id, %name, "Updated version");
    Ok(updated.into())
}

#[utoipa::path(
    delete, path = "/{id}",
    params(VersionPathData),
    responses(
        (status = NO_CONTENT, description = "The version was deleted"),
        (status = NOT_FOUND, description = "No version with this id", body = ErrorResponseDto),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponseDto),
    )
)]
#[debug_handler(state = crate::app::App)]
/// Delete a version
async fn version_delete(
    State(db): State<DatabaseConnection>,
    VersionPathData { id }: VersionPathData,
) -> Result<StatusCode, VersionDeleteError> {
    match Version::delete_by_id(id).exec(&db).await? {
        DeleteResult { rows_affected: 0 } => Err(VersionDeleteError::NotFound(id)),
        DeleteResult { rows_affected: _ } => {
            tracing::info!(id, "Deleted version");
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

#[utoipa::path(
    get, path = "/search",
    params(VersionSearchParams),
    responses(
        (status = OK, description = "The matching versions, ordered by id", body = [VersionOutDto]),
        (status = BAD_REQUEST, description = "Missing search text", body = ErrorResponseDto),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponseDto),
    )
)]
#[debug_handler(state = crate::app::App)]
/// Search the versions
///
/// The text is split on whitespace, and a version matches if every piece
/// appears in its name or description, ignoring case. A blank text matches
/// every version.
async fn version_search(
    State(db): State<DatabaseConnection>,
    VersionSearchParams { text }: VersionSearchParams,
) -> Result<Json<Vec<VersionOutDto>>, VersionSearchError> {
    let versions = Version::find()
        .filter(search_condition(&text))
        .order_by_asc(version::Column::Id)
        .all(&db)
        .await?;
    Ok(Json(versions.into_iter().map(Into::into).collect()))
}

pub(super) fn router<S: Clone + Send + Sync + 'static>() -> OpenApiRouter<S>
where
    DatabaseConnection: FromRef<S>,
{
    let mut router =
        OpenApiRouter::with_openapi(versions_server_dtos::version::ApiComponents::openapi())
            .routes(routes!(version_list, version_create))
            .routes(routes!(version_search))
            .routes(routes!(version_get, version_update, version_delete));

    super::tag_api(router.get_openapi_mut(), "Versions");

    router
}
