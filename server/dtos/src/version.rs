use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        FromRequestParts,
    },
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use derive_more::derive::From;
use http::StatusCode;
use sea_orm::{ActiveValue::NotSet, DbErr, Set, SqlErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, OpenApi, ToSchema};

use versions_server_entities::version::{self, VersionId};

use crate::{
    errors::{ErrorCode, ErrorResponse, ErrorResponseDto, ServerError},
    valid::Validate,
};

/// Maximum length of a version name, in characters
pub const NAME_MAX_LEN: usize = 255;
/// Maximum length of a version description, in characters
pub const DESCRIPTION_MAX_LEN: usize = 4096;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
/// Content of a version, as sent by the client
///
/// Used both for creation and full replacement. Optional fields that are
/// missing or `null` are stored as absent.
pub struct VersionInDto {
    /// Name of the version
    ///
    /// Must be unique, cannot be blank or contain newlines
    pub name: String,
    /// Free text description
    #[serde(default)]
    pub description: Option<String>,
    /// Day of the release
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Day of the deprecation, cannot precede the release
    #[serde(default)]
    pub deprecation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionValidationError {
    #[error("The version name cannot be blank")]
    BlankName,
    #[error("The version name cannot contain newlines")]
    NameContainsNewline,
    #[error("The version name is {len} characters long, the maximum is {max}", max = NAME_MAX_LEN)]
    NameTooLong { len: usize },
    #[error(
        "The version description is {len} characters long, the maximum is {max}",
        max = DESCRIPTION_MAX_LEN
    )]
    DescriptionTooLong { len: usize },
    #[error("The version is deprecated on {deprecation}, before its release on {release}")]
    DeprecatedBeforeRelease {
        release: NaiveDate,
        deprecation: NaiveDate,
    },
}

impl ServerError for VersionValidationError {
    fn error_code(&self) -> ErrorCode {
        match self {
            VersionValidationError::BlankName => ErrorCode::BlankVersionName,
            VersionValidationError::NameContainsNewline => ErrorCode::VersionNameContainsNewline,
            VersionValidationError::NameTooLong { .. } => ErrorCode::VersionNameTooLong,
            VersionValidationError::DescriptionTooLong { .. } => {
                ErrorCode::VersionDescriptionTooLong
            }
            VersionValidationError::DeprecatedBeforeRelease { .. } => {
                ErrorCode::DeprecatedBeforeRelease
            }
        }
    }
}

impl Validate for VersionInDto {
    type Error = VersionValidationError;

    fn validate(self) -> Result<Self, Self::Error> {
        let Self {
            name,
            description,
            release_date,
            deprecation_date,
        } = self;

        let name = name.trim();
        if name.is_empty() {
            return Err(VersionValidationError::BlankName);
        }
        if name.contains(['\n', '\r']) {
            return Err(VersionValidationError::NameContainsNewline);
        }
        let len = name.chars().count();
        if len > NAME_MAX_LEN {
            return Err(VersionValidationError::NameTooLong { len });
        }

        let description = description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);
        if let Some(len) = description
            .as_deref()
            .map(|d| d.chars().count())
            .filter(|&len| len > DESCRIPTION_MAX_LEN)
        {
            return Err(VersionValidationError::DescriptionTooLong { len });
        }

        if let (Some(release), Some(deprecation)) = (release_date, deprecation_date) {
            if deprecation < release {
                return Err(VersionValidationError::DeprecatedBeforeRelease {
                    release,
                    deprecation,
                });
            }
        }

        Ok(Self {
            name: name.to_owned(),
            description,
            release_date,
            deprecation_date,
        })
    }
}

impl From<VersionInDto> for version::ActiveModel {
    fn from(
        VersionInDto {
            name,
            description,
            release_date,
            deprecation_date,
        }: VersionInDto,
    ) -> Self {
        version::ActiveModel {
            id: NotSet,
            name: Set(name),
            description: Set(description),
            release_date: Set(release_date),
            deprecation_date: Set(deprecation_date),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
/// A stored version
pub struct VersionOutDto {
    /// Identifier of the version
    pub id: VersionId,
    /// Unique name of the version
    pub name: String,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub deprecation_date: Option<NaiveDate>,
}

impl From<version::Model> for VersionOutDto {
    fn from(
        version::Model {
            id,
            name,
            description,
            release_date,
            deprecation_date,
        }: version::Model,
    ) -> Self {
        Self {
            id,
            name,
            description,
            release_date,
            deprecation_date,
        }
    }
}

impl IntoResponse for VersionOutDto {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

/// A version that was just created
#[derive(Clone, Debug, PartialEq, Eq, From)]
pub struct VersionCreatedDto(pub VersionOutDto);

impl IntoResponse for VersionCreatedDto {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, self.0).into_response()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, FromRequestParts, IntoParams)]
#[from_request(via(axum::extract::Path), rejection(ErrorResponse<PathRejection>))]
#[into_params(parameter_in = Path)]
pub struct VersionPathData {
    /// Identifier of the version
    pub id: VersionId,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, FromRequestParts, IntoParams)]
#[from_request(via(axum::extract::Query), rejection(ErrorResponse<QueryRejection>))]
#[into_params(parameter_in = Query)]
pub struct VersionSearchParams {
    /// Whitespace separated terms, all of them must appear in the name or the description
    pub text: String,
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionListError {
    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionGetError {
    #[error("No version with id {0}")]
    NotFound(VersionId),
    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionCreateError {
    #[error("A version named {name:?} already exists")]
    NameAlreadyExists { name: String },
    #[error("Internal server error")]
    InternalServerError,
}

impl VersionCreateError {
    /// Map an error from the insertion of a version named `name`
    pub fn from_write(err: DbErr, name: &str) -> Self {
        if is_unique_violation(&err) {
            Self::NameAlreadyExists {
                name: name.to_owned(),
            }
        } else {
            err.into()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionUpdateError {
    #[error("No version with id {0}")]
    NotFound(VersionId),
    #[error("Another version named {name:?} already exists")]
    NameAlreadyExists { name: String },
    #[error("Internal server error")]
    InternalServerError,
}

impl VersionUpdateError {
    /// Map an error from the renaming of a version to `name`
    pub fn from_write(err: DbErr, name: &str) -> Self {
        if is_unique_violation(&err) {
            Self::NameAlreadyExists {
                name: name.to_owned(),
            }
        } else {
            err.into()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionDeleteError {
    #[error("No version with id {0}")]
    NotFound(VersionId),
    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionSearchError {
    #[error("Internal server error")]
    InternalServerError,
}

/// Implement the response machinery shared by all the operation errors
macro_rules! operation_error {
    ($($error:ident { $($variant:ident => $code:ident),* $(,)? })*) => {$(
        impl ServerError for $error {
            fn error_code(&self) -> ErrorCode {
                match self {
                    $($error::$variant { .. } => ErrorCode::$code,)*
                }
            }
        }

        impl IntoResponse for $error {
            fn into_response(self) -> axum::response::Response {
                ErrorResponse(self).into_response()
            }
        }

        impl From<DbErr> for $error {
            fn from(value: DbErr) -> Self {
                crate::internal_server_error(&value);
                Self::InternalServerError
            }
        }
    )*};
}

operation_error! {
    VersionListError {
        InternalServerError => InternalServerError,
    }
    VersionGetError {
        NotFound => VersionNotFound,
        InternalServerError => InternalServerError,
    }
    VersionCreateError {
        NameAlreadyExists => VersionNameAlreadyExists,
        InternalServerError => InternalServerError,
    }
    VersionUpdateError {
        NotFound => VersionNotFound,
        NameAlreadyExists => VersionNameAlreadyExists,
        InternalServerError => InternalServerError,
    }
    VersionDeleteError {
        NotFound => VersionNotFound,
        InternalServerError => InternalServerError,
    }
    VersionSearchError {
        InternalServerError => InternalServerError,
    }
}

#[derive(OpenApi)]
#[openapi(components(schemas(VersionInDto, VersionOutDto, ErrorResponseDto, ErrorCode)))]
pub struct ApiComponents;
