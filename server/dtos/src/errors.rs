use std::{
    error::Error,
    fmt::{self, Display},
};

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, FixedOffset};
use derive_more::derive::From;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;
use utoipa::ToSchema;

/// Error code of the versions server
#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize_repr, Deserialize_repr, ToSchema,
)]
#[repr(u16)]
pub enum ErrorCode {
    // -- GENERAL --
    /// Internal server error
    InternalServerError = 0,
    /// A JSON sent was found to be invalid
    InvalidJson = 1,
    /// A path could not be parsed
    InvalidPath = 2,
    /// The query string could not be parsed
    InvalidQuery = 3,

    // -- VERSIONS --
    /// No version has the requested id
    VersionNotFound = 100,
    /// Another version already has this name
    VersionNameAlreadyExists = 101,

    /// The version name is empty, or made only of whitespaces
    BlankVersionName = 110,
    /// The version name contains a line break
    VersionNameContainsNewline = 111,
    /// The version name is too long
    VersionNameTooLong = 112,
    /// The version description is too long
    VersionDescriptionTooLong = 113,
    /// The deprecation date comes before the release date
    DeprecatedBeforeRelease = 114,
}
impl ErrorCode {
    pub const fn status_code(self) -> StatusCode {
        match self {
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InvalidJson | ErrorCode::InvalidQuery => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidPath | ErrorCode::VersionNotFound => StatusCode::NOT_FOUND,
            ErrorCode::VersionNameAlreadyExists
            | ErrorCode::BlankVersionName
            | ErrorCode::VersionNameContainsNewline
            | ErrorCode::VersionNameTooLong
            | ErrorCode::VersionDescriptionTooLong
            | ErrorCode::DeprecatedBeforeRelease => StatusCode::BAD_REQUEST,
        }
    }
}

pub trait ServerError: Error {
    fn error_code(&self) -> ErrorCode;
}

impl ServerError for JsonRejection {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidJson
    }
}

impl ServerError for PathRejection {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidPath
    }
}

impl ServerError for QueryRejection {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidQuery
    }
}

/// Body of every error returned by the api
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponseDto {
    /// Machine readable code of the error
    pub code: ErrorCode,
    /// Human readable description of the error
    pub msg: String,
    /// When the error happened
    pub time: DateTime<FixedOffset>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, From)]
pub struct ErrorResponse<T>(pub T);

#[derive(Debug, Error)]
#[error("Internal server error")]
struct InternalServerError;

impl<T: ServerError> ErrorResponse<T> {
    pub fn dto(&self) -> ErrorResponseDto {
        let Self(inner) = self;
        let code = inner.error_code();
        // internal details are logged where the error is created, never sent
        let msg = if code == ErrorCode::InternalServerError {
            InternalServerError.to_string()
        } else {
            inner.to_string()
        };
        ErrorResponseDto {
            code,
            msg,
            time: chrono::Local::now().fixed_offset(),
        }
    }
}

impl<T: ServerError> Serialize for ErrorResponse<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.dto().serialize(serializer)
    }
}

impl<T: ServerError> IntoResponse for ErrorResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0.error_code().status_code(), Json(self)).into_response()
    }
}

/// Display an error followed by its chain of sources
pub struct ErrorChain<'e>(pub &'e (dyn Error + 'e));

impl Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, "\n  caused by: {err}")?;
            source = err.source();
        }
        Ok(())
    }
}
