//! Bodies that are checked before reaching the handlers

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::errors::{ErrorCode, ErrorResponse, ServerError};

/// A body that can be checked, and normalized, after deserialization
pub trait Validate: Sized {
    type Error: ServerError;

    fn validate(self) -> Result<Self, Self::Error>;
}

/// A JSON body that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valid<T>(pub T);

#[derive(Debug, Error)]
pub enum BodyRejection<E> {
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error(transparent)]
    Invalid(E),
}

impl<E: ServerError + 'static> ServerError for BodyRejection<E> {
    fn error_code(&self) -> ErrorCode {
        match self {
            BodyRejection::Json(rejection) => rejection.error_code(),
            BodyRejection::Invalid(err) => err.error_code(),
        }
    }
}

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
    T::Error: 'static,
{
    type Rejection = ErrorResponse<BodyRejection<T::Error>>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(BodyRejection::Json)?;
        body.validate()
            .map(Valid)
            .map_err(|err| ErrorResponse(BodyRejection::Invalid(err)))
    }
}
