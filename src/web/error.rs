use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use crate::store::StoreError;

use super::data::DataParsingError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::MethodNotAllowed(_) => (StatusCode::METHOD_NOT_ALLOWED, MethodNotAllowed),
            Error::DataParsing(_) => (StatusCode::BAD_REQUEST, InvalidEmail),
            Error::Store(store_er) if store_er.is_configuration() => {
                (StatusCode::INTERNAL_SERVER_ERROR, StoreNotConfigured)
            }
            Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, StoreFailure),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the caller gets to see. The `AsRefStr` form is the stable error code.
#[derive(Debug, AsRefStr, derive_more::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientError {
    #[display("Method not allowed")]
    MethodNotAllowed,
    #[display("Valid email is required")]
    InvalidEmail,
    #[display("Store is not configured")]
    StoreNotConfigured,
    #[display("Failed to store submission")]
    StoreFailure,
}
