use axum::{
    extract::{rejection::JsonRejection, State},
    http::Method,
    Json,
};
use serde_json::Value;
use tracing::{info, Instrument};

use crate::{
    store::SubmissionRecord,
    web::{
        data::{DataParsingError, DeserSubmission, SubmitResponse, ValidEmail},
        Error, WebResult,
    },
    AppState,
};

/// Validates the submitted email and writes it to the waitlist store.
///
/// Anything that is not a JSON object with a string `email` is treated as a missing email.
/// Exactly one write is attempted per accepted request and none for rejected ones.
#[tracing::instrument(
    name = "Adding email to the waitlist",
    skip(app_state, payload),
    fields(store = %app_state.store.backend())
)]
pub async fn submit_email(
    State(app_state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> WebResult<Json<SubmitResponse>> {
    let Json(body) =
        payload.map_err(|rejection| DataParsingError::BodyInvalid(rejection.body_text()))?;
    let submission = DeserSubmission::try_from(body)?;
    let email = ValidEmail::try_from(submission)?;

    let record = SubmissionRecord::new(email.normalized());
    let q_span = tracing::info_span!("Writing submission to the store");
    let receipt = app_state.store.insert(&record).instrument(q_span).await?;

    if receipt.created {
        info!("New email successfully added to the waitlist.");
    } else {
        info!("Email was already on the waitlist, nothing written.");
    }

    Ok(Json(SubmitResponse::success(receipt.url)))
}

/// Every method on `/api/submit-email` other than `POST` (and the CORS handled `OPTIONS`).
pub async fn method_not_allowed(method: Method) -> WebResult<()> {
    Err(Error::MethodNotAllowed(method.to_string()))
}
