//! Request and response bodies of the `web` module, and the validation of submitted emails.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable Submission
/// A Submission that can be Deserialized but can have a missing or invalid email
#[derive(Debug, Deserialize)]
pub struct DeserSubmission {
    #[serde(default)]
    pub email: Option<String>,
}

/// Only a JSON object is a submission.
/// The derived `Deserialize` would also fill the struct from a sequence like `["a@b.com"]`.
impl TryFrom<Value> for DeserSubmission {
    type Error = DataParsingError;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        if !body.is_object() {
            return Err(DataParsingError::BodyNotObject);
        }

        serde_json::from_value(body).map_err(|ex| DataParsingError::BodyInvalid(ex.to_string()))
    }
}

/// Validated Submission Email
/// Surrounding whitespace is trimmed, nothing else about the address is changed.
#[derive(Debug, Clone)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    pub const MAX_GRAPHEMES: usize = 256;

    /// Accepts anything non-empty that contains an `@`.
    /// There is deliberately no further format or domain validation.
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim();

        if value.is_empty() {
            return Err(DataParsingError::EmailEmpty);
        }

        if value.graphemes(true).count() > Self::MAX_GRAPHEMES {
            return Err(DataParsingError::EmailTooLong);
        }

        if !value.contains('@') {
            return Err(DataParsingError::EmailMissingAt);
        }

        Ok(ValidEmail(value.to_owned()))
    }

    /// The form that gets persisted. Two submissions with the same normalized
    /// email are the same waitlist entry.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl TryFrom<DeserSubmission> for ValidEmail {
    type Error = DataParsingError;

    fn try_from(deser_sub: DeserSubmission) -> Result<Self, Self::Error> {
        let email = deser_sub.email.ok_or(DataParsingError::EmailMissing)?;
        ValidEmail::parse(email)
    }
}

/// The body of a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SubmitResponse {
    pub fn success(url: Option<String>) -> Self {
        Self {
            message: "Success",
            url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub env: PingEnv,
}

#[derive(Debug, Serialize)]
pub struct PingEnv {
    pub has_token: bool,
    pub store: String,
    pub version: &'static str,
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("request body could not be read: {0}")]
    BodyInvalid(String),
    #[error("request body is not a JSON object")]
    BodyNotObject,

    #[error("missing email")]
    EmailMissing,
    #[error("email empty")]
    EmailEmpty,
    #[error("email missing '@'")]
    EmailMissingAt,
    #[error("email too long")]
    EmailTooLong,
}
