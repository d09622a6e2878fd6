use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ClientError;

/// Body of a response with a non-success status.
///
/// `error_code` is never read from the body, the dispatcher fills it in with
/// the real HTTP status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "is_zero")]
    pub error_code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiError>,
}

/// A single problem reported by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ErrorResponse {
    /// Decode an error body and stamp it with the status it arrived with.
    /// A literal `null` body decodes to an empty response.
    pub fn from_body(status: u16, body: &[u8]) -> serde_json::Result<Self> {
        let mut response =
            serde_json::from_slice::<Option<ErrorResponse>>(body)?.unwrap_or_default();
        response.error_code = status;
        Ok(response)
    }

    /// Only the first entry survives; the rest are dropped.
    pub fn into_error(self) -> ClientError {
        let status = self.error_code;
        match self.errors.into_iter().next() {
            Some(error) => ClientError::Api { status, error },
            None => ClientError::UnknownApi { status },
        }
    }
}

fn is_zero(code: &u16) -> bool {
    *code == 0
}

// Both wire types only decode from JSON objects. Keys match case-insensitively,
// unknown keys are skipped, null values leave the default, and a repeated key
// overwrites the earlier one.

impl<'de> Deserialize<'de> for ErrorResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ErrorResponseVisitor)
    }
}

struct ErrorResponseVisitor;

impl<'de> Visitor<'de> for ErrorResponseVisitor {
    type Value = ErrorResponse;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an error response object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut errors = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("errors") {
                errors = map.next_value::<Option<Vec<ApiError>>>()?.unwrap_or_default();
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(ErrorResponse {
            error_code: 0,
            errors,
        })
    }
}

impl<'de> Deserialize<'de> for ApiError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ApiErrorVisitor)
    }
}

struct ApiErrorVisitor;

impl<'de> Visitor<'de> for ApiErrorVisitor {
    type Value = ApiError;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an API error object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut error = ApiError::default();
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("field") {
                error.field = map.next_value::<Option<String>>()?;
            } else if key.eq_ignore_ascii_case("message") {
                error.message = map.next_value::<Option<String>>()?.unwrap_or_default();
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(error)
    }
}
