use reqwest::StatusCode;
use serde_json::Value;

use crate::{GatewayError, GatewayRestError};

/// Result of a dispatch that reached the gateway and was not rejected.
///
/// Unexpected statuses are reported through
/// [`GatewayError::Rest`](crate::GatewayError::Rest) instead, so a value of this
/// type is always either a payload or a plain absence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// 2xx response with its payload.
    Success(T),
    /// 404 response.
    NotFound,
}

impl<T> Outcome<T> {
    /// Returns `true` for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for [`Outcome::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Converts into an `Option`, mapping `NotFound` to `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::NotFound => None,
        }
    }

    /// Borrows the payload, if any.
    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::NotFound => Outcome::NotFound,
        }
    }

    /// Maps the success payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::NotFound => Outcome::NotFound,
        }
    }

    /// Maps the success payload with a fallible function.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Outcome<U>, E> {
        match self {
            Self::Success(value) => f(value).map(Outcome::Success),
            Self::NotFound => Ok(Outcome::NotFound),
        }
    }
}

impl<T> From<Outcome<T>> for Option<T> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_option()
    }
}

/// Classifies a response by status.
///
/// 2xx yields the body, 404 yields [`Outcome::NotFound`], anything else is a
/// [`GatewayRestError`] holding the status and the raw body.
pub fn classify(status: StatusCode, body: Vec<u8>) -> Result<Outcome<Vec<u8>>, GatewayRestError> {
    if status == StatusCode::NOT_FOUND {
        tracing::debug!("Gateway returned 404, treating as not found");
        return Ok(Outcome::NotFound);
    }

    if status.is_success() {
        return Ok(Outcome::Success(body));
    }

    tracing::error!("Unexpected status code {} was returned", status.as_u16());
    Err(GatewayRestError {
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Classifies a response and decodes a successful body as JSON.
///
/// Empty (or whitespace-only) success bodies decode to [`Value::Null`].
pub fn classify_json(status: StatusCode, body: Vec<u8>) -> Result<Outcome<Value>, GatewayError> {
    classify(status, body)?.try_map(|payload| decode_payload(&payload))
}

fn decode_payload(payload: &[u8]) -> Result<Value, GatewayError> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        Ok(Value::Null)
    } else {
        Ok(serde_json::from_slice(payload)?)
    }
}
