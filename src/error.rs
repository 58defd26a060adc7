use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Unexpected (non-2xx, non-404) status returned by the gateway.
///
/// Carries the status code and the raw response body so callers can
/// diagnose malformed requests or server-side failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayRestError {
    /// Status code of the response.
    pub status: StatusCode,
    /// Raw response body, lossily decoded as UTF-8.
    pub body: String,
}

impl GatewayRestError {
    /// Returns the status code as a plain integer.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Attempts to parse the raw body as JSON.
    ///
    /// Returns `None` when the body is empty or not JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

impl fmt::Display for GatewayRestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status code {}: {}", self.status.as_u16(), self.body)
    }
}

impl std::error::Error for GatewayRestError {}

/// Errors returned by gateway client operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Base URL is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Endpoint path could not be joined to the base URL.
    #[error("invalid endpoint path '{0}'")]
    InvalidPath(String),

    /// Method is not one of GET, POST, PUT, PATCH or DELETE.
    #[error("unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),

    /// A configured default header has an invalid name or value.
    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    /// A path template placeholder had no matching parameter.
    #[error("missing path parameter '{parameter}' for template '{template}'")]
    MissingPathParameter { template: String, parameter: String },

    /// HTTP transport-layer failure, passed through untouched.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A successful response body could not be parsed as JSON.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The gateway answered with an unexpected status.
    #[error(transparent)]
    Rest(#[from] GatewayRestError),
}

impl GatewayError {
    /// Returns the REST error when this is an unexpected-status failure.
    pub fn as_rest(&self) -> Option<&GatewayRestError> {
        match self {
            Self::Rest(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the transport error when the request never got a response.
    pub fn as_transport(&self) -> Option<&reqwest::Error> {
        match self {
            Self::Transport(error) => Some(error),
            _ => None,
        }
    }
}
