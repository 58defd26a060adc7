use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use url::form_urlencoded::byte_serialize;

use crate::GatewayError;

/// HTTP methods accepted by the Airlock REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RestMethod {
    /// Uppercase method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestMethod {
    type Err = GatewayError;

    /// Parses a method name case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(GatewayError::UnsupportedMethod(value.to_owned())),
        }
    }
}

impl From<RestMethod> for Method {
    fn from(method: RestMethod) -> Self {
        match method {
            RestMethod::Get => Method::GET,
            RestMethod::Post => Method::POST,
            RestMethod::Put => Method::PUT,
            RestMethod::Patch => Method::PATCH,
            RestMethod::Delete => Method::DELETE,
        }
    }
}

/// Non-JSON request payload, such as a configuration zip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawBody {
    /// Value of the `Content-Type` header.
    pub content_type: String,
    /// Payload bytes.
    pub bytes: Vec<u8>,
}

impl RawBody {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Convenience constructor for `application/zip` payloads.
    pub fn zip(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new("application/zip", bytes)
    }
}

/// Request body as handed to the transport.
#[derive(Debug)]
pub(crate) enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Raw(RawBody),
}

/// Renders a path template such as `/configuration/mappings/{id}`.
///
/// Every `{name}` placeholder is replaced by the percent-encoded value from
/// `params`. A placeholder without a matching parameter returns
/// [`GatewayError::MissingPathParameter`]; unused parameters are ignored.
pub fn render_path(template: &str, params: &[(&str, &str)]) -> Result<String, GatewayError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| GatewayError::MissingPathParameter {
                template: template.to_owned(),
                parameter: name.to_owned(),
            })?;

        rendered.push_str(&rest[..start]);
        rendered.push_str(&encode_path_segment(value));
        rest = &rest[start + len + 1..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

fn encode_path_segment(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
