use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use crate::compat::{
    NODE_STATUS_PATH, SESSION_CREATE_PATH, SESSION_TERMINATE_PATH, log_compatibility,
    version_from_node_status,
};
use crate::config::{Credentials, SESSION_COOKIE, SessionConfig, cookie_value};
use crate::outcome::{classify, classify_json};
use crate::request::{RawBody, RequestBody};
use crate::{GatewayError, Outcome, RestMethod};

/// Async Airlock Gateway REST client.
///
/// Cloning is cheap and clones share the connection pool and the session
/// cookie jar.
#[derive(Clone, Debug)]
pub struct GatewayClient {
    config: SessionConfig,
    cookies: Arc<Jar>,
    http: reqwest::Client,
}

impl GatewayClient {
    /// Builds a client from the given session configuration.
    pub fn new(config: &SessionConfig) -> Result<Self, GatewayError> {
        let cookies = config.cookie_jar();
        let mut builder = reqwest::Client::builder()
            .default_headers(config.default_headers()?)
            .cookie_provider(Arc::clone(&cookies))
            .danger_accept_invalid_certs(!config.verify_tls());

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            config: config.clone(),
            cookies,
            http: builder.build()?,
        })
    }

    /// Returns the configuration this client was built from.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Sends a `GET` request.
    pub async fn get(&self, path: &str) -> Result<Outcome<Value>, GatewayError> {
        self.dispatch(RestMethod::Get, path, None).await
    }

    /// Sends a `POST` request with an optional JSON body.
    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Outcome<Value>, GatewayError> {
        self.dispatch(RestMethod::Post, path, body).await
    }

    /// Sends a `PUT` request with a JSON body.
    pub async fn put(&self, path: &str, body: Value) -> Result<Outcome<Value>, GatewayError> {
        self.dispatch(RestMethod::Put, path, Some(body)).await
    }

    /// Sends a `PATCH` request with a JSON body.
    pub async fn patch(&self, path: &str, body: Value) -> Result<Outcome<Value>, GatewayError> {
        self.dispatch(RestMethod::Patch, path, Some(body)).await
    }

    /// Sends a `DELETE` request with an optional JSON body.
    ///
    /// Relationship endpoints take the identifiers to unlink in the body.
    pub async fn delete(&self, path: &str, body: Option<Value>) -> Result<Outcome<Value>, GatewayError> {
        self.dispatch(RestMethod::Delete, path, body).await
    }

    /// Sends one request and classifies the response.
    ///
    /// - 2xx: [`Outcome::Success`] with the JSON body ([`Value::Null`] if empty).
    /// - 404: [`Outcome::NotFound`].
    /// - anything else: [`GatewayError::Rest`] with status and raw body.
    /// - no response at all: [`GatewayError::Transport`] with the original
    ///   `reqwest` error.
    pub async fn dispatch(
        &self,
        method: RestMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Outcome<Value>, GatewayError> {
        self.dispatch_with_query(method, path, &[], body).await
    }

    /// Same as [`Self::dispatch`], with query parameters appended to the URL.
    pub async fn dispatch_with_query(
        &self,
        method: RestMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Outcome<Value>, GatewayError> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Json);
        let (status, payload) = self.send(method, path, query, body, "application/json").await?;
        classify_json(status, payload)
    }

    /// Sends a request with a raw body and returns the raw response payload.
    ///
    /// Used for binary resources such as configuration or mapping zips.
    pub async fn dispatch_bytes(
        &self,
        method: RestMethod,
        path: &str,
        body: Option<RawBody>,
        accept: &str,
    ) -> Result<Outcome<Vec<u8>>, GatewayError> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Raw);
        let (status, payload) = self.send(method, path, &[], body, accept).await?;
        classify(status, payload).map_err(GatewayError::from)
    }

    /// Opens a REST session on the gateway.
    ///
    /// On success the gateway version is checked against the supported
    /// releases and a warning is logged on mismatch. Returns
    /// [`Outcome::NotFound`] if the gateway does not offer the session endpoint.
    pub async fn create_session(&self) -> Result<Outcome<()>, GatewayError> {
        tracing::info!(
            "Starting the REST session with host {}",
            self.config.host_name().unwrap_or_default()
        );
        let outcome = self.post(SESSION_CREATE_PATH, None).await?;
        if outcome.is_success() {
            let version = self.gateway_version().await?;
            log_compatibility(version.as_deref());
        }
        Ok(outcome.map(|_| ()))
    }

    /// Returns the Airlock release of the gateway node, e.g. `8.3.1`.
    pub async fn gateway_version(&self) -> Result<Option<String>, GatewayError> {
        let status = self.get(NODE_STATUS_PATH).await?;
        Ok(status.into_option().as_ref().and_then(version_from_node_status))
    }

    /// Terminates the REST session. An already expired session is not an error.
    pub async fn terminate_session(&self) -> Result<(), GatewayError> {
        if self.post(SESSION_TERMINATE_PATH, None).await?.is_not_found() {
            tracing::debug!("Session was already terminated");
        }
        Ok(())
    }

    /// Current `JSESSIONID` held by this client, if a session is open.
    pub fn jsession_id(&self) -> Option<String> {
        let header = self.cookies.cookies(self.config.base_url())?;
        cookie_value(header.to_str().ok()?, SESSION_COOKIE)
    }

    async fn send(
        &self,
        method: RestMethod,
        path: &str,
        query: &[(&str, &str)],
        body: RequestBody,
        accept: &str,
    ) -> Result<(reqwest::StatusCode, Vec<u8>), GatewayError> {
        let url = self.config.build_url(path)?;
        tracing::debug!("Performing a {} request at URI: {}", method, url);

        let mut request = self.http.request(method.into(), url).header(ACCEPT, accept);

        if !query.is_empty() {
            request = request.query(query);
        }

        match self.config.credentials() {
            Credentials::ApiKey(key) => request = request.bearer_auth(key),
            Credentials::Basic { username, password } => {
                request = request.basic_auth(username, password.as_ref());
            }
            Credentials::None | Credentials::SessionCookie(_) => {}
        }

        match body {
            RequestBody::Empty => {}
            RequestBody::Json(json_body) => {
                tracing::trace!("JSON payload of request: {}", json_body);
                request = request.json(&json_body);
            }
            RequestBody::Raw(raw) => {
                request = request.header(CONTENT_TYPE, raw.content_type).body(raw.bytes);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let payload = response.bytes().await?;
        Ok((status, payload.to_vec()))
    }
}
