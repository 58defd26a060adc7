//! In-process mock of the Airlock Gateway REST API.
//!
//! Routes live under `/airlock/rest` like on a real gateway. Besides a few
//! realistic endpoints there is `/status/{code}`, which answers with the
//! requested status, and `/echo`, which reflects the request back as JSON.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use airlock_gateway_client::SessionConfig;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, RawQuery},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{any, get, post, put},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const API_KEY: &str = "test-key";
pub const SESSION_ID: &str = "session-1";
pub const EXPORT_ZIP: &[u8] = b"PK\x03\x04alec_full.xml";

pub fn app() -> Router {
    let api = Router::new()
        .route("/session/create", post(create_session))
        .route("/session/terminate", post(terminate_session))
        .route("/system/status/node", get(node_status))
        .route("/configuration/ip-lists/{id}", get(ip_list))
        .route("/configuration/configurations/export", get(export_config))
        .route("/configuration/configurations/import", put(import_config))
        .route("/status/{code}", any(fixed_status))
        .route("/echo", any(echo))
        .route("/empty", any(empty))
        .route("/not-json", get(not_json))
        .route("/slow", get(slow));
    Router::new().nest("/airlock/rest", api)
}

/// Starts the mock on an ephemeral port of the current runtime.
pub async fn spawn_gateway() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock gateway");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app()).await.expect("mock gateway");
    });
    addr
}

/// Starts the mock on its own thread and runtime, for blocking clients.
pub fn spawn_gateway_thread() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock gateway");
    let addr = std_listener.local_addr().expect("local addr");
    std_listener.set_nonblocking(true).expect("nonblocking");

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        rt.block_on(async {
            let listener = TcpListener::from_std(std_listener).expect("tokio listener");
            axum::serve(listener, app()).await
        })
        .expect("mock gateway");
    });

    addr
}

/// Session configuration pointing at a mock gateway.
pub fn config_for(addr: SocketAddr) -> SessionConfig {
    SessionConfig::new(format!("http://{addr}/airlock/rest"))
        .expect("valid mock url")
        .with_api_key(API_KEY)
}

/// Session configuration for a base path the mock does not serve.
pub fn unserved_config_for(addr: SocketAddr) -> SessionConfig {
    SessionConfig::new(format!("http://{addr}/no-gateway/rest"))
        .expect("valid mock url")
        .with_api_key(API_KEY)
}

/// Address on which nothing listens.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr")
}

async fn create_session(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {API_KEY}"));

    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"errors": [{"code": "UNAUTHORIZED"}]})))
            .into_response();
    }

    (
        [(header::SET_COOKIE, format!("JSESSIONID={SESSION_ID}; Path=/"))],
        Json(json!({"meta": {"type": "jsonapi.metadata.document"}})),
    )
        .into_response()
}

async fn terminate_session(headers: HeaderMap) -> StatusCode {
    if cookie_header(&headers).contains(&format!("JSESSIONID={SESSION_ID}")) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn node_status() -> Json<Value> {
    Json(json!({
        "data": {
            "type": "node-status",
            "attributes": {"version": "8.3.1", "hostName": "gw-1"}
        }
    }))
}

async fn ip_list(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "abc" => Json(json!({"id": "abc"})).into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"msg": "internal"}))).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn export_config() -> Response {
    ([(header::CONTENT_TYPE, "application/zip")], EXPORT_ZIP).into_response()
}

async fn import_config(headers: HeaderMap, body: Bytes) -> StatusCode {
    let is_zip = headers
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value == "application/zip");
    if is_zip && body.starts_with(b"PK") {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}

async fn fixed_status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(json!({"code": code}))).into_response()
}

async fn echo(method: Method, headers: HeaderMap, RawQuery(query): RawQuery, body: Bytes) -> Json<Value> {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    Json(json!({
        "method": method.as_str(),
        "query": query,
        "authorization": header_text(header::AUTHORIZATION),
        "accept": header_text(header::ACCEPT),
        "content_type": header_text(header::CONTENT_TYPE),
        "cookie": header_text(header::COOKIE),
        "x_request_source": header_text(header::HeaderName::from_static("x-request-source")),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_json() -> &'static str {
    "plain text"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({"late": true}))
}

fn cookie_header(headers: &HeaderMap) -> String {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}
