//! Rust client library for the Airlock Gateway REST management API.
//!
//! Public API layers:
//! - [`SessionConfig`]: base URL, credentials and TLS policy for one gateway.
//! - [`GatewayClient`]/[`BlockingGatewayClient`]: dispatch requests and
//!   classify the responses.
//! - [`Outcome`]/[`GatewayError`]: what a dispatch can produce.
//!
//! Every response is classified the same way: 2xx is
//! [`Outcome::Success`], 404 is [`Outcome::NotFound`], any other status is a
//! [`GatewayRestError`] carrying status and raw body, and transport failures
//! are returned as [`GatewayError::Transport`] without reinterpretation.
//!
//! ```no_run
//! use airlock_gateway_client::{BlockingGatewayClient, Outcome, SessionConfig};
//!
//! # fn main() -> Result<(), airlock_gateway_client::GatewayError> {
//! let config = SessionConfig::for_host("gateway.example.com", 443)?
//!     .with_api_key("my-api-key")
//!     .with_tls_verification(false);
//! let client = BlockingGatewayClient::new(&config)?;
//! client.create_session()?;
//!
//! match client.get("/configuration/ip-lists/abc")? {
//!     Outcome::Success(ip_list) => println!("{ip_list}"),
//!     Outcome::NotFound => println!("no such IP list"),
//! }
//!
//! client.terminate_session()?;
//! # Ok(())
//! # }
//! ```

mod blocking_client;
mod client;
mod compat;
mod config;
mod error;
mod outcome;
mod request;

/// Blocking gateway client.
pub use blocking_client::BlockingGatewayClient;
/// Async gateway client.
pub use client::GatewayClient;
pub use compat::{COMPATIBLE_VERSIONS, is_compatible_version};
pub use config::{Credentials, REST_API_PREFIX, SESSION_COOKIE, SessionConfig};
/// Error types returned by all client operations.
pub use error::{GatewayError, GatewayRestError};
pub use outcome::{Outcome, classify, classify_json};
pub use request::{RawBody, RestMethod, render_path};
