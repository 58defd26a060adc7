//! Show how each dispatch outcome surfaces to the caller.
//!
//! Run:
//! `AIRLOCK_BASE_URL=https://<host>/airlock/rest AIRLOCK_API_KEY=<key> cargo run --example async_inspect_errors -- <path>`

use airlock_gateway_client::{GatewayClient, GatewayError, Outcome, SessionConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (Ok(base_url), Ok(api_key)) = (
        std::env::var("AIRLOCK_BASE_URL"),
        std::env::var("AIRLOCK_API_KEY"),
    ) else {
        eprintln!("Set AIRLOCK_BASE_URL and AIRLOCK_API_KEY before running this example.");
        std::process::exit(2);
    };
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/configuration/ip-lists/abc".to_owned());

    let config = SessionConfig::new(base_url)?
        .with_api_key(api_key)
        .with_tls_verification(false);
    let client = GatewayClient::new(&config)?;
    if client.create_session().await?.is_not_found() {
        eprintln!("gateway does not offer a REST session endpoint, check host and port");
        std::process::exit(2);
    }

    match client.get(&path).await {
        Ok(Outcome::Success(value)) => println!("found: {value}"),
        Ok(Outcome::NotFound) => println!("not found"),
        Err(GatewayError::Rest(error)) => {
            println!("gateway rejected the request with {}", error.status_code());
            if let Some(details) = error.json_body() {
                println!("{}", serde_json::to_string_pretty(&details)?);
            }
        }
        Err(GatewayError::Transport(error)) => println!("gateway unreachable: {error}"),
        Err(other) => return Err(other.into()),
    }

    client.terminate_session().await?;
    Ok(())
}
