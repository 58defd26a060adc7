//! List mapping names matching a label with the async `GatewayClient`.
//!
//! Run:
//! `AIRLOCK_HOST=<host> AIRLOCK_API_KEY=<key> cargo run --example async_list_mappings -- <label>`

use airlock_gateway_client::{GatewayClient, RestMethod, SessionConfig};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (Ok(host), Ok(api_key)) = (std::env::var("AIRLOCK_HOST"), std::env::var("AIRLOCK_API_KEY"))
    else {
        eprintln!("Set AIRLOCK_HOST and AIRLOCK_API_KEY before running this example.");
        std::process::exit(2);
    };
    let label = std::env::args().nth(1);

    let config = SessionConfig::for_host(&host, 443)?
        .with_api_key(api_key)
        .with_tls_verification(false);
    let client = GatewayClient::new(&config)?;
    if client.create_session().await?.is_not_found() {
        eprintln!("gateway does not offer a REST session endpoint, check host and port");
        std::process::exit(2);
    }

    let filter = label.map(|label| format!("label=={label}"));
    let query: Vec<(&str, &str)> = filter
        .as_deref()
        .map(|filter| vec![("filter", filter)])
        .unwrap_or_default();

    let mappings = client
        .dispatch_with_query(RestMethod::Get, "/configuration/mappings", &query, None)
        .await?
        .into_option()
        .unwrap_or(Value::Null);

    let mut names: Vec<&str> = mappings["data"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|mapping| mapping.pointer("/attributes/name").and_then(Value::as_str))
        .collect();
    names.sort_unstable();
    for name in names {
        println!("{name}");
    }

    client.terminate_session().await?;
    Ok(())
}
