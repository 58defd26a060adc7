//! Look up an IP list by id, treating "not found" as a normal answer.
//!
//! Run:
//! `AIRLOCK_HOST=<host> AIRLOCK_API_KEY=<key> cargo run --example blocking_get_or_none -- <ip-list-id>`
//!
//! Optional env vars:
//! - `AIRLOCK_PORT` (defaults to `443`)

use airlock_gateway_client::{BlockingGatewayClient, Outcome, SessionConfig, render_path};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (Ok(host), Ok(api_key)) = (std::env::var("AIRLOCK_HOST"), std::env::var("AIRLOCK_API_KEY"))
    else {
        eprintln!("Set AIRLOCK_HOST and AIRLOCK_API_KEY before running this example.");
        std::process::exit(2);
    };
    let port = std::env::var("AIRLOCK_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(443);
    let id = std::env::args().nth(1).unwrap_or_else(|| "1".to_owned());

    let config = SessionConfig::for_host(&host, port)?
        .with_api_key(api_key)
        .with_tls_verification(false);
    let client = BlockingGatewayClient::new(&config)?;
    if client.create_session()?.is_not_found() {
        eprintln!("gateway does not offer a REST session endpoint, check host and port");
        std::process::exit(2);
    }

    let path = render_path("/configuration/ip-lists/{id}", &[("id", id.as_str())])?;
    match client.get(&path)? {
        Outcome::Success(ip_list) => println!("{}", serde_json::to_string_pretty(&ip_list)?),
        Outcome::NotFound => println!("IP list {id} does not exist"),
    }

    client.terminate_session()?;
    Ok(())
}
