//! Resume a session from its `JSESSIONID` and print the gateway release.
//!
//! Run:
//! `AIRLOCK_BASE_URL=https://<host>/airlock/rest AIRLOCK_JSESSIONID=<id> cargo run --example blocking_session_version`

use airlock_gateway_client::{BlockingGatewayClient, SessionConfig, is_compatible_version};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (Ok(base_url), Ok(jsessionid)) = (
        std::env::var("AIRLOCK_BASE_URL"),
        std::env::var("AIRLOCK_JSESSIONID"),
    ) else {
        eprintln!("Set AIRLOCK_BASE_URL and AIRLOCK_JSESSIONID before running this example.");
        std::process::exit(2);
    };

    let config = SessionConfig::new(base_url)?
        .with_session_cookie(jsessionid)
        .with_tls_verification(false);
    let client = BlockingGatewayClient::new(&config)?;

    match client.gateway_version()? {
        Some(version) => println!(
            "Airlock {version} (supported: {})",
            is_compatible_version(&version)
        ),
        None => println!("gateway did not report a version"),
    }
    Ok(())
}
