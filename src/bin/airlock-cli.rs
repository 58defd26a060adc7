use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use airlock_gateway_client::{GatewayClient, Outcome, RestMethod, SessionConfig, render_path};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Exit status used when the gateway answers 404.
const EXIT_NOT_FOUND: u8 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "airlock-cli",
    version,
    about = "Small CLI for calling the Airlock Gateway REST API",
    after_help = "Exits with status 3 when the gateway reports the resource as not found."
)]
struct Cli {
    /// Gateway host name. Ignored when --base-url is given.
    #[arg(long, env = "AIRLOCK_HOST", required_unless_present = "base_url")]
    host: Option<String>,

    /// Gateway management HTTPS port.
    #[arg(long, env = "AIRLOCK_PORT", default_value_t = 443)]
    port: u16,

    /// Full REST base URL (for example https://gw:8443/airlock/rest).
    #[arg(long, env = "AIRLOCK_BASE_URL")]
    base_url: Option<String>,

    /// API key sent as bearer token when opening the session.
    #[arg(long, env = "AIRLOCK_API_KEY", conflicts_with = "jsessionid")]
    api_key: Option<String>,

    /// Resume an existing session instead of opening a new one.
    #[arg(long, env = "AIRLOCK_JSESSIONID")]
    jsessionid: Option<String>,

    /// Accept invalid TLS certificates.
    #[arg(long, env = "AIRLOCK_INSECURE")]
    insecure: bool,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Leave the session open on exit.
    #[arg(long)]
    keep_session: bool,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a request and print the JSON response.
    Request(RequestArgs),
    /// Print the Airlock release of the gateway.
    Version,
}

#[derive(Debug, Args)]
struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE).
    method: String,

    /// Request path, may contain {name} placeholders
    /// (for example: /configuration/mappings/{id}).
    path: String,

    /// Path placeholder value in form key=value. Repeat as needed.
    #[arg(long = "path-param", value_name = "KEY=VALUE")]
    path_param: Vec<String>,

    /// Query parameter in form key=value. Repeat as needed.
    #[arg(long = "query", value_name = "KEY=VALUE")]
    query: Vec<String>,

    #[command(flatten)]
    body: BodyInput,
}

#[derive(Debug, Args)]
struct BodyInput {
    /// JSON request body literal.
    #[arg(long, conflicts_with = "body_file")]
    body_json: Option<String>,

    /// Path to a file containing a JSON request body.
    #[arg(long, value_name = "PATH", conflicts_with = "body_json")]
    body_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = session_config(&cli)?;
    let client = GatewayClient::new(&config).context("failed to create gateway client")?;

    if cli.jsessionid.is_none() {
        let opened = client
            .create_session()
            .await
            .context("failed to create gateway session")?;
        if opened.is_not_found() {
            bail!("gateway does not offer a REST session endpoint, check host and port");
        }
    }

    let result = run(&client, &cli).await;

    if cli.keep_session {
        if let Some(jsessionid) = client.jsession_id() {
            eprintln!("session kept open: JSESSIONID={jsessionid}");
        }
    } else if let Err(error) = client.terminate_session().await {
        tracing::warn!("failed to terminate session: {}", error);
    }

    let outcome = result?;
    match outcome {
        Outcome::Success(value) => {
            print_json(&value, cli.compact).context("failed to print JSON output")?;
            Ok(ExitCode::SUCCESS)
        }
        Outcome::NotFound => {
            eprintln!("not found");
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
    }
}

/// Installs a stderr subscriber; `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn session_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = match (&cli.base_url, &cli.host) {
        (Some(url), _) => SessionConfig::new(url)
            .with_context(|| format!("invalid base URL '{url}'"))?,
        (None, Some(host)) => SessionConfig::for_host(host, cli.port)
            .with_context(|| format!("invalid gateway host '{host}'"))?,
        (None, None) => bail!("either --host or --base-url is required"),
    };

    config = config.with_tls_verification(!cli.insecure);
    if let Some(seconds) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(seconds));
    }
    match (&cli.api_key, &cli.jsessionid) {
        (_, Some(jsessionid)) => config = config.with_session_cookie(jsessionid.clone()),
        (Some(key), None) => config = config.with_api_key(key.clone()),
        (None, None) => bail!("either --api-key or --jsessionid is required"),
    }
    Ok(config)
}

async fn run(client: &GatewayClient, cli: &Cli) -> Result<Outcome<Value>> {
    match &cli.command {
        Command::Request(args) => send_request(client, args)
            .await
            .with_context(|| format!("request failed: {} {}", args.method, args.path)),
        Command::Version => {
            let version = client
                .gateway_version()
                .await
                .context("failed to query gateway version")?;
            Ok(version.map_or(Outcome::NotFound, |v| Outcome::Success(Value::String(v))))
        }
    }
}

/// Sends one request built from CLI arguments.
///
/// The method is validated before any network call.
async fn send_request(client: &GatewayClient, args: &RequestArgs) -> Result<Outcome<Value>> {
    let method: RestMethod = args.method.parse()?;
    let path_params = parse_pairs(&args.path_param, "--path-param")
        .context("failed to parse --path-param arguments")?;
    let query = parse_pairs(&args.query, "--query").context("failed to parse --query arguments")?;
    let body = parse_body(&args.body).context("failed to parse request body input")?;

    let borrowed_params: Vec<(&str, &str)> = path_params
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    let borrowed_query: Vec<(&str, &str)> = query
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    let path = render_path(&args.path, &borrowed_params)?;
    let outcome = client
        .dispatch_with_query(method, &path, &borrowed_query, body)
        .await?;
    Ok(outcome)
}

/// Parses repeated `key=value` arguments into owned key/value pairs.
fn parse_pairs(values: &[String], flag_name: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(values.len());
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid {flag_name} value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid {flag_name} value '{item}': empty key");
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

fn parse_body(body: &BodyInput) -> Result<Option<Value>> {
    match (&body.body_json, &body.body_file) {
        (Some(raw), None) => serde_json::from_str(raw)
            .context("failed to parse JSON from --body-json")
            .map(Some),
        (None, Some(path)) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read --body-file '{}'", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| {
                    format!("failed to parse JSON in --body-file '{}'", path.display())
                })
                .map(Some)
        }
        (None, None) => Ok(None),
        (Some(_), Some(_)) => bail!("use only one of --body-json or --body-file"),
    }
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("Failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}
