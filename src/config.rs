use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::GatewayError;

/// Path prefix of the REST API on an Airlock Gateway host.
pub const REST_API_PREFIX: &str = "/airlock/rest/";

/// Name of the session cookie set by `session/create`.
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// How requests authenticate against the gateway.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    /// No credentials; only useful against test backends.
    #[default]
    None,
    /// API key sent as `Authorization: Bearer <key>`.
    ApiKey(String),
    /// HTTP basic authentication.
    Basic {
        username: String,
        password: Option<String>,
    },
    /// Existing session, resumed through its `JSESSIONID` cookie.
    SessionCookie(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::SessionCookie(_) => f.write_str("SessionCookie(<redacted>)"),
        }
    }
}

/// Connection and authentication settings shared by every dispatch.
///
/// The value is plain data owned by the caller; a client built from it keeps
/// its own copy and never mutates it.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    base_url: Url,
    credentials: Credentials,
    verify_tls: bool,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    headers: Vec<(String, String)>,
}

impl SessionConfig {
    /// Creates a configuration for an explicit base URL.
    ///
    /// The URL is normalized to include a trailing slash, so relative endpoint
    /// paths join correctly.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, GatewayError> {
        let parsed = Url::parse(base_url.as_ref())
            .map_err(|_| GatewayError::InvalidBaseUrl(base_url.as_ref().to_owned()))?;
        if parsed.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl(base_url.as_ref().to_owned()));
        }

        Ok(Self {
            base_url: ensure_trailing_slash(parsed),
            credentials: Credentials::None,
            verify_tls: true,
            timeout: None,
            connect_timeout: None,
            headers: Vec::new(),
        })
    }

    /// Creates a configuration for the REST API of an Airlock host.
    ///
    /// The port is left out of the URL when it is the HTTPS default (443).
    pub fn for_host(host: &str, port: u16) -> Result<Self, GatewayError> {
        let authority = if port == 443 {
            host.to_owned()
        } else {
            format!("{host}:{port}")
        };
        Self::new(format!("https://{authority}{REST_API_PREFIX}"))
    }

    /// Authenticates with an API key (`Authorization: Bearer <key>`).
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.credentials = Credentials::ApiKey(api_key.into());
        self
    }

    /// Authenticates with HTTP basic credentials.
    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Credentials::Basic {
            username: username.into(),
            password,
        };
        self
    }

    /// Resumes an existing session from its `JSESSIONID` value.
    #[must_use]
    pub fn with_session_cookie(mut self, jsessionid: impl Into<String>) -> Self {
        self.credentials = Credentials::SessionCookie(jsessionid.into());
        self
    }

    /// Enables or disables TLS certificate verification (enabled by default).
    #[must_use]
    pub fn with_tls_verification(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Sets a total request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Adds a header sent with every request. A later value for the same
    /// name replaces an earlier one.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Host name the configuration points at.
    pub fn host_name(&self) -> Option<&str> {
        self.base_url.host_str()
    }

    /// Resolves `path` under the base URL.
    ///
    /// The result always stays on the base URL's origin and below its path
    /// prefix; absolute URLs, scheme-like first segments and `..` escapes are
    /// rejected with [`GatewayError::InvalidPath`].
    pub(crate) fn build_url(&self, path: &str) -> Result<Url, GatewayError> {
        let invalid = || GatewayError::InvalidPath(path.to_owned());
        let relative = path.trim_start_matches('/');

        let first_segment = relative.split(['/', '?', '#']).next().unwrap_or_default();
        if Url::parse(path).is_ok() || first_segment.contains(':') {
            return Err(invalid());
        }

        let url = self.base_url.join(relative).map_err(|_| invalid())?;
        if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path()) {
            return Err(invalid());
        }
        Ok(url)
    }

    pub(crate) fn default_headers(&self) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| GatewayError::InvalidHeader(name.clone()))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| GatewayError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    /// Cookie jar seeded with the session cookie, if one was configured.
    pub(crate) fn cookie_jar(&self) -> Arc<Jar> {
        let jar = Jar::default();
        if let Credentials::SessionCookie(jsessionid) = &self.credentials {
            jar.add_cookie_str(&format!("{SESSION_COOKIE}={jsessionid}; Path=/"), &self.base_url);
        }
        Arc::new(jar)
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_owned();
        path.push('/');
        url.set_path(&path);
    }
    url
}

/// Extracts a cookie value from a `Cookie` header value (`a=1; b=2`).
pub(crate) fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::cookie::CookieStore;

    use super::{Credentials, SessionConfig, cookie_value};
    use crate::GatewayError;

    #[test]
    fn joins_paths_from_base_with_nested_prefix() {
        let config = SessionConfig::new("https://example.com/airlock/rest").expect("valid url");
        let resolved = config.build_url("/configuration/mappings").expect("valid path");
        assert_eq!(
            resolved.as_str(),
            "https://example.com/airlock/rest/configuration/mappings"
        );
    }

    #[test]
    fn rejects_paths_that_leave_the_base_url() {
        let config = SessionConfig::new("https://gw.example.com/airlock/rest").expect("valid url");
        for path in [
            "https://other/x",
            "\\\\other\\x",
            "../../admin",
            "/configuration/../../../admin",
            "%2e%2e/%2e%2e/admin",
            "ip:lists",
            "/ip:lists",
        ] {
            let error = config.build_url(path).expect_err(path);
            assert!(
                matches!(&error, GatewayError::InvalidPath(rejected) if rejected == path),
                "{path}: {error}"
            );
        }
    }

    #[test]
    fn allows_colons_and_dots_inside_later_segments() {
        let config = SessionConfig::new("https://gw.example.com/airlock/rest").expect("valid url");
        let resolved = config
            .build_url("/configuration/mappings/../ip-lists/a:b")
            .expect("stays under prefix");
        assert_eq!(
            resolved.as_str(),
            "https://gw.example.com/airlock/rest/configuration/ip-lists/a:b"
        );
    }

    #[test]
    fn leading_slashes_stay_under_the_prefix() {
        let config = SessionConfig::new("https://gw.example.com/airlock/rest").expect("valid url");
        let resolved = config.build_url("//other/x").expect("relative path");
        assert_eq!(resolved.as_str(), "https://gw.example.com/airlock/rest/other/x");
    }

    #[test]
    fn keeps_query_strings_in_paths() {
        let config = SessionConfig::new("https://example.com/airlock/rest/").expect("valid url");
        let resolved = config
            .build_url("/configuration/mappings?filter=name==intranet")
            .expect("valid path");
        assert_eq!(resolved.path(), "/airlock/rest/configuration/mappings");
        assert_eq!(resolved.query(), Some("filter=name==intranet"));
    }

    #[test]
    fn for_host_omits_default_port() {
        let config = SessionConfig::for_host("gw.example.com", 443).expect("valid host");
        assert_eq!(config.base_url().as_str(), "https://gw.example.com/airlock/rest/");
        assert_eq!(config.host_name(), Some("gw.example.com"));

        let config = SessionConfig::for_host("gw.example.com", 8443).expect("valid host");
        assert_eq!(
            config.base_url().as_str(),
            "https://gw.example.com:8443/airlock/rest/"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let error = SessionConfig::new("not a url").expect_err("invalid url");
        assert!(matches!(error, GatewayError::InvalidBaseUrl(_)));

        let error = SessionConfig::new("mailto:ops@example.com").expect_err("not a base");
        assert!(matches!(error, GatewayError::InvalidBaseUrl(_)));
    }

    #[test]
    fn builder_records_settings() {
        let config = SessionConfig::new("https://gw/airlock/rest/")
            .expect("valid url")
            .with_api_key("secret")
            .with_tls_verification(false)
            .with_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(1));

        assert_eq!(config.credentials(), &Credentials::ApiKey("secret".to_owned()));
        assert!(!config.verify_tls());
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.connect_timeout(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = SessionConfig::new("https://gw/airlock/rest/")
            .expect("valid url")
            .with_api_key("top-secret-key");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn invalid_default_header_is_reported() {
        let config = SessionConfig::new("https://gw/airlock/rest/")
            .expect("valid url")
            .with_header("bad header", "value");
        let error = config.default_headers().expect_err("invalid name");
        assert!(matches!(error, GatewayError::InvalidHeader(name) if name == "bad header"));
    }

    #[test]
    fn session_cookie_seeds_the_jar() {
        let config = SessionConfig::new("https://gw/airlock/rest/")
            .expect("valid url")
            .with_session_cookie("abc123");
        let jar = config.cookie_jar();
        let header = jar.cookies(config.base_url()).expect("cookie present");
        let header = header.to_str().expect("ascii cookie");
        assert_eq!(cookie_value(header, "JSESSIONID"), Some("abc123".to_owned()));
    }

    #[test]
    fn cookie_value_picks_named_cookie() {
        assert_eq!(
            cookie_value("a=1; JSESSIONID=xyz; b=2", "JSESSIONID"),
            Some("xyz".to_owned())
        );
        assert_eq!(cookie_value("a=1", "JSESSIONID"), None);
    }
}
