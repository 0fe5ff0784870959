use std::{net::SocketAddr, time::Duration};

use url::Url;

pub const DEFAULT_LOGIN_URL: &str = "https://sol.lideraviacao.com.br/Login";
pub const DEFAULT_DATA_URL: &str =
    "https://sol.lideraviacao.com.br/AcompanhamentoCliente/AcompanhamentoCliente/GetAllByFilter";
pub const DEFAULT_LOGIN_MARKER: &str = "Login";
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config value for {0}")]
    Invalid(String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `HOST` may be an IP literal or a hostname; the first resolved address wins.
    pub async fn resolve(&self) -> Result<SocketAddr, ConfigError> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|_| ConfigError::Invalid("HOST".to_string()))?
            .next()
            .ok_or_else(|| ConfigError::Invalid("HOST".to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub login_url: Url,
    pub data_url: Url,
    /// Sent as the `ReturnUrl` form field on login.
    pub return_url: String,
    /// Substring of the URL path that means we landed back on the login page.
    pub login_marker: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Upstream replies larger than this are refused.
    pub max_body_bytes: usize,
    pub proxy: Option<String>,
}

impl UpstreamConfig {
    pub fn new(login_url: Url, data_url: Url) -> Self {
        Self {
            login_url,
            data_url,
            return_url: String::new(),
            login_marker: DEFAULT_LOGIN_MARKER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            proxy: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<AppConfig, ConfigError> {
        build_config(|key| std::env::var(key).ok())
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid(key.to_string())),
        None => Ok(default),
    }
}

fn parse_url(value: Option<String>, key: &str, default: &str) -> Result<Url, ConfigError> {
    Url::parse(value.as_deref().unwrap_or(default).trim()).map_err(|_| ConfigError::Invalid(key.to_string()))
}

pub fn build_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Building AppConfig...");

    let mut upstream = UpstreamConfig::new(
        parse_url(lookup("UPSTREAM_LOGIN_URL"), "UPSTREAM_LOGIN_URL", DEFAULT_LOGIN_URL)?,
        parse_url(lookup("UPSTREAM_DATA_URL"), "UPSTREAM_DATA_URL", DEFAULT_DATA_URL)?,
    );
    if let Some(return_url) = lookup("UPSTREAM_RETURN_URL") {
        upstream.return_url = return_url;
    }
    if let Some(login_marker) = lookup("UPSTREAM_LOGIN_MARKER") {
        upstream.login_marker = login_marker;
    }
    if let Some(user_agent) = lookup("UPSTREAM_USER_AGENT") {
        upstream.user_agent = user_agent;
    }
    upstream.timeout = Duration::from_secs(parse_or(
        lookup("UPSTREAM_TIMEOUT_SECS"),
        "UPSTREAM_TIMEOUT_SECS",
        upstream.timeout.as_secs(),
    )?);
    upstream.connect_timeout = Duration::from_secs(parse_or(
        lookup("UPSTREAM_CONNECT_TIMEOUT_SECS"),
        "UPSTREAM_CONNECT_TIMEOUT_SECS",
        upstream.connect_timeout.as_secs(),
    )?);
    upstream.max_body_bytes = parse_or(
        lookup("UPSTREAM_MAX_BODY_BYTES"),
        "UPSTREAM_MAX_BODY_BYTES",
        upstream.max_body_bytes,
    )?;
    upstream.proxy = lookup("UPSTREAM_PROXY").filter(|p| !p.trim().is_empty());

    if upstream.login_marker.is_empty() {
        return Err(ConfigError::Invalid("UPSTREAM_LOGIN_MARKER".to_string()));
    }
    if upstream.timeout.is_zero() {
        return Err(ConfigError::Invalid("UPSTREAM_TIMEOUT_SECS".to_string()));
    }
    if upstream.max_body_bytes == 0 {
        return Err(ConfigError::Invalid("UPSTREAM_MAX_BODY_BYTES".to_string()));
    }

    let config = AppConfig {
        server: ServerConfig {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(lookup("PORT"), "PORT", 8000u16)?,
        },
        upstream,
    };
    info!("AppConfig built");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_point_at_portal() {
        let config = build_config(lookup_from(&[])).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.upstream.login_url.as_str(), DEFAULT_LOGIN_URL);
        assert_eq!(config.upstream.data_url.as_str(), DEFAULT_DATA_URL);
        assert_eq!(config.upstream.return_url, "");
        assert_eq!(config.upstream.login_marker, "Login");
        assert_eq!(config.upstream.timeout, Duration::from_secs(30));
        assert_eq!(config.upstream.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.upstream.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.upstream.proxy.is_none());
    }

    #[tokio::test]
    async fn test_overrides() {
        let config = build_config(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9001"),
            ("UPSTREAM_LOGIN_URL", "http://localhost:4000/Login"),
            ("UPSTREAM_DATA_URL", "http://localhost:4000/data"),
            ("UPSTREAM_TIMEOUT_SECS", "5"),
            ("UPSTREAM_MAX_BODY_BYTES", "65536"),
            ("UPSTREAM_PROXY", "socks5://127.0.0.1:1080"),
        ]))
        .unwrap();

        assert_eq!(
            config.server.resolve().await.unwrap(),
            "127.0.0.1:9001".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.upstream.login_url.as_str(), "http://localhost:4000/Login");
        assert_eq!(config.upstream.data_url.path(), "/data");
        assert_eq!(config.upstream.timeout, Duration::from_secs(5));
        assert_eq!(config.upstream.max_body_bytes, 65536);
        assert_eq!(config.upstream.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = build_config(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(key) if key == "PORT"));

        let err = build_config(lookup_from(&[("UPSTREAM_DATA_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(key) if key == "UPSTREAM_DATA_URL"));

        let err = build_config(lookup_from(&[("UPSTREAM_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(key) if key == "UPSTREAM_TIMEOUT_SECS"));

        let err = build_config(lookup_from(&[("UPSTREAM_MAX_BODY_BYTES", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(key) if key == "UPSTREAM_MAX_BODY_BYTES"));
    }

    #[tokio::test]
    async fn test_hostname_host_resolves() {
        let config = build_config(lookup_from(&[("HOST", "localhost"), ("PORT", "9002")])).unwrap();

        let addr = config.server.resolve().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 9002);
    }

    #[test]
    fn test_empty_proxy_is_ignored() {
        let config = build_config(lookup_from(&[("UPSTREAM_PROXY", "  ")])).unwrap();
        assert!(config.upstream.proxy.is_none());
    }
}
