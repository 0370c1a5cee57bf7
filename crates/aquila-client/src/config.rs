//! Client configuration with YAML support

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

/// Client configuration
///
/// Can be loaded from YAML or constructed programmatically via
/// [`ClientConfig::builder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server hostname (default: localhost)
    #[serde(default = "default_host")]
    pub host: String,

    /// Transport scheme (default: http)
    #[serde(default)]
    pub protocol: Protocol,

    /// Server port; defaults to 8080 for http and 8443 for https
    #[serde(default)]
    pub port: Option<u16>,

    /// Skip TLS certificate validation (https only)
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Maintain a session cookie jar with an anti-forgery token
    /// (default: true)
    #[serde(default = "default_enable_cookies")]
    pub enable_cookies: bool,

    /// Headers applied to every request, below per-request overrides
    #[serde(default)]
    pub default_headers: HashMap<String, String>,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_enable_cookies() -> bool {
    true
}

/// Transport scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    fn default_port(self) -> u16 {
        match self {
            Protocol::Http => 8080,
            Protocol::Https => 8443,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// General request timeout in milliseconds (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub request_ms: u64,

    /// Connect timeout in milliseconds (default: 10s)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_ms: default_request_timeout(),
            connect_ms: default_connect_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_connect_timeout() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            protocol: Protocol::default(),
            port: None,
            accept_invalid_certs: false,
            enable_cookies: default_enable_cookies(),
            default_headers: HashMap::new(),
            timeouts: TimeoutsConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Create a builder for programmatic configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Effective port, falling back to the scheme default
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.protocol.default_port())
    }

    /// Base URL derived from scheme, host and port
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}://{}:{}",
            self.protocol.scheme(),
            self.host,
            self.effective_port()
        ))
    }
}

/// Builder for [`ClientConfig`]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    pub fn https(self) -> Self {
        self.protocol(Protocol::Https)
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = Some(port);
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    pub fn enable_cookies(mut self, enable: bool) -> Self {
        self.config.enable_cookies = enable;
        self
    }

    /// Add a header sent with every request
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.request_ms = ms;
        self
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.connect_ms = ms;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.protocol, Protocol::Http);
        assert_eq!(config.effective_port(), 8080);
        assert!(config.enable_cookies);
        assert_eq!(config.timeouts.request_ms, 30_000);
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn test_https_port_fallback() {
        let config = ClientConfig::builder().https().build();
        assert_eq!(config.effective_port(), 8443);
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://localhost:8443/"
        );
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
host: aquila.example.com
protocol: https
port: 443
accept_invalid_certs: true

default_headers:
  X-Tenant: plant-7

timeouts:
  request_ms: 60000
"#;

        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.host, "aquila.example.com");
        assert_eq!(config.protocol, Protocol::Https);
        assert_eq!(config.effective_port(), 443);
        assert!(config.accept_invalid_certs);
        assert!(config.enable_cookies);
        assert_eq!(config.default_headers["X-Tenant"], "plant-7");
        assert_eq!(config.timeouts.request_ms, 60_000);
        assert_eq!(config.timeouts.connect_ms, 10_000);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .host("127.0.0.1")
            .port(18080)
            .enable_cookies(false)
            .default_header("Authorization", "Bearer tok")
            .request_timeout_ms(5_000)
            .build();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.effective_port(), 18080);
        assert!(!config.enable_cookies);
        assert_eq!(config.default_headers["Authorization"], "Bearer tok");
    }

    #[test]
    fn test_to_yaml() {
        let config = ClientConfig::builder().host("10.0.0.5").build();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("10.0.0.5"));
        assert!(yaml.contains("protocol"));
    }
}
