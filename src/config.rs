//! Client configuration
//!
//! Certificate material is supplied at runtime, nothing is compiled in, so the
//! merchant bundle and the gateway CA can be rotated without a rebuild.

use crate::{Result, SwishError};
use base64::Engine;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Test environment endpoint
pub const TEST_URL: &str = "https://mss.cpc.getswish.net";
/// Production environment endpoint
pub const PRODUCTION_URL: &str = "https://cpc.getswish.net";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway environment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Test,
    #[default]
    Production,
}

impl Environment {
    /// Base URL of the gateway in this environment
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Test => TEST_URL,
            Environment::Production => PRODUCTION_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = SwishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" | "mss" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(SwishError::config(format!("Unknown environment: {}", other))),
        }
    }
}

/// Settings used to build a [`SwishClient`](crate::SwishClient)
#[derive(Clone)]
pub struct ClientConfig {
    /// Password of the PKCS#12 certificate bundle
    pub passphrase: String,
    /// Raw PKCS#12 bundle holding the merchant certificate and private key
    pub certificate: Vec<u8>,
    /// Base64 encoded PEM of the gateway certificate authority
    pub ca: String,
    /// Which gateway to talk to
    pub environment: Environment,
    /// Timeout applied to every request, zero for none
    pub timeout: Duration,
    /// Replaces the environment's base URL, e.g. to point at a test double
    pub base_url: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("passphrase", &"<redacted>")
            .field("certificate", &format!("<{} bytes>", self.certificate.len()))
            .field("ca", &format!("<{} chars>", self.ca.len()))
            .field("environment", &self.environment)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new production config with the default timeout
    pub fn new(
        certificate: impl Into<Vec<u8>>,
        passphrase: impl Into<String>,
        ca: impl Into<String>,
    ) -> Self {
        Self {
            passphrase: passphrase.into(),
            certificate: certificate.into(),
            ca: ca.into(),
            environment: Environment::Production,
            timeout: DEFAULT_TIMEOUT,
            base_url: None,
        }
    }

    /// Set the environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the request timeout. `Duration::ZERO` disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the CA from raw PEM bytes
    pub fn with_ca_pem(mut self, pem: &[u8]) -> Self {
        self.ca = base64::engine::general_purpose::STANDARD.encode(pem);
        self
    }

    /// Load the configuration from environment variables.
    ///
    /// Reads `SWISH_CERTIFICATE_PATH`, `SWISH_PASSPHRASE`, `SWISH_CA` or
    /// `SWISH_CA_PATH`, and optionally `SWISH_ENVIRONMENT` and
    /// `SWISH_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let certificate_path = required_var("SWISH_CERTIFICATE_PATH")?;
        let certificate = std::fs::read(&certificate_path)?;
        let passphrase = env::var("SWISH_PASSPHRASE").unwrap_or_default();

        let mut config = Self::new(certificate, passphrase, String::new());

        config = match (env::var("SWISH_CA"), env::var("SWISH_CA_PATH")) {
            (Ok(ca), _) if !ca.is_empty() => {
                config.ca = ca;
                config
            }
            (_, Ok(path)) if !path.is_empty() => {
                let pem = std::fs::read(&path)?;
                config.with_ca_pem(&pem)
            }
            _ => {
                return Err(SwishError::config(
                    "Missing CA: SWISH_CA or SWISH_CA_PATH must be set",
                ))
            }
        };

        if let Ok(environment) = env::var("SWISH_ENVIRONMENT") {
            config.environment = environment.parse()?;
        }

        if let Ok(secs) = env::var("SWISH_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| SwishError::config(format!("Invalid SWISH_TIMEOUT_SECS: {}", secs)))?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.certificate.is_empty() {
            return Err(SwishError::config("Certificate bundle cannot be empty"));
        }

        if self.ca.trim().is_empty() {
            return Err(SwishError::config("CA certificate cannot be empty"));
        }

        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SwishError::config(
                    "Base URL must start with http:// or https://",
                ));
            }
        }

        Ok(())
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }

    /// Decode the CA into PEM bytes
    pub(crate) fn ca_pem(&self) -> Result<Vec<u8>> {
        // Tolerate line-wrapped base64
        let compact: String = self.ca.split_whitespace().collect();
        Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
    }
}

fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(SwishError::config(format!("Missing environment variable: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(vec![1, 2, 3], "swish", "Y2E=")
    }

    #[test]
    fn test_environment_urls() {
        assert_eq!(Environment::Test.base_url(), "https://mss.cpc.getswish.net");
        assert_eq!(Environment::Production.base_url(), "https://cpc.getswish.net");
        assert_eq!(Environment::default(), Environment::Production);
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!(" PRODUCTION ".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_base_url_selection() {
        let config = config();
        assert_eq!(config.base_url(), PRODUCTION_URL);

        let config = config.with_environment(Environment::Test);
        assert_eq!(config.base_url(), TEST_URL);

        let config = config.with_base_url("http://127.0.0.1:1234");
        assert_eq!(config.base_url(), "http://127.0.0.1:1234");
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());
        assert!(ClientConfig::new(Vec::new(), "swish", "Y2E=").validate().is_err());
        assert!(ClientConfig::new(vec![1], "swish", "").validate().is_err());
        assert!(config().with_timeout(Duration::ZERO).validate().is_ok());
        assert!(config().with_base_url("ftp://example.com").validate().is_err());
    }

    #[test]
    fn test_ca_pem_roundtrip() {
        let config = config().with_ca_pem(b"-----BEGIN CERTIFICATE-----\n");
        assert_eq!(config.ca_pem().unwrap(), b"-----BEGIN CERTIFICATE-----\n");
    }

    #[test]
    fn test_ca_pem_rejects_garbage() {
        let config = ClientConfig::new(vec![1], "swish", "not base64!");
        assert!(matches!(config.ca_pem(), Err(SwishError::Base64(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", ClientConfig::new(vec![1, 2, 3], "hunter2", "Y2E="));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("<3 bytes>"));
    }
}
