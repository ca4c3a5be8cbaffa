//! Configuration module for httpmail.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::smtp::TlsPolicy;
use crate::{HttpMailError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream SMTP relay configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpConfig {
    /// Relay address as `host:port`.
    #[serde(default)]
    pub address: String,
    /// Talk to the relay in plain text, without STARTTLS.
    #[serde(default)]
    pub skip_tls: bool,
    /// Connect timeout in seconds. No timeout when unset.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Name announced in EHLO. Defaults to the local hostname.
    #[serde(default)]
    pub hello_name: Option<String>,
    /// PEM file with extra root certificates trusted for STARTTLS, for
    /// relays using a private CA.
    #[serde(default)]
    pub ca_file: Option<String>,
}

impl SmtpConfig {
    /// TLS policy derived from `skip_tls`.
    pub fn tls_policy(&self) -> TlsPolicy {
        if self.skip_tls {
            TlsPolicy::Skip
        } else {
            TlsPolicy::Required
        }
    }

    /// Connect timeout as a duration.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

/// Mail field defaults applied when a request leaves a field out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsConfig {
    /// Default sender address.
    #[serde(default)]
    pub from: String,
    /// Default recipients, comma separated.
    #[serde(default)]
    pub to: String,
    /// Default subject.
    #[serde(default)]
    pub subject: String,
    /// Default mail text.
    #[serde(default)]
    pub body: String,
    /// When non-empty, this is the sender regardless of request parameters.
    #[serde(default)]
    pub locked_from: String,
}

impl DefaultsConfig {
    /// Default recipients split out of the comma separated list.
    pub fn to_list(&self) -> Vec<String> {
        self.to
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The locked sender, if one is configured.
    pub fn locked_from(&self) -> Option<&str> {
        Some(self.locked_from.as_str()).filter(|s| !s.is_empty())
    }
}

/// Request handling options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    /// Hide relay-side error text from HTTP callers.
    #[serde(default)]
    pub redact_errors: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// SMTP relay configuration.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Mail defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Request handling options.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(HttpMailError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| HttpMailError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `HTTPMAIL_PORT`: Port to listen on
    /// - `HTTPMAIL_SMTP_SERVER`: Relay `host:port`
    /// - `HTTPMAIL_SKIP_TLS`: Skip TLS towards the relay (`true`/`false`)
    /// - `HTTPMAIL_FROM`, `HTTPMAIL_TO`, `HTTPMAIL_SUBJECT`, `HTTPMAIL_MESSAGE`: Mail defaults
    /// - `HTTPMAIL_FORCED_FROM`: Locked sender
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = get("HTTPMAIL_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| HttpMailError::Config(format!("invalid HTTPMAIL_PORT: {port}")))?;
        }
        if let Some(address) = get("HTTPMAIL_SMTP_SERVER") {
            self.smtp.address = address;
        }
        if let Some(skip) = get("HTTPMAIL_SKIP_TLS") {
            self.smtp.skip_tls = parse_bool(&skip).ok_or_else(|| {
                HttpMailError::Config(format!("invalid HTTPMAIL_SKIP_TLS: {skip}"))
            })?;
        }
        if let Some(from) = get("HTTPMAIL_FROM") {
            self.defaults.from = from;
        }
        if let Some(to) = get("HTTPMAIL_TO") {
            self.defaults.to = to;
        }
        if let Some(subject) = get("HTTPMAIL_SUBJECT") {
            self.defaults.subject = subject;
        }
        if let Some(body) = get("HTTPMAIL_MESSAGE") {
            self.defaults.body = body;
        }
        if let Some(locked) = get("HTTPMAIL_FORCED_FROM") {
            self.defaults.locked_from = locked;
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the relay address is not set.
    pub fn validate(&self) -> Result<()> {
        if self.smtp.address.trim().is_empty() {
            return Err(HttpMailError::Validation(
                "smtp.address is not set. \
                 Set it in config.toml or via HTTPMAIL_SMTP_SERVER environment variable."
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
