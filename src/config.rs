use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for the vouch ledger service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Audit notification configuration
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub url: String,
    /// Connection pool size
    pub max_connections: u32,
    /// Interactive deadline for a single store call, in seconds. A call
    /// that runs past this surfaces as a transient error.
    pub call_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Gateway webhook base URL for audit notifications. Unset disables
    /// delivery entirely.
    pub webhook_base_url: Option<String>,
    /// Delivery timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8180,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost:5432/vouch_ledger".to_string(),
                max_connections: 10,
                call_timeout_secs: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            audit: AuditConfig {
                webhook_base_url: None,
                timeout_secs: 5,
            },
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("VOUCH_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = env::var("VOUCH_PORT") {
            config.server.port = port.parse().context("Invalid VOUCH_PORT value")?;
        }

        if let Ok(url) = env::var("VOUCH_DATABASE_URL") {
            config.database.url = url;
        }

        if let Ok(max) = env::var("VOUCH_DB_MAX_CONNECTIONS") {
            config.database.max_connections =
                max.parse().context("Invalid VOUCH_DB_MAX_CONNECTIONS value")?;
        }

        if let Ok(timeout) = env::var("VOUCH_STORE_TIMEOUT_SECS") {
            config.database.call_timeout_secs = timeout
                .parse()
                .context("Invalid VOUCH_STORE_TIMEOUT_SECS value")?;
        }

        if let Ok(level) = env::var("VOUCH_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(base_url) = env::var("VOUCH_AUDIT_WEBHOOK_URL") {
            if !base_url.is_empty() {
                config.audit.webhook_base_url = Some(base_url);
            }
        }

        if let Ok(timeout) = env::var("VOUCH_AUDIT_TIMEOUT_SECS") {
            config.audit.timeout_secs = timeout
                .parse()
                .context("Invalid VOUCH_AUDIT_TIMEOUT_SECS value")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for consistency
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.database.url.is_empty() {
            return Err(anyhow::anyhow!("Database URL cannot be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("Connection pool size must be non-zero"));
        }

        if self.database.call_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "Store call timeout must be at least one second"
            ));
        }

        if let Some(ref url) = self.audit.webhook_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "Audit webhook URL must be an http(s) URL: {}",
                    url
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(LedgerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = LedgerConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_webhook_scheme_checked() {
        let mut config = LedgerConfig::default();
        config.audit.webhook_base_url = Some("ftp://bad.example".to_string());
        assert!(config.validate().is_err());
        config.audit.webhook_base_url = Some("https://gateway.example".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = LedgerConfig::default();
        config.database.call_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
