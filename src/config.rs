//! Application configuration
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory holding the append-only log streams
    pub log_dir: PathBuf,
    /// Maximum accepted request body in bytes
    pub max_body_size: usize,
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
    /// Environment (development/production)
    pub environment: Environment,
    /// Site identity used in notifications and the spam filter
    pub site: SiteConfig,
    /// Outbound mail settings
    pub mail: MailConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

/// Public identity of the site
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Display name, e.g. "Beehive Lodge"
    pub name: String,
    /// Own domain; links to it are not treated as spam
    pub domain: String,
    /// Phone number printed in confirmation emails
    pub contact_phone: String,
}

/// Mail identity and delivery settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from_email: String,
    pub from_name: String,
    /// Operator inbox receiving notifications
    pub operator_email: String,
    /// Optional HTTP mail relay; when absent mails are only logged
    pub relay_url: Option<String>,
    pub relay_token: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Beehive Lodge".to_string(),
            domain: "beehive-lodge.fr".to_string(),
            contact_phone: "+33 1 23 45 67 89".to_string(),
        }
    }
}

impl MailConfig {
    /// Mail settings for local runs and tests: everything goes to one inbox.
    pub fn local(address: &str) -> Self {
        Self {
            from_email: address.to_string(),
            from_name: SiteConfig::default().name,
            operator_email: address.to_string(),
            relay_url: None,
            relay_token: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        let port = match env::var("PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT must be a number, got '{}'", p)))?,
            Err(_) => 8080,
        };

        let defaults = SiteConfig::default();
        let site = SiteConfig {
            name: env::var("SITE_NAME").unwrap_or(defaults.name),
            domain: env::var("SITE_DOMAIN")
                .map(|d| d.trim().trim_start_matches("www.").to_lowercase())
                .unwrap_or(defaults.domain),
            contact_phone: env::var("CONTACT_PHONE").unwrap_or(defaults.contact_phone),
        };

        // Sender and operator inbox must be explicit in production; a
        // development run falls back to a local placeholder address.
        let operator_email = match env::var("MAIL_TO_EMAIL") {
            Ok(addr) => addr,
            Err(_) if environment == Environment::Production => {
                return Err(ConfigError::Missing("MAIL_TO_EMAIL is required".to_string()))
            }
            Err(_) => "contact@localhost".to_string(),
        };
        let from_email = env::var("MAIL_FROM_EMAIL").unwrap_or_else(|_| operator_email.clone());

        let relay_url = env::var("MAIL_RELAY_URL").ok().filter(|u| !u.trim().is_empty());
        if let Some(ref url) = relay_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ConfigError::Invalid(format!(
                    "MAIL_RELAY_URL must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }

        let mail = MailConfig {
            from_email,
            from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| site.name.clone()),
            operator_email,
            relay_url,
            relay_token: env::var("MAIL_RELAY_TOKEN").ok(),
        };

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            log_dir: env::var("LOG_DIR")
                .or_else(|_| env::var("DATA_PATH").map(|p| format!("{}/logs", p.trim_end_matches('/'))))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./logs")),
            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024), // 64KB default
            cors_origins: env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["http://localhost:8080".to_string()]),
            environment,
            site,
            mail,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_dir: PathBuf::from("./logs"),
            max_body_size: 1024,
            cors_origins: vec![],
            environment: Environment::Development,
            site: SiteConfig::default(),
            mail: MailConfig::local("ops@example.com"),
        };
        assert_eq!(config.server_addr(), "127.0.0.1:3000");
        assert!(!config.is_production());
    }

    #[test]
    fn test_local_mail_config() {
        let mail = MailConfig::local("ops@example.com");
        assert_eq!(mail.operator_email, "ops@example.com");
        assert_eq!(mail.from_name, "Beehive Lodge");
        assert!(mail.relay_url.is_none());
    }
}
