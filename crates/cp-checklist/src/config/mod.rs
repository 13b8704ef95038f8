use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use lettre::message::Mailbox;
use lettre::Address;
use secrecy::SecretString;

use crate::workflows::checklist::{FilenameStyle, PropertyRecipientMap};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub recipients: PropertyRecipientMap,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment =
            AppEnvironment::from_str(&var("APP_ENV").unwrap_or_else(|| "development".to_string()));

        let host = var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("APP_PORT")
            .unwrap_or_else(|| "5000".to_string())
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let output_dir = var("CHECKLIST_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let filename_style = match var("CHECKLIST_FILENAME_STYLE") {
            Some(raw) => FilenameStyle::parse(&raw)
                .ok_or(ConfigError::InvalidFilenameStyle { value: raw })?,
            None => FilenameStyle::default(),
        };

        let recipients = match var("CHECKLIST_PROPERTY_RECIPIENTS") {
            Some(raw) => parse_recipient_table(&raw)?,
            None => PropertyRecipientMap::standard().entries().to_vec(),
        };
        let default_recipient = var("CHECKLIST_DEFAULT_RECIPIENT")
            .unwrap_or_else(|| PropertyRecipientMap::STANDARD_DEFAULT.to_string());
        let default_recipient = parse_address(&default_recipient)
            .ok_or_else(|| ConfigError::InvalidRecipient {
                entry: default_recipient.clone(),
            })?
            .to_string();

        let smtp_port = match var("SMTP_PORT") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidSmtpPort)?,
            ),
            None => None,
        };
        let username = var("SMTP_USERNAME");
        let password = var("SMTP_PASSWORD").map(SecretString::from);
        let from = var("MAIL_FROM")
            .or_else(|| username.clone())
            .unwrap_or_else(|| DEFAULT_SENDER.to_string());
        if from.trim().parse::<Mailbox>().is_err() {
            return Err(ConfigError::InvalidSender { value: from });
        }
        let enabled = match var("MAIL_ENABLED") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidMailFlag { value: raw })?,
            None => true,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                output_dir,
                filename_style,
            },
            mail: MailConfig {
                relay: var("SMTP_RELAY").unwrap_or_else(|| DEFAULT_RELAY.to_string()),
                port: smtp_port,
                username,
                password,
                from,
                enabled,
            },
            recipients: PropertyRecipientMap::new(recipients, default_recipient),
        })
    }
}

const DEFAULT_OUTPUT_DIR: &str = "inspection-reports";
const DEFAULT_RELAY: &str = "smtp.gmail.com";
const DEFAULT_SENDER: &str = "inspections@example.com";

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_address(value: &str) -> Option<Address> {
    value.trim().parse::<Address>().ok()
}

/// Parse `Property=address;Property=address` pairs, preserving declaration order.
fn parse_recipient_table(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = || ConfigError::InvalidRecipient {
                entry: entry.to_string(),
            };
            let (property, address) = entry.split_once('=').ok_or_else(invalid)?;
            let (property, address) = (property.trim(), address.trim());
            if property.is_empty() {
                return Err(invalid());
            }
            let address = parse_address(address).ok_or_else(invalid)?;
            Ok((property.to_string(), address.to_string()))
        })
        .collect()
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where generated checklist PDFs land and how they are named.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
    pub filename_style: FilenameStyle,
}

/// Outbound mail relay settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub relay: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub from: String,
    /// When disabled, messages are logged instead of sent.
    pub enabled: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSmtpPort,
    InvalidRecipient { entry: String },
    InvalidSender { value: String },
    InvalidFilenameStyle { value: String },
    InvalidMailFlag { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid u16"),
            ConfigError::InvalidRecipient { entry } => write!(
                f,
                "recipient entry '{}' must look like 'Property=name@domain'",
                entry
            ),
            ConfigError::InvalidSender { value } => write!(
                f,
                "MAIL_FROM '{}' must be a mailbox such as 'Inspections <name@domain>'",
                value
            ),
            ConfigError::InvalidFilenameStyle { value } => write!(
                f,
                "CHECKLIST_FILENAME_STYLE '{}' must be 'millis' or 'timestamp'",
                value
            ),
            ConfigError::InvalidMailFlag { value } => {
                write!(f, "MAIL_ENABLED '{}' must be true or false", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "CHECKLIST_OUTPUT_DIR",
            "CHECKLIST_FILENAME_STYLE",
            "CHECKLIST_PROPERTY_RECIPIENTS",
            "CHECKLIST_DEFAULT_RECIPIENT",
            "SMTP_RELAY",
            "SMTP_PORT",
            "SMTP_USERNAME",
            "SMTP_PASSWORD",
            "MAIL_FROM",
            "MAIL_ENABLED",
        ] {
            env::remove_var(key);
        }
    }

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.storage.output_dir, PathBuf::from("inspection-reports"));
        assert_eq!(config.storage.filename_style, FilenameStyle::EpochMillis);
        assert!(config.mail.enabled);
        assert!(config.mail.password.is_none());
        assert_eq!(
            config.recipients.resolve(Some("San Clemente")),
            PropertyRecipientMap::standard().resolve(Some("San Clemente"))
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        reset_env();
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 5000));
    }

    #[test]
    fn parses_recipient_table_and_default() {
        let config = from_pairs(&[
            (
                "CHECKLIST_PROPERTY_RECIPIENTS",
                "San Clemente = sc@example.com; Harbor Point=hp@example.com;",
            ),
            ("CHECKLIST_DEFAULT_RECIPIENT", "desk@example.com"),
        ])
        .expect("config loads");

        assert_eq!(config.recipients.resolve(Some("San Clemente")), "sc@example.com");
        assert_eq!(config.recipients.resolve(Some("Harbor Point")), "hp@example.com");
        assert_eq!(config.recipients.resolve(Some("Property 1")), "desk@example.com");
        assert_eq!(config.recipients.resolve(None), "desk@example.com");
    }

    #[test]
    fn rejects_malformed_recipient_entries() {
        for raw in [
            "San Clemente",
            "=sc@example.com",
            "San Clemente=not-an-address",
            "San Clemente=sc@@exa mple",
            "San Clemente=sc@example.com;Harbor Point=hp@",
        ] {
            let err = from_pairs(&[("CHECKLIST_PROPERTY_RECIPIENTS", raw)])
                .expect_err("entry should be rejected");
            assert!(matches!(err, ConfigError::InvalidRecipient { .. }), "{raw}");
        }
    }

    #[test]
    fn rejects_unusable_default_recipient_and_sender() {
        assert!(matches!(
            from_pairs(&[("CHECKLIST_DEFAULT_RECIPIENT", "front desk@example")]),
            Err(ConfigError::InvalidRecipient { .. })
        ));
        assert!(matches!(
            from_pairs(&[("MAIL_FROM", "inspections at example.com")]),
            Err(ConfigError::InvalidSender { .. })
        ));

        let config = from_pairs(&[("MAIL_FROM", "Inspections <inspections@example.com>")])
            .expect("display-name sender accepted");
        assert_eq!(config.mail.from, "Inspections <inspections@example.com>");
    }

    #[test]
    fn rejects_invalid_ports_and_flags() {
        assert!(matches!(
            from_pairs(&[("APP_PORT", "70000")]),
            Err(ConfigError::InvalidPort)
        ));
        assert!(matches!(
            from_pairs(&[("SMTP_PORT", "smtp")]),
            Err(ConfigError::InvalidSmtpPort)
        ));
        assert!(matches!(
            from_pairs(&[("MAIL_ENABLED", "maybe")]),
            Err(ConfigError::InvalidMailFlag { .. })
        ));
        assert!(matches!(
            from_pairs(&[("CHECKLIST_FILENAME_STYLE", "uuid")]),
            Err(ConfigError::InvalidFilenameStyle { .. })
        ));
    }

    #[test]
    fn mail_sender_falls_back_to_username() {
        let config = from_pairs(&[
            ("SMTP_USERNAME", "relay@example.com"),
            ("SMTP_PASSWORD", "app-password"),
            ("SMTP_PORT", "587"),
            ("MAIL_ENABLED", "off"),
        ])
        .expect("config loads");

        assert_eq!(config.mail.from, "relay@example.com");
        assert_eq!(config.mail.port, Some(587));
        assert!(!config.mail.enabled);
        let password = config.mail.password.expect("password configured");
        assert_eq!(password.expose_secret(), "app-password");
    }
}
