use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::storage::Collections;

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
    pub access: AccessConfig,
    pub dashboard: DashboardConfig,
    pub summary: SummaryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = Collections::default();
        let collections = Collections {
            case_studies: env::var("APP_CASE_STUDY_COLLECTION").unwrap_or(defaults.case_studies),
            evaluations: env::var("APP_EVALUATION_COLLECTION").unwrap_or(defaults.evaluations),
        };
        let seed_path = env::var("APP_SEED_PATH").ok().map(PathBuf::from);

        let mut authorized_emails = split_list(&env::var("APP_AUTHORIZED_EMAILS").unwrap_or_default());
        if let Ok(path) = env::var("APP_AUTHORIZED_EMAILS_FILE") {
            authorized_emails.extend(load_authorized_emails(Path::new(&path))?);
        }
        let admin_emails = split_list(&env::var("APP_ADMIN_EMAILS").unwrap_or_default());

        let company_urls = match env::var("APP_COMPANY_URLS_FILE") {
            Ok(path) => load_company_urls(Path::new(&path))?,
            Err(_) => Vec::new(),
        };

        let limit = env::var("APP_SUMMARY_LIMIT")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or(ConfigError::InvalidSummaryLimit)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                collections,
                seed_path,
            },
            access: AccessConfig {
                authorized_emails,
                admin_emails,
            },
            dashboard: DashboardConfig { company_urls },
            summary: SummaryConfig { limit },
        })
    }
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Document store collections and the optional seed file for the in-memory backend.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub collections: Collections,
    pub seed_path: Option<PathBuf>,
}

/// Reviewer allow-list. Comparisons are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    pub authorized_emails: Vec<String>,
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    pub company_urls: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub limit: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

#[derive(Deserialize)]
struct AuthorizedEmailsFile {
    #[serde(default)]
    authorized_emails: Vec<String>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads `{ "authorized_emails": [...] }`.
pub fn load_authorized_emails(path: &Path) -> Result<Vec<String>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: AuthorizedEmailsFile =
        serde_json::from_str(&raw).map_err(|source| ConfigError::AuthorizedEmails {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parsed.authorized_emails)
}

/// Reads one URL per line, dropping blanks and duplicates. Output is sorted.
pub fn load_company_urls(path: &Path) -> Result<Vec<String>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let urls: BTreeSet<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    Ok(urls.into_iter().collect())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidSummaryLimit,
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    AuthorizedEmails {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSummaryLimit => {
                write!(f, "APP_SUMMARY_LIMIT must be a positive integer")
            }
            ConfigError::File { path, .. } => {
                write!(f, "unable to read '{}'", path.display())
            }
            ConfigError::AuthorizedEmails { path, .. } => write!(
                f,
                "'{}' must contain {{\"authorized_emails\": [...]}}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidSummaryLimit => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::File { source, .. } => Some(source),
            ConfigError::AuthorizedEmails { source, .. } => Some(source),
        }
    }
}
