use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CarrierError, Result};

pub const DEFAULT_ADDRESS_FILE: &str = "config/fedex/address.json";
pub const DEFAULT_ORIGINS: [&str; 2] = ["Seattle", "Provo"];
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_JWT_EXPIRES_SECS: u64 = 3600;
pub const MAX_JWT_EXPIRES_SECS: u64 = 30 * 24 * 3600;

/// Static credentials for the optional login gate.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub username: String,
    pub password: String,
    pub jwt_secret: String,
    pub expires_secs: u64,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub account_number: String,
    pub address_file: PathBuf,
    pub valid_origins: Vec<String>,
    pub bind_addr: String,
    pub request_timeout: Duration,
    pub auth: Option<AuthSettings>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    /// - `FEDEX_CLIENT_ID`: Required - OAuth client id
    /// - `FEDEX_CLIENT_SECRET`: Required - OAuth client secret
    /// - `FEDEX_BASE_URL`: Required - Carrier API base URL
    /// - `FEDEX_ACCOUNT_NUMBER`: Required - Shipper account number
    /// - `FEDEX_ADDRESS_FILE`: Optional - Origin address table (default: "config/fedex/address.json")
    /// - `FEDEX_ORIGINS`: Optional - Comma-separated accepted origins (default: "Seattle,Provo")
    /// - `BIND_ADDR`: Optional - Listen address (default: "127.0.0.1:5000")
    /// - `FEDEX_TIMEOUT_SECS`: Optional - Per-call carrier timeout (default: 30)
    /// - `API_USERNAME`, `API_PASSWORD`, `JWT_SECRET`: Optional - Enable the login gate when all are set
    /// - `JWT_EXPIRES_SECS`: Optional - Session token lifetime (default: 3600, max: 30 days)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// All required keys are checked together; the error names every one
    /// that is missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            let value = read(key);
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let client_id = required("FEDEX_CLIENT_ID");
        let client_secret = required("FEDEX_CLIENT_SECRET");
        let base_url = required("FEDEX_BASE_URL");
        let account_number = required("FEDEX_ACCOUNT_NUMBER");

        if !missing.is_empty() {
            return Err(CarrierError::Configuration(format!(
                "Missing environment variables: {}",
                missing.join(", ")
            )));
        }

        let address_file = read("FEDEX_ADDRESS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ADDRESS_FILE));

        let valid_origins = match read("FEDEX_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let bind_addr = read("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let request_timeout = match read("FEDEX_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(CarrierError::Configuration(format!(
                        "FEDEX_TIMEOUT_SECS must be a positive number of seconds: {raw}"
                    )));
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let auth = parse_auth(&read)?;

        Ok(Config {
            client_id,
            client_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
            account_number,
            address_file,
            valid_origins,
            bind_addr,
            request_timeout,
            auth,
        })
    }
}

fn parse_origins(raw: &str) -> Result<Vec<String>> {
    let mut origins: Vec<String> = Vec::new();
    for origin in raw.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        if !origins.iter().any(|o| o == origin) {
            origins.push(origin.to_string());
        }
    }

    if origins.is_empty() {
        return Err(CarrierError::Configuration(
            "FEDEX_ORIGINS must name at least one origin".to_string(),
        ));
    }

    Ok(origins)
}

fn parse_auth<F>(read: &F) -> Result<Option<AuthSettings>>
where
    F: Fn(&str) -> Option<String>,
{
    let username = read("API_USERNAME");
    let password = read("API_PASSWORD");
    let jwt_secret = read("JWT_SECRET");

    match (username, password, jwt_secret) {
        (None, None, None) => Ok(None),
        (Some(username), Some(password), Some(jwt_secret)) => {
            let expires_secs = match read("JWT_EXPIRES_SECS") {
                Some(raw) => match raw.trim().parse::<u64>() {
                    Ok(secs) if (1..=MAX_JWT_EXPIRES_SECS).contains(&secs) => secs,
                    _ => {
                        return Err(CarrierError::Configuration(format!(
                            "JWT_EXPIRES_SECS must be between 1 and {MAX_JWT_EXPIRES_SECS}: {raw}"
                        )));
                    }
                },
                None => DEFAULT_JWT_EXPIRES_SECS,
            };

            Ok(Some(AuthSettings {
                username,
                password,
                jwt_secret,
                expires_secs,
            }))
        }
        (username, password, jwt_secret) => {
            let missing: Vec<&str> = [
                ("API_USERNAME", username.is_none()),
                ("API_PASSWORD", password.is_none()),
                ("JWT_SECRET", jwt_secret.is_none()),
            ]
            .into_iter()
            .filter_map(|(key, absent)| absent.then_some(key))
            .collect();

            Err(CarrierError::Configuration(format!(
                "Login gate is partially configured, missing: {}",
                missing.join(", ")
            )))
        }
    }
}
