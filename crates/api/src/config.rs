//! Process configuration, read once from the environment at startup.
//!
//! The allowlist is the exception: it is re-read on every gate call by
//! [`itemvault_auth::EnvAllowlist`], so only the variable *name* lives here.

use std::net::SocketAddr;

use thiserror::Error;

use itemvault_auth::allowlist::DEFAULT_ALLOWLIST_VAR;
use itemvault_core::Uid;

const DEV_SESSION_SECRET: &str = "dev-session-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

fn invalid(var: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// HS256 secret for ID tokens and session cookies.
    pub session_secret: String,
    /// Audience/issuer suffix of minted tokens.
    pub project_id: String,
    pub session_ttl_days: i64,
    /// Mark the session cookie `Secure` (disable only for plain-http local dev).
    pub secure_cookies: bool,
    /// Name of the variable holding the comma-separated email allowlist.
    pub allowlist_var: String,
    /// `(key, uid)` pairs seeded into the API-key directory at startup.
    pub dev_api_keys: Vec<(String, Uid)>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            session_secret: DEV_SESSION_SECRET.to_string(),
            project_id: "itemvault-dev".to_string(),
            session_ttl_days: 5,
            secure_cookies: true,
            allowlist_var: DEFAULT_ALLOWLIST_VAR.to_string(),
            dev_api_keys: Vec::new(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|e| invalid("BIND_ADDR", format!("{e}")))?;
        }

        match lookup("SESSION_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(secret) => config.session_secret = secret,
            None => tracing::warn!("SESSION_SECRET not set; using insecure dev default"),
        }

        if let Some(project) = lookup("PROJECT_ID").filter(|s| !s.trim().is_empty()) {
            config.project_id = project;
        }

        if let Some(days) = lookup("SESSION_TTL_DAYS") {
            let days: i64 = days
                .trim()
                .parse()
                .map_err(|e| invalid("SESSION_TTL_DAYS", format!("{e}")))?;
            if !(1..=14).contains(&days) {
                return Err(invalid("SESSION_TTL_DAYS", "must be between 1 and 14"));
            }
            config.session_ttl_days = days;
        }

        if let Some(secure) = lookup("SECURE_COOKIES") {
            config.secure_cookies = secure
                .trim()
                .parse()
                .map_err(|e| invalid("SECURE_COOKIES", format!("{e}")))?;
        }

        if let Some(var) = lookup("ALLOWLIST_VAR").filter(|s| !s.trim().is_empty()) {
            config.allowlist_var = var;
        }

        if let Some(raw) = lookup("DEV_API_KEYS") {
            config.dev_api_keys = parse_api_keys(&raw)?;
        }

        Ok(config)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }
}

/// Parse `key=uid,key=uid`.
fn parse_api_keys(raw: &str) -> Result<Vec<(String, Uid)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, uid) = pair
                .split_once('=')
                .ok_or_else(|| invalid("DEV_API_KEYS", format!("expected key=uid, got '{pair}'")))?;
            let key = key.trim();
            if key.is_empty() || key.contains('/') {
                return Err(invalid("DEV_API_KEYS", format!("invalid key in '{pair}'")));
            }
            let uid = Uid::new(uid.trim()).map_err(|e| invalid("DEV_API_KEYS", e.to_string()))?;
            Ok((key.to_string(), uid))
        })
        .collect()
}
