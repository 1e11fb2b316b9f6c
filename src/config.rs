//! Console configuration: backend location, token persistence and endpoint paths.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE_URL: &str = "https://nyc360.runasp.net/api";
pub const ACCESS_TOKEN_KEY: &str = "nyc360_token";
pub const REFRESH_TOKEN_KEY: &str = "nyc360_refresh_token";

/// Backend paths, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub two_factor_verify: String,
    pub refresh_token: String,
    pub register: String,
    pub confirm_email: String,
    pub forgot_password: String,
    pub password_reset: String,
    pub change_password: String,
    pub external_google: String,
    pub users: String,
    pub users_dashboard: String,
    pub roles_dashboard: String,
    pub posts: String,
    pub posts_dashboard: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login".into(),
            two_factor_verify: "/auth/2fa-verify".into(),
            refresh_token: "/auth/refresh-token".into(),
            register: "/auth/register".into(),
            confirm_email: "/auth/confirm-email".into(),
            forgot_password: "/auth/forgot-password".into(),
            password_reset: "/auth/password-reset".into(),
            change_password: "/auth/change-password".into(),
            external_google: "/oauth/google".into(),
            users: "/users".into(),
            users_dashboard: "/users-dashboard".into(),
            roles_dashboard: "/roles-dashboard".into(),
            posts: "/posts".into(),
            posts_dashboard: "/posts-dashboard".into(),
        }
    }
}

impl Endpoints {
    /// Login and refresh must never trigger a refresh-and-retry of themselves.
    pub fn is_retry_exempt(&self, path: &str) -> bool {
        path.contains(self.login.as_str()) || path.contains(self.refresh_token.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    /// Where tokens persist between runs. `None` keeps them in memory only.
    pub token_file: Option<PathBuf>,
    pub access_token_key: String,
    pub refresh_token_key: String,
    pub request_timeout: Option<Duration>,
    pub endpoints: Endpoints,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_file: None,
            access_token_key: ACCESS_TOKEN_KEY.to_string(),
            refresh_token_key: REFRESH_TOKEN_KEY.to_string(),
            request_timeout: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn with_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Overlay `NYC360_*` environment variables on the defaults.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(url) = lookup("NYC360_API_BASE_URL") {
            let trimmed = url.trim();
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                return Err(AppError::config(
                    "invalid_base_url".to_string(),
                    format!("NYC360_API_BASE_URL must be an http(s) URL, got '{}'", trimmed),
                ));
            }
            cfg.api_base_url = trimmed.to_string();
        }
        if let Some(path) = lookup("NYC360_TOKEN_FILE") {
            if !path.trim().is_empty() {
                cfg.token_file = Some(PathBuf::from(path.trim()));
            }
        }
        if let Some(secs) = lookup("NYC360_REQUEST_TIMEOUT_SECS") {
            let n = secs.trim().parse::<u64>().map_err(|_| {
                AppError::config(
                    "invalid_timeout".to_string(),
                    format!("NYC360_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'", secs),
                )
            })?;
            cfg.request_timeout = if n == 0 { None } else { Some(Duration::from_secs(n)) };
        }
        Ok(cfg)
    }

    /// Absolute URL for an endpoint path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = ConsoleConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.access_token_key, "nyc360_token");
        assert!(cfg.token_file.is_none());
        assert!(cfg.request_timeout.is_none());
    }

    #[test]
    fn env_overrides_apply() {
        let cfg = ConsoleConfig::from_lookup(lookup_from(&[
            ("NYC360_API_BASE_URL", "http://127.0.0.1:5000/api/"),
            ("NYC360_TOKEN_FILE", "/tmp/tokens.json"),
            ("NYC360_REQUEST_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(cfg.url_for("/auth/login"), "http://127.0.0.1:5000/api/auth/login");
        assert_eq!(cfg.token_file, Some(PathBuf::from("/tmp/tokens.json")));
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn bad_values_are_config_errors() {
        let err = ConsoleConfig::from_lookup(lookup_from(&[("NYC360_REQUEST_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.code_str(), "invalid_timeout");
        let err = ConsoleConfig::from_lookup(lookup_from(&[("NYC360_API_BASE_URL", "ftp://x")])).unwrap_err();
        assert_eq!(err.code_str(), "invalid_base_url");
    }

    #[test]
    fn only_login_and_refresh_are_exempt() {
        let ep = Endpoints::default();
        assert!(ep.is_retry_exempt("/auth/login"));
        assert!(ep.is_retry_exempt("/auth/refresh-token"));
        assert!(!ep.is_retry_exempt("/auth/2fa-verify"));
        assert!(!ep.is_retry_exempt("/users-dashboard/all"));
    }
}
