//! Application settings loaded from environment variables.

use std::env;
use std::time::Duration;

use super::constants::{
    DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_PROTECTED_EMAILS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Base URL of the hosted project (identity + REST stores)
    pub supabase_url: String,
    service_role_key: String,
    anon_key: String,
    jwt_secret: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub http_timeout_seconds: u64,
    /// Accounts the orphan sweep must leave alone (lowercased)
    pub protected_emails: Vec<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field("service_role_key", &"[REDACTED]")
            .field("anon_key", &"[REDACTED]")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("protected_emails", &self.protected_emails)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// # Errors
    /// Fails when `SUPABASE_URL` or `SUPABASE_SERVICE_ROLE_KEY` is missing.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let supabase_url = non_empty("SUPABASE_URL")
            .ok_or_else(|| AppError::internal("SUPABASE_URL must be set"))?
            .trim_end_matches('/')
            .to_string();
        let service_role_key = non_empty("SUPABASE_SERVICE_ROLE_KEY")
            .ok_or_else(|| AppError::internal("SUPABASE_SERVICE_ROLE_KEY must be set"))?;

        let anon_key = non_empty("SUPABASE_ANON_KEY").unwrap_or_else(|| {
            tracing::warn!("SUPABASE_ANON_KEY not set, falling back to the service role key");
            service_role_key.clone()
        });

        let protected_emails = non_empty("PROTECTED_ACCOUNT_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                DEFAULT_PROTECTED_EMAILS
                    .iter()
                    .map(|e| e.to_string())
                    .collect()
            });

        Ok(Self {
            supabase_url,
            service_role_key,
            anon_key,
            jwt_secret: non_empty("SUPABASE_JWT_SECRET"),
            server_host: non_empty("SERVER_HOST")
                .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: non_empty("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            http_timeout_seconds: non_empty("HTTP_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS),
            protected_emails,
        })
    }

    /// Privileged key used for every store call made by the server.
    pub fn service_role_key(&self) -> &str {
        &self.service_role_key
    }

    /// Public key sent alongside user tokens to the identity store.
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Secret for local access-token verification, when configured.
    pub fn jwt_secret_bytes(&self) -> Option<&[u8]> {
        self.jwt_secret.as_deref().map(str::as_bytes)
    }

    /// Timeout applied to outbound store requests.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_requires_url_and_service_key() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("SUPABASE_URL", "http://x")])).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://proj.supabase.co/"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ]))
        .unwrap();

        assert_eq!(config.supabase_url, "https://proj.supabase.co");
        assert_eq!(config.anon_key(), "service");
        assert!(config.jwt_secret_bytes().is_none());
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.protected_emails.len(), 3);
        assert!(config
            .protected_emails
            .contains(&"admin@petvac.com".to_string()));
    }

    #[test]
    fn test_protected_emails_are_normalized() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
            ("PROTECTED_ACCOUNT_EMAILS", " Root@Example.com , ,ops@example.com"),
            ("SERVER_PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(
            config.protected_emails,
            vec!["root@example.com".to_string(), "ops@example.com".to_string()]
        );
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_SERVICE_ROLE_KEY", "super-secret-key"),
            ("SUPABASE_JWT_SECRET", "jwt-secret-value"),
        ]))
        .unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-key"));
        assert!(!rendered.contains("jwt-secret-value"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
