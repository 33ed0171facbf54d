use std::{fmt::Display, str::FromStr, time::Duration};

use postgres::database::{DEFAULT_DATABASE_URL, DatabaseConfig};

/// Session secret used when `SESSION_SECRET` is unset. Fine for development only.
pub const DEFAULT_SESSION_SECRET: &str = "thisshouldbeabettersecret!";

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The variable is set but cannot be parsed
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        /// Environment variable name
        key: &'static str,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Where accounts, campgrounds and reviews are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL through the connection pool
    Postgres,
    /// Process memory; everything is lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{other}', expected postgres or memory")),
        }
    }
}

/// Server configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Static asset directory served under `/public`
    pub public_dir: String,
    /// Store selection
    pub store_backend: StoreBackend,
    /// Connection pool settings, used with the Postgres backend
    pub database: DatabaseConfig,
    /// Key signing session tokens
    pub session_secret: String,
    /// Lifetime of session cookies and session tokens
    pub session_ttl: chrono::Duration,
    /// Whether the session cookie is only sent over HTTPS
    pub session_cookie_secure: bool,
    /// bcrypt cost for password hashes
    pub bcrypt_cost: u32,
}

impl ServerConfig {
    /// Loads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, falling back to defaults for unset
    /// variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let session_secret = lookup("SESSION_SECRET").unwrap_or_else(|| {
            log::warn!("SESSION_SECRET not set, using the development default");
            DEFAULT_SESSION_SECRET.to_string()
        });

        let session_ttl_hours: i64 = try_load(&lookup, "SESSION_TTL_HOURS", "168")?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                value: session_ttl_hours.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let bcrypt_cost: u32 = try_load(&lookup, "BCRYPT_COST", "12")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: "must be between 4 and 31".to_string(),
            });
        }

        Ok(Self {
            host: try_load(&lookup, "HOST", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "3000")?,
            public_dir: try_load(&lookup, "PUBLIC_DIR", "./public")?,
            store_backend: try_load(&lookup, "STORE_BACKEND", "postgres")?,
            database: DatabaseConfig {
                url: try_load(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL)?,
                max_connections: try_load(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?,
                acquire_timeout: Duration::from_secs(5),
            },
            session_secret,
            session_ttl: chrono::Duration::hours(session_ttl_hours),
            session_cookie_secure: try_load(&lookup, "SESSION_COOKIE_SECURE", "false")?,
            bcrypt_cost,
        })
    }

    /// Address to bind the HTTP server to.
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        log::info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.bind_address(), ("0.0.0.0".to_string(), 3000));
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.session_secret, DEFAULT_SESSION_SECRET);
        assert_eq!(config.session_ttl, chrono::Duration::hours(168));
        assert!(!config.session_cookie_secure);
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.public_dir, "./public");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("STORE_BACKEND", "Memory"),
            ("SESSION_SECRET", "s3cret"),
            ("BCRYPT_COST", "4"),
            ("SESSION_COOKIE_SECURE", "true"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.session_secret, "s3cret");
        assert_eq!(config.bcrypt_cost, 4);
        assert!(config.session_cookie_secure);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let error = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(error.to_string().contains("PORT"));

        let error = load(&[("STORE_BACKEND", "mongo")]).unwrap_err();
        assert!(error.to_string().contains("STORE_BACKEND"));

        assert!(load(&[("BCRYPT_COST", "2")]).is_err());
        assert!(load(&[("SESSION_TTL_HOURS", "0")]).is_err());
        assert!(load(&[("SESSION_COOKIE_SECURE", "yes")]).is_err());
    }
}
