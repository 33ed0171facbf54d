use std::time::Duration;

use sqlx::{PgPool, Row, postgres::PgPoolOptions};

/// Default connection string for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/yelp_camp";

/// Settings for the connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string
    pub url: String,
    /// Upper bound on open connections
    pub max_connections: u32,
    /// How long a request waits for a free connection before failing
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Creates a connection pool to the PostgreSQL database.
///
/// Connections are opened lazily, so the server starts even while the database
/// is down; only a malformed URL fails here.
pub fn create_connection_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_lazy(&config.url)
}

/// Tests the database connection by executing a simple query.
pub async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    let row = sqlx::query("SELECT 1 as test").fetch_one(pool).await?;

    let test_value: i32 = row.get("test");
    log::debug!("Database connection check returned {}", test_value);

    Ok(())
}

/// Applies the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

/// Probes the database every `interval`, logging when it goes away and comes
/// back. Migrations that could not run at startup are retried until they succeed.
pub fn spawn_connection_monitor(
    pool: PgPool,
    interval: Duration,
    mut migrated: bool,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        let mut healthy = true;

        loop {
            ticker.tick().await;

            match test_connection(&pool).await {
                Ok(()) => {
                    if !healthy {
                        log::info!("✅ Database connection restored");
                        healthy = true;
                    }

                    if !migrated {
                        match run_migrations(&pool).await {
                            Ok(()) => {
                                log::info!("🗃️ Database migrations applied");
                                migrated = true;
                            }
                            Err(e) => log::error!("❌ Database migrations failed: {}", e),
                        }
                    }
                }
                Err(e) => {
                    if healthy {
                        log::error!("❌ Database connection lost: {}", e);
                        healthy = false;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_config_creates_lazy_pool() {
        let pool = create_connection_pool(&DatabaseConfig::default());

        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_url_is_rejected() {
        let config = DatabaseConfig {
            url: "definitely not a url".to_string(),
            ..Default::default()
        };

        assert!(create_connection_pool(&config).is_err());
    }
}
