use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::{Account, AuthError, NewAccount};

/// Persistence for account records.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts the account unless the username is taken, in which case `None` is returned.
    /// The check and the insert happen as one atomic step.
    async fn insert_account(&self, account: NewAccount) -> Result<Option<Account>, AuthError>;

    /// Looks an account up by its exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError>;

    /// Looks an account up by ID.
    async fn find_by_id(&self, account_id: &Uuid) -> Result<Option<Account>, AuthError>;
}

/// Account store backed by the `accounts` table.
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Creates a new instance of `PgAccountStore` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert_account(&self, account: NewAccount) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, account_id: &Uuid) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
