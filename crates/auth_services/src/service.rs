use std::sync::Arc;

use bcrypt::{hash, verify};
use uuid::Uuid;
use validator::Validate;

use crate::jwt::JwtService;
use crate::store::AccountStore;
use crate::types::{
    Account, AuthError, MAX_PASSWORD_BYTES, NewAccount, RegisterRequest, validation_message,
};

/// A service for handling account operations: registration, credential checks,
/// and converting accounts to and from session tokens.
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    jwt: JwtService,
    hash_cost: u32,
    // Verified against when the username is unknown so both failures cost the same.
    dummy_hash: String,
}

impl AuthService {
    /// Creates a new `AuthService` hashing passwords with the given bcrypt cost.
    pub fn new(
        store: Arc<dyn AccountStore>,
        jwt: JwtService,
        hash_cost: u32,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hash(Uuid::new_v4().to_string(), hash_cost)?;

        Ok(Self {
            store,
            jwt,
            hash_cost,
            dummy_hash,
        })
    }

    /// Registers a new account. Fails with `DuplicateUsername` if the username is taken.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Account, AuthError> {
        let request = RegisterRequest {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password: request.password.clone(),
        };

        request
            .validate()
            .map_err(|e| AuthError::Validation(validation_message(&e)))?;

        let password_hash = hash(&request.password, self.hash_cost)?;

        let account = self
            .store
            .insert_account(NewAccount {
                id: Uuid::new_v4(),
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await?
            .ok_or(AuthError::DuplicateUsername)?;

        log::info!("Registered account {}", account.username);

        Ok(account)
    }

    /// Checks a username/password pair. Both an unknown username and a wrong
    /// password fail with `InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let account = self.store.find_by_username(username.trim()).await?;

        // Registration never accepts longer passwords, and bcrypt would truncate them.
        let account = account.filter(|_| password.len() <= MAX_PASSWORD_BYTES);

        let Some(account) = account else {
            let _ = verify(password, &self.dummy_hash);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Produces the token stored in the session for a signed-in account.
    pub fn serialize_for_session(&self, account: &Account) -> Result<String, AuthError> {
        self.jwt.generate_session_token(account)
    }

    /// Restores the account a session token was issued for, without checking the password.
    pub async fn deserialize_from_session(&self, token: &str) -> Result<Account, AuthError> {
        let account_id = self.jwt.extract_account_id(token)?;

        self.store
            .find_by_id(&account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryAccountStore;

    const TEST_COST: u32 = 4;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryAccountStore::new()),
            JwtService::new("test-secret", chrono::Duration::hours(1)),
            TEST_COST,
        )
        .unwrap()
    }

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let service = service();

        let account = service
            .register(&request("alice", "A@x.com ", "pw1"))
            .await
            .unwrap();

        assert_eq!(account.username, "alice");
        assert_eq!(account.email, "a@x.com");
        assert_ne!(account.password_hash, "pw1");
        assert!(verify("pw1", &account.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_fails() {
        let service = service();

        service
            .register(&request("alice", "a@x.com", "pw1"))
            .await
            .unwrap();
        let second = service.register(&request("alice", "b@x.com", "pw2")).await;

        assert!(matches!(second, Err(AuthError::DuplicateUsername)));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_have_one_winner() {
        let service = service();
        let first = request("alice", "a@x.com", "pw1");
        let second = request("alice", "b@x.com", "pw2");

        let (a, b) = tokio::join!(service.register(&first), service.register(&second));

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert!(
            matches!(a, Err(AuthError::DuplicateUsername))
                || matches!(b, Err(AuthError::DuplicateUsername))
        );
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_fields() {
        let service = service();

        let result = service.register(&request("", "nope", "pw")).await;

        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authenticate_failures_have_same_shape() {
        let service = service();
        service
            .register(&request("alice", "a@x.com", "pw1"))
            .await
            .unwrap();

        let wrong_password = service.authenticate("alice", "wrong").await.unwrap_err();
        let unknown_user = service.authenticate("bob", "pw1").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_overlong_passwords_are_rejected() {
        let service = service();
        let long = "a".repeat(100);

        let result = service.register(&request("alice", "a@x.com", &long)).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));

        service
            .register(&request("bob", "b@x.com", &"a".repeat(72)))
            .await
            .unwrap();
        let login = service.authenticate("bob", &long).await;
        assert!(matches!(login, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let service = service();
        let registered = service
            .register(&request("alice", "a@x.com", "pw1"))
            .await
            .unwrap();

        let account = service.authenticate(" alice ", "pw1").await.unwrap();

        assert_eq!(account.id, registered.id);
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let service = service();
        let account = service
            .register(&request("alice", "a@x.com", "pw1"))
            .await
            .unwrap();

        let token = service.serialize_for_session(&account).unwrap();
        let restored = service.deserialize_from_session(&token).await.unwrap();

        assert_eq!(restored, account);
    }

    #[tokio::test]
    async fn test_session_for_unknown_account_is_not_found() {
        let service = service();
        let ghost = Account {
            id: Uuid::new_v4(),
            username: "ghost".to_string(),
            email: "g@x.com".to_string(),
            password_hash: String::new(),
            created_at: chrono::Utc::now(),
        };

        let token = service.serialize_for_session(&ghost).unwrap();

        assert!(matches!(
            service.deserialize_from_session(&token).await,
            Err(AuthError::AccountNotFound)
        ));
    }
}
