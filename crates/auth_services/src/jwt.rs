use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::types::{Account, AuthError, SessionClaims};

/// Signs and verifies the token that ties a session to an account.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl JwtService {
    /// Creates a new `JwtService` signing with `secret`; tokens live for `token_ttl`.
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            token_ttl,
        }
    }

    /// Generates a session token whose subject is the account ID.
    pub fn generate_session_token(&self, account: &Account) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = (now + self.token_ttl).timestamp() as usize;

        let claims = SessionClaims {
            sub: account.id.to_string(),
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies the signature and expiry of a session token.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let token_data = decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Verifies a session token and returns the account ID it was issued for.
    pub fn extract_account_id(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.verify_token(token)?;
        let account_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            AuthError::Jwt(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ))
        })?;

        Ok(account_id)
    }
}
