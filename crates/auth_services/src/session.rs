use serde::de::DeserializeOwned;

use crate::service::AuthService;
use crate::types::{Account, AuthError};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "yelpcamp.sid";

pub(crate) const PRINCIPAL_KEY: &str = "principal";
const FLASH_SUCCESS_KEY: &str = "flash.success";
const FLASH_ERROR_KEY: &str = "flash.error";

/// Which flash channel a message goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    /// Confirmation of a completed action
    Success,
    /// Something the user has to fix or retry
    Error,
}

impl FlashKind {
    fn key(self) -> &'static str {
        match self {
            FlashKind::Success => FLASH_SUCCESS_KEY,
            FlashKind::Error => FLASH_ERROR_KEY,
        }
    }
}

/// One-time messages shown on the next rendered page.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Flash {
    /// Messages for the success channel, in push order
    pub success: Vec<String>,
    /// Messages for the error channel, in push order
    pub error: Vec<String>,
}

impl Flash {
    /// Whether both channels are empty.
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

/// The session context of one request: the signed-in account and access to the
/// flash queue, both kept in the `actix-session` cookie. Inserted by
/// [`PrincipalMiddleware`] and extracted by handlers.
///
/// [`PrincipalMiddleware`]: crate::middleware::PrincipalMiddleware
#[derive(Clone)]
pub struct Session {
    inner: actix_session::Session,
    principal: Option<Account>,
}

impl Session {
    /// Wraps the request's cookie session, with the account restored from it.
    pub fn new(inner: actix_session::Session, principal: Option<Account>) -> Self {
        Self { inner, principal }
    }

    /// The account signed in when the request arrived.
    pub fn current_user(&self) -> Option<&Account> {
        self.principal.as_ref()
    }

    /// Queues a flash message for the next rendered page.
    pub fn flash(&self, kind: FlashKind, message: impl Into<String>) {
        let mut messages: Vec<String> = read(&self.inner, kind.key()).unwrap_or_default();
        messages.push(message.into());

        if let Err(e) = self.inner.insert(kind.key(), messages) {
            log::warn!("Could not queue flash message: {}", e);
        }
    }

    /// Drains the flash queue; called once per rendered page.
    pub fn take_flash(&self) -> Flash {
        Flash {
            success: self.drain(FlashKind::Success),
            error: self.drain(FlashKind::Error),
        }
    }

    // Untouched channels are left alone so the cookie is only rewritten on change.
    fn drain(&self, kind: FlashKind) -> Vec<String> {
        match read(&self.inner, kind.key()) {
            Some(messages) => {
                self.inner.remove(kind.key());
                messages
            }
            None => Vec::new(),
        }
    }

    /// Signs `account` in. The session is renewed so a cookie issued before login
    /// never carries the account; queued flash messages move along.
    pub fn sign_in(&self, auth: &AuthService, account: &Account) -> Result<(), AuthError> {
        let token = auth.serialize_for_session(account)?;

        self.inner.renew();
        self.inner.insert(PRINCIPAL_KEY, token)?;
        Ok(())
    }

    /// Signs the current account out, keeping queued flash messages.
    pub fn sign_out(&self) {
        self.inner.remove(PRINCIPAL_KEY);
    }
}

pub(crate) fn read<T: DeserializeOwned>(session: &actix_session::Session, key: &str) -> Option<T> {
    session.get(key).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable session value {}: {}", key, e);
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::{SessionExt, SessionStatus};
    use actix_web::test::TestRequest;
    use std::sync::Arc;

    use crate::jwt::JwtService;
    use crate::memory::MemoryAccountStore;

    fn session() -> Session {
        let req = TestRequest::default().to_http_request();
        Session::new(req.get_session(), None)
    }

    fn account() -> Account {
        Account {
            id: uuid::Uuid::new_v4(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: String::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_flash_is_drained_once() {
        let session = session();

        session.flash(FlashKind::Success, "first");
        session.flash(FlashKind::Success, "second");
        session.flash(FlashKind::Error, "oops");

        let flash = session.take_flash();
        assert_eq!(flash.success, vec!["first", "second"]);
        assert_eq!(flash.error, vec!["oops"]);

        assert!(session.take_flash().is_empty());
    }

    #[test]
    fn test_reading_empty_flash_leaves_session_unchanged() {
        let session = session();

        assert!(session.take_flash().is_empty());
        assert_eq!(session.inner.status(), SessionStatus::Unchanged);
    }

    #[test]
    fn test_sign_in_renews_session_and_keeps_flash() {
        let auth = AuthService::new(
            Arc::new(MemoryAccountStore::new()),
            JwtService::new("test-secret", chrono::Duration::hours(1)),
            4,
        )
        .unwrap();
        let session = session();
        session.flash(FlashKind::Error, "You must be signed in first!");

        session.sign_in(&auth, &account()).unwrap();

        assert_eq!(session.inner.status(), SessionStatus::Renewed);
        assert!(read::<String>(&session.inner, PRINCIPAL_KEY).is_some());
        assert_eq!(
            session.take_flash().error,
            vec!["You must be signed in first!"]
        );
    }

    #[test]
    fn test_sign_out_keeps_flash() {
        let session = session();
        session.inner.insert(PRINCIPAL_KEY, "token").unwrap();
        session.flash(FlashKind::Success, "Goodbye!");

        session.sign_out();

        assert!(read::<String>(&session.inner, PRINCIPAL_KEY).is_none());
        assert_eq!(session.take_flash().success, vec!["Goodbye!"]);
    }
}
