use actix_session::{
    SessionExt, SessionMiddleware,
    config::{PersistentSession, TtlExtensionPolicy},
    storage::CookieSessionStore,
};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, Result,
    cookie::{Key, SameSite},
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{StatusCode, header},
    web,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{Ready, ready},
    rc::Rc,
};

use crate::service::AuthService;
use crate::session::{self, FlashKind, PRINCIPAL_KEY, SESSION_COOKIE, Session};
use crate::types::Account;

/// Where the sign-in guard sends anonymous visitors.
pub const LOGIN_PATH: &str = "/login";

// Minimum master key length accepted by `Key::derive_from`.
const MIN_KEY_BYTES: usize = 32;

/// Derives the cookie signing key from the configured session secret.
pub fn session_key(secret: &str) -> Key {
    if secret.is_empty() {
        log::warn!("Empty session secret, sessions will not survive a restart");
        return Key::generate();
    }

    let master: Vec<u8> = secret
        .bytes()
        .cycle()
        .take(secret.len().max(MIN_KEY_BYTES))
        .collect();
    Key::derive_from(&master)
}

/// Cookie-backed session layer. The session state is kept in a private cookie
/// that is only written when the state changes, and expires `ttl` after the
/// last change. Must wrap [`PrincipalMiddleware`].
pub fn session_layer(
    key: Key,
    ttl: chrono::Duration,
    secure: bool,
) -> SessionMiddleware<CookieSessionStore> {
    let lifecycle = PersistentSession::default()
        .session_ttl(actix_web::cookie::time::Duration::seconds(ttl.num_seconds()))
        .session_ttl_extension_policy(TtlExtensionPolicy::OnStateChanges);

    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .cookie_secure(secure)
        .session_lifecycle(lifecycle)
        .build()
}

/// Middleware that restores the signed-in account from the cookie session and
/// makes a [`Session`] available to handlers.
pub struct PrincipalMiddleware {
    auth: web::Data<AuthService>,
}

impl PrincipalMiddleware {
    /// Creates the middleware over the account service.
    pub fn new(auth: web::Data<AuthService>) -> Self {
        Self { auth }
    }
}

impl<S, B> Transform<S, ServiceRequest> for PrincipalMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = PrincipalMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PrincipalMiddlewareService {
            service: Rc::new(service),
            auth: self.auth.clone(),
        }))
    }
}

/// Service that implements the principal middleware logic
pub struct PrincipalMiddlewareService<S> {
    service: Rc<S>,
    auth: web::Data<AuthService>,
}

impl<S, B> Service<ServiceRequest> for PrincipalMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let auth = self.auth.clone();

        Box::pin(async move {
            let cookie_session = req.get_session();
            let principal = restore_principal(&cookie_session, &auth).await;

            req.extensions_mut()
                .insert(Session::new(cookie_session, principal));

            service.call(req).await
        })
    }
}

async fn restore_principal(
    cookie_session: &actix_session::Session,
    auth: &AuthService,
) -> Option<Account> {
    let token: String = session::read(cookie_session, PRINCIPAL_KEY)?;

    match auth.deserialize_from_session(&token).await {
        Ok(account) => Some(account),
        // Keep the token: the account may load fine once the store is back.
        Err(e) if e.is_store_failure() => {
            log::warn!("Could not restore session principal: {}", e);
            None
        }
        Err(e) => {
            log::debug!("Dropping stale session principal: {}", e);
            cookie_session.remove(PRINCIPAL_KEY);
            None
        }
    }
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.extensions().get::<Session>().cloned();

        ready(session.ok_or_else(|| {
            log::error!("Session requested but PrincipalMiddleware is not installed");
            actix_web::error::ErrorInternalServerError("Session unavailable")
        }))
    }
}

/// Rejection produced by the sign-in guard: a redirect to the login page.
#[derive(Debug, thiserror::Error)]
#[error("You must be signed in first!")]
pub struct SignInRequired;

impl ResponseError for SignInRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, LOGIN_PATH))
            .finish()
    }
}

/// Sign-in guard. Extracting it from an anonymous request queues an error notice
/// and redirects to the login page instead of running the handler.
pub struct CurrentUser(pub Account);

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.extensions().get::<Session>().cloned();

        ready(match session {
            Some(session) => match session.current_user() {
                Some(account) => Ok(CurrentUser(account.clone())),
                None => {
                    session.flash(FlashKind::Error, SignInRequired.to_string());
                    Err(SignInRequired.into())
                }
            },
            None => Err(SignInRequired.into()),
        })
    }
}
