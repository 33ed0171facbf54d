use actix_web::{HttpResponse, web};

use auth_services::middleware::LOGIN_PATH;
use auth_services::service::AuthService;
use auth_services::session::{FlashKind, Session};
use auth_services::types::*;

use crate::responses::{CAMPGROUNDS_PATH, flash_failure, redirect, render};
use crate::views;

/// Path of the registration form.
pub const REGISTER_PATH: &str = "/register";

/// Renders the registration form.
pub async fn register_form(session: Session) -> HttpResponse {
    render(&session, "Register", &views::register_page())
}

/// Handles registration: creates the account, signs it in and redirects to the
/// campground list. Failures go back to the registration form with a notice.
pub async fn add_user(
    session: Session,
    auth_service: web::Data<AuthService>,
    request: web::Form<RegisterRequest>,
) -> HttpResponse {
    let account = match auth_service.register(&request).await {
        Ok(account) => account,
        Err(e) => {
            flash_failure(&session, &e, e.is_store_failure());
            return redirect(REGISTER_PATH);
        }
    };

    if let Err(e) = session.sign_in(&auth_service, &account) {
        log::error!("Could not sign in new account {}: {}", account.username, e);
        session.flash(FlashKind::Error, "Your account was created. Please log in.");
        return redirect(LOGIN_PATH);
    }

    session.flash(FlashKind::Success, "Welcome to Yelp Camp!");
    redirect(CAMPGROUNDS_PATH)
}

/// Renders the login form.
pub async fn login_form(session: Session) -> HttpResponse {
    render(&session, "Login", &views::login_page())
}

/// Handles login: checks the credentials, signs the account in and redirects to
/// the campground list, or back to the login form with an error notice.
pub async fn logged_in(
    session: Session,
    auth_service: web::Data<AuthService>,
    request: web::Form<LoginRequest>,
) -> HttpResponse {
    let signed_in = match auth_service
        .authenticate(&request.username, &request.password)
        .await
    {
        Ok(account) => session.sign_in(&auth_service, &account),
        Err(e) => Err(e),
    };

    match signed_in {
        Ok(()) => {
            session.flash(FlashKind::Success, "Welcome back!");
            redirect(CAMPGROUNDS_PATH)
        }
        Err(e) => {
            // Only bad credentials are shown verbatim.
            let internal = !matches!(e, AuthError::InvalidCredentials);
            flash_failure(&session, &e, internal);
            redirect(LOGIN_PATH)
        }
    }
}

/// Signs the current account out and redirects to the campground list.
pub async fn logout(session: Session) -> HttpResponse {
    session.sign_out();
    session.flash(FlashKind::Success, "Goodbye!");
    redirect(CAMPGROUNDS_PATH)
}
