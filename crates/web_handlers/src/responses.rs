use actix_web::{
    HttpMessage, HttpRequest, HttpResponse,
    error::{InternalError, UrlencodedError},
    http::{Uri, header, header::ContentType},
    web,
};
use auth_services::session::{FlashKind, Session};

use crate::views;

/// Notice shown when a store failure interrupts a form submission.
pub const STORE_FAILURE_NOTICE: &str = "Something went wrong. Please try again.";

/// Notice shown when a form body is too large to accept.
pub const FORM_TOO_LARGE_NOTICE: &str = "That submission is too large.";

/// Notice shown when a form body cannot be decoded.
pub const FORM_UNREADABLE_NOTICE: &str = "That form could not be read. Please try again.";

/// Largest accepted form body. Every form field at its maximum length, fully
/// percent-encoded, still fits.
pub const FORM_LIMIT: usize = 128 * 1024;

/// Path of the campground list.
pub const CAMPGROUNDS_PATH: &str = "/campgrounds";

/// Path of a campground's detail page.
pub fn campground_path(campground_id: impl std::fmt::Display) -> String {
    format!("{}/{}", CAMPGROUNDS_PATH, campground_id)
}

/// 302 redirect to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Renders `body` inside the layout, draining the session's flash notices.
pub fn render(session: &Session, title: &str, body: &str) -> HttpResponse {
    let flash = session.take_flash();

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(views::layout(title, session.current_user(), &flash, body))
}

/// Queues the error notice for a failed submission. Store failures are logged and
/// replaced by a generic notice.
pub fn flash_failure(session: &Session, error: &dyn std::fmt::Display, store_failure: bool) {
    if store_failure {
        log::error!("Store failure while handling a submission: {}", error);
        session.flash(FlashKind::Error, STORE_FAILURE_NOTICE);
    } else {
        session.flash(FlashKind::Error, error.to_string());
    }
}

/// Form extractor settings: the body limit, and rejected bodies turned into an
/// error notice plus a redirect back to the submitting page.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .limit(FORM_LIMIT)
        .error_handler(form_rejected)
}

fn form_rejected(error: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected form submitted to {}: {}", req.path(), error);

    let notice = match error {
        UrlencodedError::Overflow { .. } => FORM_TOO_LARGE_NOTICE,
        _ => FORM_UNREADABLE_NOTICE,
    };
    if let Some(session) = req.extensions().get::<Session>() {
        session.flash(FlashKind::Error, notice);
    }

    InternalError::from_response(error, redirect(&back_location(req))).into()
}

/// Local path of the `Referer`, or the campground list when there is none.
fn back_location(req: &HttpRequest) -> String {
    req.headers()
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|referer| referer.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| CAMPGROUNDS_PATH.to_string())
}
