use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header::ContentType};
use auth_services::session::Flash;
use auth_services::types::AuthError;
use listing_services::types::ListingError;

use crate::views;

/// Failure of a page request, rendered as an HTML error page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The requested record or route does not exist
    #[error("{0}")]
    NotFound(String),

    /// Anything else; details are logged, never shown
    #[error("Something went wrong")]
    Internal,
}

impl From<ListingError> for PageError {
    fn from(error: ListingError) -> Self {
        match error {
            ListingError::CampgroundNotFound | ListingError::ReviewNotFound => {
                PageError::NotFound(error.to_string())
            }
            other => {
                log::error!("Page request failed: {}", other);
                PageError::Internal
            }
        }
    }
}

impl From<AuthError> for PageError {
    fn from(error: AuthError) -> Self {
        log::error!("Page request failed: {}", error);
        PageError::Internal
    }
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = views::error_page(status, &self.to_string());

        HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(views::layout(
                status.canonical_reason().unwrap_or("Error"),
                None,
                &Flash::default(),
                &body,
            ))
    }
}
