use actix_web::{HttpResponse, web};
use uuid::Uuid;

use auth_services::middleware::CurrentUser;
use auth_services::session::{FlashKind, Session};
use listing_services::service::ReviewService;
use listing_services::types::{ListingError, ReviewForm};

use crate::campground_handlers::{parse_campground_id, submission_failed};
use crate::responses::{CAMPGROUNDS_PATH, campground_path, redirect};

/// Adds a review to the campground.
pub async fn create_review(
    _user: CurrentUser,
    session: Session,
    review_service: web::Data<ReviewService>,
    path: web::Path<String>,
    form: web::Form<ReviewForm>,
) -> HttpResponse {
    let campground_id = match parse_campground_id(&path) {
        Ok(id) => id,
        Err(e) => return submission_failed(&session, e, None, CAMPGROUNDS_PATH),
    };
    let detail = campground_path(campground_id);

    match review_service.create(&campground_id, form.into_inner()).await {
        Ok(_) => {
            session.flash(FlashKind::Success, "Created new review!");
            redirect(&detail)
        }
        Err(e) => submission_failed(&session, e, Some(&campground_id), &detail),
    }
}

/// Removes a review from the campground and deletes it.
pub async fn delete_review(
    CurrentUser(user): CurrentUser,
    session: Session,
    review_service: web::Data<ReviewService>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (raw_campground_id, raw_review_id) = path.into_inner();

    let campground_id = match parse_campground_id(&raw_campground_id) {
        Ok(id) => id,
        Err(e) => return submission_failed(&session, e, None, CAMPGROUNDS_PATH),
    };
    let detail = campground_path(campground_id);

    let review_id = match Uuid::parse_str(&raw_review_id) {
        Ok(id) => id,
        Err(_) => {
            return submission_failed(
                &session,
                ListingError::ReviewNotFound,
                Some(&campground_id),
                &detail,
            );
        }
    };

    match review_service
        .delete(&campground_id, &review_id, &user)
        .await
    {
        Ok(()) => {
            session.flash(FlashKind::Success, "Successfully deleted review!");
            redirect(&detail)
        }
        Err(e) => submission_failed(&session, e, Some(&campground_id), &detail),
    }
}
