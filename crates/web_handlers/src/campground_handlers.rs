use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;

use auth_services::middleware::CurrentUser;
use auth_services::session::{FlashKind, Session};
use listing_services::service::CampgroundService;
use listing_services::types::{CampgroundForm, ListingError};

use crate::error::PageError;
use crate::responses::{CAMPGROUNDS_PATH, campground_path, flash_failure, redirect, render};
use crate::views;

/// Parses a campground ID from the path; a malformed ID is treated as missing.
pub(crate) fn parse_campground_id(raw: &str) -> Result<Uuid, ListingError> {
    Uuid::parse_str(raw).map_err(|_| ListingError::CampgroundNotFound)
}

/// Turns a failed submission into an error notice plus a redirect. Missing
/// campgrounds go to the list, permission failures to the detail page, and
/// everything else back to `retry`.
pub(crate) fn submission_failed(
    session: &Session,
    error: ListingError,
    campground_id: Option<&Uuid>,
    retry: &str,
) -> HttpResponse {
    let location = match (&error, campground_id) {
        (ListingError::CampgroundNotFound, _) => CAMPGROUNDS_PATH.to_string(),
        (ListingError::Forbidden | ListingError::ReviewNotFound, Some(id)) => campground_path(id),
        _ => retry.to_string(),
    };

    flash_failure(session, &error, error.is_store_failure());
    redirect(&location)
}

/// Lists every campground.
pub async fn index(
    session: Session,
    campground_service: web::Data<CampgroundService>,
) -> Result<HttpResponse, PageError> {
    let campgrounds = campground_service.list().await?;

    Ok(render(
        &session,
        "All Campgrounds",
        &views::index_page(&campgrounds),
    ))
}

/// Renders the creation form.
pub async fn new_form(_user: CurrentUser, session: Session) -> HttpResponse {
    render(&session, "New Campground", &views::new_page())
}

/// Creates a campground authored by the current user.
pub async fn create_campground(
    CurrentUser(user): CurrentUser,
    session: Session,
    campground_service: web::Data<CampgroundService>,
    form: web::Form<CampgroundForm>,
) -> HttpResponse {
    match campground_service.create(form.into_inner(), &user).await {
        Ok(campground) => {
            session.flash(FlashKind::Success, "Successfully made a new campground!");
            redirect(&campground_path(campground.id))
        }
        Err(e) => submission_failed(&session, e, None, "/campgrounds/new"),
    }
}

/// Shows a campground with its author and reviews.
pub async fn show_campground(
    session: Session,
    campground_service: web::Data<CampgroundService>,
    path: web::Path<String>,
) -> Result<HttpResponse, PageError> {
    let campground_id = parse_campground_id(&path)?;
    let details = campground_service.get_with_relations(&campground_id).await?;

    Ok(render(
        &session,
        &details.campground.title,
        &views::show_page(&details, session.current_user()),
    ))
}

/// Renders the edit form for the campground's author.
pub async fn edit_form(
    CurrentUser(user): CurrentUser,
    session: Session,
    campground_service: web::Data<CampgroundService>,
    path: web::Path<String>,
) -> Result<HttpResponse, PageError> {
    let campground_id = parse_campground_id(&path)?;

    match campground_service.get_for_edit(&campground_id, &user).await {
        Ok(campground) => Ok(render(
            &session,
            "Edit Campground",
            &views::edit_page(&campground),
        )),
        Err(ListingError::Forbidden) => {
            session.flash(FlashKind::Error, ListingError::Forbidden.to_string());
            Ok(redirect(&campground_path(campground_id)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Replaces the editable fields of the campground.
pub async fn update_campground(
    CurrentUser(user): CurrentUser,
    session: Session,
    campground_service: web::Data<CampgroundService>,
    path: web::Path<String>,
    form: web::Form<CampgroundForm>,
) -> HttpResponse {
    let campground_id = match parse_campground_id(&path) {
        Ok(id) => id,
        Err(e) => return submission_failed(&session, e, None, CAMPGROUNDS_PATH),
    };

    match campground_service
        .update(&campground_id, form.into_inner(), &user)
        .await
    {
        Ok(campground) => {
            session.flash(FlashKind::Success, "Successfully updated campground!");
            redirect(&campground_path(campground.id))
        }
        Err(e) => submission_failed(
            &session,
            e,
            Some(&campground_id),
            &format!("{}/edit", campground_path(campground_id)),
        ),
    }
}

/// Deletes the campground and its reviews.
pub async fn delete_campground(
    CurrentUser(user): CurrentUser,
    session: Session,
    campground_service: web::Data<CampgroundService>,
    path: web::Path<String>,
) -> HttpResponse {
    let campground_id = match parse_campground_id(&path) {
        Ok(id) => id,
        Err(e) => return submission_failed(&session, e, None, CAMPGROUNDS_PATH),
    };

    match campground_service.delete(&campground_id, &user).await {
        Ok(()) => {
            session.flash(FlashKind::Success, "Successfully deleted campground!");
            redirect(CAMPGROUNDS_PATH)
        }
        Err(e) => submission_failed(
            &session,
            e,
            Some(&campground_id),
            &campground_path(campground_id),
        ),
    }
}
