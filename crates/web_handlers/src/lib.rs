//! # Web Handlers for the Yelp Camp Web Application
//!
//! This crate provides the HTTP handlers, HTML views and request middleware for the
//! Yelp Camp application, plus [`configure`] to register its routes.

use actix_web::web;

/// Account handlers (register, login, logout)
mod auth_handlers;
pub use auth_handlers::*;

/// Campground listing handlers
mod campground_handlers;
pub use campground_handlers::*;

/// Review handlers
mod review_handlers;
pub use review_handlers::*;

/// Health and fallback handlers
mod admin_handlers;
pub use admin_handlers::*;

/// HTML error pages
pub mod error;

/// `_method` override for HTML forms
pub mod method_override;

/// Redirect and page helpers
pub mod responses;

/// HTML rendering
pub mod views;

/// Registers every route of the site.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(responses::form_config())
        .route("/health", web::get().to(health))
        .route("/register", web::get().to(register_form))
        .route("/adduser", web::post().to(add_user))
        .route("/login", web::get().to(login_form))
        .route("/loggedin", web::post().to(logged_in))
        .route("/logout", web::get().to(logout))
        .service(
            web::scope("/campgrounds")
                .route("", web::get().to(index))
                .route("", web::post().to(create_campground))
                .route("/new", web::get().to(new_form))
                .route("/{id}", web::get().to(show_campground))
                .route("/{id}", web::put().to(update_campground))
                .route("/{id}", web::patch().to(update_campground))
                .route("/{id}", web::delete().to(delete_campground))
                .route("/{id}/edit", web::get().to(edit_form))
                .route("/{id}/reviews", web::post().to(create_review))
                .route("/{id}/reviews/{review_id}", web::delete().to(delete_review)),
        );
}
