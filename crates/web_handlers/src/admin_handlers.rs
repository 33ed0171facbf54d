use actix_web::{HttpResponse, Result, web};

use listing_services::service::CampgroundService;

use crate::error::PageError;

/// Health check endpoint. Reports 503 while the listing store is unreachable.
pub async fn health(campground_service: web::Data<CampgroundService>) -> Result<HttpResponse> {
    let (mut response, status, store) = match campground_service.health_check().await {
        Ok(()) => (HttpResponse::Ok(), "healthy", "up"),
        Err(e) => {
            log::warn!("Health check failed: {}", e);
            (HttpResponse::ServiceUnavailable(), "degraded", "down")
        }
    };

    Ok(response.json(serde_json::json!({
        "service": "yelp_camp",
        "status": status,
        "store": store,
        "timestamp": chrono::Utc::now()
    })))
}

/// Fallback for unknown routes.
pub async fn not_found() -> Result<HttpResponse, PageError> {
    Err(PageError::NotFound("Page not found".to_string()))
}
