use auth_services::types::{Account, AuthError, validation_message};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Highest rating a review can give.
pub const MAX_RATING: i32 = 5;

/// Campground record as stored
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Campground {
    /// Unique identifier for the campground
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Price per night
    pub price: f64,
    /// Image URL, may be empty
    pub image: String,
    /// Free-text description, may be empty
    pub description: String,
    /// Location text
    pub location: String,
    /// Account that created the listing
    pub author_id: Uuid,
    /// Attached reviews, oldest first
    pub review_ids: Vec<Uuid>,
    /// When the campground was created
    pub created_at: DateTime<Utc>,
    /// When the campground was last updated
    pub updated_at: DateTime<Utc>,
}

/// Review record as stored
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Review {
    /// Unique identifier for the review
    pub id: Uuid,
    /// Review text
    pub body: String,
    /// Rating from 1 to 5
    pub rating: i32,
    /// When the review was created
    pub created_at: DateTime<Utc>,
}

/// A campground with its author and reviews loaded, for the detail page.
#[derive(Debug, Clone)]
pub struct CampgroundDetails {
    /// The campground itself
    pub campground: Campground,
    /// The author, or `None` if the account no longer exists
    pub author: Option<Account>,
    /// Attached reviews in attachment order; dangling IDs are skipped
    pub reviews: Vec<Review>,
}

/// Campground form as submitted by the browser
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CampgroundForm {
    /// Title field
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    /// Price field, parsed as a number
    #[serde(default)]
    #[validate(custom(function = "validate_price"))]
    pub price: String,

    /// Image URL field
    #[serde(default)]
    #[validate(custom(function = "validate_image_url"))]
    pub image: String,

    /// Description field
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: String,

    /// Location field
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    pub location: String,
}

/// The editable fields of a campground, validated and typed
#[derive(Debug, Clone, PartialEq)]
pub struct CampgroundFields {
    /// Display title
    pub title: String,
    /// Price per night
    pub price: f64,
    /// Image URL, may be empty
    pub image: String,
    /// Free-text description
    pub description: String,
    /// Location text
    pub location: String,
}

impl CampgroundForm {
    /// Validates the form and converts it into typed fields.
    pub fn into_fields(self) -> Result<CampgroundFields, ListingError> {
        let form = CampgroundForm {
            title: self.title.trim().to_string(),
            price: self.price.trim().to_string(),
            image: self.image.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
        };

        form.validate()
            .map_err(|e| ListingError::Validation(validation_message(&e)))?;

        let price = parse_price(&form.price)
            .ok_or_else(|| ListingError::Validation("Price must be a number".to_string()))?;

        Ok(CampgroundFields {
            title: form.title,
            price,
            image: form.image,
            description: form.description,
            location: form.location,
        })
    }
}

impl From<&Campground> for CampgroundForm {
    fn from(campground: &Campground) -> Self {
        Self {
            title: campground.title.clone(),
            price: campground.price.to_string(),
            image: campground.image.clone(),
            description: campground.description.clone(),
            location: campground.location.clone(),
        }
    }
}

/// Review form as submitted by the browser
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewForm {
    /// Review text
    #[serde(default)]
    #[validate(length(min = 1, max = 2000, message = "Review text is required"))]
    pub body: String,

    /// Rating field, parsed as an integer
    #[serde(default)]
    #[validate(custom(function = "validate_rating"))]
    pub rating: String,
}

/// The fields of a review, validated and typed
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewFields {
    /// Review text
    pub body: String,
    /// Rating from 1 to 5
    pub rating: i32,
}

impl ReviewForm {
    /// Validates the form and converts it into typed fields.
    pub fn into_fields(self) -> Result<ReviewFields, ListingError> {
        let form = ReviewForm {
            body: self.body.trim().to_string(),
            rating: self.rating.trim().to_string(),
        };

        form.validate()
            .map_err(|e| ListingError::Validation(validation_message(&e)))?;

        let rating = parse_rating(&form.rating).ok_or_else(|| {
            ListingError::Validation("Rating must be a whole number from 1 to 5".to_string())
        })?;

        Ok(ReviewFields {
            body: form.body,
            rating,
        })
    }
}

/// Custom error type for listing operations
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// Submitted fields were malformed
    #[error("{0}")]
    Validation(String),

    /// Campground not found
    #[error("Cannot find that campground!")]
    CampgroundNotFound,

    /// Review not found, or not attached to the given campground
    #[error("Cannot find that review!")]
    ReviewNotFound,

    /// The signed-in account does not own the campground
    #[error("You do not have permission to do that!")]
    Forbidden,

    /// Account lookup failed
    #[error(transparent)]
    Account(#[from] AuthError),

    /// The store could not be reached
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ListingError {
    /// Whether the failure came from a store rather than from the request.
    pub fn is_store_failure(&self) -> bool {
        match self {
            ListingError::Database(_) => true,
            ListingError::Account(e) => e.is_store_failure(),
            _ => false,
        }
    }

    /// Whether the failure means the referenced record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ListingError::CampgroundNotFound | ListingError::ReviewNotFound
        )
    }
}

fn parse_price(price: &str) -> Option<f64> {
    price
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

fn parse_rating(rating: &str) -> Option<i32> {
    rating
        .parse::<i32>()
        .ok()
        .filter(|rating| (1..=MAX_RATING).contains(rating))
}

fn invalid(code: &'static str, message: &'static str) -> validator::ValidationError {
    let mut error = validator::ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_price(price: &str) -> Result<(), validator::ValidationError> {
    match parse_price(price) {
        Some(_) => Ok(()),
        None => Err(invalid("invalid_price", "Price must be a number")),
    }
}

/// Longest image URL accepted, in characters.
pub const MAX_IMAGE_URL_CHARS: usize = 2000;

fn validate_image_url(image: &str) -> Result<(), validator::ValidationError> {
    if image.chars().count() > MAX_IMAGE_URL_CHARS {
        Err(invalid("image_url_too_long", "Image URL is too long"))
    } else if image.is_empty() || image.starts_with("http://") || image.starts_with("https://") {
        Ok(())
    } else {
        Err(invalid("invalid_image_url", "Image must be an http(s) URL"))
    }
}

fn validate_rating(rating: &str) -> Result<(), validator::ValidationError> {
    match parse_rating(rating) {
        Some(_) => Ok(()),
        None => Err(invalid(
            "invalid_rating",
            "Rating must be a whole number from 1 to 5",
        )),
    }
}
