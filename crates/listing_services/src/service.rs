use std::sync::Arc;

use auth_services::store::AccountStore;
use auth_services::types::Account;
use uuid::Uuid;

use crate::store::{CampgroundStore, ReviewStore};
use crate::types::{
    Campground, CampgroundDetails, CampgroundForm, ListingError, Review, ReviewForm,
};

/// Only the author of a campground may change it or moderate its reviews.
pub fn ensure_author(campground: &Campground, account: &Account) -> Result<(), ListingError> {
    if campground.author_id == account.id {
        Ok(())
    } else {
        Err(ListingError::Forbidden)
    }
}

/// Service for campground listing operations
pub struct CampgroundService {
    campgrounds: Arc<dyn CampgroundStore>,
    reviews: Arc<dyn ReviewStore>,
    accounts: Arc<dyn AccountStore>,
}

impl CampgroundService {
    /// Creates a new instance of `CampgroundService` over the given stores.
    pub fn new(
        campgrounds: Arc<dyn CampgroundStore>,
        reviews: Arc<dyn ReviewStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            campgrounds,
            reviews,
            accounts,
        }
    }

    /// Lists every campground.
    pub async fn list(&self) -> Result<Vec<Campground>, ListingError> {
        self.campgrounds.list_campgrounds().await
    }

    /// Creates a campground authored by `author`.
    pub async fn create(
        &self,
        form: CampgroundForm,
        author: &Account,
    ) -> Result<Campground, ListingError> {
        let fields = form.into_fields()?;
        let campground = self.campgrounds.insert_campground(&fields, &author.id).await?;

        log::info!(
            "Campground {} created by {}",
            campground.id,
            author.username
        );

        Ok(campground)
    }

    /// Gets a campground by ID.
    pub async fn get(&self, campground_id: &Uuid) -> Result<Campground, ListingError> {
        self.campgrounds
            .find_campground(campground_id)
            .await?
            .ok_or(ListingError::CampgroundNotFound)
    }

    /// Gets a campground with its author and reviews loaded.
    pub async fn get_with_relations(
        &self,
        campground_id: &Uuid,
    ) -> Result<CampgroundDetails, ListingError> {
        let campground = self.get(campground_id).await?;
        let reviews = self.reviews.find_reviews(&campground.review_ids).await?;
        let author = self.accounts.find_by_id(&campground.author_id).await?;

        if reviews.len() != campground.review_ids.len() {
            log::warn!(
                "Campground {} references {} missing review(s)",
                campground.id,
                campground.review_ids.len() - reviews.len()
            );
        }

        Ok(CampgroundDetails {
            campground,
            author,
            reviews,
        })
    }

    /// Gets a campground for editing, ensuring `account` is its author.
    pub async fn get_for_edit(
        &self,
        campground_id: &Uuid,
        account: &Account,
    ) -> Result<Campground, ListingError> {
        let campground = self.get(campground_id).await?;
        ensure_author(&campground, account)?;
        Ok(campground)
    }

    /// Replaces the editable fields of a campground owned by `account`.
    pub async fn update(
        &self,
        campground_id: &Uuid,
        form: CampgroundForm,
        account: &Account,
    ) -> Result<Campground, ListingError> {
        self.get_for_edit(campground_id, account).await?;
        let fields = form.into_fields()?;

        self.campgrounds
            .update_campground(campground_id, &fields)
            .await?
            .ok_or(ListingError::CampgroundNotFound)
    }

    /// Deletes a campground owned by `account`, along with its reviews.
    pub async fn delete(&self, campground_id: &Uuid, account: &Account) -> Result<(), ListingError> {
        self.get_for_edit(campground_id, account).await?;

        if !self.campgrounds.delete_campground(campground_id).await? {
            return Err(ListingError::CampgroundNotFound);
        }

        log::info!("Campground {} deleted by {}", campground_id, account.username);
        Ok(())
    }

    /// Checks that the listing store is reachable.
    pub async fn health_check(&self) -> Result<(), ListingError> {
        self.campgrounds.ping().await
    }
}

/// Service for review operations
pub struct ReviewService {
    campgrounds: Arc<dyn CampgroundStore>,
    reviews: Arc<dyn ReviewStore>,
}

impl ReviewService {
    /// Creates a new instance of `ReviewService` over the given stores.
    pub fn new(campgrounds: Arc<dyn CampgroundStore>, reviews: Arc<dyn ReviewStore>) -> Self {
        Self {
            campgrounds,
            reviews,
        }
    }

    /// Creates a review and attaches it to the campground.
    pub async fn create(
        &self,
        campground_id: &Uuid,
        form: ReviewForm,
    ) -> Result<Review, ListingError> {
        let fields = form.into_fields()?;
        self.reviews.attach_review(campground_id, &fields).await
    }

    /// Detaches and deletes a review. Only the campground's author may do this.
    pub async fn delete(
        &self,
        campground_id: &Uuid,
        review_id: &Uuid,
        account: &Account,
    ) -> Result<(), ListingError> {
        let campground = self
            .campgrounds
            .find_campground(campground_id)
            .await?
            .ok_or(ListingError::CampgroundNotFound)?;
        ensure_author(&campground, account)?;

        self.reviews.detach_review(campground_id, review_id).await
    }

    /// Gets a review by ID.
    pub async fn get(&self, review_id: &Uuid) -> Result<Review, ListingError> {
        self.reviews
            .find_review(review_id)
            .await?
            .ok_or(ListingError::ReviewNotFound)
    }
}
