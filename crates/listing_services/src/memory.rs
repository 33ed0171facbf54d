use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{CampgroundStore, ReviewStore, order_by_ids};
use crate::types::{Campground, CampgroundFields, ListingError, Review, ReviewFields};

#[derive(Default)]
struct ListingState {
    campgrounds: HashMap<Uuid, Campground>,
    // Insertion order of campground IDs.
    order: Vec<Uuid>,
    reviews: HashMap<Uuid, Review>,
}

/// Campground and review store kept in process memory. Every operation runs
/// under one lock, so multi-record changes are atomic.
#[derive(Default)]
pub struct MemoryListingStore {
    state: RwLock<ListingState>,
}

impl MemoryListingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of review records held, attached or not.
    pub async fn review_count(&self) -> usize {
        self.state.read().await.reviews.len()
    }
}

#[async_trait]
impl CampgroundStore for MemoryListingStore {
    async fn list_campgrounds(&self) -> Result<Vec<Campground>, ListingError> {
        let state = self.state.read().await;

        Ok(state
            .order
            .iter()
            .filter_map(|id| state.campgrounds.get(id).cloned())
            .collect())
    }

    async fn insert_campground(
        &self,
        fields: &CampgroundFields,
        author_id: &Uuid,
    ) -> Result<Campground, ListingError> {
        let now = Utc::now();
        let campground = Campground {
            id: Uuid::new_v4(),
            title: fields.title.clone(),
            price: fields.price,
            image: fields.image.clone(),
            description: fields.description.clone(),
            location: fields.location.clone(),
            author_id: *author_id,
            review_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        state.order.push(campground.id);
        state.campgrounds.insert(campground.id, campground.clone());

        Ok(campground)
    }

    async fn find_campground(
        &self,
        campground_id: &Uuid,
    ) -> Result<Option<Campground>, ListingError> {
        Ok(self.state.read().await.campgrounds.get(campground_id).cloned())
    }

    async fn update_campground(
        &self,
        campground_id: &Uuid,
        fields: &CampgroundFields,
    ) -> Result<Option<Campground>, ListingError> {
        let mut state = self.state.write().await;

        Ok(state.campgrounds.get_mut(campground_id).map(|campground| {
            campground.title = fields.title.clone();
            campground.price = fields.price;
            campground.image = fields.image.clone();
            campground.description = fields.description.clone();
            campground.location = fields.location.clone();
            campground.updated_at = Utc::now();
            campground.clone()
        }))
    }

    async fn delete_campground(&self, campground_id: &Uuid) -> Result<bool, ListingError> {
        let mut state = self.state.write().await;

        let Some(campground) = state.campgrounds.remove(campground_id) else {
            return Ok(false);
        };

        state.order.retain(|id| id != campground_id);
        for review_id in &campground.review_ids {
            state.reviews.remove(review_id);
        }

        Ok(true)
    }

    async fn ping(&self) -> Result<(), ListingError> {
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryListingStore {
    async fn attach_review(
        &self,
        campground_id: &Uuid,
        fields: &ReviewFields,
    ) -> Result<Review, ListingError> {
        let mut state = self.state.write().await;

        if !state.campgrounds.contains_key(campground_id) {
            return Err(ListingError::CampgroundNotFound);
        }

        let review = Review {
            id: Uuid::new_v4(),
            body: fields.body.clone(),
            rating: fields.rating,
            created_at: Utc::now(),
        };
        state.reviews.insert(review.id, review.clone());

        if let Some(campground) = state.campgrounds.get_mut(campground_id) {
            campground.review_ids.push(review.id);
        }

        Ok(review)
    }

    async fn detach_review(
        &self,
        campground_id: &Uuid,
        review_id: &Uuid,
    ) -> Result<(), ListingError> {
        let mut state = self.state.write().await;

        let campground = state
            .campgrounds
            .get_mut(campground_id)
            .ok_or(ListingError::CampgroundNotFound)?;

        let position = campground
            .review_ids
            .iter()
            .position(|id| id == review_id)
            .ok_or(ListingError::ReviewNotFound)?;

        campground.review_ids.remove(position);
        state.reviews.remove(review_id);

        Ok(())
    }

    async fn find_review(&self, review_id: &Uuid) -> Result<Option<Review>, ListingError> {
        Ok(self.state.read().await.reviews.get(review_id).cloned())
    }

    async fn find_reviews(&self, review_ids: &[Uuid]) -> Result<Vec<Review>, ListingError> {
        let state = self.state.read().await;
        let reviews = review_ids
            .iter()
            .filter_map(|id| state.reviews.get(id).cloned())
            .collect();

        Ok(order_by_ids(reviews, review_ids))
    }
}
