use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::types::{Campground, CampgroundFields, ListingError, Review, ReviewFields};

/// Persistence for campground records.
#[async_trait]
pub trait CampgroundStore: Send + Sync {
    /// All campgrounds, oldest first.
    async fn list_campgrounds(&self) -> Result<Vec<Campground>, ListingError>;

    /// Inserts a campground owned by `author_id` with no reviews.
    async fn insert_campground(
        &self,
        fields: &CampgroundFields,
        author_id: &Uuid,
    ) -> Result<Campground, ListingError>;

    /// Looks a campground up by ID.
    async fn find_campground(&self, campground_id: &Uuid)
    -> Result<Option<Campground>, ListingError>;

    /// Replaces the editable fields; author and reviews are left alone.
    /// Returns `None` if the campground does not exist.
    async fn update_campground(
        &self,
        campground_id: &Uuid,
        fields: &CampgroundFields,
    ) -> Result<Option<Campground>, ListingError>;

    /// Deletes a campground together with the reviews it references.
    /// Returns `false` if the campground does not exist.
    async fn delete_campground(&self, campground_id: &Uuid) -> Result<bool, ListingError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), ListingError>;
}

/// Persistence for reviews and their attachment to campgrounds.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Creates a review and appends it to the campground's review list as one
    /// atomic step. Fails with `CampgroundNotFound` without creating anything.
    async fn attach_review(
        &self,
        campground_id: &Uuid,
        fields: &ReviewFields,
    ) -> Result<Review, ListingError>;

    /// Removes the review from the campground's list and deletes it as one atomic
    /// step. Fails with `CampgroundNotFound` or, when the review is not attached to
    /// that campground, `ReviewNotFound`; nothing is changed in either case.
    async fn detach_review(&self, campground_id: &Uuid, review_id: &Uuid)
    -> Result<(), ListingError>;

    /// Looks a review up by ID.
    async fn find_review(&self, review_id: &Uuid) -> Result<Option<Review>, ListingError>;

    /// Loads the given reviews in the order of `review_ids`, skipping missing ones.
    async fn find_reviews(&self, review_ids: &[Uuid]) -> Result<Vec<Review>, ListingError>;
}

const CAMPGROUND_COLUMNS: &str = "id, title, price, image, description, location, \
     author_id, review_ids, created_at, updated_at";

/// Campground and review store backed by the `campgrounds` and `reviews` tables.
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    /// Creates a new instance of `PgListingStore` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampgroundStore for PgListingStore {
    async fn list_campgrounds(&self) -> Result<Vec<Campground>, ListingError> {
        let campgrounds = sqlx::query_as::<_, Campground>(&format!(
            "SELECT {} FROM campgrounds ORDER BY created_at, id",
            CAMPGROUND_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(campgrounds)
    }

    async fn insert_campground(
        &self,
        fields: &CampgroundFields,
        author_id: &Uuid,
    ) -> Result<Campground, ListingError> {
        let campground = sqlx::query_as::<_, Campground>(&format!(
            r#"
            INSERT INTO campgrounds (
                id, title, price, image, description, location, author_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CAMPGROUND_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&fields.title)
        .bind(fields.price)
        .bind(&fields.image)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(campground)
    }

    async fn find_campground(
        &self,
        campground_id: &Uuid,
    ) -> Result<Option<Campground>, ListingError> {
        let campground = sqlx::query_as::<_, Campground>(&format!(
            "SELECT {} FROM campgrounds WHERE id = $1",
            CAMPGROUND_COLUMNS
        ))
        .bind(campground_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(campground)
    }

    async fn update_campground(
        &self,
        campground_id: &Uuid,
        fields: &CampgroundFields,
    ) -> Result<Option<Campground>, ListingError> {
        let campground = sqlx::query_as::<_, Campground>(&format!(
            r#"
            UPDATE campgrounds
            SET title = $1,
                price = $2,
                image = $3,
                description = $4,
                location = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            CAMPGROUND_COLUMNS
        ))
        .bind(&fields.title)
        .bind(fields.price)
        .bind(&fields.image)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(campground_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(campground)
    }

    async fn delete_campground(&self, campground_id: &Uuid) -> Result<bool, ListingError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("DELETE FROM campgrounds WHERE id = $1 RETURNING review_ids")
            .bind(campground_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(false);
        };

        let review_ids: Vec<Uuid> = row.get("review_ids");
        if !review_ids.is_empty() {
            sqlx::query("DELETE FROM reviews WHERE id = ANY($1)")
                .bind(&review_ids)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn ping(&self) -> Result<(), ListingError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for PgListingStore {
    async fn attach_review(
        &self,
        campground_id: &Uuid,
        fields: &ReviewFields,
    ) -> Result<Review, ListingError> {
        let mut tx = self.pool.begin().await?;

        // Lock the campground row so a concurrent delete cannot slip in between.
        let exists = sqlx::query("SELECT id FROM campgrounds WHERE id = $1 FOR UPDATE")
            .bind(campground_id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Err(ListingError::CampgroundNotFound);
        }

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, body, rating)
            VALUES ($1, $2, $3)
            RETURNING id, body, rating, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.body)
        .bind(fields.rating)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE campgrounds
            SET review_ids = array_append(review_ids, $1)
            WHERE id = $2
            "#,
        )
        .bind(review.id)
        .bind(campground_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(review)
    }

    async fn detach_review(
        &self,
        campground_id: &Uuid,
        review_id: &Uuid,
    ) -> Result<(), ListingError> {
        let mut tx = self.pool.begin().await?;

        let detached = sqlx::query(
            r#"
            UPDATE campgrounds
            SET review_ids = array_remove(review_ids, $2)
            WHERE id = $1 AND $2 = ANY(review_ids)
            RETURNING id
            "#,
        )
        .bind(campground_id)
        .bind(review_id)
        .fetch_optional(&mut *tx)
        .await?;

        if detached.is_none() {
            let campground_exists = sqlx::query("SELECT id FROM campgrounds WHERE id = $1")
                .bind(campground_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();

            return Err(if campground_exists {
                ListingError::ReviewNotFound
            } else {
                ListingError::CampgroundNotFound
            });
        }

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_review(&self, review_id: &Uuid) -> Result<Option<Review>, ListingError> {
        let review = sqlx::query_as::<_, Review>(
            "SELECT id, body, rating, created_at FROM reviews WHERE id = $1",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn find_reviews(&self, review_ids: &[Uuid]) -> Result<Vec<Review>, ListingError> {
        if review_ids.is_empty() {
            return Ok(Vec::new());
        }

        let reviews = sqlx::query_as::<_, Review>(
            "SELECT id, body, rating, created_at FROM reviews WHERE id = ANY($1)",
        )
        .bind(review_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(order_by_ids(reviews, review_ids))
    }
}

/// Arranges `reviews` in the order their IDs appear in `review_ids`.
pub(crate) fn order_by_ids(mut reviews: Vec<Review>, review_ids: &[Uuid]) -> Vec<Review> {
    review_ids
        .iter()
        .filter_map(|id| {
            reviews
                .iter()
                .position(|review| review.id == *id)
                .map(|index| reviews.swap_remove(index))
        })
        .collect()
}
