use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ReviewError, ReviewResult};
use crate::models::{RatingTotals, Review, ReviewFilter, ReviewTarget};

/// Repository trait for Review persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fails with `Duplicate` if the author already reviewed the target
    async fn create(&self, review: Review) -> ReviewResult<Review>;

    async fn get_by_id(&self, id: Uuid) -> ReviewResult<Option<Review>>;

    async fn find_by_author(
        &self,
        user_id: Uuid,
        target: ReviewTarget,
    ) -> ReviewResult<Option<Review>>;

    /// Newest first, paginated
    async fn list(&self, filter: ReviewFilter) -> ReviewResult<Vec<Review>>;

    async fn count(&self, filter: ReviewFilter) -> ReviewResult<u64>;

    async fn totals(&self, target: ReviewTarget) -> ReviewResult<RatingTotals>;

    async fn update(&self, review: Review) -> ReviewResult<Review>;

    async fn delete(&self, id: Uuid) -> ReviewResult<bool>;
}

/// In-memory implementation of ReviewRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryReviewRepository {
    reviews: Arc<RwLock<HashMap<Uuid, Review>>>,
}

impl InMemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_target(review: &Review, target: ReviewTarget) -> bool {
    review.review_type == target.review_type && review.target_id == target.target_id
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn create(&self, review: Review) -> ReviewResult<Review> {
        let mut reviews = self.reviews.write().await;

        let target = ReviewTarget {
            review_type: review.review_type,
            target_id: review.target_id,
        };
        if reviews
            .values()
            .any(|r| r.user_id == review.user_id && is_target(r, target))
        {
            return Err(ReviewError::Duplicate(review.review_type));
        }

        reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn get_by_id(&self, id: Uuid) -> ReviewResult<Option<Review>> {
        Ok(self.reviews.read().await.get(&id).cloned())
    }

    async fn find_by_author(
        &self,
        user_id: Uuid,
        target: ReviewTarget,
    ) -> ReviewResult<Option<Review>> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .values()
            .find(|r| r.user_id == user_id && is_target(r, target))
            .cloned())
    }

    async fn list(&self, filter: ReviewFilter) -> ReviewResult<Vec<Review>> {
        let reviews = self.reviews.read().await;

        let mut result: Vec<Review> = reviews
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count(&self, filter: ReviewFilter) -> ReviewResult<u64> {
        let reviews = self.reviews.read().await;
        Ok(reviews.values().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn totals(&self, target: ReviewTarget) -> ReviewResult<RatingTotals> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .values()
            .filter(|r| is_target(r, target))
            .fold(RatingTotals::default(), |acc, r| RatingTotals {
                count: acc.count + 1,
                sum: acc.sum + u64::from(r.rating),
            }))
    }

    async fn update(&self, review: Review) -> ReviewResult<Review> {
        let mut reviews = self.reviews.write().await;

        match reviews.get_mut(&review.id) {
            Some(existing) => {
                *existing = review.clone();
                Ok(review)
            }
            None => Err(ReviewError::NotFound(review.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> ReviewResult<bool> {
        Ok(self.reviews.write().await.remove(&id).is_some())
    }
}
