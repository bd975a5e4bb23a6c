use axum_helpers::CurrentUser;
use clients::{ClientError, OrderClient, ProductClient};
use contracts::OrderStatus;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ReviewError, ReviewResult};
use crate::models::{
    CreateReview, RatingSummary, Review, ReviewFilter, ReviewList, ReviewTarget, ReviewType,
    UpdateReview,
};
use crate::repository::ReviewRepository;

/// Service layer for ratings of products and orders
pub struct ReviewService<R: ReviewRepository> {
    repository: Arc<R>,
    products: Arc<dyn ProductClient>,
    orders: Arc<dyn OrderClient>,
}

impl<R: ReviewRepository> Clone for ReviewService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            products: Arc::clone(&self.products),
            orders: Arc::clone(&self.orders),
        }
    }
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(
        repository: R,
        products: Arc<dyn ProductClient>,
        orders: Arc<dyn OrderClient>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            products,
            orders,
        }
    }

    pub async fn create_review(
        &self,
        user: &CurrentUser,
        input: CreateReview,
    ) -> ReviewResult<Review> {
        let target = ReviewTarget {
            review_type: input.review_type,
            target_id: input.target_id,
        };
        self.verify_target(user, target).await?;

        if self.repository.find_by_author(user.id, target).await?.is_some() {
            return Err(ReviewError::Duplicate(target.review_type));
        }

        let review = self
            .repository
            .create(Review::new(user.id, user.name.clone(), input))
            .await?;
        tracing::info!(
            review_id = %review.id,
            review_type = %review.review_type,
            target_id = %review.target_id,
            rating = review.rating,
            "Review created"
        );
        Ok(review)
    }

    pub async fn list_for_target(&self, filter: ReviewFilter) -> ReviewResult<ReviewList> {
        let total = self.repository.count(filter.clone()).await?;
        let items = self.repository.list(filter).await?;
        Ok(ReviewList { items, total })
    }

    pub async fn summary(&self, target: ReviewTarget) -> ReviewResult<RatingSummary> {
        let totals = self.repository.totals(target).await?;
        Ok(RatingSummary::from_totals(target, totals))
    }

    pub async fn update_review(
        &self,
        user: &CurrentUser,
        id: Uuid,
        input: UpdateReview,
    ) -> ReviewResult<Review> {
        let mut review = self.load(id).await?;
        if review.user_id != user.id {
            return Err(ReviewError::Forbidden(
                "Only the author can edit this review".to_string(),
            ));
        }

        review.apply_update(input);
        self.repository.update(review).await
    }

    pub async fn delete_review(&self, user: &CurrentUser, id: Uuid) -> ReviewResult<()> {
        let review = self.load(id).await?;
        if review.user_id != user.id && !user.is_staff() {
            return Err(ReviewError::Forbidden(
                "Not allowed to delete this review".to_string(),
            ));
        }

        if !self.repository.delete(id).await? {
            return Err(ReviewError::NotFound(id));
        }
        tracing::info!(review_id = %id, by_author = review.user_id == user.id, "Review deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> ReviewResult<Review> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ReviewError::NotFound(id))
    }

    /// Products must exist; orders must be the caller's and completed.
    async fn verify_target(&self, user: &CurrentUser, target: ReviewTarget) -> ReviewResult<()> {
        let id = target.target_id;
        match target.review_type {
            ReviewType::Product => match self.products.get_product(id).await {
                Ok(_) => Ok(()),
                Err(ClientError::NotFound) => {
                    Err(ReviewError::TargetNotFound(ReviewType::Product, id))
                }
                Err(e) => Err(ReviewError::Upstream("catalog", e)),
            },
            ReviewType::Order => {
                let order = match self.orders.get_order(id, &user.token).await {
                    Ok(order) => order,
                    Err(ClientError::NotFound) => {
                        return Err(ReviewError::TargetNotFound(ReviewType::Order, id));
                    }
                    Err(ClientError::Forbidden) => {
                        return Err(not_your_order());
                    }
                    Err(e) => return Err(ReviewError::Upstream("orders", e)),
                };
                if order.user_id != user.id {
                    return Err(not_your_order());
                }
                if order.status != OrderStatus::Completed {
                    return Err(ReviewError::NotReviewable(
                        "Only completed orders can be reviewed".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn not_your_order() -> ReviewError {
    ReviewError::NotReviewable("You can only review your own orders".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockReviewRepository;
    use axum_helpers::Role;
    use clients::fake::{FakeOrderClient, FakeProductClient};
    use contracts::OrderSummary;

    fn user(roles: Vec<Role>) -> CurrentUser {
        CurrentUser {
            id: Uuid::now_v7(),
            email: "ann@bistro.test".into(),
            name: "Ann".into(),
            roles,
            token: "token".into(),
        }
    }

    fn service(
        repo: MockReviewRepository,
        orders: FakeOrderClient,
    ) -> ReviewService<MockReviewRepository> {
        ReviewService::new(
            repo,
            Arc::new(FakeProductClient::new()),
            Arc::new(orders),
        )
    }

    fn order_review(target_id: Uuid) -> CreateReview {
        CreateReview {
            review_type: ReviewType::Order,
            target_id,
            rating: 5,
            comment: Some("Fast delivery".into()),
        }
    }

    async fn order(orders: &FakeOrderClient, user_id: Uuid, status: OrderStatus) -> Uuid {
        let id = Uuid::now_v7();
        orders
            .insert(OrderSummary {
                id,
                user_id,
                status,
                total_cents: 2500,
                customer_email: "ann@bistro.test".into(),
            })
            .await;
        id
    }

    #[tokio::test]
    async fn test_completed_own_order_can_be_reviewed() {
        let ann = user(vec![Role::User]);
        let orders = FakeOrderClient::new();
        let order_id = order(&orders, ann.id, OrderStatus::Completed).await;

        let mut repo = MockReviewRepository::new();
        repo.expect_find_by_author().returning(|_, _| Ok(None));
        repo.expect_create().returning(Ok);

        let review = service(repo, orders)
            .create_review(&ann, order_review(order_id))
            .await
            .unwrap();

        assert_eq!(review.author_name, "Ann");
        assert_eq!(review.target_id, order_id);
    }

    #[tokio::test]
    async fn test_unfinished_order_is_not_reviewable() {
        let ann = user(vec![Role::User]);
        let orders = FakeOrderClient::new();
        let order_id = order(&orders, ann.id, OrderStatus::Paid).await;

        let mut repo = MockReviewRepository::new();
        repo.expect_create().never();

        let result = service(repo, orders)
            .create_review(&ann, order_review(order_id))
            .await;
        assert!(matches!(result, Err(ReviewError::NotReviewable(msg)) if msg.contains("completed")));
    }

    #[tokio::test]
    async fn test_someone_elses_order_is_not_reviewable() {
        let orders = FakeOrderClient::new();
        let order_id = order(&orders, Uuid::now_v7(), OrderStatus::Completed).await;

        let mut repo = MockReviewRepository::new();
        repo.expect_create().never();

        let result = service(repo, orders)
            .create_review(&user(vec![Role::User]), order_review(order_id))
            .await;
        assert!(matches!(result, Err(ReviewError::NotReviewable(_))));
    }

    #[tokio::test]
    async fn test_duplicate_is_caught_before_insert() {
        let ann = user(vec![Role::User]);
        let orders = FakeOrderClient::new();
        let order_id = order(&orders, ann.id, OrderStatus::Completed).await;
        let existing = Review::new(ann.id, "Ann".into(), order_review(order_id));

        let mut repo = MockReviewRepository::new();
        repo.expect_find_by_author()
            .returning(move |_, _| Ok(Some(existing.clone())));
        repo.expect_create().never();

        let result = service(repo, orders)
            .create_review(&ann, order_review(order_id))
            .await;
        assert!(matches!(result, Err(ReviewError::Duplicate(ReviewType::Order))));
    }

    #[tokio::test]
    async fn test_staff_can_delete_any_review() {
        let review = Review::new(Uuid::now_v7(), "Bob".into(), order_review(Uuid::now_v7()));

        let mut repo = MockReviewRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(review.clone())));
        repo.expect_delete().times(1).returning(|_| Ok(true));

        let result = service(repo, FakeOrderClient::new())
            .delete_review(&user(vec![Role::Manager]), Uuid::now_v7())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_only_author_can_edit() {
        let review = Review::new(Uuid::now_v7(), "Bob".into(), order_review(Uuid::now_v7()));

        let mut repo = MockReviewRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(review.clone())));
        repo.expect_update().never();

        let result = service(repo, FakeOrderClient::new())
            .update_review(&user(vec![Role::Admin]), Uuid::now_v7(), UpdateReview::default())
            .await;
        assert!(matches!(result, Err(ReviewError::Forbidden(_))));
    }
}
