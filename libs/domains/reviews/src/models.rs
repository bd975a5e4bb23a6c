use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// What a review is about
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReviewType {
    Order,
    Product,
}

impl ReviewType {
    pub fn label(self) -> &'static str {
        match self {
            ReviewType::Order => "Order",
            ReviewType::Product => "Product",
        }
    }
}

/// Review entity; one per (user, review_type, target)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub review_type: ReviewType,
    pub target_id: Uuid,
    /// 1 to 5 stars
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(user_id: Uuid, author_name: String, input: CreateReview) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            author_name,
            review_type: input.review_type,
            target_id: input.target_id,
            rating: input.rating,
            comment: normalize_comment(input.comment),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateReview) {
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if update.comment.is_some() {
            self.comment = normalize_comment(update.comment);
        }
        self.updated_at = Utc::now();
    }
}

/// Blank comments are stored as none
fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    pub review_type: ReviewType,
    pub target_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReview {
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<u8>,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// `?type=product&target_id=...`
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, IntoParams)]
pub struct ReviewTarget {
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub target_id: Uuid,
}

/// Reviews of one target, paginated
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct TargetReviewsQuery {
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub target_id: Uuid,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: u64,
    #[serde(default)]
    #[validate(range(max = 1_000_000))]
    pub offset: u64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct Page {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: u64,
    #[serde(default)]
    #[validate(range(max = 1_000_000))]
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewFilter {
    pub review_type: Option<ReviewType>,
    pub target_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub limit: u64,
    pub offset: u64,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self {
            review_type: None,
            target_id: None,
            user_id: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> u64 {
    50
}

impl ReviewFilter {
    pub fn for_target(query: TargetReviewsQuery) -> Self {
        Self {
            review_type: Some(query.review_type),
            target_id: Some(query.target_id),
            user_id: None,
            limit: query.limit,
            offset: query.offset,
        }
    }

    pub fn for_author(user_id: Uuid, page: Page) -> Self {
        Self {
            user_id: Some(user_id),
            limit: page.limit,
            offset: page.offset,
            ..Default::default()
        }
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.review_type.is_none_or(|t| review.review_type == t)
            && self.target_id.is_none_or(|id| review.target_id == id)
            && self.user_id.is_none_or(|id| review.user_id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewList {
    pub items: Vec<Review>,
    pub total: u64,
}

/// Raw rating totals for one target, as stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingTotals {
    pub count: u64,
    pub sum: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingSummary {
    pub target_id: Uuid,
    pub review_type: ReviewType,
    /// Mean rating rounded to two decimals, 0 when there are no reviews
    pub average: f64,
    pub count: u64,
}

impl RatingSummary {
    pub fn from_totals(target: ReviewTarget, totals: RatingTotals) -> Self {
        let average = if totals.count == 0 {
            0.0
        } else {
            let mean = totals.sum as f64 / totals.count as f64;
            (mean * 100.0).round() / 100.0
        };

        Self {
            target_id: target.target_id,
            review_type: target.review_type,
            average,
            count: totals.count,
        }
    }
}
