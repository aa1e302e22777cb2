//! Product review record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProductId, ReviewId, UserId};

/// A user's rating and comment on a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
