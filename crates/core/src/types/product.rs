//! Catalog product record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Price, ProductId, Review};
use crate::constants::PRODUCT_CATEGORIES;

/// Catalog category for menus and display.
///
/// Products store their category as free text; see [`Product::category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Electronics,
    Clothing,
    Books,
    HomeAndGarden,
    Sports,
    Toys,
    Beauty,
    #[default]
    Other,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Self; 8] = [
        Self::Electronics,
        Self::Clothing,
        Self::Books,
        Self::HomeAndGarden,
        Self::Sports,
        Self::Toys,
        Self::Beauty,
        Self::Other,
    ];

    /// Display label, as stored in the document store.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        let [electronics, clothing, books, home, sports, toys, beauty, other] = PRODUCT_CATEGORIES;
        match self {
            Self::Electronics => electronics,
            Self::Clothing => clothing,
            Self::Books => books,
            Self::HomeAndGarden => home,
            Self::Sports => sports,
            Self::Toys => toys,
            Self::Beauty => beauty,
            Self::Other => other,
        }
    }

    /// Look up a category by its stored label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Category label as stored; not limited to [`Category::ALL`].
    pub category: String,
    pub image_url: String,
    pub stock: u32,
    /// Aggregate rating as stored; not recomputed from `reviews`.
    pub rating: f64,
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Menu category; labels outside the known set fall under `Other`.
    #[must_use]
    pub fn category(&self) -> Category {
        Category::from_label(&self.category).unwrap_or_default()
    }

    /// Price in the store currency.
    #[must_use]
    pub const fn store_price(&self) -> Price {
        Price::store(self.price)
    }

    /// Whether any units are left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Mean rating of the attached reviews, if there are any.
    #[must_use]
    pub fn review_average(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)] // Review counts never approach f64 precision
        let count = self.reviews.len() as f64;
        Some(self.reviews.iter().map(|r| r.rating).sum::<f64>() / count)
    }
}
