//! Application constants.
//!
//! Static values shared by every layer: endpoints, enumerations, limits,
//! message strings and patterns.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// REST endpoints of the store API.
pub mod api {
    /// Base URL used when `STOREFRONT_API_BASE_URL` is unset.
    pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
    pub const USERS: &str = "/users";
    pub const PRODUCTS: &str = "/products";
    pub const ORDERS: &str = "/orders";
    pub const CART: &str = "/cart";
    pub const AUTH: &str = "/auth";
    pub const REVIEWS: &str = "/reviews";
}

/// Request timeout applied to every outbound platform call.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog categories, in menu order.
pub const PRODUCT_CATEGORIES: [&str; 8] = [
    "Electronics",
    "Clothing",
    "Books",
    "Home & Garden",
    "Sports",
    "Toys",
    "Beauty",
    "Other",
];

/// Wire names of order statuses.
pub mod order_status {
    pub const PENDING: &str = "pending";
    pub const PROCESSING: &str = "processing";
    pub const SHIPPED: &str = "shipped";
    pub const DELIVERED: &str = "delivered";
    pub const CANCELLED: &str = "cancelled";
}

/// Catalog sort options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOption {
    #[serde(rename = "price-asc")]
    PriceLowHigh,
    #[serde(rename = "price-desc")]
    PriceHighLow,
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "popularity")]
    Popularity,
}

impl SortOption {
    /// Every option, in menu order.
    pub const ALL: [Self; 5] = [
        Self::PriceLowHigh,
        Self::PriceHighLow,
        Self::Newest,
        Self::Rating,
        Self::Popularity,
    ];

    /// Wire name (e.g. as a query parameter).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PriceLowHigh => "price-asc",
            Self::PriceHighLow => "price-desc",
            Self::Newest => "newest",
            Self::Rating => "rating",
            Self::Popularity => "popularity",
        }
    }
}

impl std::str::FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| format!("invalid sort option: {s}"))
    }
}

/// Pagination defaults.
pub mod pagination {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    /// Clamp a requested page size: zero falls back to the default and
    /// anything above the maximum is capped.
    #[must_use]
    pub const fn clamp_limit(requested: u32) -> u32 {
        if requested == 0 {
            DEFAULT_LIMIT
        } else if requested > MAX_LIMIT {
            MAX_LIMIT
        } else {
            requested
        }
    }
}

/// Store currency.
pub mod currency {
    pub const SYMBOL: &str = "$";
    pub const CODE: &str = "USD";
    pub const DECIMAL_PLACES: u32 = 2;
}

/// Length limits for user input.
pub mod validation_rules {
    pub const PASSWORD_MIN_LENGTH: usize = 8;
    pub const PASSWORD_MAX_LENGTH: usize = 128;
    pub const USERNAME_MIN_LENGTH: usize = 3;
    pub const USERNAME_MAX_LENGTH: usize = 32;
    pub const PRODUCT_NAME_MAX_LENGTH: usize = 255;
    pub const PRODUCT_DESCRIPTION_MAX_LENGTH: usize = 5000;
    pub const REVIEW_MAX_LENGTH: usize = 1000;
}

/// User-facing error strings.
pub mod error_messages {
    pub const INVALID_EMAIL: &str = "Please enter a valid email address";
    pub const INVALID_PASSWORD: &str = "Password must be at least 8 characters with uppercase, lowercase, number, and special character";
    pub const INVALID_PHONE: &str = "Please enter a valid phone number";
    pub const INVALID_URL: &str = "Please enter a valid URL";
    pub const INVALID_ZIP: &str = "Please enter a valid ZIP code";
    pub const FIELD_REQUIRED: &str = "This field is required";
    pub const INVALID_CREDIT_CARD: &str = "Please enter a valid credit card number";
    pub const UNAUTHORIZED: &str = "You are not authorized to perform this action";
    pub const INTERNAL_SERVER_ERROR: &str = "An error occurred. Please try again later";
    pub const NETWORK_ERROR: &str = "Network error. Please check your connection";
}

/// User-facing confirmation strings.
pub mod success_messages {
    pub const ORDER_PLACED: &str = "Your order has been placed successfully";
    pub const PRODUCT_ADDED_TO_CART: &str = "Product added to cart";
    pub const PRODUCT_REMOVED_FROM_CART: &str = "Product removed from cart";
    pub const REVIEW_SUBMITTED: &str = "Your review has been submitted";
    pub const PROFILE_UPDATED: &str = "Your profile has been updated";
    pub const PASSWORD_CHANGED: &str = "Your password has been changed";
}

/// Keys for client-side persisted state.
pub mod storage_keys {
    pub const USER_TOKEN: &str = "user_token";
    pub const USER_PREFERENCES: &str = "user_preferences";
    pub const CART_DATA: &str = "cart_data";
    pub const THEME: &str = "theme";
}

/// Regex sources shared by validation and any client-side checks.
pub mod regex_patterns {
    pub const EMAIL: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
    pub const URL: &str = r"^(https?://)?(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&/=]*)$";
    pub const PHONE: &str =
        r"^[+]?[(]?[0-9]{1,4}[)]?[-\s.]?[(]?[0-9]{1,4}[)]?[-\s.]?[0-9]{1,9}$";
    pub const ZIP_CODE: &str = r"^\d{5}(-\d{4})?$";
}
