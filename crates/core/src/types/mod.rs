//! Core types for Tensura Store.
//!
//! Records mirror the documents kept in the platform's document store. They
//! carry no behavior beyond a few derived helpers; nothing here checks that,
//! e.g., a cart total matches its lines.

pub mod address;
pub mod api;
pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod review;
pub mod status;
pub mod user;

pub use address::Address;
pub use api::ApiResponse;
pub use cart::{Cart, CartItem};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::Order;
pub use price::{CurrencyCode, Price};
pub use product::{Category, Product};
pub use review::Review;
pub use status::*;
pub use user::User;
