//! Tensura Store Core - Shared types library.
//!
//! This crate provides the pieces shared by every Tensura Store component:
//! - `storefront` - Public-facing site and the platform data-access wrappers
//! - `integration-tests` - HTTP-level tests against a stubbed platform
//!
//! # Architecture
//!
//! The core crate contains only types, constants and pure functions - no I/O,
//! no platform access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Catalog, cart and order records plus type-safe document IDs
//! - [`validation`] - Form and string-shape validation helpers
//! - [`constants`] - Static configuration values and message strings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod constants;
pub mod types;
pub mod validation;

pub use types::*;
