//! Hearth Core - Shared domain library.
//!
//! This crate provides the types and pure logic used across all Hearth components:
//! - `storefront` - Public bakery site (catalog, cart, checkout, account)
//! - `admin` - Back office (orders, custom requests, content, settings)
//! - `cli` - Command-line tools for migrations, admin users and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and computations - no I/O, no database access,
//! no HTTP clients. Everything here can be unit tested without a running service.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, contact details, money, ratings and status enums
//! - [`models`] - Domain records shared by the storefront and admin
//! - [`pricing`] - Site settings and delivery/tax/total computation
//! - [`custom_request`] - The custom cake request wizard
//! - [`analytics`] - Order, review and request aggregates
//! - [`filters`] - Search and filter predicates for list pages
//! - [`validation`] - Field-level form errors
//! - [`slug`] - URL slugs
//! - `rows` - Database row shapes (feature `postgres`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod custom_request;
pub mod filters;
pub mod models;
pub mod pricing;
#[cfg(feature = "postgres")]
pub mod rows;
pub mod slug;
pub mod types;
pub mod validation;

pub use types::*;
