//! Core types for Hearth.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod money;
pub mod rating;
pub mod status;

pub use contact::{Email, EmailError, Phone, PhoneError};
pub use id::*;
pub use money::{Currency, Money, UnknownCurrency};
pub use rating::{Rating, RatingError};
pub use status::*;
