//! Core domain models shared across all StayNest crates.
//!
//! These are the "truth" types: what the database stores and the API serializes.

pub mod admin;
pub mod booking;
pub mod contact;
pub mod listing;
pub mod password_reset;
pub mod user;

/// Re-export all model types for convenience.
pub use admin::*;
pub use booking::*;
pub use contact::*;
pub use listing::*;
pub use password_reset::*;
pub use user::*;
