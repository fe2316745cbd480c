//! API route modules.

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod contact;
pub mod health;
pub mod properties;
pub mod stripe;
pub mod users;
