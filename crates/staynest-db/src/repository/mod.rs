//! Repository layer: query functions organized by table.

pub mod bookings;
pub mod contact;
pub mod listings;
pub mod password_resets;
pub mod stats;
pub mod users;
pub mod wishlists;

#[cfg(test)]
mod test_support;
