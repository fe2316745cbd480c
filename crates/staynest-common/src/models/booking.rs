//! Booking model: a reservation of a listing for a date range.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stay::StayDates;

use super::listing::Listing;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,

    /// Guest who made the booking
    pub customer_id: Uuid,

    /// Listing creator at booking time
    pub host_id: Uuid,

    pub listing_id: Uuid,

    pub start_date: NaiveDate,

    /// Check-out date
    pub end_date: NaiveDate,

    /// Minor currency units
    pub total_price: i64,

    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn dates(&self) -> StayDates {
        StayDates {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Customer, host, or nobody else.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.customer_id == user_id || self.host_id == user_id
    }
}

/// Body of `POST /bookings/create` and `POST /stripe/create-payment-intent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayRequest {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Booking with its listing, for trip and reservation lists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithListing {
    #[serde(flatten)]
    pub booking: Booking,
    pub listing: Listing,
}

/// A blocked range on a listing's calendar.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookedRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
