//! Booking repository: reservations and the overlap-guarded insert.

use std::collections::HashMap;

use chrono::NaiveDate;
use staynest_common::{
    models::{
        booking::{BookedRange, Booking, BookingWithListing},
        listing::Listing,
    },
    stay::StayDates,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Result of [`create_booking`].
#[derive(Debug)]
pub enum BookingOutcome {
    Created(Booking),
    /// Another booking on the listing overlaps the requested dates.
    Overlap,
    /// The listing was deleted before the booking could be placed.
    ListingMissing,
}

/// Insert a booking unless an existing one overlaps the requested dates.
///
/// The listing row is locked for the duration of the transaction, so
/// concurrent requests for the same listing run the check-then-insert one
/// after another.
pub async fn create_booking(
    pool: &PgPool,
    id: Uuid,
    customer_id: Uuid,
    host_id: Uuid,
    listing_id: Uuid,
    dates: StayDates,
    total_price: i64,
) -> Result<BookingOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let locked: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM listings WHERE id = $1 FOR UPDATE")
            .bind(listing_id)
            .fetch_optional(&mut *tx)
            .await?;
    if locked.is_none() {
        return Ok(BookingOutcome::ListingMissing);
    }

    // StayDates::overlaps with the existing booking as `self`: bounds inclusive
    let clash: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id FROM bookings
        WHERE listing_id = $1
          AND start_date <= $3
          AND $2 <= end_date
        LIMIT 1
        "#,
    )
    .bind(listing_id)
    .bind(dates.start)
    .bind(dates.end)
    .fetch_optional(&mut *tx)
    .await?;
    if clash.is_some() {
        return Ok(BookingOutcome::Overlap);
    }

    let booking = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (id, customer_id, host_id, listing_id, start_date, end_date, total_price, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(customer_id)
    .bind(host_id)
    .bind(listing_id)
    .bind(dates.start)
    .bind(dates.end)
    .bind(total_price)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(BookingOutcome::Created(booking))
}

/// Find a booking by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Cancel (delete) a booking.
pub async fn delete_booking(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// A guest's trips, most recent stay first.
pub async fn list_trips(pool: &PgPool, customer_id: Uuid) -> Result<Vec<BookingWithListing>, sqlx::Error> {
    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE customer_id = $1 ORDER BY start_date DESC",
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    attach_listings(pool, bookings).await
}

/// Bookings received by a host across all their listings.
pub async fn list_reservations(pool: &PgPool, host_id: Uuid) -> Result<Vec<BookingWithListing>, sqlx::Error> {
    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE host_id = $1 ORDER BY start_date DESC",
    )
    .bind(host_id)
    .fetch_all(pool)
    .await?;
    attach_listings(pool, bookings).await
}

/// Ranges on a listing's calendar that end on or after `from`.
pub async fn booked_ranges(
    pool: &PgPool,
    listing_id: Uuid,
    from: NaiveDate,
) -> Result<Vec<BookedRange>, sqlx::Error> {
    sqlx::query_as::<_, BookedRange>(
        r#"
        SELECT start_date, end_date FROM bookings
        WHERE listing_id = $1 AND end_date >= $2
        ORDER BY start_date
        "#,
    )
    .bind(listing_id)
    .bind(from)
    .fetch_all(pool)
    .await
}

/// All bookings, newest first (admin).
pub async fn list_bookings(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT * FROM bookings
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Pair each booking with its listing. Bookings whose listing has vanished
/// are dropped (the cascade removes them shortly after anyway).
async fn attach_listings(
    pool: &PgPool,
    bookings: Vec<Booking>,
) -> Result<Vec<BookingWithListing>, sqlx::Error> {
    if bookings.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = bookings.iter().map(|b| b.listing_id).collect();
    let listings = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(pool)
        .await?;
    let by_id: HashMap<Uuid, Listing> = listings.into_iter().map(|l| (l.id, l)).collect();

    Ok(bookings
        .into_iter()
        .filter_map(|booking| {
            let listing = by_id.get(&booking.listing_id)?.clone();
            Some(BookingWithListing { booking, listing })
        })
        .collect())
}
