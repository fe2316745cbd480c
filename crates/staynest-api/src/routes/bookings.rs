//! Booking routes (all require authentication).
//!
//! POST   /bookings/create                      : reserve a listing for a date range
//! GET    /bookings/{id}                        : customer, host or admin
//! DELETE /bookings/{id}                        : cancel; customer, host or admin
//! GET    /bookings/listing/{listing_id}/booked : calendar of taken ranges

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use staynest_common::{
    error::{StayError, StayResult},
    ids::generate_id,
    models::{
        booking::{BookedRange, Booking, StayRequest},
        listing::Listing,
    },
    stay::StayDates,
};
use staynest_db::repository::{bookings, bookings::BookingOutcome, listings};
use std::sync::Arc;
use uuid::Uuid;

use crate::{middleware::AuthContext, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings/create", post(create_booking))
        .route("/bookings/{id}", get(get_booking).delete(cancel_booking))
        .route("/bookings/listing/{listing_id}/booked", get(booked_dates))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// A priced stay on an existing listing, ready to book or pay for.
pub(crate) struct QuotedStay {
    pub listing: Listing,
    pub dates: StayDates,
    pub total_price: i64,
}

/// Validate a stay request for `customer_id` and price it.
///
/// Rejects inverted or past ranges, missing listings and hosts booking their
/// own listing.
pub(crate) async fn quote_stay(state: &AppState, customer_id: Uuid, req: &StayRequest) -> StayResult<QuotedStay> {
    let today = Utc::now().date_naive();
    let dates = StayDates::upcoming(req.start_date, req.end_date, today)?;

    let listing = listings::find_by_id(&state.db.pool, req.listing_id)
        .await?
        .ok_or_else(|| StayError::not_found("Listing"))?;
    if listing.creator_id == customer_id {
        return Err(StayError::validation("You cannot book your own listing"));
    }

    let total_price = dates.total_price(listing.price)?;
    Ok(QuotedStay {
        listing,
        dates,
        total_price,
    })
}

/// POST /bookings/create
async fn create_booking(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<StayRequest>,
) -> StayResult<(StatusCode, Json<Booking>)> {
    let quote = quote_stay(&state, auth.user_id, &body).await?;

    let outcome = bookings::create_booking(
        &state.db.pool,
        generate_id(),
        auth.user_id,
        quote.listing.creator_id,
        quote.listing.id,
        quote.dates,
        quote.total_price,
    )
    .await?;

    match outcome {
        BookingOutcome::Created(booking) => {
            tracing::info!(
                booking_id = %booking.id,
                listing_id = %booking.listing_id,
                customer_id = %booking.customer_id,
                nights = quote.dates.nights(),
                "Booking created"
            );
            Ok((StatusCode::CREATED, Json(booking)))
        }
        BookingOutcome::Overlap => {
            tracing::debug!(listing_id = %body.listing_id, "Booking rejected: dates taken");
            Err(StayError::DatesUnavailable)
        }
        BookingOutcome::ListingMissing => Err(StayError::not_found("Listing")),
    }
}

async fn load_visible_booking(state: &AppState, auth: &AuthContext, booking_id: Uuid) -> StayResult<Booking> {
    let booking = bookings::find_by_id(&state.db.pool, booking_id)
        .await?
        .ok_or_else(|| StayError::not_found("Booking"))?;
    if !booking.involves(auth.user_id) && !auth.is_admin() {
        return Err(StayError::Forbidden);
    }
    Ok(booking)
}

/// GET /bookings/{id}
async fn get_booking(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> StayResult<Json<Booking>> {
    Ok(Json(load_visible_booking(&state, &auth, booking_id).await?))
}

/// DELETE /bookings/{id}
async fn cancel_booking(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> StayResult<StatusCode> {
    let booking = load_visible_booking(&state, &auth, booking_id).await?;

    if !bookings::delete_booking(&state.db.pool, booking.id).await? {
        return Err(StayError::not_found("Booking"));
    }

    tracing::info!(booking_id = %booking.id, cancelled_by = %auth.user_id, "Booking cancelled");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /bookings/listing/{listing_id}/booked: ranges from today on.
async fn booked_dates(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> StayResult<Json<Vec<BookedRange>>> {
    let today = Utc::now().date_naive();
    Ok(Json(bookings::booked_ranges(&state.db.pool, listing_id, today).await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use staynest_common::models::user::UserRole;
    use uuid::Uuid;

    fn stay_body(start: chrono::NaiveDate, end: chrono::NaiveDate) -> serde_json::Value {
        json!({
            "listingId": Uuid::now_v7(),
            "startDate": start.to_string(),
            "endDate": end.to_string(),
        })
    }

    #[tokio::test]
    async fn booking_requires_token() {
        let today = Utc::now().date_naive();
        let (status, _) = send(json_request(
            "POST",
            "/bookings/create",
            None,
            stay_body(today, today + Duration::days(2)),
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn inverted_dates_are_rejected() {
        let token = bearer(UserRole::User);
        let start = Utc::now().date_naive() + Duration::days(10);
        let (status, body) = send(json_request(
            "POST",
            "/bookings/create",
            Some(&token),
            stay_body(start, start - Duration::days(3)),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed: End date must be after start date");
    }

    #[tokio::test]
    async fn past_start_is_rejected() {
        let token = bearer(UserRole::User);
        let start = Utc::now().date_naive() - Duration::days(5);
        let (status, body) = send(json_request(
            "POST",
            "/bookings/create",
            Some(&token),
            stay_body(start, start + Duration::days(2)),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_dates_are_rejected() {
        let token = bearer(UserRole::User);
        let (status, _) = send(json_request(
            "POST",
            "/bookings/create",
            Some(&token),
            json!({"listingId": Uuid::now_v7(), "startDate": "07/01/2025", "endDate": "2025-07-04"}),
        ))
        .await;
        assert!(status.is_client_error());
    }
}
