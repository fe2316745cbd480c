//! Checkout: Stripe payment intents.

use axum::{
    extract::{Extension, State},
    middleware,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use staynest_common::{
    error::{StayError, StayResult},
    models::booking::StayRequest,
};
use std::sync::Arc;

use crate::{middleware::AuthContext, routes::bookings::quote_stay, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stripe/create-payment-intent", post(create_payment_intent))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Serialize)]
struct PaymentIntentResponse {
    client_secret: String,
    /// Minor currency units
    amount: i64,
    currency: String,
}

/// POST /stripe/create-payment-intent
///
/// The amount is priced here from the listing, never taken from the client.
async fn create_payment_intent(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<StayRequest>,
) -> StayResult<Json<PaymentIntentResponse>> {
    let stripe = state.stripe.as_ref().ok_or(StayError::PaymentsDisabled)?;
    let quote = quote_stay(&state, auth.user_id, &body).await?;

    let intent = stripe
        .create_payment_intent(quote.total_price, quote.listing.id, auth.user_id)
        .await?;

    tracing::info!(
        intent_id = %intent.id,
        listing_id = %quote.listing.id,
        customer_id = %auth.user_id,
        amount = intent.amount,
        "Payment intent created"
    );

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
        amount: intent.amount,
        currency: intent.currency,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use staynest_common::models::user::UserRole;
    use uuid::Uuid;

    #[tokio::test]
    async fn disabled_without_stripe_key() {
        let token = bearer(UserRole::User);
        let start = Utc::now().date_naive() + Duration::days(3);
        let (status, body) = send(json_request(
            "POST",
            "/stripe/create-payment-intent",
            Some(&token),
            json!({
                "listingId": Uuid::now_v7(),
                "startDate": start.to_string(),
                "endDate": (start + Duration::days(2)).to_string(),
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "PAYMENTS_DISABLED");
    }
}
