//! Stripe payment intents.
//!
//! Only the one call the checkout flow needs: create a PaymentIntent and hand
//! its `client_secret` to the browser, which confirms the card with Stripe.js.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use staynest_common::{config::StripeConfig, error::StayError};
use uuid::Uuid;

#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    secret_key: String,
    api_base: String,
    currency: String,
}

/// The parts of a PaymentIntent the client needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeClient {
    /// `None` when no secret key is configured.
    pub fn from_config(cfg: &StripeConfig) -> anyhow::Result<Option<Self>> {
        if !cfg.is_enabled() {
            return Ok(None);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("StayNest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Some(Self {
            http,
            secret_key: cfg.secret_key.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            currency: cfg.currency.to_lowercase(),
        }))
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// `POST /v1/payment_intents`
    pub async fn create_payment_intent(
        &self,
        amount: i64,
        listing_id: Uuid,
        customer_id: Uuid,
    ) -> Result<PaymentIntent, StayError> {
        let params = intent_params(amount, &self.currency, listing_id, customer_id);

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| StayError::Payment {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(StayError::Payment { message });
        }

        response.json::<PaymentIntent>().await.map_err(|e| StayError::Payment {
            message: format!("Unreadable PaymentIntent: {e}"),
        })
    }
}

/// Form fields for a PaymentIntent, in Stripe's bracketed form encoding.
fn intent_params(amount: i64, currency: &str, listing_id: Uuid, customer_id: Uuid) -> Vec<(&'static str, String)> {
    vec![
        ("amount", amount.to_string()),
        ("currency", currency.to_string()),
        ("automatic_payment_methods[enabled]", "true".to_string()),
        ("metadata[listing_id]", listing_id.to_string()),
        ("metadata[customer_id]", customer_id.to_string()),
    ]
}
