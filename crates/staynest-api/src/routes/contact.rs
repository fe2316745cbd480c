//! Public contact form.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use staynest_common::{
    config,
    error::StayResult,
    ids::generate_id,
    models::contact::{ContactMessage, ContactRequest},
    validation::validate_request,
};
use staynest_db::repository::contact;
use std::sync::Arc;

use crate::{mailer::contact_notification_email, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/contact", post(submit_message))
}

/// POST /contact
///
/// Stores the message and notifies the operators' inbox when one is configured.
async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContactRequest>,
) -> StayResult<(StatusCode, Json<ContactMessage>)> {
    validate_request(&body)?;

    let subject = body.subject.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let message = contact::create_message(
        &state.db.pool,
        generate_id(),
        body.name.trim(),
        body.email.trim(),
        subject,
        body.message.trim(),
    )
    .await?;

    let inbox = &config::get().mail.admin_inbox;
    if !inbox.trim().is_empty() {
        state
            .mailer
            .send_best_effort(contact_notification_email(
                inbox,
                &message.name,
                &message.email,
                message.subject.as_deref(),
                &message.message,
            ))
            .await;
    }

    tracing::info!(message_id = %message.id, "Contact message received");
    Ok((StatusCode::CREATED, Json(message)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let (status, body) = send(json_request(
            "POST",
            "/contact",
            None,
            json!({"name": "Bob", "email": "bob-at-example", "message": "Hello"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed: Invalid email format");
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (status, _) = send(json_request(
            "POST",
            "/contact",
            None,
            json!({"name": "Bob", "email": "bob@example.com", "message": ""}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn whitespace_only_fields_are_rejected() {
        for body in [
            json!({"name": "   ", "email": "bob@example.com", "message": "Hello"}),
            json!({"name": "Bob", "email": "bob@example.com", "message": " \n\t "}),
        ] {
            let (status, reply) = send(json_request("POST", "/contact", None, body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(reply["error"], "VALIDATION_ERROR");
        }
    }
}
