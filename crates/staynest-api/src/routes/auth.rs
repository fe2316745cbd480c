//! Authentication routes: register, login, refresh, password reset.
//!
//! POST /auth/register         : multipart form with optional profile picture
//! POST /auth/login            : email + password
//! POST /auth/refresh          : trade a refresh token for a new pair
//! POST /auth/forgot-password  : email a reset link
//! POST /auth/reset-password   : set a new password with a reset token

use axum::{extract::{Multipart, State}, routing::post, Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use staynest_common::{
    auth::{decode_expecting, REFRESH_TOKEN},
    config,
    error::{StayError, StayResult},
    ids::generate_id,
    models::user::{
        ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, UserResponse,
    },
    validation::validate_request,
};
use staynest_db::{
    postgres::is_unique_violation,
    repository::{password_resets, users},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::{self, TokenPair},
    mailer::password_reset_email,
    uploads::MultipartForm,
    AppState,
};

/// Multipart part holding the profile picture.
pub(crate) const PROFILE_IMAGE_FIELD: &str = "profileImage";

/// Auth router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

#[derive(Serialize)]
struct AuthResponse {
    user: UserResponse,
    #[serde(flatten)]
    tokens: TokenPair,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

fn issue_tokens(user: &staynest_common::models::user::User) -> StayResult<TokenPair> {
    auth::generate_token_pair(user, &config::get().auth).map_err(|e| StayError::Internal(e.into()))
}

/// POST /auth/register
///
/// Create an account from the sign-up form. Returns the profile plus JWT tokens.
async fn register(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> StayResult<Json<AuthResponse>> {
    let limits = &config::get().limits;
    let mut form = MultipartForm::read(multipart, &[PROFILE_IMAGE_FIELD], limits.max_upload_bytes).await?;

    let body = RegisterRequest {
        first_name: form.string("firstName"),
        last_name: form.string("lastName"),
        email: form.string("email").to_lowercase(),
        // passwords are taken verbatim
        password: form.text("password").unwrap_or_default().to_string(),
    };
    validate_request(&body)?;

    if users::find_by_email(&state.db.pool, &body.email).await?.is_some() {
        return Err(StayError::AlreadyExists {
            resource: "Email".into(),
        });
    }

    let password_hash =
        auth::hash_password(&body.password).map_err(|e| StayError::Internal(anyhow::anyhow!("{e}")))?;

    let profile_image_path = match form.take_files(PROFILE_IMAGE_FIELD).into_iter().next() {
        Some(image) => Some(
            state
                .storage
                .put("profiles", image.data, &image.content_type)
                .await?,
        ),
        None => None,
    };

    let user = match users::create_user(
        &state.db.pool,
        generate_id(),
        &body.first_name,
        &body.last_name,
        &body.email,
        &password_hash,
        profile_image_path.as_deref(),
    )
    .await
    {
        Ok(user) => user,
        Err(e) => {
            if let Some(path) = &profile_image_path {
                let _ = state.storage.delete(path).await;
            }
            // lost a race with a concurrent sign-up
            if is_unique_violation(&e) {
                return Err(StayError::AlreadyExists {
                    resource: "Email".into(),
                });
            }
            return Err(e.into());
        }
    };

    let tokens = issue_tokens(&user)?;
    tracing::info!(user_id = %user.id, "New user registered");

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens,
    }))
}

/// POST /auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> StayResult<Json<AuthResponse>> {
    validate_request(&body)?;

    let user = users::find_by_email(&state.db.pool, &body.email)
        .await?
        .ok_or(StayError::InvalidCredentials)?;

    let valid =
        auth::verify_password(&body.password, &user.password_hash).map_err(|_| StayError::InvalidCredentials)?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(StayError::InvalidCredentials);
    }

    let tokens = issue_tokens(&user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens,
    }))
}

/// POST /auth/refresh
///
/// Role changes take effect here: the new pair carries the current role.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> StayResult<Json<TokenPair>> {
    let claims = decode_expecting(&body.refresh_token, &config::get().auth.jwt_secret, REFRESH_TOKEN)?;
    let user_id: Uuid = claims.sub.parse().map_err(|_| StayError::InvalidToken)?;

    // deleted accounts can't refresh
    let user = users::find_by_id(&state.db.pool, user_id)
        .await?
        .ok_or(StayError::InvalidToken)?;

    Ok(Json(issue_tokens(&user)?))
}

/// POST /auth/forgot-password
///
/// Always answers the same way so the endpoint can't be used to probe for accounts.
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> StayResult<Json<MessageResponse>> {
    validate_request(&body)?;
    let cfg = config::get();

    if let Some(user) = users::find_by_email(&state.db.pool, &body.email).await? {
        let token = auth::generate_reset_token();
        let ttl = cfg.auth.password_reset_ttl_secs;
        let expires_at = Utc::now() + Duration::seconds(ttl as i64);

        password_resets::issue(
            &state.db.pool,
            generate_id(),
            user.id,
            &auth::hash_reset_token(&token),
            expires_at,
        )
        .await?;

        let link = format!(
            "{}/reset-password/{token}",
            cfg.server.client_url.trim_end_matches('/')
        );
        state
            .mailer
            .send_best_effort(password_reset_email(&user.email, &user.first_name, &link, ttl / 60))
            .await;

        tracing::info!(user_id = %user.id, "Password reset issued");
    }

    Ok(Json(MessageResponse {
        message: "If an account exists for that email, a reset link has been sent".into(),
    }))
}

/// POST /auth/reset-password
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordRequest>,
) -> StayResult<Json<MessageResponse>> {
    validate_request(&body)?;

    let reset = password_resets::find_by_hash(&state.db.pool, &auth::hash_reset_token(body.token.trim()))
        .await?
        .filter(|r| !r.is_expired_at(Utc::now()))
        .ok_or_else(|| StayError::validation("Reset link is invalid or has expired"))?;

    let password_hash =
        auth::hash_password(&body.password).map_err(|e| StayError::Internal(anyhow::anyhow!("{e}")))?;
    password_resets::complete(&state.db.pool, reset.user_id, &password_hash).await?;

    tracing::info!(user_id = %reset.user_id, "Password reset completed");

    Ok(Json(MessageResponse {
        message: "Password has been reset".into(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn login_validates_before_lookup() {
        let (status, body) = send(json_request(
            "POST",
            "/auth/login",
            None,
            json!({"email": "not-an-email", "password": "whatever"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn refresh_rejects_access_tokens() {
        let access = bearer(staynest_common::models::user::UserRole::User);
        let token = access.trim_start_matches("Bearer ");
        let (status, body) = send(json_request(
            "POST",
            "/auth/refresh",
            None,
            json!({"refresh_token": token}),
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn reset_requires_strong_password() {
        let (status, _) = send(json_request(
            "POST",
            "/auth/reset-password",
            None,
            json!({"token": "abc", "password": "short"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
