//! # staynest-api
//!
//! REST API layer for StayNest: accounts, listings, bookings, wishlists,
//! contact messages, payments and the back office.

pub mod auth;
pub mod mailer;
pub mod middleware;
pub mod payments;
pub mod routes;
pub mod uploads;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use mailer::Mailer;
use payments::StripeClient;
use staynest_db::{
    storage::{MediaStore, LOCAL_MOUNT},
    Database,
};
use std::{sync::Arc, time::Instant};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Listing photos and profile pictures.
    pub storage: MediaStore,
    pub mailer: Mailer,
    /// `None` when no Stripe key is configured.
    pub stripe: Option<StripeClient>,
    pub started_at: Instant,
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let config = staynest_common::config::get();

    let mut router = Router::new()
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::properties::router())
        .merge(routes::bookings::router())
        .merge(routes::contact::router())
        .merge(routes::stripe::router())
        .merge(routes::admin::router())
        .merge(routes::health::router());

    if let Some(root) = state.storage.local_root() {
        router = router.nest_service(LOCAL_MOUNT, ServeDir::new(root));
    }

    // a listing form carries up to max_listing_photos images plus its text fields
    let body_limit = config
        .limits
        .max_upload_bytes
        .saturating_mul(config.limits.max_listing_photos + 1);

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(cors_layer(&config.server.client_url))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(Arc::new(state))
}

fn cors_layer(client_url: &str) -> CorsLayer {
    let origin = match client_url.trim_end_matches('/') {
        "*" => AllowOrigin::any(),
        url => match url.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(client_url = %url, "Unusable client_url for CORS; allowing any origin");
                AllowOrigin::any()
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use staynest_common::{
        config,
        models::user::{User, UserRole},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    pub const JWT_SECRET: &str = "router-test-secret";

    /// A router over a pool that never connects, for requests rejected
    /// before any query runs.
    pub fn router() -> Router {
        let cfg = test_config();

        build_router(AppState {
            db: Database::connect_lazy(&cfg.database.url).unwrap(),
            storage: MediaStore::from_config(&cfg.storage),
            mailer: Mailer::log_only("StayNest <no-reply@staynest.local>".parse().unwrap()),
            stripe: None,
            started_at: Instant::now(),
        })
    }

    /// Install the shared test configuration (first caller wins).
    fn test_config() -> &'static config::AppConfig {
        config::init_from(
            config::from_overrides(&[
                ("database.url", "postgres://staynest@127.0.0.1:1/staynest"),
                ("auth.jwt_secret", JWT_SECRET),
                ("storage.data_dir", "./target/test-uploads"),
            ])
            .unwrap(),
        )
    }

    pub fn bearer(role: UserRole) -> String {
        bearer_for(Uuid::now_v7(), role)
    }

    pub fn bearer_for(user_id: Uuid, role: UserRole) -> String {
        let now = Utc::now();
        let user = User {
            id: user_id,
            first_name: "Test".into(),
            last_name: "Caller".into(),
            email: "caller@example.com".into(),
            password_hash: String::new(),
            profile_image_path: None,
            role,
            created_at: now,
            updated_at: now,
        };
        let pair = crate::auth::generate_token_pair(&user, &test_config().auth).unwrap();
        format!("Bearer {}", pair.access_token)
    }

    /// Send one request and return the status with the parsed JSON body
    /// (`Null` when the body is not JSON).
    pub async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    pub fn json_request(method: &str, uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    pub fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(Body::empty()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (status, _) = send(empty_request("GET", "/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        use tower::ServiceExt;
        let response = router()
            .oneshot(empty_request("GET", "/users/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }

    #[test]
    fn wildcard_client_url_allows_any_origin() {
        // construction must not panic for either form
        let _ = super::cors_layer("*");
        let _ = super::cors_layer("http://localhost:3000/");
    }
}
