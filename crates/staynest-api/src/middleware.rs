//! Middleware: bearer authentication, the admin gate, security headers.

use axum::{extract::Request, middleware::Next, response::Response};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use staynest_common::{
    auth::{decode_expecting, ACCESS_TOKEN},
    error::StayError,
    models::user::UserRole,
};
use uuid::Uuid;

/// Authentication context extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Allow the caller when they are `user_id` or an admin.
    pub fn ensure_self_or_admin(&self, user_id: Uuid) -> Result<(), StayError> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(StayError::Forbidden)
        }
    }
}

/// Extract and validate the JWT from the `Authorization: Bearer <token>` header.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, StayError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(StayError::Unauthorized)?;

    let config = staynest_common::config::get();
    let claims = decode_expecting(bearer.token(), &config.auth.jwt_secret, ACCESS_TOKEN)?;

    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| StayError::InvalidToken)?;

    request.extensions_mut().insert(AuthContext {
        user_id,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Reject callers whose token does not carry the admin role.
///
/// Must run after [`auth_middleware`].
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, StayError> {
    let ctx = request
        .extensions()
        .get::<AuthContext>()
        .ok_or(StayError::Unauthorized)?;

    if !ctx.is_admin() {
        tracing::warn!(user_id = %ctx.user_id, path = %request.uri().path(), "Non-admin hit admin route");
        return Err(StayError::Forbidden);
    }

    Ok(next.run(request).await)
}

// ── Security headers ──────────────────────────────────────────────────────────

/// Add security headers to every HTTP response.
///
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Strict-Transport-Security`: HSTS (max-age 2 years)
/// - `Content-Security-Policy`: the API only returns JSON and media
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let h = response.headers_mut();

    macro_rules! set {
        ($name:expr, $val:expr) => {
            if let Ok(v) = $val.parse::<axum::http::HeaderValue>() {
                h.insert($name, v);
            }
        };
    }

    set!(
        axum::http::header::HeaderName::from_static("x-content-type-options"),
        "nosniff"
    );
    set!(
        axum::http::header::HeaderName::from_static("x-frame-options"),
        "DENY"
    );
    set!(
        axum::http::header::HeaderName::from_static("referrer-policy"),
        "strict-origin-when-cross-origin"
    );
    set!(
        axum::http::header::HeaderName::from_static("strict-transport-security"),
        "max-age=63072000; includeSubDomains"
    );
    set!(
        axum::http::header::HeaderName::from_static("content-security-policy"),
        "default-src 'none'; img-src 'self'; frame-ancestors 'none'"
    );

    response
}
