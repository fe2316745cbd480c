//! Back office. Every route requires an access token carrying the admin role.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, patch},
    Json, Router,
};
use staynest_common::{
    config,
    error::{StayError, StayResult},
    models::{
        admin::{PageQuery, PlatformStats},
        booking::Booking,
        contact::ContactMessage,
        listing::Listing,
        user::{UpdateRoleRequest, UserResponse, UserRole},
    },
};
use staynest_db::repository::{bookings, contact, listings, stats, users};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::AuthContext,
    routes::{properties::remove_listing, users::remove_account},
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/stats", get(get_stats))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", delete(delete_user))
        .route("/admin/users/{id}/role", patch(update_role))
        .route("/admin/properties", get(list_properties))
        .route("/admin/properties/{id}", delete(delete_property))
        .route("/admin/bookings", get(list_bookings))
        .route("/admin/bookings/{id}", delete(delete_booking))
        .route("/admin/messages", get(list_messages))
        .route("/admin/messages/{id}", delete(delete_message))
        // layers run outermost-last: authenticate, then check the role
        .route_layer(middleware::from_fn(crate::middleware::admin_middleware))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

fn page(query: &PageQuery) -> (i64, i64) {
    query.resolve(config::get().limits.max_page_size)
}

/// GET /admin/stats
async fn get_stats(State(state): State<Arc<AppState>>) -> StayResult<Json<PlatformStats>> {
    Ok(Json(stats::platform_stats(&state.db.pool).await?))
}

/// GET /admin/users
async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> StayResult<Json<Vec<UserResponse>>> {
    let (limit, offset) = page(&query);
    let rows = users::list_users(&state.db.pool, limit, offset).await?;
    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

/// PATCH /admin/users/{id}/role
async fn update_role(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateRoleRequest>,
) -> StayResult<Json<UserResponse>> {
    if user_id == auth.user_id && body.role != UserRole::Admin {
        return Err(StayError::validation("You cannot remove your own admin role"));
    }

    let user = users::set_role(&state.db.pool, user_id, body.role)
        .await?
        .ok_or_else(|| StayError::not_found("User"))?;

    tracing::info!(user_id = %user_id, role = body.role.as_str(), changed_by = %auth.user_id, "Role changed");
    Ok(Json(user.into()))
}

/// DELETE /admin/users/{id}
async fn delete_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> StayResult<StatusCode> {
    if user_id == auth.user_id {
        return Err(StayError::validation("You cannot delete your own account from the admin area"));
    }

    remove_account(&state, user_id).await?;
    tracing::info!(user_id = %user_id, deleted_by = %auth.user_id, "User deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/properties
async fn list_properties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> StayResult<Json<Vec<Listing>>> {
    let (limit, offset) = page(&query);
    Ok(Json(listings::list_listings(&state.db.pool, None, limit, offset).await?))
}

/// DELETE /admin/properties/{id}
async fn delete_property(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> StayResult<StatusCode> {
    let listing = listings::find_by_id(&state.db.pool, listing_id)
        .await?
        .ok_or_else(|| StayError::not_found("Listing"))?;

    remove_listing(&state, listing).await?;
    tracing::info!(listing_id = %listing_id, deleted_by = %auth.user_id, "Listing deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/bookings
async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> StayResult<Json<Vec<Booking>>> {
    let (limit, offset) = page(&query);
    Ok(Json(bookings::list_bookings(&state.db.pool, limit, offset).await?))
}

/// DELETE /admin/bookings/{id}
async fn delete_booking(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> StayResult<StatusCode> {
    if !bookings::delete_booking(&state.db.pool, booking_id).await? {
        return Err(StayError::not_found("Booking"));
    }
    tracing::info!(booking_id = %booking_id, deleted_by = %auth.user_id, "Booking deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/messages
async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> StayResult<Json<Vec<ContactMessage>>> {
    let (limit, offset) = page(&query);
    Ok(Json(contact::list_messages(&state.db.pool, limit, offset).await?))
}

/// DELETE /admin/messages/{id}
async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
) -> StayResult<StatusCode> {
    if !contact::delete_message(&state.db.pool, message_id).await? {
        return Err(StayError::not_found("Message"));
    }
    Ok(StatusCode::NO_CONTENT)
}
