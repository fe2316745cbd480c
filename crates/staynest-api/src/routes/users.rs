//! User routes: own profile, trips, reservations, properties and wishlist.

use axum::{
    extract::{Extension, Multipart, Path, State},
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use staynest_common::{
    config,
    error::{StayError, StayResult},
    models::{
        booking::BookingWithListing,
        listing::Listing,
        user::{UpdateUserRequest, UserResponse},
    },
    validation::validate_request,
};
use staynest_db::repository::{bookings, listings, users, wishlists};
use std::sync::Arc;
use uuid::Uuid;

use crate::{middleware::AuthContext, routes::auth::PROFILE_IMAGE_FIELD, uploads::MultipartForm, AppState};

/// User routes (all require authentication).
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me", get(get_current_user).patch(update_current_user))
        .route("/users/me/avatar", post(upload_avatar))
        .route("/users/{user_id}", axum::routing::delete(delete_user))
        .route("/users/{user_id}/trips", get(get_trips))
        .route("/users/{user_id}/reservations", get(get_reservations))
        .route("/users/{user_id}/properties", get(get_properties))
        .route("/users/{user_id}/wishlist", get(get_wishlist))
        .route("/users/{user_id}/wishlist/{listing_id}", patch(toggle_wishlist))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

#[derive(Serialize)]
struct WishlistToggleResponse {
    wishlist: Vec<Listing>,
    /// `true` when the listing was added, `false` when removed
    added: bool,
}

/// GET /users/me
async fn get_current_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> StayResult<Json<UserResponse>> {
    let user = users::find_by_id(&state.db.pool, auth.user_id)
        .await?
        .ok_or_else(|| StayError::not_found("User"))?;

    Ok(Json(user.into()))
}

/// PATCH /users/me
async fn update_current_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateUserRequest>,
) -> StayResult<Json<UserResponse>> {
    validate_request(&body)?;

    let user = users::update_profile(
        &state.db.pool,
        auth.user_id,
        body.first_name.as_deref().map(str::trim),
        body.last_name.as_deref().map(str::trim),
    )
    .await?;

    Ok(Json(user.into()))
}

/// POST /users/me/avatar (multipart `profileImage`)
async fn upload_avatar(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> StayResult<Json<UserResponse>> {
    let limits = &config::get().limits;
    let mut form = MultipartForm::read(multipart, &[PROFILE_IMAGE_FIELD], limits.max_upload_bytes).await?;
    let image = form
        .take_files(PROFILE_IMAGE_FIELD)
        .into_iter()
        .next()
        .ok_or_else(|| StayError::validation("No profileImage in request"))?;

    let previous = users::find_by_id(&state.db.pool, auth.user_id)
        .await?
        .ok_or_else(|| StayError::not_found("User"))?
        .profile_image_path;

    let path = state.storage.put("profiles", image.data, &image.content_type).await?;
    let user = users::update_profile_image(&state.db.pool, auth.user_id, &path).await?;

    if let Some(old) = previous {
        if let Err(e) = state.storage.delete(&old).await {
            tracing::warn!(user_id = %auth.user_id, "Failed to delete old avatar: {e:#}");
        }
    }

    tracing::info!(user_id = %auth.user_id, "Avatar updated");
    Ok(Json(user.into()))
}

/// GET /users/{user_id}/trips: bookings the user made as a guest.
async fn get_trips(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> StayResult<Json<Vec<BookingWithListing>>> {
    auth.ensure_self_or_admin(user_id)?;
    Ok(Json(bookings::list_trips(&state.db.pool, user_id).await?))
}

/// GET /users/{user_id}/reservations: bookings on the user's listings.
async fn get_reservations(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> StayResult<Json<Vec<BookingWithListing>>> {
    auth.ensure_self_or_admin(user_id)?;
    Ok(Json(bookings::list_reservations(&state.db.pool, user_id).await?))
}

/// GET /users/{user_id}/properties: listings the user hosts.
async fn get_properties(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> StayResult<Json<Vec<Listing>>> {
    Ok(Json(listings::list_by_creator(&state.db.pool, user_id).await?))
}

/// GET /users/{user_id}/wishlist
async fn get_wishlist(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> StayResult<Json<Vec<Listing>>> {
    auth.ensure_self_or_admin(user_id)?;
    Ok(Json(wishlists::list_for_user(&state.db.pool, user_id).await?))
}

/// PATCH /users/{user_id}/wishlist/{listing_id}: add or remove a listing.
async fn toggle_wishlist(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path((user_id, listing_id)): Path<(Uuid, Uuid)>,
) -> StayResult<Json<WishlistToggleResponse>> {
    if auth.user_id != user_id {
        return Err(StayError::Forbidden);
    }

    if listings::find_by_id(&state.db.pool, listing_id).await?.is_none() {
        return Err(StayError::not_found("Listing"));
    }

    let added = wishlists::toggle(&state.db.pool, user_id, listing_id).await?;
    let wishlist = wishlists::list_for_user(&state.db.pool, user_id).await?;

    tracing::debug!(user_id = %user_id, listing_id = %listing_id, added, "Wishlist toggled");
    Ok(Json(WishlistToggleResponse { wishlist, added }))
}

/// DELETE /users/{user_id}
///
/// Listings, bookings, wishlist entries and reset tokens go with the account.
async fn delete_user(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> StayResult<axum::http::StatusCode> {
    auth.ensure_self_or_admin(user_id)?;
    remove_account(&state, user_id).await?;
    tracing::info!(user_id = %user_id, deleted_by = %auth.user_id, "User deleted");
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Delete an account and, best effort, the media it owned.
pub(crate) async fn remove_account(state: &AppState, user_id: Uuid) -> StayResult<()> {
    let user = users::find_by_id(&state.db.pool, user_id)
        .await?
        .ok_or_else(|| StayError::not_found("User"))?;
    let hosted = listings::list_by_creator(&state.db.pool, user_id).await?;

    if !users::delete_user(&state.db.pool, user_id).await? {
        return Err(StayError::not_found("User"));
    }

    let media = user
        .profile_image_path
        .into_iter()
        .chain(hosted.into_iter().flat_map(|l| l.photo_paths));
    for path in media {
        if let Err(e) = state.storage.delete(&path).await {
            tracing::warn!(user_id = %user_id, path = %path, "Failed to delete media: {e:#}");
        }
    }

    Ok(())
}
