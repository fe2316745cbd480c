//! Listing routes.
//!
//! POST   /properties/create         : create a listing (multipart, auth)
//! GET    /properties                : browse, optionally by category
//! GET    /properties/search/{query} : free-text search ("all" lists everything)
//! GET    /properties/{id}           : listing details with its host
//! PATCH  /properties/{id}           : edit (owner or admin)
//! DELETE /properties/{id}           : remove (owner or admin)

use axum::{
    extract::{Extension, Multipart, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use staynest_common::{
    config,
    error::{StayError, StayResult},
    ids::generate_id,
    models::{
        admin::PageQuery,
        listing::{CreateListingRequest, Listing, ListingDetails, ListingQuery, UpdateListingRequest},
    },
    validation::{page_limit, validate_request},
};
use staynest_db::repository::listings;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::AuthContext,
    uploads::{MultipartForm, UploadedImage},
    AppState,
};

const PHOTOS_FIELD: &str = "listingPhotos";

pub fn router() -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/properties", get(list_properties))
        .route("/properties/search/{query}", get(search_properties))
        .route("/properties/{id}", get(get_property));

    let protected = Router::new()
        .route("/properties/create", post(create_property))
        .route(
            "/properties/{id}",
            axum::routing::patch(update_property).delete(delete_property),
        )
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware));

    public.merge(protected)
}

/// Read the listing form out of its multipart fields.
fn listing_form(form: &MultipartForm) -> StayResult<CreateListingRequest> {
    Ok(CreateListingRequest {
        category: form.string("category"),
        property_type: form.string("type"),
        street_address: form.string("streetAddress"),
        apt_suite: form.string("aptSuite"),
        city: form.string("city"),
        province: form.string("province"),
        country: form.string("country"),
        guest_count: form.number("guestCount")?,
        bedroom_count: form.number("bedroomCount")?,
        bed_count: form.number("bedCount")?,
        bathroom_count: form.number("bathroomCount")?,
        amenities: form.list("amenities"),
        title: form.string("title"),
        description: form.string("description"),
        highlight: form.string("highlight"),
        highlight_desc: form.string("highlightDesc"),
        price: form.number("price")?,
    })
}

fn check_photo_count(photos: &[UploadedImage], max: usize) -> StayResult<()> {
    if photos.is_empty() {
        return Err(StayError::validation("At least one listing photo is required"));
    }
    if photos.len() > max {
        return Err(StayError::validation(format!(
            "Too many photos: {} (max {max})",
            photos.len()
        )));
    }
    Ok(())
}

/// POST /properties/create
async fn create_property(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> StayResult<(StatusCode, Json<Listing>)> {
    let limits = &config::get().limits;
    let mut form = MultipartForm::read(multipart, &[PHOTOS_FIELD], limits.max_upload_bytes).await?;

    let body = listing_form(&form)?;
    validate_request(&body)?;

    let photos = form.take_files(PHOTOS_FIELD);
    check_photo_count(&photos, limits.max_listing_photos)?;

    let mut photo_paths = Vec::with_capacity(photos.len());
    for photo in photos {
        match state.storage.put("listings", photo.data, &photo.content_type).await {
            Ok(path) => photo_paths.push(path),
            Err(e) => {
                discard_media(&state, &photo_paths).await;
                return Err(e.into());
            }
        }
    }

    let listing = match listings::create_listing(&state.db.pool, generate_id(), auth.user_id, &body, &photo_paths).await {
        Ok(listing) => listing,
        Err(e) => {
            discard_media(&state, &photo_paths).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        listing_id = %listing.id,
        creator_id = %auth.user_id,
        photos = listing.photo_paths.len(),
        "Listing created"
    );
    Ok((StatusCode::CREATED, Json(listing)))
}

/// GET /properties?category=&limit=&offset=
async fn list_properties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> StayResult<Json<Vec<Listing>>> {
    let max = config::get().limits.max_page_size;
    let limit = page_limit(query.limit, PageQuery::DEFAULT_LIMIT, max);
    let offset = query.offset.unwrap_or(0).max(0);

    let rows = listings::list_listings(&state.db.pool, query.category_filter(), limit, offset).await?;
    Ok(Json(rows))
}

/// GET /properties/search/{query}
async fn search_properties(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
) -> StayResult<Json<Vec<Listing>>> {
    let max = config::get().limits.max_page_size;
    let query = query.trim();

    let rows = if query.is_empty() || query.eq_ignore_ascii_case("all") {
        listings::list_listings(&state.db.pool, None, max, 0).await?
    } else {
        listings::search_listings(&state.db.pool, query, max).await?
    };

    tracing::debug!(query = %query, hits = rows.len(), "Listing search");
    Ok(Json(rows))
}

/// GET /properties/{id}
async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> StayResult<Json<ListingDetails>> {
    let listing = listings::find_by_id(&state.db.pool, listing_id)
        .await?
        .ok_or_else(|| StayError::not_found("Listing"))?;
    let creator = listings::find_host(&state.db.pool, listing.creator_id)
        .await?
        .ok_or_else(|| StayError::not_found("Host"))?;

    Ok(Json(ListingDetails { listing, creator }))
}

/// PATCH /properties/{id}
async fn update_property(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
    Json(body): Json<UpdateListingRequest>,
) -> StayResult<Json<Listing>> {
    validate_request(&body)?;

    let listing = listings::find_by_id(&state.db.pool, listing_id)
        .await?
        .ok_or_else(|| StayError::not_found("Listing"))?;
    auth.ensure_self_or_admin(listing.creator_id)?;

    let updated = listings::update_listing(&state.db.pool, listing_id, &body).await?;
    tracing::info!(listing_id = %listing_id, user_id = %auth.user_id, "Listing updated");
    Ok(Json(updated))
}

/// DELETE /properties/{id}
async fn delete_property(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> StayResult<StatusCode> {
    let listing = listings::find_by_id(&state.db.pool, listing_id)
        .await?
        .ok_or_else(|| StayError::not_found("Listing"))?;
    auth.ensure_self_or_admin(listing.creator_id)?;

    remove_listing(&state, listing).await?;
    tracing::info!(listing_id = %listing_id, user_id = %auth.user_id, "Listing deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a listing (its bookings and wishlist entries cascade) and its photos.
pub(crate) async fn remove_listing(state: &AppState, listing: Listing) -> StayResult<()> {
    if !listings::delete_listing(&state.db.pool, listing.id).await? {
        return Err(StayError::not_found("Listing"));
    }
    discard_media(state, &listing.photo_paths).await;
    Ok(())
}

async fn discard_media(state: &AppState, paths: &[String]) {
    for path in paths {
        if let Err(e) = state.storage.delete(path).await {
            tracing::warn!(path = %path, "Failed to delete media: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use serde_json::json;
    use staynest_common::models::user::UserRole;

    fn image() -> UploadedImage {
        UploadedImage {
            content_type: "image/png".into(),
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn photo_count_bounds() {
        assert!(check_photo_count(&[], 3).is_err());
        assert!(check_photo_count(&[image()], 3).is_ok());
        assert!(check_photo_count(&vec![image(); 4], 3).is_err());
    }

    #[test]
    fn form_requires_numeric_counts() {
        assert!(matches!(
            listing_form(&MultipartForm::default()),
            Err(StayError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn create_requires_token() {
        let (status, _) = send(empty_request("POST", "/properties/create", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn edit_requires_token() {
        let uri = format!("/properties/{}", Uuid::now_v7());
        let (status, _) = send(json_request("PATCH", &uri, None, json!({"title": "New"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn edit_body_is_validated_before_lookup() {
        let token = bearer(UserRole::User);
        let uri = format!("/properties/{}", Uuid::now_v7());
        let (status, body) = send(json_request("PATCH", &uri, Some(&token), json!({"price": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let token = bearer(UserRole::User);
        let uri = format!("/properties/{}", Uuid::now_v7());
        let (status, body) = send(json_request("PATCH", &uri, Some(&token), json!({"title": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed: Title cannot be blank");
    }

    #[tokio::test]
    async fn malformed_listing_id_is_rejected() {
        let (status, _) = send(empty_request("GET", "/properties/not-a-uuid", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
