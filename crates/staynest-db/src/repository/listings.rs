//! Listing repository: property CRUD, browse and search.

use staynest_common::models::{
    listing::{CreateListingRequest, Listing, UpdateListingRequest},
    user::HostSummary,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a listing owned by `creator_id`.
pub async fn create_listing(
    pool: &PgPool,
    id: Uuid,
    creator_id: Uuid,
    form: &CreateListingRequest,
    photo_paths: &[String],
) -> Result<Listing, sqlx::Error> {
    sqlx::query_as::<_, Listing>(
        r#"
        INSERT INTO listings (
            id, creator_id, category, property_type, street_address, apt_suite,
            city, province, country, guest_count, bedroom_count, bed_count,
            bathroom_count, amenities, photo_paths, title, description,
            highlight, highlight_desc, price, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(creator_id)
    .bind(&form.category)
    .bind(&form.property_type)
    .bind(&form.street_address)
    .bind(&form.apt_suite)
    .bind(&form.city)
    .bind(&form.province)
    .bind(&form.country)
    .bind(form.guest_count)
    .bind(form.bedroom_count)
    .bind(form.bed_count)
    .bind(form.bathroom_count)
    .bind(&form.amenities)
    .bind(photo_paths.to_vec())
    .bind(&form.title)
    .bind(&form.description)
    .bind(&form.highlight)
    .bind(&form.highlight_desc)
    .bind(form.price)
    .fetch_one(pool)
    .await
}

/// Find a listing by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Public summary of a listing's host.
pub async fn find_host(pool: &PgPool, user_id: Uuid) -> Result<Option<HostSummary>, sqlx::Error> {
    sqlx::query_as::<_, HostSummary>(
        "SELECT id, first_name, last_name, profile_image_path FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Browse listings newest first, optionally restricted to one category.
pub async fn list_listings(
    pool: &PgPool,
    category: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>(
        r#"
        SELECT * FROM listings
        WHERE ($1::TEXT IS NULL OR category = $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(category)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring search over the descriptive and location fields.
pub async fn search_listings(
    pool: &PgPool,
    query: &str,
    limit: i64,
) -> Result<Vec<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>(
        r#"
        SELECT * FROM listings
        WHERE title ILIKE $1 ESCAPE '\'
           OR category ILIKE $1 ESCAPE '\'
           OR property_type ILIKE $1 ESCAPE '\'
           OR city ILIKE $1 ESCAPE '\'
           OR province ILIKE $1 ESCAPE '\'
           OR country ILIKE $1 ESCAPE '\'
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(like_pattern(query))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Listings created by a host (their property list).
pub async fn list_by_creator(pool: &PgPool, creator_id: Uuid) -> Result<Vec<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>(
        "SELECT * FROM listings WHERE creator_id = $1 ORDER BY created_at DESC",
    )
    .bind(creator_id)
    .fetch_all(pool)
    .await
}

/// Apply a partial update. Absent fields keep their current value.
pub async fn update_listing(
    pool: &PgPool,
    id: Uuid,
    patch: &UpdateListingRequest,
) -> Result<Listing, sqlx::Error> {
    sqlx::query_as::<_, Listing>(
        r#"
        UPDATE listings SET
            category = COALESCE($2, category),
            property_type = COALESCE($3, property_type),
            guest_count = COALESCE($4, guest_count),
            bedroom_count = COALESCE($5, bedroom_count),
            bed_count = COALESCE($6, bed_count),
            bathroom_count = COALESCE($7, bathroom_count),
            amenities = COALESCE($8, amenities),
            title = COALESCE($9, title),
            description = COALESCE($10, description),
            highlight = COALESCE($11, highlight),
            highlight_desc = COALESCE($12, highlight_desc),
            price = COALESCE($13, price),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patch.category.as_deref())
    .bind(patch.property_type.as_deref())
    .bind(patch.guest_count)
    .bind(patch.bedroom_count)
    .bind(patch.bed_count)
    .bind(patch.bathroom_count)
    .bind(&patch.amenities)
    .bind(patch.title.as_deref())
    .bind(patch.description.as_deref())
    .bind(patch.highlight.as_deref())
    .bind(patch.highlight_desc.as_deref())
    .bind(patch.price)
    .fetch_one(pool)
    .await
}

/// Delete a listing; its bookings and wishlist rows cascade.
pub async fn delete_listing(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM listings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Wrap a user query as an `ILIKE` pattern, escaping its wildcards.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
