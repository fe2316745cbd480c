//! Wishlist repository: per-user saved listings.

use staynest_common::models::listing::Listing;
use sqlx::PgPool;
use uuid::Uuid;

/// Add the listing to the user's wishlist if absent, remove it if present.
///
/// Returns `true` when the listing ended up on the wishlist.
pub async fn toggle(pool: &PgPool, user_id: Uuid, listing_id: Uuid) -> Result<bool, sqlx::Error> {
    let removed = sqlx::query("DELETE FROM wishlists WHERE user_id = $1 AND listing_id = $2")
        .bind(user_id)
        .bind(listing_id)
        .execute(pool)
        .await?;
    if removed.rows_affected() > 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"
        INSERT INTO wishlists (user_id, listing_id, created_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id, listing_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(listing_id)
    .execute(pool)
    .await?;
    Ok(true)
}

/// The user's wishlisted listings, most recently saved first.
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>(
        r#"
        SELECT l.* FROM listings l
        INNER JOIN wishlists w ON w.listing_id = l.id
        WHERE w.user_id = $1
        ORDER BY w.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
