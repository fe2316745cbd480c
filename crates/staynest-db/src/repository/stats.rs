//! Aggregate counters for the admin dashboard.

use staynest_common::models::admin::PlatformStats;
use sqlx::PgPool;

pub async fn platform_stats(pool: &PgPool) -> Result<PlatformStats, sqlx::Error> {
    sqlx::query_as::<_, PlatformStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS users,
            (SELECT COUNT(*) FROM listings) AS listings,
            (SELECT COUNT(*) FROM bookings) AS bookings,
            (SELECT COUNT(*) FROM contact_messages) AS messages,
            (SELECT COALESCE(SUM(total_price), 0)::BIGINT FROM bookings) AS revenue
        "#,
    )
    .fetch_one(pool)
    .await
}
