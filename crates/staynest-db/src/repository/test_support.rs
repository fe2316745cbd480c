//! Fixtures for repository tests that need a live PostgreSQL.
//!
//! Tests connect to `DATABASE_URL` and run the migrations. Without it they
//! log a notice and return early. Every fixture row gets fresh IDs, so tests
//! can share one database and run in parallel.

use sqlx::PgPool;
use staynest_common::{
    ids::generate_id,
    models::{listing::CreateListingRequest, user::User},
};
use uuid::Uuid;

use super::{listings, users};

/// Connect and migrate, or `None` when no test database is configured.
pub async fn pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };
    let pool = PgPool::connect(&url).await.expect("connect to DATABASE_URL");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

pub async fn user(pool: &PgPool, first_name: &str) -> User {
    let id = generate_id();
    let email = format!("{}-{id}@example.com", first_name.to_lowercase());
    users::create_user(pool, id, first_name, "Tester", &email, "$argon2id$placeholder", None)
        .await
        .expect("insert user")
}

/// A listing hosted by `host_id` at 10 000 minor units a night.
pub async fn listing(pool: &PgPool, host_id: Uuid) -> Uuid {
    let form = CreateListingRequest {
        category: "Cabins".into(),
        property_type: "An entire place".into(),
        street_address: "1 Pine Rd".into(),
        city: "Banff".into(),
        province: "AB".into(),
        country: "Canada".into(),
        guest_count: 2,
        bedroom_count: 1,
        bed_count: 1,
        bathroom_count: 1,
        title: "Lakeside cabin".into(),
        description: "Quiet spot by the lake".into(),
        price: 10_000,
        ..Default::default()
    };
    listings::create_listing(pool, generate_id(), host_id, &form, &["listings/cabin.jpg".to_string()])
        .await
        .expect("insert listing")
        .id
}
