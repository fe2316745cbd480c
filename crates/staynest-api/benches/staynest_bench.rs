//! Criterion microbenchmarks for staynest-api hot paths.
//!
//! Run with:
//!   cargo bench -p staynest-api
//!
//! HTML reports are written to `target/criterion/`.

use chrono::{Duration, NaiveDate, Utc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use staynest_common::{
    config::AuthConfig,
    models::{
        listing::Listing,
        user::{User, UserRole},
    },
    stay::StayDates,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── Stay dates ────────────────────────────────────────────────────────────────

/// Overlap test of one request against a calendar of existing bookings.
fn bench_overlap_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("stay/overlap_scan");

    for size in [10usize, 100, 1000] {
        let start = date(2025, 1, 1);
        let calendar: Vec<StayDates> = (0..size as i64)
            .map(|i| StayDates::new(start + Duration::days(i * 4), start + Duration::days(i * 4 + 2)).unwrap())
            .collect();
        let request = StayDates::new(date(2030, 6, 1), date(2030, 6, 8)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &calendar, |b, cal| {
            b.iter(|| cal.iter().any(|booked| booked.overlaps(black_box(&request))))
        });
    }

    group.finish();
}

fn bench_pricing(c: &mut Criterion) {
    let stay = StayDates::new(date(2025, 7, 1), date(2025, 7, 15)).unwrap();
    c.bench_function("stay/total_price", |b| {
        b.iter(|| black_box(&stay).total_price(black_box(18_500)).unwrap())
    });
}

// ── JSON serialisation ────────────────────────────────────────────────────────

fn sample_listing() -> Listing {
    let now = Utc::now();
    Listing {
        id: Uuid::now_v7(),
        creator_id: Uuid::now_v7(),
        category: "Beachfront".into(),
        property_type: "An entire place".into(),
        street_address: "12 Ocean Drive".into(),
        apt_suite: String::new(),
        city: "Tulum".into(),
        province: "Quintana Roo".into(),
        country: "Mexico".into(),
        guest_count: 6,
        bedroom_count: 3,
        bed_count: 4,
        bathroom_count: 2,
        amenities: ["Wifi", "Kitchen", "Pool", "Air conditioning", "Beach access"]
            .map(String::from)
            .to_vec(),
        photo_paths: (0..8).map(|i| format!("/uploads/listings/{i}.jpg")).collect(),
        title: "Beach house with a private pool".into(),
        description: "Steps from the sand, with a shaded terrace and an outdoor kitchen.".into(),
        highlight: "Sunset views".into(),
        highlight_desc: "The terrace faces west over the water.".into(),
        price: 24_000,
        created_at: now,
        updated_at: now,
    }
}

fn bench_listing_serialise(c: &mut Criterion) {
    let listing = sample_listing();
    c.bench_function("listing/serialise", |b| {
        b.iter(|| serde_json::to_string(black_box(&listing)).unwrap())
    });
}

fn bench_listing_page_serialise(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing/page_serialise");

    for size in [10usize, 50, 100] {
        let page: Vec<Listing> = (0..size).map(|_| sample_listing()).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &page, |b, p| {
            b.iter(|| serde_json::to_vec(black_box(p)).unwrap())
        });
    }

    group.finish();
}

// ── Tokens ────────────────────────────────────────────────────────────────────

fn bench_token_pair(c: &mut Criterion) {
    let cfg = AuthConfig {
        jwt_secret: "bench-secret-key-32-bytes-padded!!".into(),
        access_token_ttl_secs: 900,
        refresh_token_ttl_secs: 2_592_000,
        password_reset_ttl_secs: 3600,
    };
    let now = Utc::now();
    let user = User {
        id: Uuid::now_v7(),
        first_name: "Bench".into(),
        last_name: "Mark".into(),
        email: "bench@example.com".into(),
        password_hash: String::new(),
        profile_image_path: None,
        role: UserRole::User,
        created_at: now,
        updated_at: now,
    };

    c.bench_function("auth/token_pair", |b| {
        b.iter(|| staynest_api::auth::generate_token_pair(black_box(&user), &cfg).unwrap())
    });

    let pair = staynest_api::auth::generate_token_pair(&user, &cfg).unwrap();
    c.bench_function("auth/decode_access", |b| {
        b.iter(|| {
            staynest_common::auth::decode_expecting(
                black_box(&pair.access_token),
                &cfg.jwt_secret,
                staynest_common::auth::ACCESS_TOKEN,
            )
            .unwrap()
        })
    });
}

fn bench_reset_token_hash(c: &mut Criterion) {
    let token = staynest_api::auth::generate_reset_token();
    c.bench_function("auth/reset_token_hash", |b| {
        b.iter(|| staynest_api::auth::hash_reset_token(black_box(&token)))
    });
}

// ── criterion entrypoints ─────────────────────────────────────────────────────

criterion_group!(stay, bench_overlap_scan, bench_pricing);

criterion_group!(serialisation, bench_listing_serialise, bench_listing_page_serialise);

criterion_group!(auth, bench_token_pair, bench_reset_token_hash);

criterion_main!(stay, serialisation, auth);
