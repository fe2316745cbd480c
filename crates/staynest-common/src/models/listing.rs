//! Listing model: a rentable property.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::user::HostSummary;
use crate::validation::non_blank;

/// A property offered for short stays.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,

    /// Host who created the listing
    pub creator_id: Uuid,

    /// Browse category (e.g. "Beachfront", "Cabins")
    pub category: String,

    /// Kind of place ("An entire place", "Room(s)", "A shared room")
    #[serde(rename = "type")]
    pub property_type: String,

    pub street_address: String,
    pub apt_suite: String,
    pub city: String,
    pub province: String,
    pub country: String,

    pub guest_count: i32,
    pub bedroom_count: i32,
    pub bed_count: i32,
    pub bathroom_count: i32,

    pub amenities: Vec<String>,

    /// Public URLs of uploaded photos, cover first
    pub photo_paths: Vec<String>,

    pub title: String,
    pub description: String,
    pub highlight: String,
    pub highlight_desc: String,

    /// Nightly rate in minor currency units
    pub price: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing form. Arrives as multipart together with the `listingPhotos` files.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    #[validate(
        length(min = 1, max = 64, message = "Category is required"),
        custom(function = "non_blank", message = "Category cannot be blank")
    )]
    pub category: String,

    #[serde(rename = "type")]
    #[validate(
        length(min = 1, max = 64, message = "Property type is required"),
        custom(function = "non_blank", message = "Property type cannot be blank")
    )]
    pub property_type: String,

    #[validate(
        length(min = 1, max = 200, message = "Street address is required"),
        custom(function = "non_blank", message = "Street address cannot be blank")
    )]
    pub street_address: String,

    #[validate(length(max = 50))]
    pub apt_suite: String,

    #[validate(
        length(min = 1, max = 100, message = "City is required"),
        custom(function = "non_blank", message = "City cannot be blank")
    )]
    pub city: String,

    #[validate(
        length(min = 1, max = 100, message = "Province is required"),
        custom(function = "non_blank", message = "Province cannot be blank")
    )]
    pub province: String,

    #[validate(
        length(min = 1, max = 100, message = "Country is required"),
        custom(function = "non_blank", message = "Country cannot be blank")
    )]
    pub country: String,

    #[validate(range(min = 1, max = 50, message = "Guest count must be 1-50"))]
    pub guest_count: i32,

    #[validate(range(min = 1, max = 50, message = "Bedroom count must be 1-50"))]
    pub bedroom_count: i32,

    #[validate(range(min = 1, max = 50, message = "Bed count must be 1-50"))]
    pub bed_count: i32,

    #[validate(range(min = 1, max = 50, message = "Bathroom count must be 1-50"))]
    pub bathroom_count: i32,

    #[validate(length(max = 64, message = "Too many amenities"))]
    pub amenities: Vec<String>,

    #[validate(
        length(min = 1, max = 120, message = "Title must be 1-120 characters"),
        custom(function = "non_blank", message = "Title cannot be blank")
    )]
    pub title: String,

    #[validate(
        length(min = 1, max = 5000, message = "Description must be 1-5000 characters"),
        custom(function = "non_blank", message = "Description cannot be blank")
    )]
    pub description: String,

    #[validate(length(max = 200))]
    pub highlight: String,

    #[validate(length(max = 1000))]
    pub highlight_desc: String,

    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price: i64,
}

/// Partial update of a listing's descriptive fields.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 64), custom(function = "non_blank", message = "Category cannot be blank"))]
    pub category: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64), custom(function = "non_blank", message = "Property type cannot be blank"))]
    pub property_type: Option<String>,

    #[validate(range(min = 1, max = 50))]
    pub guest_count: Option<i32>,

    #[validate(range(min = 1, max = 50))]
    pub bedroom_count: Option<i32>,

    #[validate(range(min = 1, max = 50))]
    pub bed_count: Option<i32>,

    #[validate(range(min = 1, max = 50))]
    pub bathroom_count: Option<i32>,

    #[validate(length(max = 64))]
    pub amenities: Option<Vec<String>>,

    #[validate(length(min = 1, max = 120), custom(function = "non_blank", message = "Title cannot be blank"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000), custom(function = "non_blank", message = "Description cannot be blank"))]
    pub description: Option<String>,

    #[validate(length(max = 200))]
    pub highlight: Option<String>,

    #[validate(length(max = 1000))]
    pub highlight_desc: Option<String>,

    #[validate(range(min = 1))]
    pub price: Option<i64>,
}

/// `GET /properties` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListingQuery {
    /// Category filter, treating "All" (any case) and blanks as no filter.
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }
}

/// Listing plus its host, for the details page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    #[serde(flatten)]
    pub listing: Listing,
    pub creator: HostSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_category_means_no_filter() {
        let q = ListingQuery {
            category: Some("All".into()),
            ..Default::default()
        };
        assert_eq!(q.category_filter(), None);

        let q = ListingQuery {
            category: Some(" Cabins ".into()),
            ..Default::default()
        };
        assert_eq!(q.category_filter(), Some("Cabins"));
    }

    #[test]
    fn update_accepts_type_key() {
        let body: UpdateListingRequest =
            serde_json::from_str(r#"{"type":"Room(s)","guestCount":3}"#).unwrap();
        assert_eq!(body.property_type.as_deref(), Some("Room(s)"));
        assert_eq!(body.guest_count, Some(3));
    }

    #[test]
    fn update_rejects_blank_title() {
        let patch = UpdateListingRequest {
            title: Some("   ".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(UpdateListingRequest::default().validate().is_ok());
    }

    #[test]
    fn create_rejects_zero_price() {
        let req = CreateListingRequest {
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
            title: "Cozy cabin".into(),
            description: "Quiet spot by the lake".into(),
            price: 0,
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
