//! Record ID generation.
//!
//! Every row gets a UUID v7: time-sortable, generated without coordination,
//! and natively supported by Postgres.

use uuid::Uuid;

/// Generate a new time-ordered record ID.
pub fn generate_id() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_id();
        let id2 = generate_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_ids_are_time_sortable() {
        let id1 = generate_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = generate_id();
        assert!(id1 < id2);
    }

    #[test]
    fn test_ids_are_version_7() {
        assert_eq!(generate_id().get_version_num(), 7);
    }
}
