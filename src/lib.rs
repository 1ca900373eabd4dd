//! CampusNest - Student housing backend
//!
//! Listings with filtered and geo-radius search, accounts with JWT auth,
//! roommate compatibility matching and an assistant for natural-language
//! dorm search.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{compatibility_score, find_matches, GeoRadius, ListingFilter, Pagination};
pub use error::AppError;
pub use models::{Listing, RoommateMatch, RoommatePreference, SearchCriteria, User};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let near = GeoRadius::new(40.7128, -74.0060, 10.0);
        assert!(near.bounding_box().min_lat < 40.7128);
        assert_eq!(Pagination::default().limit, 10);
    }
}
