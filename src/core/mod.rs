// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use distance::{calculate_bounding_box, central_angle, distance_km, radius_radians, BoundingBox, GeoRadius};
pub use filters::{like_pattern, parse_near, ListingFilter, Pagination, TextMatch};
pub use matcher::{find_matches, MatchError};
pub use scoring::{compatibility_score, score_with_shared_interests};
