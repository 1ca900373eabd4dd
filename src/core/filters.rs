use crate::core::distance::GeoRadius;
use crate::models::{Listing, ListingQueryParams, SearchCriteria};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_NEAR_DISTANCE_KM: f64 = 10.0;

/// Leading-integer parse: optional whitespace and sign followed by digits.
/// Trailing garbage is ignored (`"12abc"` → 12); no digits → `None`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    rest[..digits_len].parse::<i64>().ok().map(|n| sign * n)
}

/// Leading-float parse: the longest numeric prefix wins (`"5km"` → 5.0).
pub fn parse_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let candidate_len = s
        .bytes()
        .take_while(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        .count();

    (1..=candidate_len)
        .rev()
        .find_map(|len| s[..len].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn non_empty(raw: Option<&String>) -> Option<&str> {
    raw.map(String::as_str).filter(|s| !s.is_empty())
}

/// Page window over a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Non-numeric or non-positive values fall back to page 1 and
    /// `default_limit`; `limit` is capped at `max_limit`.
    pub fn from_params(
        page: Option<&String>,
        limit: Option<&String>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        let max_limit = max_limit.max(1);
        let page = non_empty(page)
            .and_then(parse_int)
            .filter(|p| *p > 0)
            .map_or(DEFAULT_PAGE, |p| p.min(u32::MAX as i64) as u32);
        let limit = non_empty(limit)
            .and_then(parse_int)
            .filter(|l| *l > 0)
            .map_or(default_limit.clamp(1, max_limit), |l| l.min(max_limit as i64) as u32);

        Self { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// `ceil(total / limit)`
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

/// How a text field is compared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    Exact(String),
    /// Case-insensitive substring
    Contains(String),
}

impl TextMatch {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(expected) => value == expected,
            Self::Contains(needle) => value.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

/// Escape a user string for use inside an `ILIKE '%...%'` pattern
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Store-independent description of a listing search.
///
/// Every field is optional; an empty filter selects everything. The Postgres
/// service translates it to SQL and [`ListingFilter::matches`] evaluates the
/// same predicate in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub university: Option<TextMatch>,
    pub min_bedrooms: Option<i32>,
    pub min_bathrooms: Option<i32>,
    pub is_available: Option<bool>,
    /// Listing must have every one of these amenities
    pub amenities_all: Vec<String>,
    /// Listing must have at least one of these tags
    pub tags_any: Vec<String>,
    pub near: Option<GeoRadius>,
    pub address_contains: Option<String>,
}

impl ListingFilter {
    /// Build the filter for GET /api/dorms. Malformed numbers are ignored.
    pub fn from_query(params: &ListingQueryParams) -> Self {
        let bound = |raw: Option<&String>| {
            non_empty(raw)
                .and_then(parse_int)
                .map(|n| n.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
        };

        Self {
            min_price: non_empty(params.min_price.as_ref())
                .and_then(parse_int)
                .map(|n| n as f64),
            max_price: non_empty(params.max_price.as_ref())
                .and_then(parse_int)
                .map(|n| n as f64),
            university: non_empty(params.university.as_ref())
                .map(|u| TextMatch::Exact(u.to_string())),
            min_bedrooms: bound(params.bedrooms.as_ref()),
            min_bathrooms: bound(params.bathrooms.as_ref()),
            is_available: non_empty(params.is_available.as_ref()).map(|v| v == "true"),
            ..Self::default()
        }
    }

    pub fn within(radius: GeoRadius) -> Self {
        Self {
            near: Some(radius),
            ..Self::default()
        }
    }

    /// Build the filter from extracted natural-language criteria.
    ///
    /// Coordinates win over a textual location. Zero or empty values count as
    /// absent.
    pub fn from_criteria(criteria: &SearchCriteria, radius_km: f64) -> Self {
        let positive = |v: Option<f64>| v.filter(|n| n.is_finite() && *n != 0.0);
        let text = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let near = criteria
            .coordinates
            .map(|c| GeoRadius::new(c.lat, c.lng, radius_km));

        Self {
            max_price: positive(criteria.max_price),
            university: text(&criteria.university).map(TextMatch::Contains),
            min_bedrooms: positive(criteria.min_bedrooms).map(|n| n.ceil() as i32),
            min_bathrooms: positive(criteria.min_bathrooms).map(|n| n.ceil() as i32),
            amenities_all: criteria.amenities.clone(),
            tags_any: criteria.tags.clone(),
            address_contains: if near.is_none() { text(&criteria.location) } else { None },
            near,
            ..Self::default()
        }
    }

    /// Evaluate the filter against a single listing
    pub fn matches(&self, listing: &Listing) -> bool {
        if self.min_price.is_some_and(|min| listing.price < min)
            || self.max_price.is_some_and(|max| listing.price > max)
        {
            return false;
        }

        if let Some(university) = &self.university {
            if !university.matches(&listing.university) {
                return false;
            }
        }

        if self.min_bedrooms.is_some_and(|min| listing.bedrooms < min)
            || self.min_bathrooms.is_some_and(|min| listing.bathrooms < min)
        {
            return false;
        }

        if self.is_available.is_some_and(|a| listing.is_available != a) {
            return false;
        }

        if !self.amenities_all.iter().all(|a| listing.amenities.contains(a)) {
            return false;
        }

        if !self.tags_any.is_empty() && !self.tags_any.iter().any(|t| listing.tags.contains(t)) {
            return false;
        }

        if let Some(near) = &self.near {
            if !near.contains(listing.location.point()) {
                return false;
            }
        }

        if let Some(address) = &self.address_contains {
            if !TextMatch::Contains(address.clone()).matches(&listing.location.address) {
                return false;
            }
        }

        true
    }
}

/// Parse the near-search path segments. Coordinates are required; a missing,
/// malformed or negative distance falls back to `default_km`.
pub fn parse_near(lat: &str, lng: &str, distance: Option<&str>, default_km: f64) -> Option<GeoRadius> {
    let lat = parse_float(lat).filter(|v| (-90.0..=90.0).contains(v))?;
    let lng = parse_float(lng).filter(|v| (-180.0..=180.0).contains(v))?;
    let distance = distance
        .and_then(parse_float)
        .filter(|d| *d >= 0.0)
        .unwrap_or(default_km);

    Some(GeoRadius::new(lat, lng, distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, GeometryType, Location};
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_listing(price: f64, bedrooms: i32, lat: f64, lng: f64) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Test Dorm".to_string(),
            description: "Test".to_string(),
            location: Location {
                kind: GeometryType::Point,
                coordinates: [lng, lat],
                address: "123 College Ave".to_string(),
                city: "Ithaca".to_string(),
                state: "NY".to_string(),
                zip_code: "14850".to_string(),
            },
            university: "Cornell University".to_string(),
            price,
            size: 300.0,
            bedrooms,
            bathrooms: 1,
            available_from: Utc::now(),
            amenities: vec!["wifi".to_string(), "gym".to_string()],
            photos: vec![],
            model_3d: None,
            is_available: true,
            tags: vec!["quiet".to_string()],
            rating: 0.0,
            rating_count: 0,
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn params(pairs: &[(&str, &str)]) -> ListingQueryParams {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn test_parse_int_like_leading_digits() {
        assert_eq!(parse_int("12"), Some(12));
        assert_eq!(parse_int(" 12abc"), Some(12));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("799.99"), Some(799));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float("42.45"), Some(42.45));
        assert_eq!(parse_float("5km"), Some(5.0));
        assert_eq!(parse_float("-71.1e0"), Some(-71.1));
        assert_eq!(parse_float("north"), None);
    }

    #[test]
    fn test_pagination_defaults_and_fallbacks() {
        let p = Pagination::from_params(None, None, DEFAULT_LIMIT, 100);
        assert_eq!(p, Pagination { page: 1, limit: 10 });

        let p = Pagination::from_params(Some(&"x".to_string()), Some(&"0".to_string()), DEFAULT_LIMIT, 100);
        assert_eq!(p, Pagination { page: 1, limit: 10 });

        let p = Pagination::from_params(Some(&"3".to_string()), Some(&"500".to_string()), DEFAULT_LIMIT, 100);
        assert_eq!(p, Pagination { page: 3, limit: 100 });
    }

    #[test]
    fn test_pagination_second_page_of_25() {
        let p = Pagination::from_params(Some(&"2".to_string()), Some(&"10".to_string()), DEFAULT_LIMIT, 100);

        assert_eq!(p.skip(), 10);
        assert_eq!(p.total_pages(25), 3);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(30), 3);
    }

    #[test]
    fn test_from_query_price_range() {
        let filter = ListingFilter::from_query(&params(&[("minPrice", "500"), ("maxPrice", "900")]));

        assert_eq!(filter.min_price, Some(500.0));
        assert_eq!(filter.max_price, Some(900.0));
        assert!(filter.matches(&create_test_listing(500.0, 1, 0.0, 0.0)));
        assert!(filter.matches(&create_test_listing(900.0, 1, 0.0, 0.0)));
        assert!(!filter.matches(&create_test_listing(901.0, 1, 0.0, 0.0)));
        assert!(!filter.matches(&create_test_listing(499.0, 1, 0.0, 0.0)));
    }

    #[test]
    fn test_from_query_ignores_malformed_values() {
        let filter = ListingFilter::from_query(&params(&[
            ("minPrice", "cheap"),
            ("bedrooms", ""),
            ("bathrooms", "two"),
        ]));

        assert_eq!(filter, ListingFilter::default());
    }

    #[test]
    fn test_bedrooms_are_minimum_bounds() {
        let filter = ListingFilter::from_query(&params(&[("bedrooms", "2")]));

        assert!(filter.matches(&create_test_listing(800.0, 3, 0.0, 0.0)));
        assert!(filter.matches(&create_test_listing(800.0, 2, 0.0, 0.0)));
        assert!(!filter.matches(&create_test_listing(800.0, 1, 0.0, 0.0)));
    }

    #[test]
    fn test_availability_only_when_provided() {
        let mut listing = create_test_listing(800.0, 1, 0.0, 0.0);
        listing.is_available = false;

        assert!(ListingFilter::from_query(&params(&[])).matches(&listing));
        assert!(ListingFilter::from_query(&params(&[("isAvailable", "false")])).matches(&listing));
        assert!(!ListingFilter::from_query(&params(&[("isAvailable", "true")])).matches(&listing));
    }

    #[test]
    fn test_university_exact_vs_contains() {
        let listing = create_test_listing(800.0, 1, 0.0, 0.0);

        let exact = ListingFilter::from_query(&params(&[("university", "cornell")]));
        assert!(!exact.matches(&listing));

        let criteria = SearchCriteria {
            university: Some("cornell".to_string()),
            ..Default::default()
        };
        assert!(ListingFilter::from_criteria(&criteria, 5.0).matches(&listing));
    }

    #[test]
    fn test_from_criteria_amenities_all_tags_any() {
        let listing = create_test_listing(800.0, 2, 0.0, 0.0);
        let mut criteria = SearchCriteria {
            amenities: vec!["wifi".to_string(), "gym".to_string()],
            tags: vec!["social".to_string(), "quiet".to_string()],
            max_price: Some(850.0),
            min_bedrooms: Some(1.5),
            ..Default::default()
        };

        let filter = ListingFilter::from_criteria(&criteria, 5.0);
        assert_eq!(filter.min_bedrooms, Some(2));
        assert!(filter.matches(&listing));

        criteria.amenities.push("pool".to_string());
        assert!(!ListingFilter::from_criteria(&criteria, 5.0).matches(&listing));
    }

    #[test]
    fn test_from_criteria_coordinates_override_location() {
        let criteria = SearchCriteria {
            location: Some("College Ave".to_string()),
            coordinates: Some(Coordinates { lat: 42.45, lng: -76.48 }),
            ..Default::default()
        };

        let filter = ListingFilter::from_criteria(&criteria, 5.0);
        assert!(filter.address_contains.is_none());
        assert_eq!(filter.near.map(|n| n.distance_km), Some(5.0));

        let text_only = SearchCriteria {
            location: Some("college ave".to_string()),
            ..Default::default()
        };
        let filter = ListingFilter::from_criteria(&text_only, 5.0);
        assert!(filter.matches(&create_test_listing(800.0, 1, 10.0, 10.0)));
    }

    #[test]
    fn test_near_filter() {
        let filter = ListingFilter::within(GeoRadius::new(42.45, -76.48, 10.0));

        assert!(filter.matches(&create_test_listing(800.0, 1, 42.46, -76.49)));
        assert!(!filter.matches(&create_test_listing(800.0, 1, 43.45, -76.48)));
    }

    #[test]
    fn test_parse_near() {
        let near = parse_near("42.45", "-76.48", None, DEFAULT_NEAR_DISTANCE_KM).unwrap();
        assert_eq!(near.distance_km, 10.0);

        let near = parse_near("42.45", "-76.48", Some("abc"), DEFAULT_NEAR_DISTANCE_KM).unwrap();
        assert_eq!(near.distance_km, 10.0);

        let near = parse_near("42.45", "-76.48", Some("0"), DEFAULT_NEAR_DISTANCE_KM).unwrap();
        assert_eq!(near.radius_radians(), 0.0);

        assert!(parse_near("north", "-76.48", None, DEFAULT_NEAR_DISTANCE_KM).is_none());
        assert!(parse_near("95", "-76.48", None, DEFAULT_NEAR_DISTANCE_KM).is_none());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("MIT"), "%MIT%");
    }
}
