use geo::Point;

/// Earth radius in kilometers used to turn a search distance into a
/// spherical-cap radius. Stored radius queries depend on this exact value.
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Kilometers per degree of latitude used for the bounding-box prefilter.
/// Slightly under the true value so the box never clips the circle.
const KM_PER_DEGREE: f64 = 111.0;

/// Lat/lon box around a search circle
///
/// When the circle crosses the antimeridian the box wraps: `min_lon` is then
/// greater than `max_lon` and the box covers `[min_lon, 180]` plus
/// `[-180, max_lon]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn wraps_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }

    /// The box's longitude intervals, one or two of them
    pub fn longitude_ranges(&self) -> Vec<(f64, f64)> {
        if self.wraps_antimeridian() {
            vec![(self.min_lon, 180.0), (-180.0, self.max_lon)]
        } else {
            vec![(self.min_lon, self.max_lon)]
        }
    }
}

/// Convert a distance in kilometers to a spherical-cap radius in radians
#[inline]
pub fn radius_radians(distance_km: f64) -> f64 {
    distance_km / EARTH_RADIUS_KM
}

/// Great-circle central angle between two points, in radians (haversine)
#[inline]
pub fn central_angle(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let delta_lat = (b.y() - a.y()).to_radians();
    let delta_lon = (b.x() - a.x()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * h.sqrt().min(1.0).asin()
}

/// Great-circle distance in kilometers on the same sphere as [`radius_radians`]
#[inline]
pub fn distance_km(a: Point<f64>, b: Point<f64>) -> f64 {
    central_angle(a, b) * EARTH_RADIUS_KM
}

/// Bring a longitude that overshot ±180 back into range
#[inline]
fn wrap_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Calculate a bounding box around a center point
///
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude). If the circle
/// reaches a pole every longitude is inside; if it crosses the antimeridian
/// the longitude span wraps.
pub fn calculate_bounding_box(center: Point<f64>, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let min_lat = center.y() - lat_delta;
    let max_lat = center.y() + lat_delta;
    let cos_lat = center.y().to_radians().cos().abs();

    let reaches_pole = min_lat <= -90.0 || max_lat >= 90.0;

    let (min_lon, max_lon) = if reaches_pole
        || cos_lat < 1e-6
        || radius_km / (KM_PER_DEGREE * cos_lat) >= 180.0
    {
        (-180.0, 180.0)
    } else {
        let lon_delta = radius_km / (KM_PER_DEGREE * cos_lat);
        (
            wrap_longitude(center.x() - lon_delta),
            wrap_longitude(center.x() + lon_delta),
        )
    };

    BoundingBox {
        min_lat: min_lat.max(-90.0),
        max_lat: max_lat.min(90.0),
        min_lon,
        max_lon,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(point: Point<f64>, bbox: &BoundingBox) -> bool {
    let lat_ok = point.y() >= bbox.min_lat && point.y() <= bbox.max_lat;
    let lon_ok = if bbox.wraps_antimeridian() {
        point.x() >= bbox.min_lon || point.x() <= bbox.max_lon
    } else {
        point.x() >= bbox.min_lon && point.x() <= bbox.max_lon
    };

    lat_ok && lon_ok
}

/// "Within radius of point" predicate: a spherical cap around `center`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRadius {
    pub center: Point<f64>,
    pub distance_km: f64,
}

impl GeoRadius {
    pub fn new(lat: f64, lng: f64, distance_km: f64) -> Self {
        Self {
            center: Point::new(lng, lat),
            distance_km,
        }
    }

    pub fn radius_radians(&self) -> f64 {
        radius_radians(self.distance_km)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        calculate_bounding_box(self.center, self.distance_km)
    }

    pub fn contains(&self, point: Point<f64>) -> bool {
        is_within_bounding_box(point, &self.bounding_box())
            && central_angle(self.center, point) <= self.radius_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_constant() {
        assert_eq!(radius_radians(6378.1), 1.0);
        assert_eq!(radius_radians(0.0), 0.0);
        assert!((radius_radians(10.0) - 0.001_567_865_038).abs() < 1e-12);
    }

    #[test]
    fn test_distance_london_paris() {
        let london = Point::new(-0.1278, 51.5074);
        let paris = Point::new(2.3522, 48.8566);

        let distance = distance_km(london, paris);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(Point::new(-74.0060, 40.7128), 10.0);

        assert!(bbox.min_lat < 40.7128);
        assert!(bbox.max_lat > 40.7128);
        assert!(bbox.min_lon < -74.0060);
        assert!(bbox.max_lon > -74.0060);

        // Check approximate size (20km / 111km per degree = ~0.18 degrees)
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_bounding_box_at_pole() {
        let bbox = calculate_bounding_box(Point::new(0.0, 90.0), 50.0);
        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!((bbox.min_lon, bbox.max_lon), (-180.0, 180.0));
    }

    #[test]
    fn test_bounding_box_wraps_antimeridian() {
        let bbox = calculate_bounding_box(Point::new(179.99, -17.0), 10.0);

        assert!(bbox.wraps_antimeridian());
        assert!(bbox.min_lon > 179.0 && bbox.min_lon <= 180.0);
        assert!(bbox.max_lon < -179.0 && bbox.max_lon >= -180.0);
        assert_eq!(bbox.longitude_ranges().len(), 2);
        assert!(is_within_bounding_box(Point::new(-179.99, -17.0), &bbox));
        assert!(is_within_bounding_box(Point::new(179.95, -17.0), &bbox));
        assert!(!is_within_bounding_box(Point::new(0.0, -17.0), &bbox));
    }

    #[test]
    fn test_radius_across_antimeridian() {
        let near = GeoRadius::new(-17.0, 179.99, 10.0);
        let across = Point::new(-179.99, -17.0);

        assert!(distance_km(near.center, across) < 3.0);
        assert!(near.contains(across));
        assert!(!near.contains(Point::new(-179.5, -17.0)));
    }

    #[test]
    fn test_bounding_box_reaching_pole_spans_all_longitudes() {
        let bbox = calculate_bounding_box(Point::new(0.0, 89.5), 100.0);

        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!((bbox.min_lon, bbox.max_lon), (-180.0, 180.0));
        assert!(!bbox.wraps_antimeridian());
    }

    #[test]
    fn test_radius_across_pole() {
        let near = GeoRadius::new(89.5, 0.0, 100.0);
        // 0.7° of arc away, on the far side of the pole
        let across = Point::new(180.0, 89.8);

        assert!(distance_km(near.center, across) < 100.0);
        assert!(near.contains(across));
    }

    #[test]
    fn test_zero_radius_matches_only_center() {
        let near = GeoRadius::new(40.7128, -74.0060, 0.0);

        assert!(near.contains(Point::new(-74.0060, 40.7128)));
        assert!(!near.contains(Point::new(-74.0060, 40.7129)));
    }

    #[test]
    fn test_point_five_km_inside_ten_km_radius() {
        let near = GeoRadius::new(40.7128, -74.0060, 10.0);
        // 5 km due north
        let north = Point::new(-74.0060, 40.7128 + (5.0 / EARTH_RADIUS_KM).to_degrees());

        assert!((distance_km(near.center, north) - 5.0).abs() < 1e-6);
        assert!(near.contains(north));
        assert!(!GeoRadius::new(40.7128, -74.0060, 4.9).contains(north));
    }
}
