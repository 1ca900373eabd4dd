// Criterion benchmarks for CampusNest

use campusnest::core::{calculate_bounding_box, central_angle};
use campusnest::models::{
    Cleanliness, GeometryType, Listing, Location, MatchCandidate, SleepSchedule, StudyHabits,
    UserSummary, Visitors,
};
use campusnest::{compatibility_score, find_matches, GeoRadius, ListingFilter, RoommatePreference};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::Point;
use uuid::Uuid;

fn create_preferences(i: usize) -> RoommatePreference {
    RoommatePreference {
        sleep_schedule: SleepSchedule::ALL[i % 3],
        cleanliness: Cleanliness::ALL[(i / 3) % 3],
        study_habits: StudyHabits::ALL[(i / 9) % 3],
        is_smoker: i % 7 == 0,
        has_pets: i % 2 == 0,
        visitors: Visitors::ALL[(i / 27) % 3],
        bio: None,
        interests: ["hiking", "music", "chess", "cooking", "gaming"]
            .iter()
            .skip(i % 5)
            .map(|s| s.to_string())
            .collect(),
        gender_preference: None,
    }
}

fn create_candidate(i: usize) -> MatchCandidate {
    MatchCandidate {
        user: UserSummary {
            id: Uuid::new_v4(),
            name: format!("Student {}", i),
            email: format!("student{}@campus.edu", i),
            profile_picture: None,
        },
        preferences: create_preferences(i),
    }
}

fn create_listing(i: usize, lat: f64, lng: f64) -> Listing {
    Listing {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        name: format!("Dorm {}", i),
        description: "Benchmark listing".to_string(),
        location: Location {
            kind: GeometryType::Point,
            coordinates: [lng, lat],
            address: format!("{} College Ave", i),
            city: "New York".to_string(),
            state: "NY".to_string(),
            zip_code: "10001".to_string(),
        },
        university: "NYU".to_string(),
        price: 500.0 + (i % 20) as f64 * 50.0,
        size: 300.0,
        bedrooms: 1 + (i % 3) as i32,
        bathrooms: 1,
        available_from: Utc::now(),
        amenities: vec!["wifi".to_string()],
        photos: vec![],
        model_3d: None,
        is_available: i % 4 != 0,
        tags: vec![],
        rating: 0.0,
        rating_count: 0,
        views: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn bench_compatibility_score(c: &mut Criterion) {
    let a = create_preferences(1);
    let b = create_preferences(2);

    c.bench_function("compatibility_score", |bench| {
        bench.iter(|| compatibility_score(black_box(&a), black_box(&b)));
    });
}

fn bench_central_angle(c: &mut Criterion) {
    c.bench_function("central_angle", |b| {
        b.iter(|| {
            central_angle(
                black_box(Point::new(-74.0060, 40.7128)),
                black_box(Point::new(-74.01, 40.72)),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| calculate_bounding_box(black_box(Point::new(-74.0060, 40.7128)), black_box(50.0)));
    });
}

fn bench_matching(c: &mut Criterion) {
    let subject = create_preferences(0);
    let subject_id = Uuid::new_v4();

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 100, 1000, 5000].iter() {
        let candidates: Vec<MatchCandidate> = (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("find_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    find_matches(
                        black_box(subject_id),
                        black_box(Some(&subject)),
                        black_box(candidates.clone()),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_radius_filter(c: &mut Criterion) {
    let listings: Vec<Listing> = (0..1000)
        .map(|i| {
            let lat_offset = (i as f64 * 0.001) % 0.5;
            let lng_offset = (i as f64 * 0.0007) % 0.5;
            create_listing(i, 40.7128 + lat_offset, -74.0060 + lng_offset)
        })
        .collect();

    let filter = ListingFilter {
        max_price: Some(1000.0),
        is_available: Some(true),
        ..ListingFilter::within(GeoRadius::new(40.7128, -74.0060, 10.0))
    };

    c.bench_function("radius_filter_1000_listings", |b| {
        b.iter(|| {
            let found: Vec<&Listing> = listings.iter().filter(|l| filter.matches(l)).collect();
            black_box(found)
        });
    });
}

criterion_group!(
    benches,
    bench_compatibility_score,
    bench_central_angle,
    bench_bounding_box,
    bench_matching,
    bench_radius_filter
);

criterion_main!(benches);
