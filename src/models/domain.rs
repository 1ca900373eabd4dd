use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// When a student usually goes to sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepSchedule {
    Early,
    Late,
    Varies,
}

impl SleepSchedule {
    pub const ALL: [Self; 3] = [Self::Early, Self::Late, Self::Varies];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cleanliness {
    VeryClean,
    Clean,
    Messy,
}

impl Cleanliness {
    pub const ALL: [Self; 3] = [Self::VeryClean, Self::Clean, Self::Messy];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyHabits {
    Quiet,
    Music,
    Group,
}

impl StudyHabits {
    pub const ALL: [Self; 3] = [Self::Quiet, Self::Music, Self::Group];
}

/// How often a student has people over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visitors {
    Often,
    Sometimes,
    Rarely,
}

impl Visitors {
    pub const ALL: [Self; 3] = [Self::Often, Self::Sometimes, Self::Rarely];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderPreference {
    Male,
    Female,
    NoPreference,
}

impl GenderPreference {
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::NoPreference];
}

/// A user's declared roommate-compatibility attributes
///
/// Stored as a single JSON document on the user row. A user without a record
/// does not take part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommatePreference {
    pub sleep_schedule: SleepSchedule,
    pub cleanliness: Cleanliness,
    pub study_habits: StudyHabits,
    pub is_smoker: bool,
    pub has_pets: bool,
    pub visitors: Visitors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_preference: Option<GenderPreference>,
}

/// Field-by-field update for a preference record. Absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub sleep_schedule: Option<SleepSchedule>,
    pub cleanliness: Option<Cleanliness>,
    pub study_habits: Option<StudyHabits>,
    pub is_smoker: Option<bool>,
    pub has_pets: Option<bool>,
    pub visitors: Option<Visitors>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
    pub gender_preference: Option<GenderPreference>,
}

/// Raised when a first preference record is missing required fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required preference fields: {}", .0.join(", "))]
pub struct MissingPreferenceFields(pub Vec<&'static str>);

impl RoommatePreference {
    /// Merge an update into the current record, or build a new record from it.
    ///
    /// A new record needs every enum field; `isSmoker` and `hasPets` start as
    /// `false` when omitted. An empty `bio` is ignored.
    pub fn merged(
        current: Option<&Self>,
        update: &PreferencesUpdate,
    ) -> Result<Self, MissingPreferenceFields> {
        let bio = update.bio.clone().filter(|b| !b.is_empty());

        if let Some(current) = current {
            return Ok(Self {
                sleep_schedule: update.sleep_schedule.unwrap_or(current.sleep_schedule),
                cleanliness: update.cleanliness.unwrap_or(current.cleanliness),
                study_habits: update.study_habits.unwrap_or(current.study_habits),
                is_smoker: update.is_smoker.unwrap_or(current.is_smoker),
                has_pets: update.has_pets.unwrap_or(current.has_pets),
                visitors: update.visitors.unwrap_or(current.visitors),
                bio: bio.or_else(|| current.bio.clone()),
                interests: update
                    .interests
                    .clone()
                    .unwrap_or_else(|| current.interests.clone()),
                gender_preference: update.gender_preference.or(current.gender_preference),
            });
        }

        let mut missing = Vec::new();
        if update.sleep_schedule.is_none() {
            missing.push("sleepSchedule");
        }
        if update.cleanliness.is_none() {
            missing.push("cleanliness");
        }
        if update.study_habits.is_none() {
            missing.push("studyHabits");
        }
        if update.visitors.is_none() {
            missing.push("visitors");
        }

        match (
            update.sleep_schedule,
            update.cleanliness,
            update.study_habits,
            update.visitors,
        ) {
            (Some(sleep_schedule), Some(cleanliness), Some(study_habits), Some(visitors)) => {
                Ok(Self {
                    sleep_schedule,
                    cleanliness,
                    study_habits,
                    is_smoker: update.is_smoker.unwrap_or(false),
                    has_pets: update.has_pets.unwrap_or(false),
                    visitors,
                    bio,
                    interests: update.interests.clone().unwrap_or_default(),
                    gender_preference: update.gender_preference,
                })
            }
            _ => Err(MissingPreferenceFields(missing)),
        }
    }
}

/// Registered account, without credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase_uid: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub roommate_preferences: Option<RoommatePreference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account fields returned alongside an auth token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_verified: bool,
}

impl From<&User> for AccountSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_verified: user.is_verified,
        }
    }
}

/// Public view of a potential roommate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

/// A user that has a preference record and can be scored
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub user: UserSummary,
    pub preferences: RoommatePreference,
}

/// Computed pairing of the requesting user with one candidate. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommateMatch {
    pub user: UserSummary,
    pub compatibility_score: i32,
    pub shared_interests: Vec<String>,
    pub preferences: RoommatePreference,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    #[default]
    Point,
}

/// GeoJSON-style point with a postal address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type", default)]
    pub kind: GeometryType,
    /// `[longitude, latitude]`
    #[validate(custom(function = "validate_coordinates"))]
    pub coordinates: [f64; 2],
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "zipCode is required"))]
    pub zip_code: String,
}

impl Location {
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn point(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude(), self.latitude())
    }
}

fn validate_coordinates(coordinates: &[f64; 2]) -> Result<(), ValidationError> {
    let [lng, lat] = *coordinates;
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        let mut err = ValidationError::new("coordinates");
        err.message = Some("coordinates must be [longitude, latitude] within range".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Photo {
    #[validate(length(min = 1, message = "photo url is required"))]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Gltf,
    Glb,
    Obj,
}

/// Optional 3D tour asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model3D {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub format: Option<ModelFormat>,
}

/// A rentable housing unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub university: String,
    pub price: f64,
    /// Square feet
    pub size: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub available_from: DateTime<Utc>,
    pub amenities: Vec<String>,
    pub photos: Vec<Photo>,
    #[serde(rename = "model3D", default, skip_serializing_if = "Option::is_none")]
    pub model_3d: Option<Model3D>,
    pub is_available: bool,
    pub tags: Vec<String>,
    pub rating: f64,
    pub rating_count: i32,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Listing with its owner resolved, as returned by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub owner: Option<OwnerSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Structured search criteria extracted from a natural-language query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_price: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_bedrooms: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_bathrooms: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// Accepts `800`, `800.5`, `"800"` or `null`. Anything else becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().trim_start_matches('$').parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_update() -> PreferencesUpdate {
        PreferencesUpdate {
            sleep_schedule: Some(SleepSchedule::Early),
            cleanliness: Some(Cleanliness::Clean),
            study_habits: Some(StudyHabits::Quiet),
            is_smoker: None,
            has_pets: Some(true),
            visitors: Some(Visitors::Often),
            bio: Some("".to_string()),
            interests: Some(vec!["hiking".to_string()]),
            gender_preference: None,
        }
    }

    #[test]
    fn test_new_record_requires_enum_fields() {
        let update = PreferencesUpdate {
            cleanliness: Some(Cleanliness::Messy),
            ..Default::default()
        };

        let err = RoommatePreference::merged(None, &update).unwrap_err();
        assert_eq!(err.0, vec!["sleepSchedule", "studyHabits", "visitors"]);
    }

    #[test]
    fn test_new_record_defaults_booleans() {
        let prefs = RoommatePreference::merged(None, &full_update()).unwrap();

        assert!(!prefs.is_smoker);
        assert!(prefs.has_pets);
        assert_eq!(prefs.bio, None, "empty bio is ignored");
        assert_eq!(prefs.interests, vec!["hiking"]);
    }

    #[test]
    fn test_partial_update_merges_field_by_field() {
        let current = RoommatePreference::merged(None, &full_update()).unwrap();
        let update = PreferencesUpdate {
            visitors: Some(Visitors::Rarely),
            is_smoker: Some(true),
            ..Default::default()
        };

        let merged = RoommatePreference::merged(Some(&current), &update).unwrap();

        assert_eq!(merged.visitors, Visitors::Rarely);
        assert!(merged.is_smoker);
        assert_eq!(merged.sleep_schedule, SleepSchedule::Early);
        assert_eq!(merged.interests, vec!["hiking"]);
    }

    #[test]
    fn test_preference_wire_format() {
        let json = serde_json::json!({
            "sleepSchedule": "varies",
            "cleanliness": "very_clean",
            "studyHabits": "group",
            "isSmoker": false,
            "hasPets": false,
            "visitors": "sometimes",
            "genderPreference": "no_preference"
        });

        let prefs: RoommatePreference = serde_json::from_value(json).unwrap();
        assert_eq!(prefs.cleanliness, Cleanliness::VeryClean);
        assert_eq!(prefs.gender_preference, Some(GenderPreference::NoPreference));
        assert!(prefs.interests.is_empty());
    }

    #[test]
    fn test_location_validation() {
        let mut location = Location {
            kind: GeometryType::Point,
            coordinates: [-122.26, 37.87],
            address: "2650 Durant Ave".to_string(),
            city: "Berkeley".to_string(),
            state: "CA".to_string(),
            zip_code: "94720".to_string(),
        };
        assert!(location.validate().is_ok());
        assert_eq!(location.point().y(), 37.87);

        location.coordinates = [37.87, -122.26];
        assert!(location.validate().is_err());
    }

    #[test]
    fn test_search_criteria_lenient_numbers() {
        let criteria: SearchCriteria = serde_json::from_value(serde_json::json!({
            "maxPrice": "$800",
            "minBedrooms": 2,
            "minBathrooms": "many",
            "tags": ["quiet"]
        }))
        .unwrap();

        assert_eq!(criteria.max_price, Some(800.0));
        assert_eq!(criteria.min_bedrooms, Some(2.0));
        assert_eq!(criteria.min_bathrooms, None);
        assert_eq!(criteria.tags, vec!["quiet"]);
    }
}
