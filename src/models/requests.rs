use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{ChatMessage, Listing, Location, Model3D, Photo};

/// POST /api/auth/register
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Please provide a name"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// POST /api/auth/login
///
/// Both fields are optional so a missing one is reported with the login
/// message rather than a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// PUT /api/users/{id}
///
/// Credentials, verification state and external identities are not part of
/// this body and cannot be changed through it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub university: Option<String>,
    pub major: Option<String>,
    #[validate(range(min = 1900, max = 2200, message = "graduationYear is out of range"))]
    pub graduation_year: Option<i32>,
    pub profile_picture: Option<String>,
}

/// POST /api/dorms
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListingForm {
    #[validate(length(min = 1, message = "Please provide a name for the dorm"))]
    pub name: String,
    #[validate(length(min = 1, message = "Please provide a description"))]
    pub description: String,
    #[validate(nested)]
    pub location: Location,
    #[validate(length(min = 1, message = "Please provide the university name"))]
    pub university: String,
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: f64,
    #[validate(range(min = 0.0, message = "size cannot be negative"))]
    pub size: f64,
    #[validate(range(min = 0, message = "bedrooms cannot be negative"))]
    pub bedrooms: i32,
    #[validate(range(min = 0, message = "bathrooms cannot be negative"))]
    pub bathrooms: i32,
    pub available_from: DateTime<Utc>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub photos: Vec<Photo>,
    #[serde(rename = "model3D", default)]
    pub model_3d: Option<Model3D>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: f64,
}

fn default_true() -> bool {
    true
}

/// PUT /api/dorms/{id}
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "description cannot be empty"))]
    pub description: Option<String>,
    #[validate(nested)]
    pub location: Option<Location>,
    #[validate(length(min = 1, message = "university cannot be empty"))]
    pub university: Option<String>,
    #[validate(range(min = 0.0, message = "price cannot be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, message = "size cannot be negative"))]
    pub size: Option<f64>,
    #[validate(range(min = 0, message = "bedrooms cannot be negative"))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, message = "bathrooms cannot be negative"))]
    pub bathrooms: Option<i32>,
    pub available_from: Option<DateTime<Utc>>,
    pub amenities: Option<Vec<String>>,
    #[validate(nested)]
    pub photos: Option<Vec<Photo>>,
    #[serde(rename = "model3D")]
    pub model_3d: Option<Model3D>,
    pub is_available: Option<bool>,
    pub tags: Option<Vec<String>>,
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: Option<f64>,
}

impl ListingUpdate {
    /// Apply the provided fields onto an existing listing
    pub fn apply_to(self, listing: &mut Listing) {
        if let Some(name) = self.name {
            listing.name = name;
        }
        if let Some(description) = self.description {
            listing.description = description;
        }
        if let Some(location) = self.location {
            listing.location = location;
        }
        if let Some(university) = self.university {
            listing.university = university;
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(size) = self.size {
            listing.size = size;
        }
        if let Some(bedrooms) = self.bedrooms {
            listing.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = self.bathrooms {
            listing.bathrooms = bathrooms;
        }
        if let Some(available_from) = self.available_from {
            listing.available_from = available_from;
        }
        if let Some(amenities) = self.amenities {
            listing.amenities = amenities;
        }
        if let Some(photos) = self.photos {
            listing.photos = photos;
        }
        if self.model_3d.is_some() {
            listing.model_3d = self.model_3d;
        }
        if let Some(is_available) = self.is_available {
            listing.is_available = is_available;
        }
        if let Some(tags) = self.tags {
            listing.tags = tags;
        }
        if let Some(rating) = self.rating {
            listing.rating = rating;
        }
    }
}

/// Raw query string of GET /api/dorms. Values are kept as text and parsed
/// leniently by the filter builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQueryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub university: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub is_available: Option<String>,
}

/// Path segments of GET /api/dorms/near/{lat}/{lng}/{distance}
#[derive(Debug, Clone, Deserialize)]
pub struct NearPath {
    pub lat: String,
    pub lng: String,
    #[serde(default)]
    pub distance: Option<String>,
}

/// POST /api/ai/chat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

/// POST /api/ai/search-dorms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDormsRequest {
    #[serde(default)]
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "12345".to_string(),
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn test_listing_form_defaults() {
        let form: ListingForm = serde_json::from_value(serde_json::json!({
            "name": "Maple Hall",
            "description": "Two blocks from campus",
            "location": {
                "type": "Point",
                "coordinates": [-83.74, 42.28],
                "address": "1 Maple St",
                "city": "Ann Arbor",
                "state": "MI",
                "zipCode": "48104"
            },
            "university": "University of Michigan",
            "price": 850,
            "size": 400,
            "bedrooms": 2,
            "bathrooms": 1,
            "availableFrom": "2026-08-15T00:00:00Z"
        }))
        .unwrap();

        assert!(form.is_available);
        assert_eq!(form.rating, 0.0);
        assert!(form.photos.is_empty());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_listing_update_rejects_bad_rating() {
        let update = ListingUpdate {
            rating: Some(7.5),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
