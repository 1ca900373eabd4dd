use serde::{Deserialize, Serialize};

use crate::models::domain::{AccountSummary, Listing, SearchCriteria};

/// Uniform JSON envelope: `{status, data}` on success, `{status, message}`
/// otherwise. `results` carries a count for list endpoints that return a bare
/// array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            results: None,
            data: Some(data),
            message: None,
        }
    }

    pub fn counted(data: T, results: usize) -> Self {
        Self {
            results: Some(results),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            results: None,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

/// One page of GET /api/dorms
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub dorms: Vec<Listing>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

/// Register/login result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: AccountSummary,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSearchResult {
    pub dorms: Vec<Listing>,
    pub ai_response: String,
    pub search_criteria: SearchCriteria,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
