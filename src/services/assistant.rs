use crate::models::{ChatMessage, ChatRole, Listing, SearchCriteria};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const CRITERIA_PROMPT: &str = "You are a helpful assistant that extracts dorm search criteria from a user's query. \
Extract structured data in JSON format with the following fields (if mentioned): \
university (the university name or campus), \
location (a specific place such as \"near science library\"), \
coordinates (an object with lat and lng, only if the user gives them), \
maxPrice (maximum price, number only), \
minBedrooms (minimum number of bedrooms), \
minBathrooms (minimum number of bathrooms), \
amenities (array, e.g. \"wifi\", \"pool\", \"gym\"), \
tags (array of descriptive tags, e.g. \"quiet\", \"social\", \"spacious\"), \
keywords (any other important search terms). \
Only include fields that are explicitly mentioned or strongly implied. \
Return just the JSON object with no additional text.";

const SUMMARY_PROMPT: &str = "You are a helpful dormitory search assistant. You give friendly, \
conversational answers about dorm options based on search results. Summarize the key findings \
such as the number of matches and the price range, highlight a few promising options, and if \
nothing matches every criterion suggest how the search could be relaxed. Keep responses under \
150 words and focus on the most relevant details.";

const CHAT_PROMPT: &str = "You are DormHelper, a helpful assistant for college students looking \
for dormitory options. You can answer questions about finding and comparing dorms, roommate \
matching and compatibility, campus living advice and housing application processes. If asked \
about specific dormitories or universities you don't have data for, suggest using the search \
feature instead. Be friendly, helpful, and concise.";

const SUMMARY_FALLBACK: &str = "Sorry, I couldn't process the search results.";
const CHAT_FALLBACK: &str = "Sorry, I couldn't process your message.";

/// Errors that can occur when talking to the language model
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Fields of a listing the model sees when summarising results
#[derive(Debug, Serialize)]
struct ListingDigest<'a> {
    name: &'a str,
    price: f64,
    bedrooms: i32,
    bathrooms: i32,
    university: &'a str,
    amenities: &'a [String],
    tags: &'a [String],
}

impl<'a> From<&'a Listing> for ListingDigest<'a> {
    fn from(listing: &'a Listing) -> Self {
        Self {
            name: &listing.name,
            price: listing.price,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            university: &listing.university,
            amenities: &listing.amenities,
            tags: &listing.tags,
        }
    }
}

/// Client for an OpenAI-compatible chat completions API
///
/// Handles the three assistant features:
/// - Extracting search criteria from a free-text query
/// - Summarising search results
/// - General housing chat
pub struct AssistantClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl AssistantClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            model,
            client,
        })
    }

    /// Turn a natural-language query into search criteria.
    ///
    /// Transport and API failures are errors; a reply that is not valid JSON
    /// yields empty criteria.
    pub async fn extract_criteria(&self, query: &str) -> Result<SearchCriteria, AssistantError> {
        let messages = [
            ChatMessage { role: ChatRole::System, content: CRITERIA_PROMPT.to_string() },
            ChatMessage { role: ChatRole::User, content: query.to_string() },
        ];

        let content = self.complete(&messages, 0.1).await?.unwrap_or_default();

        Ok(parse_criteria(&content))
    }

    /// Short conversational summary of the listings found for `query`
    pub async fn generate_summary(
        &self,
        query: &str,
        results: &[Listing],
    ) -> Result<String, AssistantError> {
        let digest: Vec<ListingDigest<'_>> = results.iter().map(ListingDigest::from).collect();
        let digest = serde_json::to_string(&digest)
            .map_err(|e| AssistantError::ApiError(format!("Failed to encode results: {}", e)))?;

        let messages = [
            ChatMessage { role: ChatRole::System, content: SUMMARY_PROMPT.to_string() },
            ChatMessage {
                role: ChatRole::User,
                content: format!("User query: \"{}\"\n\nSearch results: {}", query, digest),
            },
        ];

        Ok(self
            .complete(&messages, 0.7)
            .await?
            .unwrap_or_else(|| SUMMARY_FALLBACK.to_string()))
    }

    /// Answer a chat message given the prior conversation
    pub async fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage { role: ChatRole::System, content: CHAT_PROMPT.to_string() });
        // Clients may not inject their own instructions
        messages.extend(history.iter().filter(|m| m.role != ChatRole::System).cloned());
        messages.push(ChatMessage { role: ChatRole::User, content: message.to_string() });

        Ok(self
            .complete(&messages, 0.7)
            .await?
            .unwrap_or_else(|| CHAT_FALLBACK.to_string()))
    }

    /// Run one completion; `None` if the reply has no text
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<Option<String>, AssistantError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        tracing::debug!("Requesting completion ({} messages)", messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
                temperature,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistantError::ApiError(format!(
                "Completion failed: {}",
                response.status()
            )));
        }

        let body: CompletionResponse = response.json().await?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty()))
    }
}

/// Parse model output as criteria, salvaging the outermost `{...}` span if
/// the reply wraps the JSON in prose
pub fn parse_criteria(content: &str) -> SearchCriteria {
    if let Ok(criteria) = serde_json::from_str(content) {
        return criteria;
    }

    tracing::warn!("Model reply is not plain JSON, attempting to salvage");

    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str(&content[start..=end]).unwrap_or_default()
        }
        _ => SearchCriteria::default(),
    }
}
