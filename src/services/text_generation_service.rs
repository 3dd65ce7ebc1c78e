use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::OpenAiConfig;
use crate::models::trip::TripContext;

const HTTP_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Error)]
pub enum TextGenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Completion request failed with status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Completion response had no content")]
    EmptyResponse,
    #[error("Text generation timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        system_instructions: &str,
        user_context: &str,
    ) -> Result<String, TextGenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for OpenAI and compatible endpoints.
#[derive(Clone)]
pub struct OpenAiTextGenerator {
    http_client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiTextGenerator {
    pub fn new(config: OpenAiConfig) -> Result<Self, TextGenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate(
        &self,
        system_instructions: &str,
        user_context: &str,
    ) -> Result<String, TextGenerationError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instructions,
                },
                ChatMessage {
                    role: "user",
                    content: user_context,
                },
            ],
            temperature: self.config.temperature,
        };

        debug!("Requesting completion from {} with model {}", url, self.config.model);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TextGenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        first_content(completion)
    }
}

fn first_content(completion: ChatCompletionResponse) -> Result<String, TextGenerationError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(TextGenerationError::EmptyResponse)
}

pub const SYSTEM_INSTRUCTIONS: &str = "You are a local travel logistics guide. \
Write practical, realistic itineraries that only recommend real, well-established venues. \
Wrap the exact name of every venue you recommend in double asterisks, like **Mercado Municipal**, \
and never use double asterisks for anything else: no bold headings, labels, times or tips. \
Put each stop on its own line, starting with its time.";

/// User message describing the trip. `now` is the traveller's local time.
pub fn build_user_context(ctx: &TripContext, now: NaiveDateTime) -> String {
    let mut lines = vec![
        format!("Destination: {}", ctx.locality.trim()),
        format!("Today is {}, {}.", now.format("%A"), now.format("%H:%M")),
        format!("Trip length: {}", ctx.duration),
        format!("Getting around: {}", ctx.transport.as_str()),
        format!("Travelling as: {}", ctx.group.as_str()),
        format!("Budget: {}", ctx.budget.as_str()),
    ];

    if !ctx.vibes.is_empty() {
        let vibes: Vec<&str> = ctx.vibes.iter().map(String::as_str).collect();
        lines.push(format!("Interests: {}", vibes.join(", ")));
    }
    if ctx.pet_friendly {
        lines.push("Travelling with a pet: only suggest pet-friendly places.".to_string());
    }
    if let Some(notes) = ctx.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        lines.push(format!("Extra requests: {}", notes));
    }

    lines.push(
        "Plan a realistic route for this transport, naming only real, established places."
            .to_string(),
    );

    if let Some(prior) = ctx
        .prior_itinerary
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        lines.push(String::new());
        lines.push("Refine this previous itinerary according to the requests above:".to_string());
        lines.push(prior.to_string());
    }

    lines.join("\n")
}
