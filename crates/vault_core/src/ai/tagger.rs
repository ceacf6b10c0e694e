//! Tagger contract and the Gemini HTTP implementation.

use crate::config::AiConfig;
use crate::service::taxonomy_service::{Taxonomy, TaxonomyList};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Structured suggestion returned by a tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSuggestion {
    pub category: String,
    pub domain: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug)]
pub enum TaggerError {
    MissingApiKey,
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
    EmptyResponse,
    Parse(serde_json::Error),
}

impl Display for TaggerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "no API key configured for the tagger"),
            Self::Transport(err) => write!(f, "tagger request failed: {err}"),
            Self::Status { status, body } => {
                write!(f, "tagger returned status {status}: {body}")
            }
            Self::EmptyResponse => write!(f, "tagger response had no candidate text"),
            Self::Parse(err) => write!(f, "tagger response is not a suggestion: {err}"),
        }
    }
}

impl Error for TaggerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TaggerError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// External classifier for material text.
///
/// `taxonomy` carries the names the suggestion should be chosen from.
#[async_trait]
pub trait MaterialTagger: Send + Sync {
    async fn suggest(
        &self,
        text: &str,
        taxonomy: &Taxonomy,
    ) -> Result<TagSuggestion, TaggerError>;
}

/// Gemini `generateContent` client with a JSON response schema.
#[derive(Debug, Clone)]
pub struct GeminiTagger {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiTagger {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, TaggerError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TaggerError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client,
        })
    }

    pub fn from_config(config: &AiConfig) -> Result<Self, TaggerError> {
        Self::new(
            config.endpoint.as_str(),
            config.model.as_str(),
            config.api_key.clone().unwrap_or_default(),
            config.timeout(),
        )
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl MaterialTagger for GeminiTagger {
    async fn suggest(
        &self,
        text: &str,
        taxonomy: &Taxonomy,
    ) -> Result<TagSuggestion, TaggerError> {
        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request_body(text, taxonomy))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TaggerError::Status {
                status,
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        parse_generate_response(&body)
    }
}

fn request_body(text: &str, taxonomy: &Taxonomy) -> Value {
    let category_hint = one_of("分类", &taxonomy.categories);
    let domain_hint = one_of("领域", &taxonomy.domains);
    let prompt = format!(
        "请分析以下素材内容，并返回其对应的分类、领域和相关标签。\n素材内容: \"{text}\""
    );
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "category": { "type": "STRING", "description": category_hint },
                    "domain": { "type": "STRING", "description": domain_hint },
                    "tags": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "3-5个描述性的关键词标签"
                    }
                },
                "required": ["category", "domain", "tags"]
            }
        }
    })
}

// Schema description listing the allowed values, e.g. `分类，必须是以下之一: 案例, 人物`.
fn one_of(label: &str, names: &TaxonomyList) -> String {
    if names.is_empty() {
        return label.to_string();
    }
    let joined = names.iter().collect::<Vec<_>>().join(", ");
    format!("{label}，必须是以下之一: {joined}")
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Extracts the suggestion from a `generateContent` response body.
pub fn parse_generate_response(body: &str) -> Result<TagSuggestion, TaggerError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(TaggerError::Parse)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(TaggerError::EmptyResponse);
    }
    serde_json::from_str(strip_code_fence(&text)).map_err(TaggerError::Parse)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}
