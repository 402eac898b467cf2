//! Gemini provider over the generateContent REST API.
//!
//! Text capabilities (rank, plan, style, critique) use the configured text
//! model; rendering uses the image model and returns the first inline image
//! part, base64-decoded. HTTP 408/429/5xx and connection errors map to
//! transient failures; other non-success statuses are permanent.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::ReferenceExample;
use crate::domain::{Critique, GenerationRequest};

use super::{prompts, ExampleScore, Provider, ProviderError};

pub struct GeminiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

fn text_part(text: String) -> Part {
    Part {
        text: Some(text),
        inline_data: None,
    }
}

fn image_part(bytes: &[u8]) -> Part {
    Part {
        text: None,
        inline_data: Some(InlineData {
            mime_type: "image/png".to_string(),
            data: BASE64.encode(bytes),
        }),
    }
}

#[derive(Deserialize)]
struct RankResponse {
    #[serde(default)]
    scores: Vec<ExampleScore>,
}

#[derive(Deserialize)]
struct CritiqueResponse {
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    revised_description: Option<String>,
}

fn parse_rank(text: &str) -> Result<Vec<ExampleScore>, ProviderError> {
    serde_json::from_str::<RankResponse>(text)
        .map(|r| r.scores)
        .map_err(|e| ProviderError::Permanent(format!("malformed rank response: {e}")))
}

/// Parse a critique response; an unparseable reply degrades to acceptance
/// rather than failing the round.
fn parse_critique(text: &str) -> Critique {
    match serde_json::from_str::<CritiqueResponse>(text) {
        Ok(parsed) => Critique::from_suggestions(parsed.suggestions, parsed.revised_description),
        Err(e) => {
            warn!(error = %e, "unparseable critique response, treating as accept");
            Critique::accept()
        }
    }
}

impl GeminiProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            text_model: text_model.into(),
            image_model: image_model.into(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate(
        &self,
        model: &str,
        parts: Vec<Part>,
        config: Option<GenerationConfig>,
    ) -> Result<Content, ProviderError> {
        let body = GenerateBody {
            contents: vec![Content { parts }],
            generation_config: config,
        };

        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transient(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let cause = format!(
                "HTTP {status}: {}",
                detail.chars().take(200).collect::<String>()
            );
            return Err(
                if status.as_u16() == 408 || status.as_u16() == 429 || status.is_server_error() {
                    ProviderError::Transient(cause)
                } else {
                    ProviderError::Permanent(cause)
                },
            );
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Permanent(format!("malformed response body: {e}")))?;

        debug!(model, "provider call succeeded");
        parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content)
            .ok_or_else(|| ProviderError::Permanent("response contained no candidates".to_string()))
    }

    async fn generate_text(&self, parts: Vec<Part>, json_mode: bool) -> Result<String, ProviderError> {
        let config = GenerationConfig {
            temperature: Some(0.3),
            response_mime_type: json_mode.then(|| "application/json".to_string()),
        };

        let content = self.generate(&self.text_model, parts, Some(config)).await?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();

        if text.trim().is_empty() {
            Err(ProviderError::Permanent(
                "response contained no text".to_string(),
            ))
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn rank_examples(
        &self,
        request: &GenerationRequest,
        candidates: &[ReferenceExample],
    ) -> Result<Vec<ExampleScore>, ProviderError> {
        let prompt = prompts::rank(request, candidates);
        let text = self.generate_text(vec![text_part(prompt)], true).await?;
        parse_rank(&text)
    }

    async fn plan(
        &self,
        request: &GenerationRequest,
        examples: &[ReferenceExample],
    ) -> Result<String, ProviderError> {
        let prompt = prompts::plan(request, examples);
        self.generate_text(vec![text_part(prompt)], false).await
    }

    async fn style(
        &self,
        request: &GenerationRequest,
        description: &str,
    ) -> Result<String, ProviderError> {
        let prompt = prompts::style(request, description);
        self.generate_text(vec![text_part(prompt)], false).await
    }

    async fn render(
        &self,
        request: &GenerationRequest,
        description: &str,
    ) -> Result<Vec<u8>, ProviderError> {
        let prompt = prompts::render(request, description);
        let content = self
            .generate(&self.image_model, vec![text_part(prompt)], None)
            .await?;

        let inline = content
            .parts
            .into_iter()
            .find_map(|p| p.inline_data)
            .ok_or_else(|| {
                ProviderError::Permanent("render response contained no image".to_string())
            })?;

        BASE64
            .decode(inline.data.as_bytes())
            .map_err(|e| ProviderError::Permanent(format!("invalid image encoding: {e}")))
    }

    async fn critique(
        &self,
        request: &GenerationRequest,
        description: &str,
        image: &[u8],
    ) -> Result<Critique, ProviderError> {
        let prompt = prompts::critique(request, description);
        let parts = vec![image_part(image), text_part(prompt)];
        let text = self.generate_text(parts, true).await?;
        Ok(parse_critique(&text))
    }
}
