//! AI enrichment adapter.
//!
//! Sends one request per submitted record to the Google Generative Language
//! API and parses the reply into a [`StructuredAnalysis`]. Any failure is
//! logged and replaced by [`AiAnalysis::fallback`]; callers never see an
//! error.
//!
//! # API Reference
//!
//! See: <https://ai.google.dev/api/generate-content>

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::error::EnrichError;
use crate::model::{AiAnalysis, StructuredAnalysis, UserData};

/// Base URL for the Generative Language API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Derives a case summary from a record.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Enrich one record. Never fails; failures yield the fallback analysis.
    async fn enhance(&self, record: &UserData) -> AiAnalysis;
}

/// Connection settings for [`GeminiEnricher`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiConfig {
    /// Configuration for the public endpoint and default model.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

/// Client for the `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiEnricher {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiEnricher {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.model)
        )
    }

    /// Perform the call and parse the reply, propagating every failure.
    pub async fn analyze(&self, record: &UserData) -> Result<StructuredAnalysis, EnrichError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(record)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let reply = response.json::<GenerateContentResponse>().await?;
        let text = reply.text().ok_or(EnrichError::MissingText)?;
        debug!(bytes = text.len(), "Generative-text reply received");

        parse_analysis(&text)
    }
}

#[async_trait]
impl Enricher for GeminiEnricher {
    #[instrument(skip(self, record), fields(record_id = %record.id))]
    async fn enhance(&self, record: &UserData) -> AiAnalysis {
        match self.analyze(record).await {
            Ok(analysis) => AiAnalysis::Structured(analysis),
            Err(e) => {
                warn!(error = %e, "Enrichment failed, using fallback summary");
                AiAnalysis::fallback()
            }
        }
    }
}

/// Build the pt-BR prompt for one record.
///
/// Tickets and locators are embedded as typed by the agent; the prompt asks
/// the model to handle every value they contain.
pub fn build_prompt(record: &UserData) -> String {
    format!(
        "Analise esta solicitação para a GOL/Smiles.\n\
         Operador: {operator}\n\
         Serviços: {services}\n\
         Tickets/Protocolos (múltiplos permitidos): {ticket}\n\
         Localizadores (múltiplos permitidos): {locator}\n\
         Data do Voo: {flight_date}\n\
         Observações: {narrative}\n\
         \n\
         Importante: Processe todos os localizadores e protocolos informados, não importa a quantidade.\n\
         \n\
         JSON de saída:\n\
         1. greeting: Saudação profissional para {operator} citando os localizadores {locator}.\n\
         2. professionalTitle: Título do atendimento.\n\
         3. improvedBio: Texto técnico refinado.\n\
         4. suggestedTags: 3 tags técnicas.\n\
         5. summary: Resumo direto de uma frase.",
        operator = record.operator,
        services = record.impact_types.join(", "),
        ticket = record.ticket,
        locator = record.locator,
        flight_date = record.flight_date,
        narrative = record.narrative,
    )
}

/// Output schema declared to the service. All five fields are requested;
/// [`parse_analysis`] only insists on `summary`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "greeting": { "type": "STRING" },
            "professionalTitle": { "type": "STRING" },
            "improvedBio": { "type": "STRING" },
            "suggestedTags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "summary": { "type": "STRING" }
        },
        "required": ["greeting", "professionalTitle", "improvedBio", "suggestedTags", "summary"]
    })
}

/// Parse the reply text. It must be a JSON object with a string `summary`;
/// the other fields are optional.
pub fn parse_analysis(text: &str) -> Result<StructuredAnalysis, EnrichError> {
    let value: Value = serde_json::from_str(text.trim())?;
    if !value.is_object() {
        return Err(EnrichError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
