//! Runtime configuration, read from the environment once at startup.

use std::env;

use crate::enrichment::GeminiConfig;

/// Default port if not specified via environment variable.
pub const DEFAULT_PORT: u16 = 3000;

/// Default database path if not specified via environment variable.
pub const DEFAULT_DB_PATH: &str = "sqlite:smiles-intake.db?mode=rwc";

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub gemini: GeminiConfig,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    ///
    /// - `INTAKE_PORT`
    /// - `INTAKE_DATABASE_URL`
    /// - `GEMINI_API_KEY` (empty means every enrichment falls back)
    /// - `GEMINI_MODEL`
    /// - `GEMINI_BASE_URL`
    pub fn from_env() -> Self {
        let port = env::var("INTAKE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url =
            env::var("INTAKE_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

        let gemini = gemini_config(
            &env::var("GEMINI_API_KEY").unwrap_or_default(),
            env::var("GEMINI_MODEL").ok(),
            env::var("GEMINI_BASE_URL").ok(),
        );

        Self {
            port,
            database_url,
            gemini,
        }
    }
}

/// Default Gemini settings with any configured overrides applied.
fn gemini_config(api_key: &str, model: Option<String>, base_url: Option<String>) -> GeminiConfig {
    let mut config = GeminiConfig::new(api_key);
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    config
}
