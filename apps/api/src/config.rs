use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

pub const DEFAULT_FAST_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ROBUST_MODEL: &str = "gemini-3-pro-preview";
/// Upstream inline data tops out near 20 MB; base64 and multipart framing add about a third.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 30 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// A missing API key is not a startup error: the pipeline reports it per call instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub fast_model: String,
    pub robust_model: String,
    pub attempt_timeout: Duration,
    pub pipeline_timeout: Duration,
    pub notify_webhook_url: Option<String>,
    /// Request body limit on the parse routes, which carry whole documents.
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let pipeline_secs = parse_or(var("PIPELINE_TIMEOUT_SECS"), 150, "PIPELINE_TIMEOUT_SECS")?;
        let attempt_secs = parse_or(var("ATTEMPT_TIMEOUT_SECS"), 60, "ATTEMPT_TIMEOUT_SECS")?;

        Ok(Config {
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            fast_model: var("FAST_MODEL").unwrap_or_else(|| DEFAULT_FAST_MODEL.to_string()),
            robust_model: var("ROBUST_MODEL").unwrap_or_else(|| DEFAULT_ROBUST_MODEL.to_string()),
            attempt_timeout: Duration::from_secs(attempt_secs.min(pipeline_secs)),
            pipeline_timeout: Duration::from_secs(pipeline_secs),
            notify_webhook_url: var("NOTIFY_WEBHOOK_URL"),
            max_upload_bytes: parse_or(
                var("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
                "MAX_UPLOAD_BYTES",
            )?,
            port: parse_or(var("PORT"), 8080, "PORT")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(raw: Option<String>, default: T, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {value}")),
        None => Ok(default),
    }
}
