use crate::domain::audio::AudioFormat;
use crate::domain::tts::{RetryPolicy, TtsServiceOptions};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Credential store; optional when keys come from `GEMINI_API_KEYS`
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Speech provider
    pub gemini_base_url: String,
    pub gemini_tts_model: String,
    pub gemini_api_keys: Vec<String>,
    pub tts_key_provider: String,
    // Object storage
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub supabase_storage_bucket: String,
    // Pipeline
    pub tts_concurrency: usize,
    pub tts_max_retries: u32,
    pub tts_backoff_base_ms: u64,
    pub tts_backoff_max_ms: u64,
    pub http_timeout_secs: u64,
    pub tts_output_format: AudioFormat,
    // TTS Cache
    pub tts_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| lookup(key).ok_or_else(|| format!("{} must be set", key));

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let gemini_api_keys: Vec<String> = lookup("GEMINI_API_KEYS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if database_url.is_none() && gemini_api_keys.is_empty() {
            return Err("either DATABASE_URL or GEMINI_API_KEYS must be set".into());
        }

        let config = Config {
            database_url,
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "8080").parse()?,
            environment: match var("ENVIRONMENT", "development").as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match var("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            gemini_base_url: var("GEMINI_BASE_URL", "https://generativelanguage.googleapis.com"),
            gemini_tts_model: var("GEMINI_TTS_MODEL", "gemini-2.5-flash-preview-tts"),
            gemini_api_keys,
            tts_key_provider: var("TTS_KEY_PROVIDER", "gemini"),
            supabase_url: required("SUPABASE_URL")?,
            supabase_service_key: required("SUPABASE_SERVICE_KEY")?,
            supabase_storage_bucket: var("SUPABASE_STORAGE_BUCKET", "audio"),
            tts_concurrency: var("TTS_CONCURRENCY", "3").parse()?,
            tts_max_retries: var("TTS_MAX_RETRIES", "3").parse()?,
            tts_backoff_base_ms: var("TTS_BACKOFF_BASE_MS", "1000").parse()?,
            tts_backoff_max_ms: var("TTS_BACKOFF_MAX_MS", "16000").parse()?,
            http_timeout_secs: var("HTTP_TIMEOUT_SECS", "30").parse()?,
            tts_output_format: var("TTS_OUTPUT_FORMAT", "wav").parse()?,
            tts_cache_enabled: var("TTS_CACHE_ENABLED", "false").to_lowercase() == "true",
        };

        if config.tts_concurrency == 0 {
            return Err("TTS_CONCURRENCY must be at least 1".into());
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Default `EnvFilter` directives when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_development() {
            "exam_audio=debug,tower_http=debug"
        } else {
            "exam_audio=info,tower_http=info"
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.tts_max_retries,
            base_delay: Duration::from_millis(self.tts_backoff_base_ms),
            max_delay: Duration::from_millis(self.tts_backoff_max_ms),
        }
    }

    pub fn service_options(&self) -> TtsServiceOptions {
        TtsServiceOptions {
            concurrency: self.tts_concurrency,
            retry: self.retry_policy(),
            format: self.tts_output_format,
            cache_enabled: self.tts_cache_enabled,
        }
    }
}
