use axum::{extract::State, Extension, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    domain::tts::{
        dto::{BatchRequest, BatchResponse},
        BatchInput, CancellationFlag, TtsServiceApi, VoiceSelection,
    },
    error::{AppError, AppResult},
    infrastructure::http::RequestId,
};

pub const MAX_BATCH_ITEMS: usize = 50;
pub const MAX_TEXT_CHARS: usize = 5_000;
pub const DEFAULT_DIRECTORY: &str = "tts";

/// Slash-separated path segments of `[A-Za-z0-9_-]`
static DIRECTORY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+(/[A-Za-z0-9_-]+)*$").unwrap());

pub struct TtsController {
    tts_service: Arc<dyn TtsServiceApi>,
}

impl TtsController {
    pub fn new(tts_service: Arc<dyn TtsServiceApi>) -> Self {
        Self { tts_service }
    }

    /// POST /api/tts/batch - Synthesize and publish a batch of clips
    ///
    /// The batch runs with a flag nobody cancels: a client that disconnects
    /// drops this handler, and with it every in-flight provider call.
    /// `CancellationFlag` is for callers that drive `TtsServiceApi` directly.
    pub async fn synthesize_batch(
        State(controller): State<Arc<TtsController>>,
        request_id: Option<Extension<RequestId>>,
        Json(request): Json<BatchRequest>,
    ) -> AppResult<Json<BatchResponse>> {
        let input = validate(request)?;

        tracing::info!(
            request_id = request_id.as_ref().map(|Extension(id)| id.0.as_str()).unwrap_or("-"),
            items = input.items.len(),
            directory = %input.directory,
            "TTS batch request"
        );

        let result = controller
            .tts_service
            .synthesize_batch(input, CancellationFlag::new())
            .await
            .map_err(AppError::from)?;

        Ok(Json(BatchResponse::from(result)))
    }
}

fn normalize_directory(directory: Option<&str>) -> AppResult<String> {
    let directory = directory.map(|d| d.trim().trim_matches('/')).unwrap_or("");
    if directory.is_empty() {
        return Ok(DEFAULT_DIRECTORY.to_string());
    }
    if !DIRECTORY_PATTERN.is_match(directory) {
        return Err(AppError::BadRequest(format!(
            "Invalid directory '{}': use letters, digits, '-', '_' and '/'",
            directory
        )));
    }
    Ok(directory.to_string())
}

fn validate(request: BatchRequest) -> AppResult<BatchInput> {
    if request.items.is_empty() {
        return Err(AppError::BadRequest("Batch must contain at least one item".to_string()));
    }
    if request.items.len() > MAX_BATCH_ITEMS {
        return Err(AppError::PayloadTooLarge(format!(
            "Batch must contain {} items or less",
            MAX_BATCH_ITEMS
        )));
    }

    let primary = request.voice.trim();
    if primary.is_empty() {
        return Err(AppError::BadRequest("Voice cannot be empty".to_string()));
    }

    let mut seen = HashSet::new();
    for item in &request.items {
        if item.item_key.trim().is_empty() {
            return Err(AppError::BadRequest("itemKey cannot be empty".to_string()));
        }
        if !seen.insert(item.item_key.as_str()) {
            return Err(AppError::BadRequest(format!("Duplicate itemKey '{}'", item.item_key)));
        }
        if item.text.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "Text for '{}' cannot be empty",
                item.item_key
            )));
        }
        if item.text.chars().count() > MAX_TEXT_CHARS {
            return Err(AppError::PayloadTooLarge(format!(
                "Text for '{}' must be {} characters or less",
                item.item_key, MAX_TEXT_CHARS
            )));
        }
    }

    let voice = match request.secondary_voice.as_deref().map(str::trim) {
        Some(secondary) if !secondary.is_empty() => VoiceSelection::dialogue(primary, secondary),
        _ => VoiceSelection::single(primary),
    };
    let directory = normalize_directory(request.directory.as_deref())?;

    Ok(BatchInput {
        items: request.items,
        voice,
        directory,
    })
}
