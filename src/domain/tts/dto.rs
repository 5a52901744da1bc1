use super::error::SynthesisError;
use super::model::{ClipLocation, StoredClip, SynthesisItem};
use super::service::{BatchResult, ItemFailure};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Request for POST /api/tts/batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub items: Vec<SynthesisItem>,
    pub voice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipDto {
    pub item_key: String,
    pub text: String,
    pub sample_rate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_audio_base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipFailureDto {
    pub item_key: String,
    pub code: String,
    pub message: String,
}

/// Response for POST /api/tts/batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub clips: Vec<ClipDto>,
    pub failures: Vec<ClipFailureDto>,
    pub requested: usize,
    pub generated: usize,
}

impl From<StoredClip> for ClipDto {
    fn from(clip: StoredClip) -> Self {
        let (url, inline_audio_base64) = match clip.location {
            ClipLocation::Url(url) => (Some(url), None),
            ClipLocation::Inline(bytes) => (None, Some(STANDARD.encode(bytes))),
        };
        Self {
            item_key: clip.item_key,
            text: clip.text,
            sample_rate: clip.sample_rate,
            url,
            inline_audio_base64,
        }
    }
}

fn failure_code(error: &SynthesisError) -> &'static str {
    match error {
        SynthesisError::Rejected(_) => "provider_rejected",
        SynthesisError::Invalid(_) => "invalid_request",
        SynthesisError::Encoding(_) => "encoding_failed",
        SynthesisError::Cancelled => "cancelled",
        SynthesisError::Aborted => "aborted",
        SynthesisError::Dependency(_) => "dependency_failed",
        SynthesisError::NoKeysAvailable(_) => "no_keys_available",
        SynthesisError::AllKeysRateLimited => "all_keys_rate_limited",
        SynthesisError::AllKeysForbidden => "all_keys_forbidden",
        SynthesisError::UpstreamUnknownFailure(_) => "upstream_failure",
    }
}

impl From<ItemFailure> for ClipFailureDto {
    fn from(failure: ItemFailure) -> Self {
        Self {
            item_key: failure.item_key,
            code: failure_code(&failure.error).to_string(),
            message: failure.error.to_string(),
        }
    }
}

impl From<BatchResult> for BatchResponse {
    fn from(result: BatchResult) -> Self {
        let generated = result.generated();
        Self {
            clips: result.clips.into_iter().map(ClipDto::from).collect(),
            failures: result.failures.into_iter().map(ClipFailureDto::from).collect(),
            requested: result.requested,
            generated,
        }
    }
}
