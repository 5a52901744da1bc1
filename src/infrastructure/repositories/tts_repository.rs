use crate::domain::tts::error::ProviderFailure;
use crate::domain::tts::model::{EncodedClip, SpeechRequest};
use async_trait::async_trait;

/// Repository for speech synthesis calls.
/// Abstracts the underlying TTS provider.
///
/// Implementations are responsible for:
/// - Building the provider-specific request (single or multi-speaker voice config)
/// - Extracting raw 16-bit little-endian PCM from the response
/// - Classifying every failure as a `ProviderFailure`
///
/// Retries and key rotation are NOT the repository's concern; one call is
/// exactly one HTTP request with the given key.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Synthesize one request with one API key
    ///
    /// # Arguments
    /// * `request` - Model, verbatim text and voice configuration
    /// * `api_key` - Secret to authenticate this single call
    ///
    /// # Errors
    /// Returns the classified failure; the caller decides whether to retry
    async fn synthesize(&self, request: &SpeechRequest, api_key: &str) -> Result<EncodedClip, ProviderFailure>;
}
