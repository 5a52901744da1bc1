use super::error::{ProviderFailure, SynthesisError};
use super::model::{EncodedClip, SpeechRequest};
use crate::domain::keys::{ApiKeyRecord, KeyPoolManager, SharedKeyPool};
use crate::infrastructure::repositories::TtsRepository;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries per key after the first try
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(16_000),
        }
    }
}

impl RetryPolicy {
    /// `min(base * 2^attempt + jitter, max_delay)` with jitter in `[0, base/2)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let exponential = base_ms.saturating_mul(1u64 << attempt.min(20));
        let jitter = if base_ms > 1 {
            rand::thread_rng().gen_range(0..base_ms / 2)
        } else {
            0
        };
        Duration::from_millis(exponential.saturating_add(jitter)).min(self.max_delay)
    }
}

/// Result of one provider call.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(EncodedClip),
    Retryable(ProviderFailure),
    Fatal(ProviderFailure),
}

impl From<Result<EncodedClip, ProviderFailure>> for AttemptOutcome {
    fn from(result: Result<EncodedClip, ProviderFailure>) -> Self {
        match result {
            Ok(clip) => AttemptOutcome::Success(clip),
            Err(failure) if failure.is_retryable() => AttemptOutcome::Retryable(failure),
            Err(failure) => AttemptOutcome::Fatal(failure),
        }
    }
}

/// Result of the full retry sequence on one key.
enum KeyOutcome {
    Success(EncodedClip),
    /// Retries used up on transient failures
    Exhausted(ProviderFailure),
    /// The key is invalid
    KeyRejected(ProviderFailure),
    /// The request itself is bad; other keys would fail the same way
    ItemRejected(ProviderFailure),
}

/// Drives one item through retries on a key and failover across the pool.
pub struct RetryController {
    provider: Arc<dyn TtsRepository>,
    keys: Arc<KeyPoolManager>,
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(provider: Arc<dyn TtsRepository>, keys: Arc<KeyPoolManager>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            keys,
            policy,
        }
    }

    pub async fn synthesize(
        &self,
        pool: &SharedKeyPool,
        request: &SpeechRequest,
        item_key: &str,
    ) -> Result<EncodedClip, SynthesisError> {
        let mut tried = HashSet::new();
        let mut failures: Vec<ProviderFailure> = Vec::new();

        loop {
            let next = pool.lock().next_excluding(&tried);
            let Some(key) = next else {
                break;
            };
            tried.insert(key.id);

            match self.run_key(&key, request, item_key).await {
                KeyOutcome::Success(clip) => {
                    self.keys.report_success(&key).await;
                    tracing::debug!(
                        item_key = item_key,
                        provider = self.provider.name(),
                        key_id = %key.id,
                        keys_tried = tried.len(),
                        pcm_bytes = clip.raw_pcm.len(),
                        "Synthesis succeeded"
                    );
                    return Ok(clip);
                }
                KeyOutcome::Exhausted(failure) => {
                    tracing::warn!(
                        item_key = item_key,
                        provider = self.provider.name(),
                        key_id = %key.id,
                        error = %failure,
                        "Retries exhausted, failing over to next key"
                    );
                    self.keys.report_failure(&key, false).await;
                    failures.push(failure);
                }
                KeyOutcome::KeyRejected(failure) => {
                    tracing::warn!(
                        item_key = item_key,
                        provider = self.provider.name(),
                        key_id = %key.id,
                        error = %failure,
                        "API key rejected, removing from pool"
                    );
                    self.keys.report_failure(&key, true).await;
                    pool.lock().retire(key.id);
                    failures.push(failure);
                }
                KeyOutcome::ItemRejected(failure) => {
                    tracing::warn!(
                        item_key = item_key,
                        provider = self.provider.name(),
                        key_id = %key.id,
                        error = %failure,
                        "Provider rejected request"
                    );
                    return Err(SynthesisError::Rejected(failure.to_string()));
                }
            }
        }

        let retired = pool.lock().has_retired();
        Err(self.exhaustion_error(&failures, retired))
    }

    async fn run_key(&self, key: &ApiKeyRecord, request: &SpeechRequest, item_key: &str) -> KeyOutcome {
        let mut attempt: u32 = 0;

        loop {
            let outcome = AttemptOutcome::from(self.provider.synthesize(request, &key.secret_value).await);

            match outcome {
                AttemptOutcome::Success(clip) => return KeyOutcome::Success(clip),
                AttemptOutcome::Retryable(failure) => {
                    if attempt >= self.policy.max_retries {
                        return KeyOutcome::Exhausted(failure);
                    }
                    let delay = self.policy.backoff_delay(attempt);
                    tracing::info!(
                        item_key = item_key,
                        provider = self.provider.name(),
                        key_id = %key.id,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "Retryable provider failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                AttemptOutcome::Fatal(failure) if failure.is_key_fatal() => {
                    return KeyOutcome::KeyRejected(failure)
                }
                AttemptOutcome::Fatal(failure) => return KeyOutcome::ItemRejected(failure),
            }
        }
    }

    fn exhaustion_error(&self, failures: &[ProviderFailure], retired: bool) -> SynthesisError {
        if failures.is_empty() {
            // Nothing was tried: the pool was empty or emptied by other items.
            return if retired {
                SynthesisError::AllKeysForbidden
            } else {
                SynthesisError::NoKeysAvailable(self.keys.provider().to_string())
            };
        }

        let forbidden = |f: &ProviderFailure| f.is_key_fatal();
        let rate_limited = |f: &ProviderFailure| matches!(f, ProviderFailure::RateLimited);

        if failures.iter().all(forbidden) {
            SynthesisError::AllKeysForbidden
        } else if failures.iter().all(|f| rate_limited(f) || forbidden(f)) {
            SynthesisError::AllKeysRateLimited
        } else {
            let last = failures
                .iter()
                .rev()
                .find(|f| !rate_limited(f) && !forbidden(f))
                .map(|f| f.to_string())
                .unwrap_or_default();
            SynthesisError::UpstreamUnknownFailure(format!("{}: {}", self.provider.name(), last))
        }
    }
}
