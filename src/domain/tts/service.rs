use super::error::SynthesisError;
use super::hash::content_hash;
use super::model::{ClipLocation, StoredClip, SynthesisItem, VoiceSelection};
use super::publisher::{storage_path, StoragePublisher};
use super::retry::{RetryController, RetryPolicy};
use super::scheduler::{CancellationFlag, ItemOutcome, Scheduler};
use super::voice::VoiceCatalog;
use crate::domain::audio::AudioFormat;
use crate::domain::keys::{KeyPoolManager, SharedKeyPool};
use crate::infrastructure::repositories::{StorageRepository, TtsRepository};
use async_trait::async_trait;
use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BatchInput {
    pub items: Vec<SynthesisItem>,
    pub voice: VoiceSelection,
    /// Storage folder the clips are published under
    pub directory: String,
}

#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub item_key: String,
    pub error: SynthesisError,
}

/// Per-item outcome of a batch that was not aborted.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub clips: Vec<StoredClip>,
    pub failures: Vec<ItemFailure>,
    pub requested: usize,
}

impl BatchResult {
    pub fn generated(&self) -> usize {
        self.clips.len()
    }
}

#[derive(Debug, Clone)]
struct CachedClip {
    url: String,
    sample_rate: u32,
}

/// Service-level knobs that come from configuration.
#[derive(Debug, Clone, Copy)]
pub struct TtsServiceOptions {
    pub concurrency: usize,
    pub retry: RetryPolicy,
    pub format: AudioFormat,
    pub cache_enabled: bool,
}

impl Default for TtsServiceOptions {
    fn default() -> Self {
        Self {
            concurrency: 3,
            retry: RetryPolicy::default(),
            format: AudioFormat::Wav,
            cache_enabled: false,
        }
    }
}

pub struct TtsService {
    key_manager: Arc<KeyPoolManager>,
    controller: RetryController,
    publisher: StoragePublisher,
    catalog: VoiceCatalog,
    scheduler: Scheduler,
    format: AudioFormat,
    cache: Option<Cache<String, CachedClip>>,
}

impl TtsService {
    pub fn new(
        key_manager: Arc<KeyPoolManager>,
        provider: Arc<dyn TtsRepository>,
        storage: Arc<dyn StorageRepository>,
        catalog: VoiceCatalog,
        options: TtsServiceOptions,
    ) -> Self {
        // Initialize cache if enabled
        let cache = if options.cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(1_000)
                    .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                    .build(),
            )
        } else {
            None
        };

        Self {
            controller: RetryController::new(provider, key_manager.clone(), options.retry),
            key_manager,
            publisher: StoragePublisher::new(storage),
            catalog,
            scheduler: Scheduler::new(options.concurrency),
            format: options.format,
            cache,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize and publish every item of a batch
    ///
    /// This operation:
    /// - Validates the voice selection against the catalog
    /// - Loads a fresh key pool for this batch
    /// - Runs items through the scheduler with bounded concurrency
    /// - Encodes and publishes each clip, deduplicated by content hash
    ///
    /// Per-item failures are part of the result. Only pool exhaustion
    /// (or an invalid voice selection) fails the whole batch.
    async fn synthesize_batch(
        &self,
        input: BatchInput,
        cancel: CancellationFlag,
    ) -> Result<BatchResult, SynthesisError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn synthesize_batch(
        &self,
        input: BatchInput,
        cancel: CancellationFlag,
    ) -> Result<BatchResult, SynthesisError> {
        let start_time = std::time::Instant::now();
        let requested = input.items.len();
        let selection = self.catalog.validate_selection(&input.voice)?;

        tracing::info!(
            requested = requested,
            directory = %input.directory,
            primary_voice = %selection.primary_voice,
            secondary_voice = ?selection.secondary_voice,
            format = %self.format,
            concurrency = self.scheduler.concurrency(),
            "TTS batch started"
        );

        let pool = self.key_manager.load().await?;
        if pool.is_empty() {
            return Err(SynthesisError::NoKeysAvailable(
                self.key_manager.provider().to_string(),
            ));
        }
        let pool = pool.shared();

        let order: HashMap<String, usize> = input
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.item_key.clone(), i))
            .collect();

        let (pool_ref, selection_ref, directory) = (&pool, &selection, input.directory.as_str());
        let (mut outcomes, fatal) = self
            .scheduler
            .run(input.items, &cancel, move |item| {
                self.process_item(pool_ref, selection_ref, directory, item)
            })
            .await;

        if let Some(error) = fatal {
            tracing::error!(
                requested = requested,
                completed = outcomes.iter().filter(|o| o.result.is_ok()).count(),
                error = %error,
                "TTS batch aborted"
            );
            return Err(error);
        }

        outcomes.sort_by_key(|o| order.get(&o.item_key).copied().unwrap_or(usize::MAX));

        let mut clips = Vec::new();
        let mut failures = Vec::new();
        for ItemOutcome { item_key, result } in outcomes {
            match result {
                Ok(clip) => clips.push(clip),
                Err(error) => failures.push(ItemFailure { item_key, error }),
            }
        }

        let result = BatchResult {
            clips,
            failures,
            requested,
        };

        tracing::info!(
            requested = requested,
            generated = result.generated(),
            failed = result.failures.len(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "TTS batch completed: {} of {} clips generated",
            result.generated(),
            requested
        );

        Ok(result)
    }
}

impl TtsService {
    async fn process_item(
        &self,
        pool: &SharedKeyPool,
        selection: &VoiceSelection,
        directory: &str,
        item: SynthesisItem,
    ) -> Result<StoredClip, SynthesisError> {
        let request = self.catalog.build_request(&item.text, selection)?;
        let hash = content_hash(&item.text, &request.voice_key());
        let path = storage_path(directory, &hash, self.format);
        let cache_key = format!("{}:{}", self.format, path);

        // Check cache first (if enabled)
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&cache_key).await {
                tracing::info!(
                    item_key = %item.item_key,
                    path = %path,
                    "TTS cache hit - reusing published clip"
                );
                return Ok(StoredClip {
                    item_key: item.item_key,
                    text: item.text,
                    sample_rate: cached.sample_rate,
                    location: ClipLocation::Url(cached.url),
                });
            }
        }

        let clip = self.controller.synthesize(pool, &request, &item.item_key).await?;

        let format = self.format;
        let source_rate = clip.sample_rate;
        let bytes = tokio::task::spawn_blocking(move || format.encode(&clip.raw_pcm, source_rate))
            .await
            .map_err(|e| SynthesisError::Encoding(e.to_string()))?
            .map_err(|e| SynthesisError::Encoding(e.to_string()))?;
        let sample_rate = format.output_sample_rate(source_rate);

        let location = self.publisher.publish(&path, bytes, format).await;

        if let (Some(cache), ClipLocation::Url(url)) = (&self.cache, &location) {
            cache
                .insert(
                    cache_key,
                    CachedClip {
                        url: url.clone(),
                        sample_rate,
                    },
                )
                .await;
        }

        tracing::info!(
            item_key = %item.item_key,
            path = %path,
            sample_rate = sample_rate,
            uploaded = matches!(location, ClipLocation::Url(_)),
            "Clip published"
        );

        Ok(StoredClip {
            item_key: item.item_key,
            text: item.text,
            sample_rate,
            location,
        })
    }
}
