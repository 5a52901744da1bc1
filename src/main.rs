use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use exam_audio::controllers::tts::TtsController;
use exam_audio::domain::keys::KeyPoolManager;
use exam_audio::domain::tts::{TtsService, VoiceCatalog};
use exam_audio::infrastructure::config::{Config, LogFormat};
use exam_audio::infrastructure::db::{check_connection, create_pool, run_migrations};
use exam_audio::infrastructure::http::start_http_server;
use exam_audio::infrastructure::repositories::{
    ApiKeyRepository, ApiKeyStore, GeminiTtsRepository, InMemoryApiKeyStore, SupabaseStorageRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Exam Audio service on {}:{}",
        config.host,
        config.port
    );

    // Credential store: env keys take precedence over the database
    let pool = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url).await?;
            check_connection(&pool).await?;
            run_migrations(&pool).await?;
            tracing::info!("Database connection verified and migrations applied");
            Some(Arc::new(pool))
        }
        None => None,
    };

    let key_store: Arc<dyn ApiKeyStore> = match (&pool, config.gemini_api_keys.is_empty()) {
        (_, false) => {
            tracing::info!(
                key_count = config.gemini_api_keys.len(),
                "Using API keys from GEMINI_API_KEYS"
            );
            Arc::new(InMemoryApiKeyStore::from_secrets(
                &config.tts_key_provider,
                &config.gemini_api_keys,
            ))
        }
        (Some(pool), true) => Arc::new(ApiKeyRepository::new(pool.clone())),
        (None, true) => return Err("no credential store configured".into()),
    };

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories (shared HTTP client with an explicit timeout)
    tracing::info!("Instantiating repositories...");
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()?;
    let tts_repo = Arc::new(GeminiTtsRepository::new(
        http_client.clone(),
        config.gemini_base_url.clone(),
    ));
    let storage_repo = Arc::new(SupabaseStorageRepository::new(
        http_client,
        config.supabase_url.clone(),
        config.supabase_service_key.clone(),
        config.supabase_storage_bucket.clone(),
    ));

    // 2. Instantiate services
    tracing::info!("Instantiating services...");
    let key_manager = Arc::new(KeyPoolManager::new(key_store, config.tts_key_provider.clone()));
    let tts_service = Arc::new(TtsService::new(
        key_manager,
        tts_repo,
        storage_repo,
        VoiceCatalog::gemini(&config.gemini_tts_model),
        config.service_options(),
    ));

    // 3. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let tts_controller = Arc::new(TtsController::new(tts_service));

    // Start HTTP server with all routes
    start_http_server(config, pool, tts_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| config.default_log_filter().into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| config.default_log_filter().into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
