use anyhow::Result;
use axum::Router;
use exam_audio::controllers::tts::TtsController;
use exam_audio::domain::audio::AudioFormat;
use exam_audio::domain::keys::KeyPoolManager;
use exam_audio::domain::tts::{TtsService, VoiceCatalog};
use exam_audio::infrastructure::config::{Config, Environment, LogFormat};
use exam_audio::infrastructure::db::DbPool;
use exam_audio::infrastructure::http::create_router;
use exam_audio::infrastructure::repositories::{
    ApiKeyRepository, ApiKeyStore, GeminiTtsRepository, InMemoryApiKeyStore, SupabaseStorageRepository,
};
use once_cell::sync::Lazy;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::postgres::Postgres;
use tokio::net::TcpListener;
use wiremock::MockServer;

pub mod api_client;
pub mod assertions;
pub mod db_pool;
pub mod fixtures;
pub mod mocks;

use api_client::TestClient;
use db_pool::{DatabasePool, PooledDatabase};
use fixtures::TestFixtures;

pub const TEST_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const TEST_BUCKET: &str = "audio";

// Docker client for test containers
static DOCKER: Lazy<Cli> = Lazy::new(Cli::default);

// Shared PostgreSQL container, started by the first database-backed test
static SHARED_CONTAINER: Lazy<SharedContainer> = Lazy::new(|| SharedContainer::new());

// Global database pool
static DB_POOL: Lazy<DatabasePool> = Lazy::new(|| DatabasePool::new(SHARED_CONTAINER.port));

/// Shared container that lives for the duration of all tests
struct SharedContainer {
    _container: Container<'static, Postgres>,
    port: u16,
}

impl SharedContainer {
    fn new() -> Self {
        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);

        println!("🐳 Started shared PostgreSQL container on port {}", port);

        Self {
            _container: container,
            port,
        }
    }
}

/// Test configuration pointing at the mock servers
pub fn test_config(provider_url: &str, storage_url: &str, database_url: Option<String>) -> Config {
    Config {
        database_url,
        host: "127.0.0.1".to_string(),
        port: 0, // Will be assigned by the OS
        environment: Environment::Development,
        log_format: LogFormat::Pretty,
        gemini_base_url: provider_url.to_string(),
        gemini_tts_model: TEST_MODEL.to_string(),
        gemini_api_keys: Vec::new(),
        tts_key_provider: "gemini".to_string(),
        supabase_url: storage_url.to_string(),
        supabase_service_key: "test-service-key".to_string(),
        supabase_storage_bucket: TEST_BUCKET.to_string(),
        tts_concurrency: 3,
        tts_max_retries: 1,
        tts_backoff_base_ms: 1,
        tts_backoff_max_ms: 5,
        http_timeout_secs: 5,
        tts_output_format: AudioFormat::Wav,
        tts_cache_enabled: false, // Disable cache in tests to avoid test pollution
    }
}

/// Wire the application the same way `main` does, with the given credential store
pub fn create_app(config: &Config, key_store: Arc<dyn ApiKeyStore>, pool: Option<Arc<DbPool>>) -> Result<Router> {
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

    let key_manager = Arc::new(KeyPoolManager::new(key_store, config.tts_key_provider.clone()));
    let tts_service = Arc::new(TtsService::new(
        key_manager,
        tts_repo,
        storage_repo,
        VoiceCatalog::gemini(&config.gemini_tts_model),
        config.service_options(),
    ));
    let tts_controller = Arc::new(TtsController::new(tts_service));

    Ok(create_router(pool, tts_controller))
}

async fn serve(app: Router) -> TestClient {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait for server to be ready
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    TestClient::new(&base_url)
}

/// App backed by an in-memory key store with mocked provider and storage.
pub struct TestContext {
    pub client: TestClient,
    pub provider: MockServer,
    pub storage: MockServer,
    pub key_store: Arc<InMemoryApiKeyStore>,
    #[allow(dead_code)]
    pub config: Config,
}

impl TestContext {
    /// Start an app whose key pool holds `secrets`
    pub async fn start(secrets: &[&str]) -> Self {
        let provider = MockServer::start().await;
        let storage = MockServer::start().await;
        let config = test_config(&provider.uri(), &storage.uri(), None);

        let secrets: Vec<String> = secrets.iter().map(|s| s.to_string()).collect();
        let key_store = Arc::new(InMemoryApiKeyStore::from_secrets("gemini", &secrets));

        let app = create_app(&config, key_store.clone(), None).expect("Failed to create app");
        let client = serve(app).await;

        Self {
            client,
            provider,
            storage,
            key_store,
            config,
        }
    }

    /// Public URL the storage mock hands out for `path`
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.storage.uri(),
            TEST_BUCKET,
            path
        )
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async { TestContext::start(&["key-a"]).await }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Mock servers shut down on drop
        }
    }
}

/// App backed by the Postgres credential store.
pub struct DbTestContext {
    pub client: TestClient,
    pub provider: MockServer,
    pub storage: MockServer,
    pub pool: PgPool,
    pub fixtures: TestFixtures,
    _db: PooledDatabase,
}

impl AsyncTestContext for DbTestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            // Get a database from the shared pool
            let pooled_db = DB_POOL
                .get_database()
                .await
                .expect("Failed to get database from pool");

            let provider = MockServer::start().await;
            let storage = MockServer::start().await;
            let config = test_config(
                &provider.uri(),
                &storage.uri(),
                Some(pooled_db.database_url.clone()),
            );

            let pool = Arc::new(pooled_db.pool.clone());
            let key_store = Arc::new(ApiKeyRepository::new(pool.clone()));
            let app = create_app(&config, key_store, Some(pool)).expect("Failed to create app");
            let client = serve(app).await;

            Self {
                client,
                provider,
                storage,
                pool: pooled_db.pool.clone(),
                fixtures: TestFixtures::new(pooled_db.pool.clone()),
                _db: pooled_db,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Database cleanup happens automatically via Drop on PooledDatabase
        }
    }
}
