pub mod api_key_repository;
pub mod api_key_store;
pub mod gemini_tts_repository;
pub mod in_memory_api_key_store;
pub mod storage_repository;
pub mod supabase_storage_repository;
pub mod tts_repository;

pub use api_key_repository::ApiKeyRepository;
pub use api_key_store::ApiKeyStore;
pub use gemini_tts_repository::GeminiTtsRepository;
pub use in_memory_api_key_store::InMemoryApiKeyStore;
pub use storage_repository::{StorageError, StorageRepository};
pub use supabase_storage_repository::SupabaseStorageRepository;
pub use tts_repository::TtsRepository;
