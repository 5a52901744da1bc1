pub mod dto;
pub mod error;
pub mod hash;
pub mod model;
pub mod publisher;
pub mod retry;
pub mod scheduler;
pub mod service;
pub mod voice;

pub use error::{ProviderFailure, SynthesisError};
pub use hash::content_hash;
pub use model::{ClipLocation, EncodedClip, StoredClip, SynthesisItem, VoiceSelection};
pub use retry::RetryPolicy;
pub use scheduler::CancellationFlag;
pub use service::{BatchInput, BatchResult, TtsService, TtsServiceApi, TtsServiceOptions};
pub use voice::VoiceCatalog;
