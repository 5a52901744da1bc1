use sha2::{Digest, Sha256};

/// Digest bytes kept in the key (16 hex chars).
pub const CONTENT_HASH_BYTES: usize = 8;

/// Deterministic storage key for a `(text, voice)` pair.
///
/// Truncated SHA-256 of `text + voice`. Identical requests resolve to the
/// same stored object.
pub fn content_hash(text: &str, voice: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(voice.as_bytes());
    hex::encode(&hasher.finalize()[..CONTENT_HASH_BYTES])
}
