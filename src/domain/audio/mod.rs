//! Codec layer: turns the provider's raw 16-bit little-endian mono PCM into
//! playable containers. Everything here is pure and synchronous.

pub mod format;
pub mod mp3;
pub mod mulaw;
pub mod resample;
pub mod wav;

pub use format::AudioFormat;
pub use mp3::encode_mp3;
pub use wav::{decode_wav_header, encode_mulaw_wav, encode_wav, WavHeader};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("mp3 encoder error: {0}")]
    Mp3(String),
    #[error("invalid wav data: {0}")]
    InvalidWav(String),
}

/// Interpret a byte buffer as 16-bit little-endian samples.
///
/// A trailing odd byte is dropped.
pub fn pcm_samples(pcm: &[u8]) -> Vec<i16> {
    pcm.chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Byte slice of `pcm` with any trailing odd byte removed.
pub fn even_pcm(pcm: &[u8]) -> &[u8] {
    &pcm[..pcm.len() - pcm.len() % 2]
}
