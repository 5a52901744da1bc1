use super::{encode_mp3, encode_mulaw_wav, encode_wav, mp3::MP3_SAMPLE_RATE, CodecError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Telephony rate used for µ-law output.
pub const MULAW_SAMPLE_RATE: u32 = 8_000;

/// Output container published to storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioFormat {
    #[default]
    #[serde(rename = "wav")]
    Wav,
    #[serde(rename = "mulaw")]
    MuLawWav,
    #[serde(rename = "mp3")]
    Mp3,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::MuLawWav => "mulaw",
            AudioFormat::Mp3 => "mp3",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav | AudioFormat::MuLawWav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav | AudioFormat::MuLawWav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }

    /// Sample rate of the encoded output for a given source rate.
    pub fn output_sample_rate(&self, source_rate: u32) -> u32 {
        match self {
            AudioFormat::Wav => source_rate,
            AudioFormat::MuLawWav => MULAW_SAMPLE_RATE,
            AudioFormat::Mp3 => MP3_SAMPLE_RATE,
        }
    }

    pub fn encode(&self, pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, CodecError> {
        match self {
            AudioFormat::Wav => Ok(encode_wav(pcm, sample_rate)),
            AudioFormat::MuLawWav => Ok(encode_mulaw_wav(pcm, sample_rate, Some(MULAW_SAMPLE_RATE))),
            AudioFormat::Mp3 => encode_mp3(pcm, sample_rate),
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wav" | "pcm" => Ok(AudioFormat::Wav),
            "mulaw" | "mu-law" | "ulaw" => Ok(AudioFormat::MuLawWav),
            "mp3" | "mpeg" => Ok(AudioFormat::Mp3),
            other => Err(format!("unsupported audio format: {}", other)),
        }
    }
}
