use serde::{Deserialize, Serialize};

/// One caller-supplied unit of work. `text` is spoken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisItem {
    pub item_key: String,
    pub text: String,
}

impl SynthesisItem {
    pub fn new(item_key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            item_key: item_key.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelection {
    pub primary_voice: String,
    pub secondary_voice: Option<String>,
}

impl VoiceSelection {
    pub fn single(voice: impl Into<String>) -> Self {
        Self {
            primary_voice: voice.into(),
            secondary_voice: None,
        }
    }

    pub fn dialogue(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary_voice: primary.into(),
            secondary_voice: Some(secondary.into()),
        }
    }
}

/// Raw provider output: 16-bit little-endian mono PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedClip {
    pub raw_pcm: Vec<u8>,
    pub sample_rate: u32,
}

/// Where a published clip can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipLocation {
    Url(String),
    /// Upload failed; the encoded bytes are returned directly.
    Inline(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredClip {
    pub item_key: String,
    pub text: String,
    pub sample_rate: u32,
    pub location: ClipLocation,
}

impl StoredClip {
    pub fn url(&self) -> Option<&str> {
        match &self.location {
            ClipLocation::Url(url) => Some(url),
            ClipLocation::Inline(_) => None,
        }
    }

    pub fn inline_audio(&self) -> Option<&[u8]> {
        match &self.location {
            ClipLocation::Url(_) => None,
            ClipLocation::Inline(bytes) => Some(bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerVoice {
    pub speaker: String,
    pub voice: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceConfig {
    Single { voice: String },
    MultiSpeaker(Vec<SpeakerVoice>),
}

/// A fully resolved provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub model: String,
    pub text: String,
    pub voice: VoiceConfig,
}

impl SpeechRequest {
    /// Voice discriminator used for content hashing
    pub fn voice_key(&self) -> String {
        match &self.voice {
            VoiceConfig::Single { voice } => voice.clone(),
            VoiceConfig::MultiSpeaker(speakers) => speakers
                .iter()
                .map(|s| s.voice.as_str())
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}
