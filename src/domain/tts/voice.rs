use super::error::SynthesisError;
use super::model::{SpeakerVoice, SpeechRequest, VoiceConfig, VoiceSelection};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Female,
    Male,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub name: String,
    pub gender: VoiceGender,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub name: String,
    /// Maximum number of distinct speakers in one request
    pub max_speakers: usize,
}

/// Gemini prebuilt voices: (name, gender, style)
const GEMINI_VOICES: &[(&str, VoiceGender, &str)] = &[
    ("Zephyr", VoiceGender::Female, "bright"),
    ("Puck", VoiceGender::Male, "upbeat"),
    ("Charon", VoiceGender::Male, "informative"),
    ("Kore", VoiceGender::Female, "firm"),
    ("Fenrir", VoiceGender::Male, "excitable"),
    ("Leda", VoiceGender::Female, "youthful"),
    ("Orus", VoiceGender::Male, "firm"),
    ("Aoede", VoiceGender::Female, "breezy"),
    ("Callirrhoe", VoiceGender::Female, "easy-going"),
    ("Autonoe", VoiceGender::Female, "bright"),
    ("Enceladus", VoiceGender::Male, "breathy"),
    ("Iapetus", VoiceGender::Male, "clear"),
    ("Umbriel", VoiceGender::Male, "easy-going"),
    ("Algieba", VoiceGender::Male, "smooth"),
    ("Despina", VoiceGender::Female, "smooth"),
    ("Erinome", VoiceGender::Female, "clear"),
    ("Algenib", VoiceGender::Male, "gravelly"),
    ("Rasalgethi", VoiceGender::Male, "informative"),
    ("Laomedeia", VoiceGender::Female, "upbeat"),
    ("Achernar", VoiceGender::Female, "soft"),
    ("Alnilam", VoiceGender::Male, "firm"),
    ("Schedar", VoiceGender::Male, "even"),
    ("Gacrux", VoiceGender::Female, "mature"),
    ("Pulcherrima", VoiceGender::Female, "forward"),
    ("Achird", VoiceGender::Male, "friendly"),
    ("Zubenelgenubi", VoiceGender::Male, "casual"),
    ("Vindemiatrix", VoiceGender::Female, "gentle"),
    ("Sadachbia", VoiceGender::Male, "lively"),
    ("Sadaltager", VoiceGender::Male, "knowledgeable"),
    ("Sulafat", VoiceGender::Female, "warm"),
];

const GEMINI_TTS_MODELS: &[(&str, usize)] = &[
    ("gemini-2.5-flash-preview-tts", 2),
    ("gemini-2.5-pro-preview-tts", 2),
];

/// A `Label:` prefix at the start of a line, e.g. `Examiner: ...`
static SPEAKER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*([A-Z][A-Za-z0-9 .'-]{0,30}?)\s*:\s+\S").unwrap());

/// Distinct speaker labels in order of first appearance.
pub fn detect_speakers(text: &str) -> Vec<String> {
    let mut speakers: Vec<String> = Vec::new();
    for captures in SPEAKER_LINE.captures_iter(text) {
        let label = captures[1].trim().to_string();
        if !speakers.contains(&label) {
            speakers.push(label);
        }
    }
    speakers
}

/// Voice and model capabilities available to the pipeline.
///
/// Models are listed in preference order; the first one that can serve the
/// requested number of speakers is used.
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: Vec<VoiceProfile>,
    models: Vec<ModelProfile>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<VoiceProfile>, models: Vec<ModelProfile>) -> Self {
        Self { voices, models }
    }

    /// Built-in Gemini catalog with `preferred_model` tried first.
    pub fn gemini(preferred_model: &str) -> Self {
        let voices = GEMINI_VOICES
            .iter()
            .map(|(name, gender, style)| VoiceProfile {
                name: name.to_string(),
                gender: *gender,
                style: style.to_string(),
            })
            .collect();

        let mut models: Vec<ModelProfile> = GEMINI_TTS_MODELS
            .iter()
            .map(|(name, max_speakers)| ModelProfile {
                name: name.to_string(),
                max_speakers: *max_speakers,
            })
            .collect();

        match models.iter().position(|m| m.name == preferred_model) {
            Some(position) => {
                let preferred = models.remove(position);
                models.insert(0, preferred);
            }
            None => models.insert(
                0,
                ModelProfile {
                    name: preferred_model.to_string(),
                    max_speakers: 2,
                },
            ),
        }

        Self::new(voices, models)
    }

    /// Case-insensitive voice lookup
    pub fn voice(&self, name: &str) -> Option<&VoiceProfile> {
        let name = name.trim();
        self.voices.iter().find(|v| v.name.eq_ignore_ascii_case(name))
    }

    pub fn model_for(&self, speakers: usize) -> Option<&ModelProfile> {
        self.models.iter().find(|m| m.max_speakers >= speakers)
    }

    fn canonical_voice(&self, name: &str) -> Result<String, SynthesisError> {
        self.voice(name)
            .map(|v| v.name.clone())
            .ok_or_else(|| SynthesisError::Invalid(format!("unknown voice: {}", name)))
    }

    /// Resolve voice names to their catalog spelling and check dialogue voices differ.
    pub fn validate_selection(&self, selection: &VoiceSelection) -> Result<VoiceSelection, SynthesisError> {
        let primary = self.canonical_voice(&selection.primary_voice)?;
        let secondary = match &selection.secondary_voice {
            Some(name) if !name.trim().is_empty() => {
                let secondary = self.canonical_voice(name)?;
                if secondary == primary {
                    return Err(SynthesisError::Invalid(
                        "dialogue voices must be distinct".to_string(),
                    ));
                }
                Some(secondary)
            }
            _ => None,
        };

        Ok(VoiceSelection {
            primary_voice: primary,
            secondary_voice: secondary,
        })
    }

    /// Build the provider call for one text.
    ///
    /// Multi-speaker synthesis is used when a secondary voice is selected and
    /// the text has at least two `Speaker:` labels; the first label gets the
    /// primary voice, the second the secondary. Anything else is read by the
    /// primary voice alone.
    pub fn build_request(&self, text: &str, selection: &VoiceSelection) -> Result<SpeechRequest, SynthesisError> {
        let speakers = detect_speakers(text);

        let voice = match &selection.secondary_voice {
            Some(secondary) if speakers.len() >= 2 => {
                if speakers.len() > 2 {
                    return Err(SynthesisError::Invalid(format!(
                        "dialogue has {} speakers, at most 2 are supported",
                        speakers.len()
                    )));
                }
                VoiceConfig::MultiSpeaker(vec![
                    SpeakerVoice {
                        speaker: speakers[0].clone(),
                        voice: selection.primary_voice.clone(),
                    },
                    SpeakerVoice {
                        speaker: speakers[1].clone(),
                        voice: secondary.clone(),
                    },
                ])
            }
            _ => VoiceConfig::Single {
                voice: selection.primary_voice.clone(),
            },
        };

        let speaker_count = match &voice {
            VoiceConfig::Single { .. } => 1,
            VoiceConfig::MultiSpeaker(speakers) => speakers.len(),
        };
        let model = self.model_for(speaker_count).ok_or_else(|| {
            SynthesisError::Invalid(format!("no model supports {} speakers", speaker_count))
        })?;

        Ok(SpeechRequest {
            model: model.name.clone(),
            text: text.to_string(),
            voice,
        })
    }
}
