use super::tts_repository::TtsRepository;
use crate::domain::tts::error::ProviderFailure;
use crate::domain::tts::model::{EncodedClip, SpeechRequest, VoiceConfig};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Sample rate Gemini TTS returns when the mime type does not say otherwise
pub const DEFAULT_PCM_SAMPLE_RATE: u32 = 24_000;

// Request body for models/{model}:generateContent

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_config: Option<PrebuiltVoice<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    multi_speaker_voice_config: Option<MultiSpeakerVoiceConfig<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoice<'a> {
    prebuilt_voice_config: VoiceName<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceName<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MultiSpeakerVoiceConfig<'a> {
    speaker_voice_configs: Vec<SpeakerVoiceConfig<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeakerVoiceConfig<'a> {
    speaker: &'a str,
    voice_config: PrebuiltVoice<'a>,
}

// Response body

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

fn prebuilt(voice: &str) -> PrebuiltVoice<'_> {
    PrebuiltVoice {
        prebuilt_voice_config: VoiceName { voice_name: voice },
    }
}

fn request_body(request: &SpeechRequest) -> GenerateContentRequest<'_> {
    let speech_config = match &request.voice {
        VoiceConfig::Single { voice } => SpeechConfig {
            voice_config: Some(prebuilt(voice)),
            multi_speaker_voice_config: None,
        },
        VoiceConfig::MultiSpeaker(speakers) => SpeechConfig {
            voice_config: None,
            multi_speaker_voice_config: Some(MultiSpeakerVoiceConfig {
                speaker_voice_configs: speakers
                    .iter()
                    .map(|s| SpeakerVoiceConfig {
                        speaker: &s.speaker,
                        voice_config: prebuilt(&s.voice),
                    })
                    .collect(),
            }),
        },
    };

    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![TextPart { text: &request.text }],
        }],
        generation_config: GenerationConfig {
            response_modalities: ["AUDIO"],
            speech_config,
        },
    }
}

/// `audio/L16;codec=pcm;rate=24000` -> 24000
///
/// A missing or unparsable rate falls back to the provider default; an
/// explicit zero rate is malformed.
fn sample_rate_from_mime(mime_type: &str) -> Result<u32, ProviderFailure> {
    let rate = mime_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_PCM_SAMPLE_RATE);

    if rate == 0 {
        return Err(ProviderFailure::MalformedResponse(format!(
            "zero sample rate in mime type {}",
            mime_type
        )));
    }
    Ok(rate)
}

/// Gemini generateContent implementation of TTS repository
pub struct GeminiTtsRepository {
    http_client: reqwest::Client,
    base_url: String,
}

impl GeminiTtsRepository {
    pub fn new(http_client: reqwest::Client, base_url: String) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn extract_audio(response: GenerateContentResponse) -> Result<EncodedClip, ProviderFailure> {
        let inline = response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.inline_data)
            .ok_or_else(|| ProviderFailure::MalformedResponse("no inline audio in response".to_string()))?;

        let raw_pcm = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| ProviderFailure::MalformedResponse(format!("invalid base64 audio: {}", e)))?;

        if raw_pcm.is_empty() {
            return Err(ProviderFailure::MalformedResponse("empty audio payload".to_string()));
        }

        Ok(EncodedClip {
            raw_pcm,
            sample_rate: sample_rate_from_mime(&inline.mime_type)?,
        })
    }
}

#[async_trait]
impl TtsRepository for GeminiTtsRepository {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn synthesize(&self, request: &SpeechRequest, api_key: &str) -> Result<EncodedClip, ProviderFailure> {
        let start_time = std::time::Instant::now();

        let response = self
            .http_client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderFailure::Timeout
                } else {
                    ProviderFailure::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let failure = ProviderFailure::from_status(status.as_u16(), &body);
            tracing::debug!(
                provider = "gemini",
                model = %request.model,
                status = status.as_u16(),
                error = %failure,
                "Gemini TTS call failed"
            );
            return Err(failure);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderFailure::MalformedResponse(e.to_string()))?;
        let clip = Self::extract_audio(body)?;

        tracing::info!(
            provider = "gemini",
            model = %request.model,
            voice = %request.voice_key(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            characters_count = request.text.chars().count(),
            pcm_bytes = clip.raw_pcm.len(),
            sample_rate = clip.sample_rate,
            "TTS synthesis completed"
        );

        Ok(clip)
    }
}
