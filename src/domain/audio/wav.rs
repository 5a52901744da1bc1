use super::{even_pcm, mulaw, pcm_samples, resample::resample_linear, CodecError};

pub const WAV_HEADER_LEN: usize = 44;

pub const FORMAT_PCM: u16 = 1;
pub const FORMAT_MULAW: u16 = 7;

/// Fields of the canonical 44-byte RIFF/WAVE header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavHeader {
    fn mono(audio_format: u16, sample_rate: u32, bits_per_sample: u16, data_len: u32) -> Self {
        let block_align = bits_per_sample / 8;
        Self {
            audio_format,
            channels: 1,
            sample_rate,
            byte_rate: sample_rate * block_align as u32,
            block_align,
            bits_per_sample,
            data_len,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + self.data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&self.audio_format.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&self.byte_rate.to_le_bytes());
        out.extend_from_slice(&self.block_align.to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&self.data_len.to_le_bytes());
    }
}

fn container(header: WavHeader, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WAV_HEADER_LEN + payload.len());
    header.write_to(&mut out);
    out.extend_from_slice(payload);
    out
}

/// Wrap 16-bit mono PCM in a WAV container. The payload is copied unmodified.
pub fn encode_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let payload = even_pcm(pcm);
    let header = WavHeader::mono(FORMAT_PCM, sample_rate, 16, payload.len() as u32);
    container(header, payload)
}

/// µ-law WAV (format tag 7, 8 bits per sample), optionally resampled first.
pub fn encode_mulaw_wav(pcm: &[u8], sample_rate: u32, target_sample_rate: Option<u32>) -> Vec<u8> {
    let samples = pcm_samples(pcm);
    let (samples, output_rate) = match target_sample_rate {
        Some(target) if target != sample_rate => (resample_linear(&samples, sample_rate, target), target),
        _ => (samples, sample_rate),
    };

    let payload = mulaw::encode_samples(&samples);
    let header = WavHeader::mono(FORMAT_MULAW, output_rate, 8, payload.len() as u32);
    container(header, &payload)
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Parse a canonical 44-byte header and return it with the data payload.
pub fn split_wav(bytes: &[u8]) -> Result<(WavHeader, &[u8]), CodecError> {
    if bytes.len() < WAV_HEADER_LEN {
        return Err(CodecError::InvalidWav(format!(
            "expected at least {} bytes, got {}",
            WAV_HEADER_LEN,
            bytes.len()
        )));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(CodecError::InvalidWav("missing RIFF/WAVE magic".to_string()));
    }
    if &bytes[12..16] != b"fmt " || &bytes[36..40] != b"data" {
        return Err(CodecError::InvalidWav("non-canonical chunk layout".to_string()));
    }

    let header = WavHeader {
        audio_format: read_u16(bytes, 20),
        channels: read_u16(bytes, 22),
        sample_rate: read_u32(bytes, 24),
        byte_rate: read_u32(bytes, 28),
        block_align: read_u16(bytes, 32),
        bits_per_sample: read_u16(bytes, 34),
        data_len: read_u32(bytes, 40),
    };

    let end = WAV_HEADER_LEN + header.data_len as usize;
    if bytes.len() < end {
        return Err(CodecError::InvalidWav(format!(
            "data chunk declares {} bytes but only {} present",
            header.data_len,
            bytes.len() - WAV_HEADER_LEN
        )));
    }

    Ok((header, &bytes[WAV_HEADER_LEN..end]))
}

pub fn decode_wav_header(bytes: &[u8]) -> Result<WavHeader, CodecError> {
    split_wav(bytes).map(|(header, _)| header)
}
