use super::{pcm_samples, resample::resample_linear, CodecError};
use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, MonoPcm, Quality};

/// Speech-optimised output rate.
pub const MP3_SAMPLE_RATE: u32 = 22_050;

/// Samples fed to the encoder per call.
pub const MP3_BLOCK_SAMPLES: usize = 1152;

fn lame_error<E: std::fmt::Debug>(err: E) -> CodecError {
    CodecError::Mp3(format!("{:?}", err))
}

/// Encode 16-bit mono PCM as a 32 kbps mono MP3 stream at 22.05 kHz.
///
/// Empty input yields an empty stream without touching LAME.
pub fn encode_mp3(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, CodecError> {
    let samples = resample_linear(&pcm_samples(pcm), sample_rate, MP3_SAMPLE_RATE);
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder =
        Builder::new().ok_or_else(|| CodecError::Mp3("failed to allocate LAME encoder".to_string()))?;
    builder.set_num_channels(1).map_err(lame_error)?;
    builder.set_sample_rate(MP3_SAMPLE_RATE).map_err(lame_error)?;
    builder.set_brate(Bitrate::Kbps32).map_err(lame_error)?;
    builder.set_quality(Quality::Good).map_err(lame_error)?;
    let mut encoder = builder.build().map_err(lame_error)?;

    let mut out: Vec<u8> = Vec::with_capacity(samples.len() / 4);

    for block in samples.chunks(MP3_BLOCK_SAMPLES) {
        encoder
            .encode_to_vec(MonoPcm(block), &mut out)
            .map_err(lame_error)?;
    }
    encoder
        .flush_to_vec::<FlushNoGap>(&mut out)
        .map_err(lame_error)?;

    tracing::debug!(
        input_samples = samples.len(),
        output_bytes = out.len(),
        "MP3 encoding finished"
    );

    Ok(out)
}
