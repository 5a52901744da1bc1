use once_cell::sync::Lazy;

const BIAS: i32 = 0x84;
const CLIP: i32 = 32635;

/// Encode table indexed by the sample reinterpreted as `u16`.
static ENCODE_TABLE: Lazy<Box<[u8; 65536]>> = Lazy::new(|| {
    let mut table = Box::new([0u8; 65536]);
    for (index, slot) in table.iter_mut().enumerate() {
        *slot = compand(index as u16 as i16);
    }
    table
});

/// G.711 µ-law companding of one 16-bit sample.
fn compand(sample: i16) -> u8 {
    let mut magnitude = sample as i32;
    let sign = if magnitude < 0 {
        magnitude = -magnitude;
        0x80
    } else {
        0x00
    };

    if magnitude > CLIP {
        magnitude = CLIP;
    }
    magnitude += BIAS;

    // Highest set bit among the top magnitude bits gives the 3-bit segment.
    let segment_bits = (magnitude >> 7) as u32 & 0xFF;
    let exponent = if segment_bits == 0 {
        0
    } else {
        (31 - segment_bits.leading_zeros()) as i32
    };
    let mantissa = (magnitude >> (exponent + 3)) & 0x0F;

    !((sign | (exponent << 4) | mantissa) as u8)
}

/// Table-driven µ-law encode.
pub fn linear_to_mulaw(sample: i16) -> u8 {
    ENCODE_TABLE[sample as u16 as usize]
}

/// Inverse transform, used to sanity-check encoded output.
pub fn mulaw_to_linear(byte: u8) -> i16 {
    let byte = !byte;
    let sign = byte & 0x80;
    let exponent = ((byte >> 4) & 0x07) as i32;
    let mantissa = (byte & 0x0F) as i32;
    let magnitude = (((mantissa << 3) + BIAS) << exponent) - BIAS;

    if sign != 0 {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}

pub fn encode_samples(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&s| linear_to_mulaw(s)).collect()
}
