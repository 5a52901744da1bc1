/// Number of output samples produced when converting `input_len` samples
/// from `from_rate` to `to_rate`.
pub fn output_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
    if input_len == 0 || from_rate == 0 || to_rate == 0 {
        return 0;
    }
    let scaled = input_len as u64 * to_rate as u64;
    scaled.div_ceil(from_rate as u64) as usize
}

/// Linear-interpolation resampler.
///
/// Output sample `i` is taken at source position `i * from_rate / to_rate`,
/// interpolating between the two bracketing input samples. Positions past the
/// last input sample reuse it.
pub fn resample_linear(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let last = samples.len() - 1;

    (0..output_len(samples.len(), from_rate, to_rate))
        .map(|i| {
            let position = i as f64 * ratio;
            let index = (position.floor() as usize).min(last);
            let fraction = position - index as f64;
            let current = samples[index] as f64;
            let next = samples[(index + 1).min(last)] as f64;
            let value = current + (next - current) * fraction.min(1.0);
            value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
        })
        .collect()
}
