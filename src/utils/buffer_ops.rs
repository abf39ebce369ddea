/// Root-mean-square of `buffer`, `0.0` for an empty slice.
pub fn rms(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }

    // Accumulate in f64; a 2048-sample block of f32 squares loses precision otherwise.
    let sum: f64 = buffer
        .iter()
        .map(|&sample| {
            let sample = sample as f64;
            sample * sample
        })
        .sum();
    (sum / buffer.len() as f64).sqrt() as f32
}

/// Largest absolute sample value. Non-finite samples are skipped.
pub fn peak(buffer: &[f32]) -> f32 {
    buffer
        .iter()
        .filter(|sample| sample.is_finite())
        .fold(0.0f32, |acc, &sample| acc.max(sample.abs()))
}

/// Linear amplitude to dBFS, clamped to `floor_db` for silence.
pub fn amplitude_to_db(amplitude: f32, floor_db: f64) -> f64 {
    if !(amplitude > 0.0) {
        return floor_db;
    }
    (20.0 * (amplitude as f64).log10()).max(floor_db)
}
