use fastrand::Rng;

pub fn db_to_amplitude(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Uniform draw in `[min_db, max_db]`.
pub fn random_gain_db(rng: &mut Rng, min_db: f32, max_db: f32) -> f32 {
    min_db + (max_db - min_db) * rng.f32()
}

pub fn peak_abs(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0, |acc, &s| acc.max(s.abs()))
}

/// Factor that brings the loudest sample across all `signals` to `target`.
///
/// `None` when every signal is silent.
pub fn normalization_scale<'a>(
    target: f32,
    signals: impl IntoIterator<Item = &'a [f32]>,
) -> Option<f32> {
    let max_amp = signals.into_iter().map(peak_abs).fold(0.0, f32::max);
    if max_amp > 0.0 {
        Some(target / max_amp)
    } else {
        None
    }
}

pub fn scale_in_place(signal: &mut [f32], factor: f32) {
    for s in signal.iter_mut() {
        *s *= factor;
    }
}
