use fastrand::Rng;

use crate::error::{MixError, Result};

/// Draws `k` distinct indices, each proportionally to the weights still in play.
///
/// After every draw the chosen weight is removed and the rest renormalized, so
/// heavy entries are favoured without ever being picked twice.
pub fn weighted_choice_without_replacement(
    rng: &mut Rng,
    weights: &[f64],
    k: usize,
) -> Result<Vec<usize>> {
    let mut remaining: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();
    let available = remaining.iter().filter(|&&w| w > 0.0).count();
    if k > available {
        return Err(MixError::NotEnoughSpeakers {
            requested: k,
            available,
        });
    }

    let mut picked = Vec::with_capacity(k);
    for _ in 0..k {
        let total: f64 = remaining.iter().sum();
        let target = rng.f64() * total;
        let mut acc = 0.0;
        // Float drift can leave `target` past the last bucket.
        let mut choice = remaining
            .iter()
            .rposition(|&w| w > 0.0)
            .unwrap_or_default();
        for (i, &w) in remaining.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            acc += w;
            if target < acc {
                choice = i;
                break;
            }
        }
        remaining[choice] = 0.0;
        picked.push(choice);
    }
    Ok(picked)
}

pub fn uniform_index(rng: &mut Rng, len: usize) -> usize {
    rng.usize(..len)
}

/// Start of a random `window`-long slice of a `len`-long signal.
///
/// The last possible start (`len - window`) is never drawn.
pub fn random_offset(rng: &mut Rng, len: usize, window: usize) -> usize {
    if len <= window {
        0
    } else {
        rng.usize(0..len - window)
    }
}
