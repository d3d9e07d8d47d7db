//! Circular statistics over hue angles in degrees.

/// Shortest angular distance between two hues, in [0, 180].
pub fn hue_distance(h1: f32, h2: f32) -> f32 {
    let diff = (h1 - h2).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Weighted circular mean of `(hue, weight)` pairs, normalized to [0, 360).
///
/// Returns NaN for empty input. Weights are expected to be non-negative.
pub fn circular_mean(hues: &[(f32, f32)]) -> f32 {
    if hues.is_empty() {
        return f32::NAN;
    }
    let (mut x, mut y) = (0.0f64, 0.0f64);
    for &(hue, weight) in hues {
        let rad = f64::from(hue).to_radians();
        x += f64::from(weight) * rad.cos();
        y += f64::from(weight) * rad.sin();
    }
    let mean = y.atan2(x).to_degrees().rem_euclid(360.0) as f32;
    if mean >= 360.0 {
        0.0
    } else {
        mean
    }
}

/// Weighted RMS of each hue's distance to the circular mean.
///
/// Zero for one or fewer members.
pub fn circular_std_dev(hues: &[(f32, f32)]) -> f32 {
    if hues.len() <= 1 {
        return 0.0;
    }
    let mean = circular_mean(hues);
    let total: f32 = hues.iter().map(|&(_, w)| w).sum();
    if total <= 0.0 || mean.is_nan() {
        return 0.0;
    }
    let sum_sq: f32 = hues
        .iter()
        .map(|&(hue, weight)| weight * hue_distance(hue, mean).powi(2))
        .sum();
    (sum_sq / total).sqrt()
}
