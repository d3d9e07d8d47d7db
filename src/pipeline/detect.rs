use crate::cli::ThemeMode;
use crate::config::{ModeConfig, PoolConfig};
use crate::pipeline::weighted::{by_weight_desc, WeightedColor};

/// Weighted mean HSL lightness of the `sample_count` heaviest colors.
///
/// Returns `None` for empty input.
pub fn weighted_lightness(colors: &[WeightedColor], sample_count: usize) -> Option<f32> {
    let mut top = colors.to_vec();
    top.sort_by(by_weight_desc);
    top.truncate(sample_count.clamp(1, colors.len().max(1)));

    let total: f32 = top.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return None;
    }
    let sum: f32 = top.iter().map(|c| c.weight * c.color.lightness()).sum();
    Some(sum / total)
}

/// Detect whether the image is predominantly dark or light.
///
/// Empty input defaults to dark.
pub fn detect_mode(colors: &[WeightedColor], config: &ModeConfig) -> ThemeMode {
    match weighted_lightness(colors, config.sample_count) {
        Some(lightness) if lightness >= config.threshold => ThemeMode::Light,
        _ => ThemeMode::Dark,
    }
}

/// True when chromatic colors carry more than `significant_color_fraction` of the weight.
pub fn has_significant_color(
    colors: &[WeightedColor],
    pool: &PoolConfig,
    mode: &ModeConfig,
) -> bool {
    let total: f32 = colors.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return false;
    }
    let chromatic: f32 = colors
        .iter()
        .filter(|c| !pool.is_neutral(c.color))
        .map(|c| c.weight)
        .sum();
    chromatic / total > mode.significant_color_fraction
}
