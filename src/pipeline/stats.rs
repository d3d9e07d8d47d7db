//! Descriptive statistics of a pool's chromatic character.

use serde::Serialize;

use crate::config::PoolConfig;
use crate::pipeline::hue::{circular_mean, circular_std_dev};
use crate::pipeline::pool::{hue_sector, sector_center, LightnessBands, SaturationBands};
use crate::pipeline::weighted::{total_weight, WeightedColor};

pub const LIGHTNESS_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    /// Chromatic weight per hue sector, summing to 1 (all zero when fully neutral).
    pub hue_histogram: Vec<f32>,
    /// Weight per tenth of the lightness axis, summing to 1.
    pub lightness_histogram: [f32; LIGHTNESS_BINS],
    /// Sector-center hues of the three heaviest sectors; 0 when a sector is absent.
    pub primary_hue: f32,
    pub secondary_hue: f32,
    pub tertiary_hue: f32,
    /// Weighted circular mean of chromatic hues; NaN when every color is neutral.
    pub mean_hue: f32,
    /// Normalized Shannon entropy of the hue histogram, in [0, 1].
    pub chromatic_diversity: f32,
    /// Weighted circular standard deviation of chromatic hues, in degrees.
    pub hue_variance: f32,
    /// Spread of WCAG relative luminance across the pool.
    pub contrast_range: f32,
    /// 1 when weight is split evenly between the three lightness bands.
    pub lightness_spread: f32,
    /// Fraction of the four saturation bands that hold any color.
    pub saturation_spread: f32,
    pub average_lightness: f32,
    pub average_saturation: f32,
    pub color_count: usize,
}

impl Statistics {
    pub fn compute(
        colors: &[WeightedColor],
        by_lightness: &LightnessBands,
        by_saturation: &SaturationBands,
        config: &PoolConfig,
    ) -> Self {
        let sectors = config.hue_sectors.max(1);
        let hsl: Vec<(f32, f32, f32)> = colors
            .iter()
            .map(|c| (c.color.hue(), c.color.saturation(), c.color.lightness()))
            .collect();
        let chromatic: Vec<(f32, f32)> = colors
            .iter()
            .zip(&hsl)
            .filter(|(_, hsl)| hsl.1 >= config.neutral_threshold)
            .map(|(c, hsl)| (hsl.0, c.weight))
            .collect();

        let hue_histogram = hue_histogram(&chromatic, sectors);
        let [primary_hue, secondary_hue, tertiary_hue] = dominant_hues(&hue_histogram);

        let total = total_weight(colors);
        let mut lightness_histogram = [0.0f32; LIGHTNESS_BINS];
        let (mut lightness_sum, mut saturation_sum) = (0.0f32, 0.0f32);
        for (c, &(_, s, l)) in colors.iter().zip(&hsl) {
            let bin = ((l * LIGHTNESS_BINS as f32) as usize).min(LIGHTNESS_BINS - 1);
            lightness_histogram[bin] += c.weight;
            lightness_sum += c.weight * l;
            saturation_sum += c.weight * s;
        }
        let (average_lightness, average_saturation) = if total > 0.0 {
            lightness_histogram.iter_mut().for_each(|b| *b /= total);
            (lightness_sum / total, saturation_sum / total)
        } else {
            (0.0, 0.0)
        };

        Self {
            chromatic_diversity: chromatic_diversity(&hue_histogram),
            hue_histogram,
            lightness_histogram,
            primary_hue,
            secondary_hue,
            tertiary_hue,
            mean_hue: circular_mean(&chromatic),
            hue_variance: circular_std_dev(&chromatic),
            contrast_range: contrast_range(colors),
            lightness_spread: lightness_spread(by_lightness),
            saturation_spread: saturation_spread(by_saturation),
            average_lightness,
            average_saturation,
            color_count: colors.len(),
        }
    }
}

/// Weight mass per hue sector, normalized to sum to 1.
pub fn hue_histogram(hues: &[(f32, f32)], sectors: usize) -> Vec<f32> {
    let mut histogram = vec![0.0f32; sectors.max(1)];
    for &(hue, weight) in hues {
        histogram[hue_sector(hue, sectors)] += weight;
    }
    let total: f32 = histogram.iter().sum();
    if total > 0.0 {
        histogram.iter_mut().for_each(|b| *b /= total);
    }
    histogram
}

/// Center angles of the three heaviest non-empty sectors.
pub fn dominant_hues(histogram: &[f32]) -> [f32; 3] {
    let mut ranked: Vec<(usize, f32)> = histogram
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, mass)| mass > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut hues = [0.0f32; 3];
    for (slot, &(sector, _)) in hues.iter_mut().zip(&ranked) {
        *slot = sector_center(sector, histogram.len());
    }
    hues
}

/// Shannon entropy of the histogram divided by its maximum, `log2(sectors)`.
pub fn chromatic_diversity(histogram: &[f32]) -> f32 {
    if histogram.len() <= 1 {
        return 0.0;
    }
    let entropy: f32 = histogram
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum();
    if entropy <= 0.0 {
        return 0.0;
    }
    (entropy / (histogram.len() as f32).log2()).min(1.0)
}

/// Difference between the brightest and darkest relative luminance.
pub fn contrast_range(colors: &[WeightedColor]) -> f32 {
    if colors.len() <= 1 {
        return 0.0;
    }
    let (min, max) = colors
        .iter()
        .map(|c| c.color.relative_luminance())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    max - min
}

/// `1 - Σ|share - 1/3| / 2` over the three lightness bands, by weight share.
pub fn lightness_spread(bands: &LightnessBands) -> f32 {
    let weights = bands.bands().map(total_weight);
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let deviation: f32 = weights
        .iter()
        .map(|w| (w / total - 1.0 / 3.0).abs())
        .sum();
    1.0 - deviation / 2.0
}

pub fn saturation_spread(bands: &SaturationBands) -> f32 {
    let occupied = bands.bands().iter().filter(|b| !b.is_empty()).count();
    occupied as f32 / 4.0
}
