use std::cmp::Ordering;

use serde::Serialize;

use crate::color::Color;
use crate::pipeline::sample::SampleResult;

/// A distinct color with its sample count and share of all samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedColor {
    pub color: Color,
    pub frequency: u64,
    pub weight: f32,
}

impl WeightedColor {
    pub fn new(color: Color, frequency: u64, total_samples: u64) -> Self {
        let weight = if total_samples == 0 {
            0.0
        } else {
            (frequency as f64 / total_samples as f64) as f32
        };
        Self {
            color,
            frequency,
            weight,
        }
    }
}

/// Heaviest first; equal weights fall back to color order so results are reproducible.
pub fn by_weight_desc(a: &WeightedColor, b: &WeightedColor) -> Ordering {
    b.weight
        .total_cmp(&a.weight)
        .then_with(|| b.frequency.cmp(&a.frequency))
        .then_with(|| a.color.cmp(&b.color))
}

/// Convert sampled counts into weighted colors, sorted by descending weight.
pub fn weigh(sample: &SampleResult) -> Vec<WeightedColor> {
    let mut colors: Vec<WeightedColor> = sample
        .frequencies
        .iter()
        .map(|(&color, &count)| WeightedColor::new(color, count, sample.total_samples))
        .collect();
    colors.sort_by(by_weight_desc);
    colors
}

/// Drop colors whose weight is below `min_weight`.
pub fn filter_min_weight(colors: Vec<WeightedColor>, min_weight: f32) -> Vec<WeightedColor> {
    let before = colors.len();
    let kept: Vec<WeightedColor> = colors
        .into_iter()
        .filter(|c| c.weight >= min_weight)
        .collect();
    tracing::debug!(before, after = kept.len(), min_weight, "frequency filter");
    kept
}

pub fn total_weight(colors: &[WeightedColor]) -> f32 {
    colors.iter().map(|c| c.weight).sum()
}
