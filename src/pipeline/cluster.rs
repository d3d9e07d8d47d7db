use palette::Lab;

use crate::color::{lab_distance, Color};
use crate::config::PoolConfig;
use crate::pipeline::weighted::{by_weight_desc, WeightedColor};

/// Per-color values the similarity test needs, computed once.
struct Features {
    lab: Lab,
    saturation: f32,
    lightness: f32,
}

impl Features {
    fn of(color: Color) -> Self {
        let hsl = color.to_hsl();
        Self {
            lab: color.to_lab(),
            saturation: hsl.saturation,
            lightness: hsl.lightness,
        }
    }
}

fn similar(a: &Features, b: &Features, config: &PoolConfig) -> bool {
    // Hue is noise near zero saturation; only lightness separates two grays.
    if a.saturation < config.neutral_threshold && b.saturation < config.neutral_threshold {
        (a.lightness - b.lightness).abs() < config.neutral_lightness_delta
    } else {
        lab_distance(&a.lab, &b.lab) < config.merge_distance
    }
}

/// Two-tier perceptual similarity: lightness-only for two neutrals, ΔE otherwise.
pub fn colors_similar(a: Color, b: Color, config: &PoolConfig) -> bool {
    similar(&Features::of(a), &Features::of(b), config)
}

/// Greedy single-pass clustering.
///
/// Colors are visited heaviest first. Each color not yet absorbed seeds a cluster that
/// absorbs every later similar color, accumulating weight and frequency onto the seed.
/// Clusters below `min_cluster_weight` are dropped. The result is sorted by weight.
pub fn cluster(colors: &[WeightedColor], config: &PoolConfig) -> Vec<WeightedColor> {
    let mut sorted = colors.to_vec();
    sorted.sort_by(by_weight_desc);
    let features: Vec<Features> = sorted.iter().map(|c| Features::of(c.color)).collect();

    let mut absorbed = vec![false; sorted.len()];
    let mut clusters = Vec::new();
    for i in 0..sorted.len() {
        if absorbed[i] {
            continue;
        }
        absorbed[i] = true;
        let mut seed = sorted[i];
        for j in (i + 1)..sorted.len() {
            if !absorbed[j] && similar(&features[i], &features[j], config) {
                absorbed[j] = true;
                seed.weight += sorted[j].weight;
                seed.frequency += sorted[j].frequency;
            }
        }
        if seed.weight >= config.min_cluster_weight {
            clusters.push(seed);
        }
    }

    clusters.sort_by(by_weight_desc);
    tracing::debug!(input = colors.len(), clusters = clusters.len(), "clustered colors");
    clusters
}
