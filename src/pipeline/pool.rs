use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::PoolConfig;
use crate::pipeline::cluster::cluster;
use crate::pipeline::stats::Statistics;
use crate::pipeline::weighted::{by_weight_desc, WeightedColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightnessBand {
    Dark,
    Mid,
    Light,
}

impl LightnessBand {
    pub fn classify(lightness: f32, config: &PoolConfig) -> Self {
        let [dark_max, light_min] = config.lightness_cuts;
        if lightness < dark_max {
            LightnessBand::Dark
        } else if lightness < light_min {
            LightnessBand::Mid
        } else {
            LightnessBand::Light
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaturationBand {
    Gray,
    Muted,
    Normal,
    Vibrant,
}

impl SaturationBand {
    pub fn classify(saturation: f32, config: &PoolConfig) -> Self {
        let [gray_max, muted_max, normal_max] = config.saturation_cuts;
        if saturation < gray_max {
            SaturationBand::Gray
        } else if saturation < muted_max {
            SaturationBand::Muted
        } else if saturation < normal_max {
            SaturationBand::Normal
        } else {
            SaturationBand::Vibrant
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LightnessBands {
    pub dark: Vec<WeightedColor>,
    pub mid: Vec<WeightedColor>,
    pub light: Vec<WeightedColor>,
}

impl LightnessBands {
    pub fn bands(&self) -> [&[WeightedColor]; 3] {
        [&self.dark, &self.mid, &self.light]
    }

    pub fn len(&self) -> usize {
        self.bands().iter().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaturationBands {
    pub gray: Vec<WeightedColor>,
    pub muted: Vec<WeightedColor>,
    pub normal: Vec<WeightedColor>,
    pub vibrant: Vec<WeightedColor>,
}

impl SaturationBands {
    pub fn bands(&self) -> [&[WeightedColor]; 4] {
        [&self.gray, &self.muted, &self.normal, &self.vibrant]
    }

    pub fn len(&self) -> usize {
        self.bands().iter().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The reduced color set with its band, sector and dominance groupings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pool {
    /// Every retained color, heaviest first.
    pub all_colors: Vec<WeightedColor>,
    pub dominant_colors: Vec<WeightedColor>,
    pub by_lightness: LightnessBands,
    pub by_saturation: SaturationBands,
    /// Chromatic colors keyed by hue sector index.
    pub by_hue: BTreeMap<usize, Vec<WeightedColor>>,
    pub statistics: Statistics,
}

impl Pool {
    /// Build the pool from filtered weighted colors.
    pub fn build(colors: Vec<WeightedColor>, config: &PoolConfig) -> Self {
        let mut all_colors = if config.clustering {
            cluster(&colors, config)
        } else {
            let mut colors = colors;
            colors.sort_by(by_weight_desc);
            colors
        };
        all_colors.truncate(config.max_colors);

        let mut by_lightness = LightnessBands::default();
        let mut by_saturation = SaturationBands::default();
        let mut by_hue: BTreeMap<usize, Vec<WeightedColor>> = BTreeMap::new();

        for &wc in &all_colors {
            let hsl = wc.color.to_hsl();
            match LightnessBand::classify(hsl.lightness, config) {
                LightnessBand::Dark => by_lightness.dark.push(wc),
                LightnessBand::Mid => by_lightness.mid.push(wc),
                LightnessBand::Light => by_lightness.light.push(wc),
            }
            match SaturationBand::classify(hsl.saturation, config) {
                SaturationBand::Gray => by_saturation.gray.push(wc),
                SaturationBand::Muted => by_saturation.muted.push(wc),
                SaturationBand::Normal => by_saturation.normal.push(wc),
                SaturationBand::Vibrant => by_saturation.vibrant.push(wc),
            }
            if !config.is_neutral(wc.color) {
                let sector = hue_sector(wc.color.hue(), config.hue_sectors);
                by_hue.entry(sector).or_default().push(wc);
            }
        }

        let dominant_colors = dominant_subset(&all_colors, config.dominant_count);
        let statistics = Statistics::compute(&all_colors, &by_lightness, &by_saturation, config);

        tracing::debug!(
            colors = all_colors.len(),
            dominant = dominant_colors.len(),
            hue_sectors = by_hue.len(),
            "pool built"
        );

        Self {
            all_colors,
            dominant_colors,
            by_lightness,
            by_saturation,
            by_hue,
            statistics,
        }
    }

    pub fn len(&self) -> usize {
        self.all_colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_colors.is_empty()
    }

    pub fn max_frequency(&self) -> u64 {
        self.all_colors.iter().map(|c| c.frequency).max().unwrap_or(0)
    }
}

/// Index of the fixed-width sector containing `hue`.
pub fn hue_sector(hue: f32, sectors: usize) -> usize {
    let sectors = sectors.max(1);
    let width = 360.0 / sectors as f32;
    ((hue.rem_euclid(360.0) / width) as usize).min(sectors - 1)
}

/// Center angle of a hue sector, in degrees.
pub fn sector_center(sector: usize, sectors: usize) -> f32 {
    let width = 360.0 / sectors.max(1) as f32;
    (sector as f32 + 0.5) * width
}

/// The `k` heaviest colors. `k == 0` or `k >= colors.len()` keeps every color.
pub fn dominant_subset(colors: &[WeightedColor], k: usize) -> Vec<WeightedColor> {
    let mut sorted = colors.to_vec();
    sorted.sort_by(by_weight_desc);
    if k > 0 && k < sorted.len() {
        sorted.truncate(k);
    }
    sorted
}
