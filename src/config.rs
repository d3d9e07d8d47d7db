//! Configuration bundle for the profiling pipeline, loadable from TOML.
//!
//! Every section carries `#[serde(default)]`, so a file only needs to name the values it
//! changes:
//!
//! ```toml
//! [pool]
//! merge_distance = 12.0
//!
//! [categories.dark.cursor]
//! lightness = [0.6, 1.0]
//! saturation = [0.5, 1.0]
//! min_contrast = 4.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::{CategoryOverrides, CategoryTable};
use crate::cli::ThemeMode;
use crate::color::Color;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampling: SamplingConfig,
    pub pool: PoolConfig,
    pub mode: ModeConfig,
    pub scoring: ScoringConfig,
    pub fallbacks: Fallbacks,
    pub categories: CategoryConfig,
}

/// Pixel walk and quantization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Bits kept per channel when quantizing sampled pixels.
    pub quantize_bits: u8,
    /// Minimum sample count before rows are split across threads.
    pub parallel_min_samples: u64,
    /// Minimum worker threads before rows are split across threads.
    pub parallel_min_threads: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            quantize_bits: 5,
            parallel_min_samples: 250_000,
            parallel_min_threads: 2,
        }
    }
}

/// Filtering, clustering and band partitioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// HSL saturation below which a color is treated as achromatic.
    pub neutral_threshold: f32,
    /// CIELAB ΔE below which two chromatic colors merge.
    pub merge_distance: f32,
    /// Lightness delta below which two neutral colors merge.
    pub neutral_lightness_delta: f32,
    /// Clusters lighter than this total weight are discarded.
    pub min_cluster_weight: f32,
    pub clustering: bool,
    /// `[dark_max, light_min]`
    pub lightness_cuts: [f32; 2],
    /// `[gray_max, muted_max, normal_max]`
    pub saturation_cuts: [f32; 3],
    pub hue_sectors: usize,
    /// Colors with a smaller share of samples are dropped as noise.
    pub min_frequency: f32,
    pub dominant_count: usize,
    /// Upper bound on distinct colors kept in the pool.
    pub max_colors: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            neutral_threshold: 0.10,
            merge_distance: 8.0,
            neutral_lightness_delta: 0.05,
            min_cluster_weight: 0.0,
            clustering: true,
            lightness_cuts: [0.33, 0.66],
            saturation_cuts: [0.10, 0.35, 0.70],
            hue_sectors: 12,
            min_frequency: 0.001,
            dominant_count: 16,
            max_colors: 64,
        }
    }
}

impl PoolConfig {
    pub fn is_neutral(&self, color: Color) -> bool {
        color.saturation() < self.neutral_threshold
    }
}

/// Light/dark classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Weighted lightness at or above which the image is classified light.
    pub threshold: f32,
    /// Number of heaviest colors averaged for classification.
    pub sample_count: usize,
    /// Share of chromatic weight needed for `has_significant_color`.
    pub significant_color_fraction: f32,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            sample_count: 10,
            significant_color_fraction: 0.10,
        }
    }
}

/// Weights of the candidate fit terms. A zero weight removes the term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub frequency: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub hue: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            frequency: 0.35,
            contrast: 0.25,
            saturation: 0.15,
            lightness: 0.15,
            hue: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// Length of each role's ranked candidate list.
    pub max_candidates: usize,
    /// Exclude colors already assigned to an earlier role.
    pub distinct_colors: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            max_candidates: 5,
            distinct_colors: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackColors {
    pub background: Color,
    pub foreground: Color,
    pub primary: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fallbacks {
    pub dark: FallbackColors,
    pub light: FallbackColors,
}

impl Fallbacks {
    pub fn for_mode(&self, mode: ThemeMode) -> &FallbackColors {
        match mode {
            ThemeMode::Dark => &self.dark,
            ThemeMode::Light => &self.light,
        }
    }
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            dark: FallbackColors {
                background: Color::new(0x12, 0x12, 0x12),
                foreground: Color::new(0xe0, 0xe0, 0xe0),
                primary: Color::new(0x5f, 0x87, 0xd7),
            },
            light: FallbackColors {
                background: Color::new(0xfa, 0xfa, 0xfa),
                foreground: Color::new(0x1c, 0x1c, 0x1c),
                primary: Color::new(0x00, 0x5f, 0xd7),
            },
        }
    }
}

/// Role window overrides layered over the built-in table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub dark: CategoryOverrides,
    pub light: CategoryOverrides,
}

impl Config {
    /// Read, parse and validate a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// The built-in role table with this config's overrides applied.
    pub fn category_table(&self) -> CategoryTable {
        let mut table = CategoryTable::builtin();
        table.apply_overrides(ThemeMode::Dark, &self.categories.dark);
        table.apply_overrides(ThemeMode::Light, &self.categories.light);
        table
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sampling = &self.sampling;
        check(
            "sampling.quantize_bits",
            sampling.quantize_bits,
            (1..=8).contains(&sampling.quantize_bits),
            "must be between 1 and 8",
        )?;

        let pool = &self.pool;
        check_unit("pool.neutral_threshold", pool.neutral_threshold)?;
        check_unit("pool.neutral_lightness_delta", pool.neutral_lightness_delta)?;
        check_unit("pool.min_cluster_weight", pool.min_cluster_weight)?;
        check_unit("pool.min_frequency", pool.min_frequency)?;
        check(
            "pool.merge_distance",
            pool.merge_distance,
            pool.merge_distance.is_finite() && pool.merge_distance >= 0.0,
            "must be a non-negative ΔE",
        )?;
        check_cuts("pool.lightness_cuts", &pool.lightness_cuts)?;
        check_cuts("pool.saturation_cuts", &pool.saturation_cuts)?;
        check(
            "pool.hue_sectors",
            pool.hue_sectors,
            (1..=360).contains(&pool.hue_sectors),
            "must be between 1 and 360",
        )?;
        check(
            "pool.max_colors",
            pool.max_colors,
            pool.max_colors >= 1,
            "must keep at least one color",
        )?;

        let mode = &self.mode;
        check_unit("mode.threshold", mode.threshold)?;
        check_unit(
            "mode.significant_color_fraction",
            mode.significant_color_fraction,
        )?;
        check(
            "mode.sample_count",
            mode.sample_count,
            mode.sample_count >= 1,
            "must average at least one color",
        )?;

        let weights = &self.scoring.weights;
        for (field, value) in [
            ("scoring.weights.frequency", weights.frequency),
            ("scoring.weights.contrast", weights.contrast),
            ("scoring.weights.saturation", weights.saturation),
            ("scoring.weights.lightness", weights.lightness),
            ("scoring.weights.hue", weights.hue),
        ] {
            check(
                field,
                value,
                value.is_finite() && value >= 0.0,
                "must be a non-negative weight",
            )?;
        }
        check(
            "scoring.max_candidates",
            self.scoring.max_candidates,
            self.scoring.max_candidates >= 1,
            "must keep at least one candidate",
        )?;

        self.category_table().validate()
    }
}

fn check<T: ToString>(
    field: &'static str,
    value: T,
    ok: bool,
    reason: &'static str,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            value: value.to_string(),
            reason,
        })
    }
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check(field, value, (0.0..=1.0).contains(&value), "must be in [0, 1]")
}

fn check_cuts(field: &'static str, cuts: &[f32]) -> Result<(), ConfigError> {
    let in_unit = cuts.iter().all(|c| (0.0..=1.0).contains(c));
    let ascending = cuts.windows(2).all(|w| w[0] <= w[1]);
    check(
        field,
        format!("{cuts:?}"),
        in_unit && ascending,
        "cut points must be ascending within [0, 1]",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, ValueRange};

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [pool]
            merge_distance = 12.5
            hue_sectors = 24
            "#,
        )
        .unwrap();
        assert_eq!(config.pool.merge_distance, 12.5);
        assert_eq!(config.pool.hue_sectors, 24);
        assert_eq!(config.pool.dominant_count, PoolConfig::default().dominant_count);
        assert_eq!(config.sampling, SamplingConfig::default());
    }

    #[test]
    fn fallback_hex_is_parsed() {
        let config = Config::from_toml_str(
            r##"
            [fallbacks.light]
            background = "#FFFFFF"
            foreground = "#000000"
            primary = "#0055aa"
            "##,
        )
        .unwrap();
        assert_eq!(config.fallbacks.light.background, Color::WHITE);
        assert_eq!(config.fallbacks.light.primary, Color::new(0x00, 0x55, 0xaa));
        assert_eq!(config.fallbacks.dark, Fallbacks::default().dark);
    }

    #[test]
    fn bad_fallback_hex_is_rejected_at_load() {
        let result = Config::from_toml_str(
            r##"
            [fallbacks.dark]
            background = "#12"
            foreground = "#ffffff"
            primary = "#0055aa"
            "##,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn category_override_applies_to_table() {
        let config = Config::from_toml_str(
            r#"
            [categories.dark.cursor]
            lightness = [0.6, 1.0]
            saturation = [0.5, 1.0]
            min_contrast = 4.5

            [categories.light.error]
            hue = { center = 350.0, tolerance = 15.0 }
            "#,
        )
        .unwrap();
        let table = config.category_table();

        let cursor = table.get(Category::Cursor, ThemeMode::Dark);
        assert_eq!(cursor.lightness, ValueRange::new(0.6, 1.0));
        assert_eq!(cursor.min_contrast, 4.5);

        let error = table.get(Category::Error, ThemeMode::Light);
        assert_eq!(error.lightness, ValueRange::FULL);
        assert_eq!(error.min_contrast, 2.0);
        assert_eq!(error.hue.map(|h| h.center), Some(350.0));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let result = Config::from_toml_str(
            r#"
            [categories.dark.chartreuse]
            min_contrast = 3.0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_category_window_is_rejected_at_load() {
        let result = Config::from_toml_str(
            r#"
            [categories.dark.foreground]
            lightness = [0.9, 0.1]
            "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidRange { .. })));
    }

    #[test]
    fn invalid_scalar_values_are_rejected() {
        let cases = [
            "[sampling]\nquantize_bits = 0",
            "[pool]\nneutral_threshold = 1.5",
            "[pool]\nlightness_cuts = [0.7, 0.3]",
            "[pool]\nhue_sectors = 0",
            "[mode]\nsample_count = 0",
            "[scoring]\nmax_candidates = 0",
            "[scoring.weights]\nhue = -1.0",
        ];
        for case in cases {
            let result = Config::from_toml_str(case);
            assert!(
                matches!(result, Err(ConfigError::InvalidValue { .. })),
                "expected validation error for {case:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "[mode]\nthreshold = 0.6\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.mode.threshold, 0.6);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = Config::load("/nonexistent/nuri-profile.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
