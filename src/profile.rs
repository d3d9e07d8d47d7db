use std::collections::BTreeMap;

use serde::Serialize;

use crate::category::{Category, CategoryTable};
use crate::cli::ThemeMode;
use crate::color::Color;
use crate::config::Config;
use crate::error::{ProfileError, Result};
use crate::pipeline::assign::{
    AssignContext, AssignmentStrategy, ColorCandidate, ScoredAssigner,
};
use crate::pipeline::detect::{detect_mode, has_significant_color, weighted_lightness};
use crate::pipeline::pool::Pool;
use crate::pipeline::sample::{sample, PixelSource, SampleResult};
use crate::pipeline::stats::Statistics;
use crate::pipeline::weighted::{filter_min_weight, weigh};

/// Everything extracted from one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorProfile {
    pub mode: ThemeMode,
    /// The mode was supplied by the caller rather than detected.
    pub mode_forced: bool,
    /// Weighted lightness of the heaviest colors, as used for classification.
    pub weighted_lightness: f32,
    pub has_significant_color: bool,
    pub pool: Pool,
    pub colors: BTreeMap<Category, Color>,
    pub candidates: BTreeMap<Category, Vec<ColorCandidate>>,
    /// Assigned roles divided by the number of roles.
    pub coverage_ratio: f32,
    pub background_fallback: bool,
    pub total_samples: u64,
    /// Distinct quantized colors seen before filtering.
    pub sampled_colors: usize,
}

impl ColorProfile {
    pub fn statistics(&self) -> &Statistics {
        &self.pool.statistics
    }

    pub fn color(&self, category: Category) -> Option<Color> {
        self.colors.get(&category).copied()
    }

    pub fn candidates_for(&self, category: Category) -> &[ColorCandidate] {
        self.candidates
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Roles left without a color, in priority order.
    pub fn unassigned(&self) -> Vec<Category> {
        Category::PRIORITY
            .into_iter()
            .filter(|c| !self.colors.contains_key(c))
            .collect()
    }

    /// The assigned color, else the configured fallback for background, foreground
    /// and primary accent.
    pub fn color_or_fallback(&self, category: Category, config: &Config) -> Option<Color> {
        if let Some(color) = self.color(category) {
            return Some(color);
        }
        let fallbacks = config.fallbacks.for_mode(self.mode);
        match category {
            Category::Background => Some(fallbacks.background),
            Category::Foreground => Some(fallbacks.foreground),
            Category::AccentPrimary => Some(fallbacks.primary),
            _ => None,
        }
    }
}

/// Runs the extraction pipeline with a fixed configuration and strategy.
///
/// Holds no per-call state, so one profiler may serve concurrent callers.
pub struct Profiler {
    config: Config,
    table: CategoryTable,
    strategy: Box<dyn AssignmentStrategy>,
    forced_mode: Option<ThemeMode>,
}

impl Profiler {
    /// Validates `config` and resolves its category table.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let table = config.category_table();
        Ok(Self {
            config,
            table,
            strategy: Box::new(ScoredAssigner),
            forced_mode: None,
        })
    }

    pub fn with_strategy(mut self, strategy: impl AssignmentStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    /// Skip classification and use `mode` when it is `Some`.
    pub fn with_mode(mut self, mode: Option<ThemeMode>) -> Self {
        self.forced_mode = mode;
        self
    }

    /// Sample `source` and build its profile.
    pub fn profile<S: PixelSource + ?Sized>(&self, source: &S) -> Result<ColorProfile> {
        let samples = sample(source, &self.config.sampling);
        self.profile_samples(&samples)
    }

    /// Build a profile from already-sampled color counts.
    pub fn profile_samples(&self, samples: &SampleResult) -> Result<ColorProfile> {
        let config = &self.config;
        let weighted = filter_min_weight(weigh(samples), config.pool.min_frequency);
        if weighted.is_empty() {
            return Err(ProfileError::InputEmpty);
        }

        let pool = Pool::build(weighted, &config.pool);
        if pool.is_empty() {
            return Err(ProfileError::InputEmpty);
        }

        let measured = weighted_lightness(&pool.all_colors, config.mode.sample_count).unwrap_or(0.0);
        let mode = self
            .forced_mode
            .unwrap_or_else(|| detect_mode(&pool.all_colors, &config.mode));
        let significant = has_significant_color(&pool.all_colors, &config.pool, &config.mode);
        tracing::debug!(
            ?mode,
            forced = self.forced_mode.is_some(),
            weighted_lightness = measured,
            significant,
            "classified image"
        );

        let ctx = AssignContext {
            pool: &pool,
            table: &self.table,
            mode,
            scoring: &config.scoring,
            fallbacks: config.fallbacks.for_mode(mode),
            neutral_threshold: config.pool.neutral_threshold,
        };
        let assignment = self.strategy.assign(&ctx);
        let coverage_ratio = assignment.coverage_ratio();

        Ok(ColorProfile {
            mode,
            mode_forced: self.forced_mode.is_some(),
            weighted_lightness: measured,
            has_significant_color: significant,
            pool,
            colors: assignment.colors,
            candidates: assignment.candidates,
            coverage_ratio,
            background_fallback: assignment.background_fallback,
            total_samples: samples.total_samples,
            sampled_colors: samples.frequencies.len(),
        })
    }
}

/// One-shot convenience: validate `config`, then profile `source` with the scored strategy.
pub fn process_image<S: PixelSource + ?Sized>(source: &S, config: &Config) -> Result<ColorProfile> {
    Profiler::new(config.clone())?.profile(source)
}
