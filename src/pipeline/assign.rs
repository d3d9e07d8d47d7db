//! Assignment of pool colors to semantic roles.
//!
//! Strategies implement [`AssignmentStrategy`]. The default [`ScoredAssigner`] resolves the
//! background first, then walks [`Category::PRIORITY`], discarding colors that break a
//! role's hard constraints and ranking the rest by a weighted fit score.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::category::{Category, CategoryCharacteristics, CategoryTable};
use crate::cli::ThemeMode;
use crate::color::Color;
use crate::config::{FallbackColors, ScoringConfig, ScoringWeights};
use crate::pipeline::pool::Pool;
use crate::pipeline::weighted::WeightedColor;

/// WCAG contrast ratio ceiling (white on black).
const MAX_CONTRAST: f32 = 21.0;

/// A ranked option for one role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorCandidate {
    pub color: Color,
    pub frequency: u64,
    pub score: f32,
}

/// Result of running a strategy over a pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Assignment {
    /// Chosen color per role. Roles with no qualifying color are absent.
    pub colors: BTreeMap<Category, Color>,
    /// Ranked alternates per role, best first.
    pub candidates: BTreeMap<Category, Vec<ColorCandidate>>,
    /// The background came from the configured fallback, not the image.
    pub background_fallback: bool,
}

impl Assignment {
    pub fn coverage_ratio(&self) -> f32 {
        self.colors.len() as f32 / Category::COUNT as f32
    }

    fn record(&mut self, category: Category, candidates: Vec<ColorCandidate>) {
        match candidates.first() {
            Some(best) => {
                tracing::trace!(%category, color = %best.color, score = best.score, "assigned");
                self.colors.insert(category, best.color);
            }
            None => tracing::trace!(%category, "no qualifying candidate"),
        }
        self.candidates.insert(category, candidates);
    }

    fn is_taken(&self, color: Color) -> bool {
        self.colors.values().any(|&c| c == color)
    }
}

/// Everything a strategy may consult.
pub struct AssignContext<'a> {
    pub pool: &'a Pool,
    pub table: &'a CategoryTable,
    pub mode: ThemeMode,
    pub scoring: &'a ScoringConfig,
    pub fallbacks: &'a FallbackColors,
    /// Saturation below which a color's hue is ignored.
    pub neutral_threshold: f32,
}

impl AssignContext<'_> {
    fn characteristics(&self, category: Category) -> &CategoryCharacteristics {
        self.table.get(category, self.mode)
    }
}

/// Maps a pool onto semantic roles.
pub trait AssignmentStrategy: Send + Sync {
    fn assign(&self, ctx: &AssignContext<'_>) -> Assignment;
}

/// Scores candidates for one role against an already-chosen background.
///
/// Holding the background by value means no contrast test can run before the
/// background has been resolved.
pub struct Scorer<'a> {
    weights: &'a ScoringWeights,
    background: Color,
    max_frequency: u64,
    neutral_threshold: f32,
}

impl<'a> Scorer<'a> {
    pub fn new(
        weights: &'a ScoringWeights,
        background: Color,
        max_frequency: u64,
        neutral_threshold: f32,
    ) -> Self {
        Self {
            weights,
            background,
            max_frequency,
            neutral_threshold,
        }
    }

    /// Hard constraints: lightness and saturation windows, hue window, minimum contrast.
    pub fn passes(&self, color: Color, chars: &CategoryCharacteristics) -> bool {
        let hsl = color.to_hsl();
        if !chars.lightness.contains(hsl.lightness) || !chars.saturation.contains(hsl.saturation) {
            return false;
        }
        if let Some(window) = chars.hue {
            if hsl.saturation < self.neutral_threshold || !window.contains(color.hue()) {
                return false;
            }
        }
        Color::contrast_ratio(&color, &self.background) >= chars.min_contrast
    }

    /// Weighted fit score, or `None` when a hard constraint fails.
    pub fn score(&self, candidate: &WeightedColor, chars: &CategoryCharacteristics) -> Option<f32> {
        if !self.passes(candidate.color, chars) {
            return None;
        }
        let color = candidate.color;
        let hsl = color.to_hsl();
        let weights = self.weights;
        let mut score = 0.0;

        if weights.frequency > 0.0 {
            score += weights.frequency * frequency_term(candidate.frequency, self.max_frequency);
        }
        if weights.contrast > 0.0 {
            let ratio = Color::contrast_ratio(&color, &self.background);
            score += weights.contrast * contrast_term(ratio, chars.min_contrast);
        }
        if weights.saturation > 0.0 {
            score += weights.saturation * chars.saturation.closeness(hsl.saturation);
        }
        if weights.lightness > 0.0 {
            score += weights.lightness * chars.lightness.closeness(hsl.lightness);
        }
        if weights.hue > 0.0 {
            if let Some(window) = chars.hue {
                score += weights.hue * window.closeness(color.hue());
            }
        }
        Some(score)
    }

    /// Every passing color, best first, truncated to `limit`.
    pub fn rank(
        &self,
        colors: &[WeightedColor],
        chars: &CategoryCharacteristics,
        exclude: impl Fn(Color) -> bool,
        limit: usize,
    ) -> Vec<ColorCandidate> {
        let candidates = colors.iter().filter(|c| !exclude(c.color)).filter_map(|c| {
            self.score(c, chars).map(|score| ColorCandidate {
                color: c.color,
                frequency: c.frequency,
                score,
            })
        });
        top_candidates(candidates, limit)
    }
}

/// Log-compressed frequency ratio in [0, 1].
pub fn frequency_term(frequency: u64, max_frequency: u64) -> f32 {
    if max_frequency == 0 {
        return 0.0;
    }
    let ratio = (frequency as f64).ln_1p() / (max_frequency as f64).ln_1p();
    (ratio as f32).clamp(0.0, 1.0)
}

/// Contrast surplus above the required minimum, scaled to the room left below 21:1.
pub fn contrast_term(ratio: f32, required: f32) -> f32 {
    let room = MAX_CONTRAST - required;
    if room <= f32::EPSILON {
        return 1.0;
    }
    ((ratio - required) / room).clamp(0.0, 1.0)
}

fn top_candidates(
    candidates: impl Iterator<Item = ColorCandidate>,
    limit: usize,
) -> Vec<ColorCandidate> {
    let mut ranked: Vec<ColorCandidate> = candidates.collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.frequency.cmp(&a.frequency))
            .then_with(|| a.color.cmp(&b.color))
    });
    ranked.truncate(limit.max(1));
    ranked
}

/// Background candidates: colors inside the window ranked by
/// `weight * (1 - |lightness - window midpoint|)`.
pub fn background_candidates(
    colors: &[WeightedColor],
    chars: &CategoryCharacteristics,
    limit: usize,
) -> Vec<ColorCandidate> {
    let midpoint = chars.lightness.midpoint();
    let candidates = colors.iter().filter_map(|c| {
        let hsl = c.color.to_hsl();
        let inside =
            chars.lightness.contains(hsl.lightness) && chars.saturation.contains(hsl.saturation);
        inside.then(|| ColorCandidate {
            color: c.color,
            frequency: c.frequency,
            score: c.weight * (1.0 - (hsl.lightness - midpoint).abs()),
        })
    });
    top_candidates(candidates, limit)
}

/// The 27-role scored-candidate model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoredAssigner;

impl AssignmentStrategy for ScoredAssigner {
    fn assign(&self, ctx: &AssignContext<'_>) -> Assignment {
        let limit = ctx.scoring.max_candidates;
        let colors = &ctx.pool.all_colors;
        let mut assignment = Assignment::default();

        let background_chars = ctx.characteristics(Category::Background);
        let background_ranked = background_candidates(colors, background_chars, limit);
        let background = match background_ranked.first() {
            Some(best) => best.color,
            None => {
                tracing::warn!(
                    mode = ?ctx.mode,
                    fallback = %ctx.fallbacks.background,
                    "no color fits the background window, using fallback"
                );
                assignment.background_fallback = true;
                ctx.fallbacks.background
            }
        };
        assignment.colors.insert(Category::Background, background);
        assignment
            .candidates
            .insert(Category::Background, background_ranked);

        let scorer = Scorer::new(
            &ctx.scoring.weights,
            background,
            ctx.pool.max_frequency(),
            ctx.neutral_threshold,
        );
        for &category in Category::PRIORITY.iter().skip(1) {
            let chars = ctx.characteristics(category);
            let ranked = if ctx.scoring.distinct_colors {
                scorer.rank(colors, chars, |c| assignment.is_taken(c), limit)
            } else {
                scorer.rank(colors, chars, |_| false, limit)
            };
            assignment.record(category, ranked);
        }

        tracing::debug!(
            assigned = assignment.colors.len(),
            coverage = assignment.coverage_ratio(),
            "scored assignment complete"
        );
        assignment
    }
}

/// Frequency/contrast heuristic covering background, foreground and primary accent.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicAssigner {
    pub min_foreground_contrast: f32,
    pub min_accent_contrast: f32,
}

impl Default for HeuristicAssigner {
    fn default() -> Self {
        Self {
            min_foreground_contrast: 4.5,
            min_accent_contrast: 3.0,
        }
    }
}

impl AssignmentStrategy for HeuristicAssigner {
    fn assign(&self, ctx: &AssignContext<'_>) -> Assignment {
        let limit = ctx.scoring.max_candidates;
        let pool = ctx.pool;
        let mut assignment = Assignment::default();

        // Most frequent color at the mode's end of the lightness axis.
        let extreme = match ctx.mode {
            ThemeMode::Dark => &pool.by_lightness.dark,
            ThemeMode::Light => &pool.by_lightness.light,
        };
        let background_ranked = top_candidates(
            extreme.iter().map(|c| ColorCandidate {
                color: c.color,
                frequency: c.frequency,
                score: c.weight,
            }),
            limit,
        );
        let background = match background_ranked.first() {
            Some(best) => best.color,
            None => {
                assignment.background_fallback = true;
                ctx.fallbacks.background
            }
        };
        assignment.colors.insert(Category::Background, background);
        assignment
            .candidates
            .insert(Category::Background, background_ranked);

        let taken = |c: Color| ctx.scoring.distinct_colors && c == background;

        let foreground = top_candidates(
            pool.all_colors.iter().filter(|c| !taken(c.color)).filter_map(|c| {
                let ratio = Color::contrast_ratio(&c.color, &background);
                (ratio >= self.min_foreground_contrast).then(|| ColorCandidate {
                    color: c.color,
                    frequency: c.frequency,
                    score: ratio,
                })
            }),
            limit,
        );
        assignment.record(Category::Foreground, foreground);

        let primary = top_candidates(
            pool.all_colors
                .iter()
                .filter(|c| !taken(c.color) && c.color.saturation() >= ctx.neutral_threshold)
                .filter_map(|c| {
                    let ratio = Color::contrast_ratio(&c.color, &background);
                    (ratio >= self.min_accent_contrast).then(|| ColorCandidate {
                        color: c.color,
                        frequency: c.frequency,
                        score: c.color.saturation() * c.weight,
                    })
                }),
            limit,
        );
        assignment.record(Category::AccentPrimary, primary);

        tracing::debug!(
            assigned = assignment.colors.len(),
            "heuristic assignment complete"
        );
        assignment
    }
}
