//! Human-readable renderings of a [`ColorProfile`].

use std::fmt::Write as _;
use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::category::Category;
use crate::color::Color;
use crate::profile::ColorProfile;

const SWATCH: &str = "      ";

/// Plain-text summary: classification, statistics and one line per role.
pub fn summary(profile: &ColorProfile) -> String {
    let stats = profile.statistics();
    let mut out = String::new();

    let source = if profile.mode_forced { "forced" } else { "detected" };
    let _ = writeln!(
        out,
        "mode: {:?} ({source}, weighted lightness {:.3})",
        profile.mode, profile.weighted_lightness
    );
    let _ = writeln!(
        out,
        "pool: {} colors from {} samples ({} distinct), significant color: {}",
        profile.pool.len(),
        profile.total_samples,
        profile.sampled_colors,
        if profile.has_significant_color { "yes" } else { "no" }
    );
    let mean_hue = if stats.mean_hue.is_nan() {
        "none".to_string()
    } else {
        format!("{:.1}", stats.mean_hue)
    };
    let _ = writeln!(
        out,
        "hues: primary {:.1}, secondary {:.1}, tertiary {:.1}, mean {mean_hue}",
        stats.primary_hue, stats.secondary_hue, stats.tertiary_hue
    );
    let _ = writeln!(
        out,
        "diversity {:.3}, hue variance {:.1}, contrast range {:.3}, lightness spread {:.3}, saturation spread {:.2}",
        stats.chromatic_diversity,
        stats.hue_variance,
        stats.contrast_range,
        stats.lightness_spread,
        stats.saturation_spread
    );
    let _ = writeln!(out, "coverage: {:.0}%", profile.coverage_ratio * 100.0);
    if profile.background_fallback {
        let _ = writeln!(out, "background: no candidate, using fallback");
    }
    out.push('\n');

    let background = profile.color(Category::Background);
    for category in Category::ALL {
        let label = role_label(category);
        match profile.color(category) {
            Some(color) => {
                let contrast = background
                    .filter(|_| category != Category::Background)
                    .map(|bg| format!("  {:>5.2}:1", Color::contrast_ratio(&color, &bg)))
                    .unwrap_or_default();
                let _ = writeln!(out, "{label:<20} {color}{contrast}");
            }
            None => {
                let _ = writeln!(out, "{label:<20} -");
            }
        }
    }
    out
}

/// Role name, with the terminal palette index for the sixteen ANSI roles.
fn role_label(category: Category) -> String {
    match category.ansi_slot() {
        Some(slot) => format!("{} ({slot})", category.name()),
        None => category.name().to_string(),
    }
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Truecolor swatches of every assigned role, each shown on the profile background.
pub fn preview<W: Write>(profile: &ColorProfile, out: &mut W) -> io::Result<()> {
    let background = profile.color(Category::Background);
    for category in Category::ALL {
        let Some(color) = profile.color(category) else {
            continue;
        };
        queue!(
            out,
            SetBackgroundColor(term_color(color)),
            Print(SWATCH),
            ResetColor,
        )?;
        if let Some(bg) = background {
            queue!(
                out,
                SetBackgroundColor(term_color(bg)),
                SetForegroundColor(term_color(color)),
                Print(format!(" {:<18} ", category.name())),
                ResetColor,
            )?;
        } else {
            queue!(out, Print(format!(" {:<18} ", category.name())))?;
        }
        queue!(out, Print(format!(" {color}\n")))?;
    }
    out.flush()
}
