//! Semantic color roles and their per-mode acceptance windows.
//!
//! Every role has one [`CategoryCharacteristics`] per [`ThemeMode`]. The table is fully
//! populated at construction time, so scoring never has to guess a default.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cli::ThemeMode;
use crate::error::ConfigError;
use crate::pipeline::hue::hue_distance;

/// One of the 27 semantic UI roles a palette color can be assigned to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Background,
    Foreground,
    DimForeground,
    Cursor,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    AccentPrimary,
    AccentSecondary,
    AccentTertiary,
    Error,
    Warning,
    Success,
    Info,
}

impl Category {
    pub const COUNT: usize = 27;

    /// All roles in declaration order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::Background,
        Category::Foreground,
        Category::DimForeground,
        Category::Cursor,
        Category::Black,
        Category::Red,
        Category::Green,
        Category::Yellow,
        Category::Blue,
        Category::Magenta,
        Category::Cyan,
        Category::White,
        Category::BrightBlack,
        Category::BrightRed,
        Category::BrightGreen,
        Category::BrightYellow,
        Category::BrightBlue,
        Category::BrightMagenta,
        Category::BrightCyan,
        Category::BrightWhite,
        Category::AccentPrimary,
        Category::AccentSecondary,
        Category::AccentTertiary,
        Category::Error,
        Category::Warning,
        Category::Success,
        Category::Info,
    ];

    /// Order in which roles are resolved. Background comes first because every
    /// later contrast test is measured against it.
    pub const PRIORITY: [Category; Category::COUNT] = [
        Category::Background,
        Category::Foreground,
        Category::AccentPrimary,
        Category::DimForeground,
        Category::Cursor,
        Category::Error,
        Category::Warning,
        Category::Success,
        Category::Info,
        Category::AccentSecondary,
        Category::AccentTertiary,
        Category::Black,
        Category::Red,
        Category::Green,
        Category::Yellow,
        Category::Blue,
        Category::Magenta,
        Category::Cyan,
        Category::White,
        Category::BrightBlack,
        Category::BrightRed,
        Category::BrightGreen,
        Category::BrightYellow,
        Category::BrightBlue,
        Category::BrightMagenta,
        Category::BrightCyan,
        Category::BrightWhite,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Background => "background",
            Category::Foreground => "foreground",
            Category::DimForeground => "dim_foreground",
            Category::Cursor => "cursor",
            Category::Black => "black",
            Category::Red => "red",
            Category::Green => "green",
            Category::Yellow => "yellow",
            Category::Blue => "blue",
            Category::Magenta => "magenta",
            Category::Cyan => "cyan",
            Category::White => "white",
            Category::BrightBlack => "bright_black",
            Category::BrightRed => "bright_red",
            Category::BrightGreen => "bright_green",
            Category::BrightYellow => "bright_yellow",
            Category::BrightBlue => "bright_blue",
            Category::BrightMagenta => "bright_magenta",
            Category::BrightCyan => "bright_cyan",
            Category::BrightWhite => "bright_white",
            Category::AccentPrimary => "accent_primary",
            Category::AccentSecondary => "accent_secondary",
            Category::AccentTertiary => "accent_tertiary",
            Category::Error => "error",
            Category::Warning => "warning",
            Category::Success => "success",
            Category::Info => "info",
        }
    }

    /// ANSI palette index (0-15) for the terminal slots.
    pub fn ansi_slot(self) -> Option<usize> {
        let index = self.index();
        let first = Category::Black.index();
        (first..first + 16).contains(&index).then(|| index - first)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive `[min, max]` window, written as a two-element array in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const FULL: ValueRange = ValueRange::new(0.0, 1.0);

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    /// 1 at the midpoint falling linearly to 0 at either edge.
    /// A zero-width window is a perfect fit for any value.
    pub fn closeness(&self, value: f32) -> f32 {
        let half = self.width() / 2.0;
        if half <= f32::EPSILON {
            return 1.0;
        }
        (1.0 - (value - self.midpoint()).abs() / half).clamp(0.0, 1.0)
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min >= 0.0
            && self.max <= 1.0
            && self.min <= self.max
    }
}

impl From<[f32; 2]> for ValueRange {
    fn from([min, max]: [f32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<ValueRange> for [f32; 2] {
    fn from(range: ValueRange) -> Self {
        [range.min, range.max]
    }
}

/// Acceptable hue band around `center`, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueWindow {
    pub center: f32,
    pub tolerance: f32,
}

impl HueWindow {
    pub const fn new(center: f32, tolerance: f32) -> Self {
        Self { center, tolerance }
    }

    pub fn contains(&self, hue: f32) -> bool {
        hue_distance(hue, self.center) <= self.tolerance
    }

    pub fn closeness(&self, hue: f32) -> f32 {
        if self.tolerance <= f32::EPSILON {
            return 1.0;
        }
        (1.0 - hue_distance(hue, self.center) / self.tolerance).clamp(0.0, 1.0)
    }
}

/// Numeric acceptance windows for one role in one mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCharacteristics {
    pub lightness: ValueRange,
    pub saturation: ValueRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<HueWindow>,
    pub min_contrast: f32,
}

impl CategoryCharacteristics {
    /// Accepts any color with at least 2:1 contrast against the background.
    pub const PERMISSIVE: CategoryCharacteristics = CategoryCharacteristics {
        lightness: ValueRange::FULL,
        saturation: ValueRange::FULL,
        hue: None,
        min_contrast: 2.0,
    };

    const fn window(
        lightness: (f32, f32),
        saturation: (f32, f32),
        hue: Option<(f32, f32)>,
        min_contrast: f32,
    ) -> Self {
        Self {
            lightness: ValueRange::new(lightness.0, lightness.1),
            saturation: ValueRange::new(saturation.0, saturation.1),
            hue: match hue {
                Some((center, tolerance)) => Some(HueWindow::new(center, tolerance)),
                None => None,
            },
            min_contrast,
        }
    }

    fn validate(&self, mode: ThemeMode, category: Category) -> Result<(), ConfigError> {
        for (field, range) in [("lightness", self.lightness), ("saturation", self.saturation)] {
            if !range.is_valid() {
                return Err(ConfigError::InvalidRange {
                    mode,
                    category,
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if let Some(hue) = self.hue {
            let center_ok = (0.0..360.0).contains(&hue.center);
            let tolerance_ok = (0.0..=180.0).contains(&hue.tolerance);
            if !center_ok || !tolerance_ok {
                return Err(ConfigError::InvalidHue {
                    mode,
                    category,
                    center: hue.center,
                    tolerance: hue.tolerance,
                });
            }
        }
        if !(1.0..=21.0).contains(&self.min_contrast) {
            return Err(ConfigError::InvalidValue {
                field: "min_contrast",
                value: format!("{} ({mode:?} {category})", self.min_contrast),
                reason: "must be a WCAG ratio in [1, 21]",
            });
        }
        Ok(())
    }
}

impl Default for CategoryCharacteristics {
    fn default() -> Self {
        Self::PERMISSIVE
    }
}

/// Per-mode role overrides as they appear in a config file.
pub type CategoryOverrides = BTreeMap<Category, CategoryCharacteristics>;

/// Fully populated role × mode lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    dark: [CategoryCharacteristics; Category::COUNT],
    light: [CategoryCharacteristics; Category::COUNT],
}

impl CategoryTable {
    /// Every role in both modes set to [`CategoryCharacteristics::PERMISSIVE`].
    pub fn permissive() -> Self {
        Self {
            dark: [CategoryCharacteristics::PERMISSIVE; Category::COUNT],
            light: [CategoryCharacteristics::PERMISSIVE; Category::COUNT],
        }
    }

    /// The built-in windows tuned for dark and light terminal themes.
    pub fn builtin() -> Self {
        let mut table = Self::permissive();
        for (category, chars) in dark_defaults() {
            table.set(ThemeMode::Dark, category, chars);
        }
        for (category, chars) in light_defaults() {
            table.set(ThemeMode::Light, category, chars);
        }
        table
    }

    pub fn get(&self, category: Category, mode: ThemeMode) -> &CategoryCharacteristics {
        match mode {
            ThemeMode::Dark => &self.dark[category.index()],
            ThemeMode::Light => &self.light[category.index()],
        }
    }

    pub fn set(&mut self, mode: ThemeMode, category: Category, chars: CategoryCharacteristics) {
        match mode {
            ThemeMode::Dark => self.dark[category.index()] = chars,
            ThemeMode::Light => self.light[category.index()] = chars,
        }
    }

    /// Replace the entries named in `overrides` for `mode`.
    pub fn apply_overrides(&mut self, mode: ThemeMode, overrides: &CategoryOverrides) {
        for (&category, &chars) in overrides {
            tracing::debug!(?mode, %category, "category override");
            self.set(mode, category, chars);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for mode in ThemeMode::ALL {
            for category in Category::ALL {
                self.get(category, mode).validate(mode, category)?;
            }
        }
        Ok(())
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

const ANSI_HUES: [(Category, Category, f32, f32); 6] = [
    (Category::Red, Category::BrightRed, 0.0, 30.0),
    (Category::Green, Category::BrightGreen, 120.0, 45.0),
    (Category::Yellow, Category::BrightYellow, 55.0, 25.0),
    (Category::Blue, Category::BrightBlue, 225.0, 35.0),
    (Category::Magenta, Category::BrightMagenta, 300.0, 35.0),
    (Category::Cyan, Category::BrightCyan, 180.0, 30.0),
];

const SEMANTIC_HUES: [(Category, f32, f32); 4] = [
    (Category::Error, 0.0, 25.0),
    (Category::Warning, 40.0, 20.0),
    (Category::Success, 120.0, 40.0),
    (Category::Info, 210.0, 30.0),
];

fn dark_defaults() -> Vec<(Category, CategoryCharacteristics)> {
    use CategoryCharacteristics as C;
    let mut table = vec![
        (Category::Background, C::window((0.0, 0.2), (0.0, 0.6), None, 1.0)),
        (Category::Foreground, C::window((0.7, 1.0), (0.0, 0.35), None, 7.0)),
        (Category::DimForeground, C::window((0.45, 0.75), (0.0, 0.35), None, 4.5)),
        (Category::Cursor, C::window((0.5, 1.0), (0.0, 1.0), None, 3.0)),
        (Category::AccentPrimary, C::window((0.4, 0.8), (0.4, 1.0), None, 3.0)),
        (Category::AccentSecondary, C::window((0.35, 0.8), (0.3, 1.0), None, 3.0)),
        (Category::AccentTertiary, C::window((0.3, 0.85), (0.25, 1.0), None, 2.5)),
        (Category::Black, C::window((0.0, 0.3), (0.0, 0.35), None, 1.0)),
        (Category::White, C::window((0.6, 0.9), (0.0, 0.3), None, 4.5)),
        (Category::BrightBlack, C::window((0.25, 0.5), (0.0, 0.35), None, 2.0)),
        (Category::BrightWhite, C::window((0.85, 1.0), (0.0, 0.25), None, 7.0)),
    ];
    for (category, center, tolerance) in SEMANTIC_HUES {
        table.push((
            category,
            C::window((0.4, 0.75), (0.4, 1.0), Some((center, tolerance)), 3.0),
        ));
    }
    for (normal, bright, center, tolerance) in ANSI_HUES {
        table.push((
            normal,
            C::window((0.35, 0.65), (0.35, 1.0), Some((center, tolerance)), 3.0),
        ));
        table.push((
            bright,
            C::window((0.5, 0.85), (0.35, 1.0), Some((center, tolerance)), 4.5),
        ));
    }
    table
}

fn light_defaults() -> Vec<(Category, CategoryCharacteristics)> {
    use CategoryCharacteristics as C;
    let mut table = vec![
        (Category::Background, C::window((0.85, 1.0), (0.0, 0.6), None, 1.0)),
        (Category::Foreground, C::window((0.0, 0.3), (0.0, 0.35), None, 7.0)),
        (Category::DimForeground, C::window((0.25, 0.55), (0.0, 0.35), None, 4.5)),
        (Category::Cursor, C::window((0.0, 0.5), (0.0, 1.0), None, 3.0)),
        (Category::AccentPrimary, C::window((0.2, 0.6), (0.4, 1.0), None, 3.0)),
        (Category::AccentSecondary, C::window((0.2, 0.65), (0.3, 1.0), None, 3.0)),
        (Category::AccentTertiary, C::window((0.15, 0.7), (0.25, 1.0), None, 2.5)),
        (Category::Black, C::window((0.0, 0.25), (0.0, 0.35), None, 4.5)),
        (Category::White, C::window((0.75, 0.95), (0.0, 0.3), None, 1.0)),
        (Category::BrightBlack, C::window((0.35, 0.6), (0.0, 0.35), None, 2.0)),
        (Category::BrightWhite, C::window((0.9, 1.0), (0.0, 0.25), None, 1.0)),
    ];
    for (category, center, tolerance) in SEMANTIC_HUES {
        table.push((
            category,
            C::window((0.25, 0.6), (0.4, 1.0), Some((center, tolerance)), 3.0),
        ));
    }
    for (normal, bright, center, tolerance) in ANSI_HUES {
        table.push((
            normal,
            C::window((0.25, 0.55), (0.35, 1.0), Some((center, tolerance)), 3.0),
        ));
        table.push((
            bright,
            C::window((0.35, 0.65), (0.35, 1.0), Some((center, tolerance)), 2.5),
        ));
    }
    table
}
