use thiserror::Error;

use crate::category::Category;
use crate::cli::ThemeMode;

/// Errors that abort a profiling call.
///
/// Unassignable roles and zero-width scoring windows are not errors: they show up as
/// absent map entries and constant fit terms in the resulting profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Zero-area image, or no color survived frequency filtering.
    #[error("no usable colors found")]
    InputEmpty,

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating a configuration bundle.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{mode:?} {category}: {field} range [{min}, {max}] must satisfy 0 <= min <= max <= 1")]
    InvalidRange {
        mode: ThemeMode,
        category: Category,
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{mode:?} {category}: hue center {center} must be in [0, 360) and tolerance {tolerance} in [0, 180]")]
    InvalidHue {
        mode: ThemeMode,
        category: Category,
        center: f32,
        tolerance: f32,
    },

    #[error("{field} = {value}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ProfileError>;
