//! Turn a raster image into a small, semantically labeled color profile for theme
//! generation: a weighted color pool, statistics describing its chromatic character,
//! a light/dark classification and one color per UI role.

pub mod category;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod profile;
pub mod report;

pub use category::Category;
pub use cli::ThemeMode;
pub use color::Color;
pub use config::Config;
pub use error::{ConfigError, ProfileError};
pub use profile::{process_image, ColorProfile, Profiler};
