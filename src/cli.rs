use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Extract a labeled, contrast-aware color profile from an image.
#[derive(Parser, Debug)]
#[command(name = "nuri-profile", version, about)]
pub struct Args {
    /// Path to the input image
    pub image: PathBuf,

    /// TOML configuration file (built-in defaults if omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Force dark or light mode (auto-detected if omitted)
    #[arg(short, long, value_enum)]
    pub mode: Option<ThemeMode>,

    /// Print the full profile as JSON instead of the text summary
    #[arg(long)]
    pub json: bool,

    /// Print a colored terminal preview of the assigned roles
    #[arg(long)]
    pub preview: bool,

    /// Use the simple frequency/contrast heuristic instead of the scored role model
    #[arg(long)]
    pub heuristic: bool,

    /// Enable debug logging on stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 2] = [ThemeMode::Dark, ThemeMode::Light];
}
