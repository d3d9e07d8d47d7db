use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nuri_profile::cli::Args;
use nuri_profile::config::Config;
use nuri_profile::loader::load_image;
use nuri_profile::pipeline::assign::HeuristicAssigner;
use nuri_profile::profile::Profiler;
use nuri_profile::report;

fn init_tracing(verbose: bool) {
    let default = if verbose { "nuri_profile=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => Config::default(),
    };

    let img = load_image(&args.image)?;

    let mut profiler = Profiler::new(config)?.with_mode(args.mode);
    if args.heuristic {
        profiler = profiler.with_strategy(HeuristicAssigner::default());
    }
    let profile = profiler
        .profile(&img)
        .with_context(|| format!("failed to profile {}", args.image.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print!("{}", report::summary(&profile));
    }

    if args.preview {
        report::preview(&profile, &mut io::stdout().lock())?;
    }

    Ok(())
}
