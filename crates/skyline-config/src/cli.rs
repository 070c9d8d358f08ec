//! Command-line argument parsing for the Skyline engine.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Shared engine flags. CLI values override settings loaded from
/// `config.ron`.
#[derive(Parser, Debug, Default)]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<String>,

    /// Chunk edge length in cells.
    #[arg(long)]
    pub chunk_size: Option<u32>,

    /// Render distance in world units.
    #[arg(long)]
    pub render_distance: Option<f32>,

    /// Use the reduced per-silhouette instance budget.
    #[arg(long)]
    pub constrained: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref seed) = args.seed {
            self.world.seed = seed.clone();
        }
        if let Some(size) = args.chunk_size {
            self.world.chunk_size = size;
        }
        if let Some(distance) = args.render_distance {
            self.world.render_distance = distance;
        }
        if args.constrained {
            self.stream.constrained_mode = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
