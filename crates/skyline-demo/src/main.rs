//! Headless demo binary for the Skyline engine.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags. Every subcommand is a plain control-loop host: it calls the
//! engine, prints what happened, and exits.
//!
//! Run with `cargo run -p skyline-demo -- walk` to stream chunks along a
//! path, or `-- map --out city.png` to export a top-down render.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use glam::Vec3;
use skyline_config::{CliArgs, Config, default_config_dir};
use skyline_noise::NoiseField;
use skyline_world::{StateError, WorldSession, WorldState};
use skyline_worldgen::{
    Building, CELL_SIZE, ChunkCoord, ChunkGenPool, GenerationTask, MapImage, generate_decorations,
    render_biome_map, render_city_map,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "skyline", about = "Skyline procedural city-world engine")]
struct DemoArgs {
    #[command(flatten)]
    engine: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream chunks along a straight focus path, printing each patch.
    Walk {
        /// Number of focus updates.
        #[arg(long, default_value_t = 20)]
        steps: u32,
        /// World units moved per step.
        #[arg(long, default_value_t = 25.0)]
        stride: f32,
    },
    /// Export top-down biome and city maps as PNG.
    Map {
        /// Region radius in cells around the origin.
        #[arg(long, default_value_t = 80)]
        radius: i32,
        /// Pixels per cell.
        #[arg(long, default_value_t = 2)]
        px_per_cell: u32,
        /// Output path for the city map; the biome map lands next to it.
        #[arg(long, default_value = "city.png")]
        out: PathBuf,
    },
    /// Generate the world window around the origin and save a snapshot.
    Save {
        /// Worker threads for parallel generation (0 = inline).
        #[arg(long, default_value_t = 0)]
        workers: usize,
        /// Output path for the JSON snapshot.
        #[arg(long, default_value = "world.json")]
        out: PathBuf,
    },
    /// Restore a snapshot and print a summary.
    Load {
        /// Path to a JSON snapshot.
        #[arg(long, default_value = "world.json")]
        path: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

fn main() {
    let args = DemoArgs::parse();

    let config_dir = args
        .engine
        .config
        .clone()
        .unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.engine);

    let log_dir = config_dir.join("logs");
    skyline_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let result = match args.command {
        Command::Walk { steps, stride } => run_walk(&config, steps, stride),
        Command::Map {
            radius,
            px_per_cell,
            out,
        } => run_map(&config, radius, px_per_cell, &out),
        Command::Save { workers, out } => run_save(&config, workers, &out),
        Command::Load { path } => run_load(&config, &path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Streams chunks along a diagonal path, logging every patch.
fn run_walk(config: &Config, steps: u32, stride: f32) -> Result<(), DemoError> {
    let mut session = session_from(config);
    info!(
        seed = session.seed(),
        chunk_size = session.chunk_size(),
        render_distance = session.render_distance(),
        "starting walk"
    );

    for step in 0..steps {
        let focus = Vec3::new(step as f32 * stride, 0.0, step as f32 * stride * 0.5);
        let patch = session.update_focus(focus);
        if patch.is_empty() {
            info!(step, "focus moved within the current window");
            continue;
        }
        info!(
            step,
            added = patch.added.len(),
            removed = patch.removed.len(),
            chunks = session.loaded_count(),
            buildings = session.building_count(),
            "streamed"
        );
    }

    // Per-silhouette draw budget and the decoration pass, as a renderer
    // host would consume them.
    let cap = config.stream.active_instance_cap() as usize;
    for (kind, group) in session.render_batches(cap) {
        info!(?kind, drawn = group.len(), cap, "render batch");
    }

    let buildings: Vec<Building> = session.buildings().cloned().collect();
    let decorations = generate_decorations(
        session.seed(),
        &buildings,
        config.stream.decoration_cap as usize,
    );
    info!(
        decorations = decorations.len(),
        cap = config.stream.decoration_cap,
        "decoration pass"
    );

    info!(digest = %format!("{:016x}", session.world_digest()), "walk complete");
    Ok(())
}

/// Renders the biome and city maps around the origin.
fn run_map(config: &Config, radius: i32, px_per_cell: u32, out: &Path) -> Result<(), DemoError> {
    let field = NoiseField::new(&config.world.seed);

    let biome_map = render_biome_map(&field, 0, 0, radius, px_per_cell);
    let biome_path = out.with_file_name(match out.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => format!("{stem}-biomes.png"),
        None => "biomes.png".to_string(),
    });
    write_png(&biome_map, &biome_path)?;
    info!(path = %biome_path.display(), "wrote biome map");

    let city_map = render_city_map(&field, &config.world.seed, 0, 0, radius, px_per_cell);
    write_png(&city_map, out)?;
    info!(path = %out.display(), width = city_map.width, "wrote city map");
    Ok(())
}

/// Generates the load window around the origin and writes a JSON snapshot.
///
/// With `workers > 0` the chunks are generated on a thread pool; the result
/// is identical to the inline path because generation is keyed only by seed
/// and coordinates.
fn run_save(config: &Config, workers: usize, out: &Path) -> Result<(), DemoError> {
    let state = if workers > 0 && config.world.chunk_size > 0 && config.world.render_distance > 0.0
    {
        bake_parallel(config, workers)
    } else {
        let mut session = session_from(config);
        session.update_focus(Vec3::ZERO);
        session.snapshot()
    };

    info!(
        chunks = state.loaded_chunks.len(),
        buildings = state.buildings.len(),
        workers,
        "baked world window"
    );

    std::fs::write(out, state.to_json()?)?;
    info!(path = %out.display(), "wrote snapshot");
    Ok(())
}

/// Restores a snapshot, falling back to a fresh default-seeded session when
/// the file is corrupt.
fn run_load(config: &Config, path: &Path) -> Result<(), DemoError> {
    let contents = std::fs::read_to_string(path)?;

    let mut session = match WorldState::from_json(&contents)
        .and_then(|state| WorldSession::restore(state, config.world.chunk_size, config.world.render_distance))
    {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "snapshot unusable, starting a fresh session");
            session_from(config)
        }
    };

    // A snapshot taken at the origin restores into a stable window: the
    // first focus update is a no-op.
    let patch = session.update_focus(Vec3::ZERO);
    info!(
        seed = session.seed(),
        chunks = session.loaded_count(),
        buildings = session.building_count(),
        stable = patch.is_empty(),
        digest = %format!("{:016x}", session.world_digest()),
        "session restored"
    );
    Ok(())
}

fn session_from(config: &Config) -> WorldSession {
    WorldSession::new(
        config.world.seed.clone(),
        config.world.chunk_size,
        config.world.render_distance,
    )
}

/// Generates every chunk of the origin load window on a worker pool and
/// assembles the snapshot in sorted-chunk order.
fn bake_parallel(config: &Config, workers: usize) -> WorldState {
    let chunk_size = config.world.chunk_size;
    let extent = chunk_size as f32 * CELL_SIZE;
    let radius = (config.world.render_distance / extent).ceil() as i32;

    let mut coords = Vec::new();
    for z in -radius..=radius {
        for x in -radius..=radius {
            coords.push(ChunkCoord::new(x, z));
        }
    }
    // Nearest chunks first.
    coords.sort_by_key(|c| i64::from(c.x) * i64::from(c.x) + i64::from(c.z) * i64::from(c.z));

    let seed: Arc<str> = Arc::from(config.world.seed.as_str());
    let pool = ChunkGenPool::new(workers, coords.len().max(1), coords.len().max(1));

    for coord in &coords {
        let mut task = GenerationTask {
            coord: *coord,
            seed: Arc::clone(&seed),
            chunk_size,
            priority: i64::from(coord.x).pow(2) as u64 + i64::from(coord.z).pow(2) as u64,
        };
        // The queue is sized for the full window; the retry loop covers the
        // full-channel case anyway.
        while let Err(rejected) = pool.submit(task) {
            task = rejected;
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }

    let mut generated: BTreeMap<ChunkCoord, Vec<Building>> = BTreeMap::new();
    while generated.len() < coords.len() {
        for chunk in pool.drain_results() {
            info!(
                chunk = ?chunk.coord,
                buildings = chunk.buildings.len(),
                micros = chunk.generation_time_us,
                "generated"
            );
            generated.insert(chunk.coord, chunk.buildings);
        }
        if generated.len() < coords.len() {
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
    }

    let loaded_chunks: Vec<ChunkCoord> = generated.keys().copied().collect();
    let buildings: Vec<Building> = generated.into_values().flatten().collect();
    WorldState {
        seed: config.world.seed.clone(),
        loaded_chunks,
        buildings,
    }
}

/// Encodes an RGBA [`MapImage`] as a PNG file.
fn write_png(image: &MapImage, path: &Path) -> Result<(), DemoError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&image.pixels)?;
    Ok(())
}
