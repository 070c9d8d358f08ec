//! Deterministic city-world synthesis: biome classification, per-cell
//! building generation, decoration streams, and whole-chunk assembly.
//!
//! Everything here is a pure function of `(seed, coordinates)`; no module
//! keeps mutable session state. That is what lets chunks be evicted and
//! regenerated bit-identically, and generation be offloaded to worker
//! threads without changing results.

mod building;
mod chunk;
mod decoration;
mod map;
mod pool;

pub mod biome;

pub use biome::{BIOME_NOISE_FREQUENCY, BIOME_NOISE_OCTAVES, Biome, BiomeDef, Rgb};
pub use building::{Building, BuildingKind, CELL_SIZE, cell_rng, generate_building, generate_building_with};
pub use chunk::{ChunkCoord, chunk_digest, chunk_of_cell, generate_chunk};
pub use decoration::{Decoration, DecorationKind, generate_decorations};
pub use map::{MapImage, render_biome_map, render_city_map};
pub use pool::{ChunkGenPool, GeneratedChunk, GenerationTask, generate_chunk_task};
