//! Chunk coordinates and whole-chunk generation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use skyline_noise::NoiseField;

use crate::biome::Biome;
use crate::building::{Building, generate_building};

/// Identifies a fixed-size square region of the world plane.
///
/// Coordinates are in chunk-grid space: chunk `(cx, cz)` covers cells
/// `[cx * size, (cx + 1) * size)` on each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the coordinate offset by `(dx, dz)`.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Chebyshev (chessboard) distance to another chunk.
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/// Maps a cell coordinate to its owning chunk (floor division).
pub fn chunk_of_cell(cell_x: i32, cell_z: i32, chunk_size: u32) -> ChunkCoord {
    let size = chunk_size as i32;
    ChunkCoord::new(cell_x.div_euclid(size), cell_z.div_euclid(size))
}

/// Generates every building in a chunk.
///
/// Sweeps the `chunk_size × chunk_size` cell grid row-major, classifying the
/// biome and synthesizing the cell's building. Output depends only on
/// `(seed, coord, chunk_size)`; the relative cell order is stable, so two
/// generations of the same chunk compare equal element-for-element.
pub fn generate_chunk(
    seed: &str,
    coord: ChunkCoord,
    chunk_size: u32,
    field: &NoiseField,
) -> Vec<Building> {
    let size = chunk_size as i32;
    let base_x = coord.x * size;
    let base_z = coord.z * size;

    let mut buildings = Vec::new();
    for dz in 0..size {
        for dx in 0..size {
            let cell_x = base_x + dx;
            let cell_z = base_z + dz;
            let biome = Biome::at(cell_x, cell_z, field);
            if let Some(building) = generate_building(seed, cell_x, cell_z, biome) {
                buildings.push(building);
            }
        }
    }
    buildings
}

/// Stable digest of a generated building list, for determinism checks and
/// regression tests. Floats are hashed by bit pattern.
pub fn chunk_digest(buildings: &[Building]) -> u64 {
    let mut hasher = DefaultHasher::new();
    buildings.len().hash(&mut hasher);
    for b in buildings {
        b.position.x.to_bits().hash(&mut hasher);
        b.position.y.to_bits().hash(&mut hasher);
        b.position.z.to_bits().hash(&mut hasher);
        b.scale.x.to_bits().hash(&mut hasher);
        b.scale.y.to_bits().hash(&mut hasher);
        b.scale.z.to_bits().hash(&mut hasher);
        b.rotation.to_bits().hash(&mut hasher);
        b.biome.hash(&mut hasher);
        b.color.hash(&mut hasher);
        b.kind.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_chunk_deterministic() {
        let field_a = NoiseField::new("chunk-seed");
        let field_b = NoiseField::new("chunk-seed");

        let a = generate_chunk("chunk-seed", ChunkCoord::new(2, -3), 10, &field_a);
        let b = generate_chunk("chunk-seed", ChunkCoord::new(2, -3), 10, &field_b);

        assert_eq!(a, b);
        assert_eq!(chunk_digest(&a), chunk_digest(&b));
    }

    #[test]
    fn test_adjacent_chunks_differ() {
        let field = NoiseField::new("chunk-seed");
        let a = generate_chunk("chunk-seed", ChunkCoord::new(0, 0), 10, &field);
        let b = generate_chunk("chunk-seed", ChunkCoord::new(1, 0), 10, &field);
        assert_ne!(chunk_digest(&a), chunk_digest(&b));
    }

    #[test]
    fn test_buildings_lie_inside_chunk_bounds() {
        use crate::building::CELL_SIZE;

        let field = NoiseField::new("bounds");
        let size = 10;
        let mut total = 0;

        for coord in [
            ChunkCoord::new(-2, 1),
            ChunkCoord::new(0, 0),
            ChunkCoord::new(3, -2),
            ChunkCoord::new(-5, -5),
        ] {
            let buildings = generate_chunk("bounds", coord, size, &field);
            total += buildings.len();
            for b in &buildings {
                let cell_x = (b.position.x / CELL_SIZE).round() as i32;
                let cell_z = (b.position.z / CELL_SIZE).round() as i32;
                assert_eq!(chunk_of_cell(cell_x, cell_z, size), coord);
            }
        }
        assert!(total > 0, "Expected some buildings across 400 cells");
    }

    #[test]
    fn test_chunk_of_cell_floor_division() {
        assert_eq!(chunk_of_cell(0, 0, 10), ChunkCoord::new(0, 0));
        assert_eq!(chunk_of_cell(9, 9, 10), ChunkCoord::new(0, 0));
        assert_eq!(chunk_of_cell(10, 0, 10), ChunkCoord::new(1, 0));
        assert_eq!(chunk_of_cell(-1, -10, 10), ChunkCoord::new(-1, -1));
        assert_eq!(chunk_of_cell(-11, 0, 10), ChunkCoord::new(-2, 0));
    }

    #[test]
    fn test_chebyshev_distance() {
        let origin = ChunkCoord::new(0, 0);
        assert_eq!(origin.chebyshev(ChunkCoord::new(0, 0)), 0);
        assert_eq!(origin.chebyshev(ChunkCoord::new(2, 1)), 2);
        assert_eq!(origin.chebyshev(ChunkCoord::new(-3, 2)), 3);
    }

    #[test]
    fn test_zero_size_chunk_is_empty() {
        let field = NoiseField::new("zero");
        let buildings = generate_chunk("zero", ChunkCoord::new(0, 0), 0, &field);
        assert!(buildings.is_empty());
    }
}
