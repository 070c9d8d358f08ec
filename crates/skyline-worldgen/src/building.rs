//! Per-cell building synthesis.
//!
//! Each grid cell owns a private PRNG derived from the world seed and the
//! cell coordinates, so the building at `(x, z)` is identical regardless of
//! generation order, call count, or which chunks happen to be loaded.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use skyline_rng::Mulberry32;

use crate::biome::{Biome, BiomeDef, Rgb};

/// World units per grid cell, applied to both positions and chunk extents.
pub const CELL_SIZE: f32 = 5.0;

/// The closed set of building silhouettes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Tower,
    Block,
    Pyramid,
    Sphere,
}

impl BuildingKind {
    /// All kinds, in draw order.
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Tower,
        BuildingKind::Block,
        BuildingKind::Pyramid,
        BuildingKind::Sphere,
    ];
}

/// One synthesized structure. Immutable after creation; lives only as long
/// as its owning chunk is loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// World-space center of the structure.
    pub position: Vec3,
    /// Width / height / depth in world units.
    pub scale: Vec3,
    /// Rotation around the vertical axis, in radians.
    pub rotation: f32,
    /// Biome the structure was generated in.
    pub biome: Biome,
    /// Resolved color from the biome palette.
    pub color: Rgb,
    /// Silhouette.
    pub kind: BuildingKind,
}

/// Derives the private PRNG for a cell.
///
/// Keyed by the string `"{seed}-{x}-{z}"`; the avalanche in the seed hash
/// decorrelates neighboring cells despite the near-identical key strings.
pub fn cell_rng(seed: &str, x: i32, z: i32) -> Mulberry32 {
    Mulberry32::from_seed_str(&format!("{seed}-{x}-{z}"))
}

/// Synthesizes the building for a cell, or `None` for an empty cell.
///
/// `None` is the normal sparse outcome, not an error. The first draw gates
/// against the biome's `building_density`; subsequent draws fix the
/// structure's dimensions, rotation, silhouette, and color in a fixed order
/// so the record is fully determined by `(seed, x, z, biome)`.
pub fn generate_building(seed: &str, x: i32, z: i32, biome: Biome) -> Option<Building> {
    generate_building_with(seed, x, z, biome, biome.def())
}

/// Variant of [`generate_building`] taking an explicit profile.
///
/// Exists for hosts that tune densities or palettes at runtime without
/// touching the static biome table.
pub fn generate_building_with(
    seed: &str,
    x: i32,
    z: i32,
    biome: Biome,
    def: &BiomeDef,
) -> Option<Building> {
    let mut rng = cell_rng(seed, x, z);

    // Sparsity gate: a unit draw at or above the density means no building.
    if rng.next_unit() >= def.building_density {
        return None;
    }

    let height = rng.random_range(def.height_range.0..def.height_range.1) as f32;
    let width = rng.random_range(1.0..3.0) as f32;
    let depth = rng.random_range(1.0..3.0) as f32;
    let rotation = rng.random_range(0.0..std::f64::consts::TAU) as f32;
    let kind = BuildingKind::ALL[rng.random_range(0..BuildingKind::ALL.len())];
    let color = if rng.next_unit() < 0.25 {
        def.accent
    } else {
        def.building
    };

    Some(Building {
        position: Vec3::new(x as f32 * CELL_SIZE, height * 0.5, z as f32 * CELL_SIZE),
        scale: Vec3::new(width, height, depth),
        rotation,
        biome,
        color,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_cell_same_building() {
        let first = generate_building("seed", 3, 4, Biome::Cyber);
        for _ in 0..100 {
            assert_eq!(generate_building("seed", 3, 4, Biome::Cyber), first);
        }
    }

    #[test]
    fn test_cell_is_independent_of_other_generations() {
        let before = generate_building("seed", 3, 4, Biome::Cyber);

        // Generate and discard a thousand other cells in between.
        for i in 0..1000 {
            let _ = generate_building("seed", 100 + i, -50, Biome::Industrial);
        }

        assert_eq!(generate_building("seed", 3, 4, Biome::Cyber), before);
    }

    #[test]
    fn test_density_zero_yields_no_buildings() {
        let def = BiomeDef {
            building_density: 0.0,
            ..Biome::Cyber.def().clone()
        };
        for x in -20..20 {
            for z in -20..20 {
                assert_eq!(
                    generate_building_with("seed", x, z, Biome::Cyber, &def),
                    None
                );
            }
        }
    }

    #[test]
    fn test_density_one_yields_a_building_everywhere() {
        let def = BiomeDef {
            building_density: 1.0,
            ..Biome::Cyber.def().clone()
        };
        for x in -20..20 {
            for z in -20..20 {
                assert!(
                    generate_building_with("seed", x, z, Biome::Cyber, &def).is_some(),
                    "Empty cell at ({x}, {z}) despite density 1.0"
                );
            }
        }
    }

    #[test]
    fn test_generated_fields_are_well_formed() {
        let def = BiomeDef {
            building_density: 1.0,
            ..Biome::Cyber.def().clone()
        };
        for x in -10..10 {
            for z in -10..10 {
                let b = generate_building_with("fields", x, z, Biome::Cyber, &def)
                    .expect("density 1.0");
                assert_eq!(b.position.x, x as f32 * CELL_SIZE);
                assert_eq!(b.position.z, z as f32 * CELL_SIZE);
                assert!((b.position.y - b.scale.y * 0.5).abs() < 1e-6);
                assert!(b.scale.y >= def.height_range.0 as f32);
                assert!(b.scale.y <= def.height_range.1 as f32);
                assert!((1.0..=3.0).contains(&b.scale.x));
                assert!((1.0..=3.0).contains(&b.scale.z));
                assert!((0.0..=std::f32::consts::TAU).contains(&b.rotation));
                assert!(BuildingKind::ALL.contains(&b.kind));
            }
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let def = BiomeDef {
            building_density: 1.0,
            ..Biome::Cyber.def().clone()
        };
        let mut identical = 0;
        for z in 0..100 {
            let a = generate_building_with("world-a", 0, z, Biome::Cyber, &def);
            let b = generate_building_with("world-b", 0, z, Biome::Cyber, &def);
            if a == b {
                identical += 1;
            }
        }
        assert!(
            identical <= 1,
            "{identical} of 100 cells identical across different seeds"
        );
    }

    #[test]
    fn test_all_kinds_appear() {
        let def = BiomeDef {
            building_density: 1.0,
            ..Biome::Cyber.def().clone()
        };
        let mut seen = std::collections::HashSet::new();
        for x in 0..100 {
            if let Some(b) = generate_building_with("kinds", x, 0, Biome::Cyber, &def) {
                seen.insert(b.kind);
            }
        }
        assert_eq!(seen.len(), BuildingKind::ALL.len());
    }
}
