//! Derived decorations: vegetation and neon signage.
//!
//! Decorations are never part of the world snapshot. They are recomputed on
//! demand from the current building list plus a dedicated seeded stream, and
//! capped for rendering performance.

use glam::Vec3;
use rand::Rng;
use skyline_rng::Mulberry32;

use crate::biome::Rgb;
use crate::building::{Building, CELL_SIZE};

/// The closed set of decoration archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Vegetation,
    Neon,
}

/// A single ephemeral decoration instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
    /// World-space anchor point.
    pub position: Vec3,
    /// Archetype.
    pub kind: DecorationKind,
    /// Color drawn from the owning biome's palette.
    pub color: Rgb,
    /// Uniform scale multiplier.
    pub scale: f32,
}

/// Spawn probability per eligible building for vegetation clusters.
const VEGETATION_CHANCE: f64 = 0.35;

/// Spawn probability per eligible building for neon signs.
const NEON_CHANCE: f64 = 0.5;

/// Computes the decoration set for the given buildings.
///
/// Uses a stream keyed by `"{seed}:decor"`, separate from building
/// synthesis, so adding decorations never perturbs building output. The
/// stream is consumed in building order; pass buildings in a stable order
/// for reproducible results. At most `max` instances are returned.
pub fn generate_decorations(seed: &str, buildings: &[Building], max: usize) -> Vec<Decoration> {
    let mut rng = Mulberry32::from_seed_str(&format!("{seed}:decor"));
    let mut decorations = Vec::new();

    for building in buildings {
        if decorations.len() >= max {
            break;
        }
        let def = building.biome.def();

        if def.vegetation && rng.next_unit() < VEGETATION_CHANCE {
            let dx = rng.random_range(-0.5..0.5) as f32 * CELL_SIZE;
            let dz = rng.random_range(-0.5..0.5) as f32 * CELL_SIZE;
            decorations.push(Decoration {
                position: Vec3::new(building.position.x + dx, 0.0, building.position.z + dz),
                kind: DecorationKind::Vegetation,
                color: def.accent,
                scale: rng.random_range(0.3..1.0) as f32,
            });
        }

        if decorations.len() >= max {
            break;
        }

        if def.neon && rng.next_unit() < NEON_CHANCE {
            // Sign mounted partway up the facade.
            let mount = rng.random_range(0.3..0.9) as f32;
            decorations.push(Decoration {
                position: Vec3::new(
                    building.position.x + building.scale.x * 0.5,
                    building.scale.y * mount,
                    building.position.z,
                ),
                kind: DecorationKind::Neon,
                color: def.accent,
                scale: rng.random_range(0.5..1.5) as f32,
            });
        }
    }

    decorations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{Biome, BiomeDef};
    use crate::building::generate_building_with;

    fn dense_buildings(biome: Biome, count: i32) -> Vec<Building> {
        let def = BiomeDef {
            building_density: 1.0,
            ..biome.def().clone()
        };
        (0..count)
            .filter_map(|x| generate_building_with("decor-seed", x, 0, biome, &def))
            .collect()
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let buildings = dense_buildings(Biome::Cyber, 50);
        let a = generate_decorations("decor-seed", &buildings, 512);
        let b = generate_decorations("decor-seed", &buildings, 512);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cap_is_respected() {
        let buildings = dense_buildings(Biome::Cyber, 200);
        let decorations = generate_decorations("decor-seed", &buildings, 10);
        assert!(decorations.len() <= 10);
    }

    #[test]
    fn test_neon_only_in_neon_biomes() {
        let buildings = dense_buildings(Biome::Industrial, 100);
        let decorations = generate_decorations("decor-seed", &buildings, 512);
        assert!(
            decorations
                .iter()
                .all(|d| d.kind != DecorationKind::Neon),
            "Industrial biome must not spawn neon"
        );
    }

    #[test]
    fn test_vegetation_only_in_vegetated_biomes() {
        let cyber = dense_buildings(Biome::Cyber, 100);
        let decorations = generate_decorations("decor-seed", &cyber, 512);
        assert!(
            decorations
                .iter()
                .all(|d| d.kind != DecorationKind::Vegetation),
            "Cyber biome must not spawn vegetation"
        );

        let nature = dense_buildings(Biome::Nature, 100);
        let decorations = generate_decorations("decor-seed", &nature, 512);
        assert!(
            decorations
                .iter()
                .any(|d| d.kind == DecorationKind::Vegetation),
            "Nature biome should spawn some vegetation over 100 buildings"
        );
    }

    #[test]
    fn test_no_buildings_no_decorations() {
        assert!(generate_decorations("decor-seed", &[], 512).is_empty());
    }
}
