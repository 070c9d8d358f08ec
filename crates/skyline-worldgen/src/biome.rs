//! Biome classification: fixed threshold lookup over a fractal noise scalar.
//!
//! Biomes are static configuration, not runtime entities. The table below is
//! the single source of truth for palettes, densities, and decoration flags;
//! nothing mutates it and every lookup is constant-time.

use serde::{Deserialize, Serialize};
use skyline_noise::NoiseField;

/// An 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Frequency applied to cell coordinates before sampling the biome field.
/// Lower values produce broader districts.
pub const BIOME_NOISE_FREQUENCY: f64 = 0.05;

/// Octave count for the biome fBm scalar.
pub const BIOME_NOISE_OCTAVES: u32 = 4;

/// The closed set of district biomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Biome {
    /// Near-empty dark zones between districts.
    Void,
    /// Warehouses and stacks; dense mid-rise, warm rust palette.
    Industrial,
    /// The neon core; tallest and densest.
    Cyber,
    /// Gallery quarter; sparse pastel structures.
    Art,
    /// Overgrown low-rise with vegetation.
    Nature,
}

/// Static visual/structural profile for one biome.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeDef {
    /// Human-readable district name.
    pub name: &'static str,
    /// Ground plane color.
    pub ground: Rgb,
    /// Primary building color.
    pub building: Rgb,
    /// Accent color (neon signage, vegetation highlights).
    pub accent: Rgb,
    /// Probability that a cell in this biome holds a building, in `[0, 1]`.
    pub building_density: f64,
    /// Building height range `[min, max)` in world units.
    pub height_range: (f64, f64),
    /// Whether vegetation decorations may spawn here.
    pub vegetation: bool,
    /// Whether neon decorations may spawn here.
    pub neon: bool,
}

const BIOME_TABLE: [BiomeDef; 5] = [
    BiomeDef {
        name: "void",
        ground: Rgb(10, 8, 18),
        building: Rgb(30, 26, 44),
        accent: Rgb(60, 50, 90),
        building_density: 0.02,
        height_range: (1.0, 4.0),
        vegetation: false,
        neon: false,
    },
    BiomeDef {
        name: "industrial",
        ground: Rgb(38, 34, 30),
        building: Rgb(84, 76, 66),
        accent: Rgb(198, 120, 48),
        building_density: 0.5,
        height_range: (1.0, 12.0),
        vegetation: false,
        neon: false,
    },
    BiomeDef {
        name: "cyber",
        ground: Rgb(16, 22, 34),
        building: Rgb(36, 48, 78),
        accent: Rgb(0, 255, 204),
        building_density: 0.8,
        height_range: (2.0, 20.0),
        vegetation: false,
        neon: true,
    },
    BiomeDef {
        name: "art",
        ground: Rgb(44, 30, 48),
        building: Rgb(120, 82, 130),
        accent: Rgb(255, 94, 180),
        building_density: 0.4,
        height_range: (1.0, 8.0),
        vegetation: false,
        neon: true,
    },
    BiomeDef {
        name: "nature",
        ground: Rgb(24, 46, 30),
        building: Rgb(70, 96, 74),
        accent: Rgb(120, 200, 120),
        building_density: 0.15,
        height_range: (1.0, 6.0),
        vegetation: true,
        neon: false,
    },
];

impl Biome {
    /// All biomes, in classification order.
    pub const ALL: [Biome; 5] = [
        Biome::Void,
        Biome::Industrial,
        Biome::Cyber,
        Biome::Art,
        Biome::Nature,
    ];

    /// Maps a noise scalar to a biome.
    ///
    /// Thresholds are ascending, lower-inclusive/upper-exclusive, and total
    /// over the real line: every input maps to exactly one biome.
    pub fn classify(value: f64) -> Biome {
        if value < -0.5 {
            Biome::Void
        } else if value < -0.2 {
            Biome::Industrial
        } else if value < 0.2 {
            Biome::Cyber
        } else if value < 0.5 {
            Biome::Art
        } else {
            Biome::Nature
        }
    }

    /// Samples the biome at a cell coordinate.
    pub fn at(x: i32, z: i32, field: &NoiseField) -> Biome {
        let value = field.fbm(
            f64::from(x) * BIOME_NOISE_FREQUENCY,
            f64::from(z) * BIOME_NOISE_FREQUENCY,
            BIOME_NOISE_OCTAVES,
        );
        Self::classify(value)
    }

    /// The static profile for this biome. Never fails.
    pub fn def(self) -> &'static BiomeDef {
        &BIOME_TABLE[self as usize]
    }
}
