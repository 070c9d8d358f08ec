//! Top-down debug map rendering of generated worlds.
//!
//! Produces plain RGBA buffers so callers decide the output encoding (the
//! demo binary writes PNG). Used to visually diagnose biome thresholds and
//! building densities without a 3D frontend.

use skyline_noise::NoiseField;

use crate::biome::Biome;
use crate::building::generate_building;

/// A 2D image stored as row-major RGBA pixels.
#[derive(Clone, Debug)]
pub struct MapImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data in row-major RGBA format. Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl MapImage {
    /// Creates a new black, fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Sets a single pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) {
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx] = r;
        self.pixels[idx + 1] = g;
        self.pixels[idx + 2] = b;
        self.pixels[idx + 3] = a;
    }

    /// Reads a single pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let idx = ((y * self.width + x) * 4) as usize;
        (
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    /// Fills a `px_per_cell`-sized square block for one cell.
    fn fill_cell(&mut self, col: u32, row: u32, px_per_cell: u32, color: (u8, u8, u8)) {
        for dy in 0..px_per_cell {
            for dx in 0..px_per_cell {
                self.set_pixel(
                    col * px_per_cell + dx,
                    row * px_per_cell + dy,
                    color.0,
                    color.1,
                    color.2,
                    255,
                );
            }
        }
    }
}

/// Renders the biome ground colors for the square cell region centered on
/// `(center_x, center_z)` with the given radius, `px_per_cell` pixels per
/// cell.
pub fn render_biome_map(
    field: &NoiseField,
    center_x: i32,
    center_z: i32,
    radius_cells: i32,
    px_per_cell: u32,
) -> MapImage {
    let side = (radius_cells as u32 * 2 + 1) * px_per_cell;
    let mut image = MapImage::new(side, side);

    for (row, dz) in (-radius_cells..=radius_cells).enumerate() {
        for (col, dx) in (-radius_cells..=radius_cells).enumerate() {
            let ground = Biome::at(center_x + dx, center_z + dz, field).def().ground;
            image.fill_cell(col as u32, row as u32, px_per_cell, (ground.0, ground.1, ground.2));
        }
    }
    image
}

/// Renders ground colors plus building footprints (in the building's
/// resolved color) for the same region as [`render_biome_map`].
pub fn render_city_map(
    field: &NoiseField,
    seed: &str,
    center_x: i32,
    center_z: i32,
    radius_cells: i32,
    px_per_cell: u32,
) -> MapImage {
    let mut image = render_biome_map(field, center_x, center_z, radius_cells, px_per_cell);

    for (row, dz) in (-radius_cells..=radius_cells).enumerate() {
        for (col, dx) in (-radius_cells..=radius_cells).enumerate() {
            let cell_x = center_x + dx;
            let cell_z = center_z + dz;
            let biome = Biome::at(cell_x, cell_z, field);
            if let Some(building) = generate_building(seed, cell_x, cell_z, biome) {
                let color = building.color;
                image.fill_cell(col as u32, row as u32, px_per_cell, (color.0, color.1, color.2));
            }
        }
    }
    image
}
