//! The chunk streaming session.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::Vec3;
use rustc_hash::FxHashMap;
use skyline_noise::NoiseField;
use skyline_worldgen::{
    Building, BuildingKind, CELL_SIZE, ChunkCoord, chunk_digest, chunk_of_cell, generate_chunk,
};
use tracing::debug;

use crate::state::{StateError, WorldState};

/// The set of chunks that entered and left the load window in one focus
/// update. Empty when the update was a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkPatch {
    /// Chunks loaded by this update, in scan order.
    pub added: Vec<ChunkCoord>,
    /// Chunks evicted by this update, in coordinate order.
    pub removed: Vec<ChunkCoord>,
}

impl ChunkPatch {
    /// Returns `true` if no chunk entered or left the window.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// One generation session: a seed, its noise field, and the currently
/// loaded chunks with their buildings.
///
/// The session exclusively owns its state; callers interact through
/// [`update_focus`](Self::update_focus) and read-only accessors, never by
/// mutating returned data in place.
pub struct WorldSession {
    seed: String,
    field: NoiseField,
    chunk_size: u32,
    render_distance: f32,
    chunks: FxHashMap<ChunkCoord, Vec<Building>>,
    last_center: Option<ChunkCoord>,
}

impl WorldSession {
    /// Creates an empty session for a seed.
    ///
    /// `chunk_size` is the chunk edge length in cells; `render_distance` is
    /// in world units. No chunks are loaded until the first
    /// [`update_focus`](Self::update_focus) call.
    pub fn new(seed: impl Into<String>, chunk_size: u32, render_distance: f32) -> Self {
        let seed = seed.into();
        let field = NoiseField::new(&seed);
        Self {
            seed,
            field,
            chunk_size,
            render_distance,
            chunks: FxHashMap::default(),
            last_center: None,
        }
    }

    /// The session's seed.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Chunk edge length in cells.
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Render distance in world units.
    pub fn render_distance(&self) -> f32 {
        self.render_distance
    }

    /// Chunk edge length in world units.
    pub fn chunk_extent(&self) -> f32 {
        self.chunk_size as f32 * CELL_SIZE
    }

    /// Load radius in chunks, or `None` for degenerate parameters
    /// (non-positive render distance or zero chunk size), which are treated
    /// permissively as "no chunks load".
    fn load_radius(&self) -> Option<i32> {
        if self.chunk_size == 0 || self.render_distance <= 0.0 {
            return None;
        }
        Some((self.render_distance / self.chunk_extent()).ceil() as i32)
    }

    /// Streams chunks around a new focus position.
    ///
    /// Loads every chunk within the load radius that is not yet resident
    /// (generating its buildings) and evicts every resident chunk beyond
    /// Chebyshev radius `load_radius + 1` (the hysteresis band prevents
    /// thrashing at the boundary). Returns the resulting [`ChunkPatch`];
    /// when no chunk enters or leaves the window the patch is empty and no
    /// session state is touched.
    ///
    /// Evicted chunks are forgotten entirely. Revisiting one regenerates
    /// identical buildings, because generation is keyed only by seed and
    /// coordinates.
    pub fn update_focus(&mut self, focus: Vec3) -> ChunkPatch {
        let Some(radius) = self.load_radius() else {
            return ChunkPatch::default();
        };

        let extent = self.chunk_extent();
        let center = ChunkCoord::new(
            (focus.x / extent).floor() as i32,
            (focus.z / extent).floor() as i32,
        );

        // Same center chunk means the load window is unchanged.
        if self.last_center == Some(center) {
            return ChunkPatch::default();
        }

        let mut patch = ChunkPatch::default();

        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let coord = center.offset(dx, dz);
                if !self.chunks.contains_key(&coord) {
                    let buildings =
                        generate_chunk(&self.seed, coord, self.chunk_size, &self.field);
                    debug!(chunk = ?coord, buildings = buildings.len(), "loaded chunk");
                    self.chunks.insert(coord, buildings);
                    patch.added.push(coord);
                }
            }
        }

        let evict_radius = radius + 1;
        let mut stale: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|coord| coord.chebyshev(center) > evict_radius)
            .copied()
            .collect();
        stale.sort_unstable();
        for coord in stale {
            self.chunks.remove(&coord);
            debug!(chunk = ?coord, "evicted chunk");
            patch.removed.push(coord);
        }

        self.last_center = Some(center);
        patch
    }

    /// Number of currently loaded chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if the chunk is currently loaded.
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Iterates over the loaded chunk coordinates (unordered).
    pub fn loaded_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// The buildings of one loaded chunk, in stable cell order.
    pub fn chunk_buildings(&self, coord: ChunkCoord) -> Option<&[Building]> {
        self.chunks.get(&coord).map(Vec::as_slice)
    }

    /// Total number of buildings across all loaded chunks.
    pub fn building_count(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }

    /// Iterates over every loaded building in sorted-chunk order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> + '_ {
        self.sorted_coords()
            .into_iter()
            .flat_map(move |coord| self.chunks[&coord].iter())
    }

    /// Loaded chunk coordinates in sorted order, the canonical iteration
    /// order for snapshots and digests.
    fn sorted_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Groups loaded buildings by silhouette, capping each group at
    /// `cap_per_kind` instances.
    ///
    /// This is a rendering throttle only: buildings beyond the cap stay in
    /// the session and in snapshots, they just are not handed to the
    /// renderer this pass.
    pub fn render_batches(&self, cap_per_kind: usize) -> Vec<(BuildingKind, Vec<&Building>)> {
        let mut batches: Vec<(BuildingKind, Vec<&Building>)> = BuildingKind::ALL
            .iter()
            .map(|kind| (*kind, Vec::new()))
            .collect();

        for coord in self.sorted_coords() {
            for building in &self.chunks[&coord] {
                if let Some((_, group)) = batches.iter_mut().find(|(kind, _)| *kind == building.kind)
                    && group.len() < cap_per_kind
                {
                    group.push(building);
                }
            }
        }
        batches
    }

    /// Order-insensitive digest of the full loaded world, for regression
    /// and eviction/reload tests.
    pub fn world_digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for coord in self.sorted_coords() {
            coord.hash(&mut hasher);
            chunk_digest(&self.chunks[&coord]).hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Captures the serializable snapshot of this session.
    ///
    /// Buildings are flattened in sorted-chunk order, so two sessions with
    /// the same loaded set produce identical snapshots regardless of the
    /// path that loaded them.
    pub fn snapshot(&self) -> WorldState {
        let coords = self.sorted_coords();
        let buildings = coords
            .iter()
            .flat_map(|coord| self.chunks[coord].iter().cloned())
            .collect();
        WorldState {
            seed: self.seed.clone(),
            loaded_chunks: coords,
            buildings,
        }
    }

    /// Rebuilds a session from a snapshot.
    ///
    /// The streaming parameters are not part of the snapshot and must be
    /// supplied again. Buildings are regrouped into their owning chunks by
    /// cell position; a building outside every loaded chunk means the
    /// snapshot is corrupt and restoration fails rather than producing a
    /// partial state.
    pub fn restore(
        state: WorldState,
        chunk_size: u32,
        render_distance: f32,
    ) -> Result<Self, StateError> {
        if chunk_size == 0 && !state.buildings.is_empty() {
            return Err(StateError::EmptyChunkGrid {
                count: state.buildings.len(),
            });
        }

        let mut chunks: FxHashMap<ChunkCoord, Vec<Building>> = state
            .loaded_chunks
            .iter()
            .map(|coord| (*coord, Vec::new()))
            .collect();

        for building in state.buildings {
            let cell_x = (building.position.x / CELL_SIZE).round() as i32;
            let cell_z = (building.position.z / CELL_SIZE).round() as i32;
            let coord = chunk_of_cell(cell_x, cell_z, chunk_size);
            match chunks.get_mut(&coord) {
                Some(list) => list.push(building),
                None => {
                    return Err(StateError::OrphanBuilding {
                        cx: coord.x,
                        cz: coord.z,
                    });
                }
            }
        }

        let field = NoiseField::new(&state.seed);
        Ok(Self {
            seed: state.seed,
            field,
            chunk_size,
            render_distance,
            chunks,
            last_center: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn test_session() -> WorldSession {
        WorldSession::new("test-world", 10, 20.0)
    }

    #[test]
    fn test_initial_load_window_is_three_by_three() {
        // chunk extent = 10 cells * 5.0 units = 50; radius = ceil(20/50) = 1.
        let mut session = test_session();
        let patch = session.update_focus(Vec3::ZERO);

        let expected: HashSet<ChunkCoord> = (-1..=1)
            .flat_map(|x| (-1..=1).map(move |z| ChunkCoord::new(x, z)))
            .collect();

        assert_eq!(patch.added.len(), 9);
        assert!(patch.removed.is_empty());
        assert_eq!(session.loaded_chunks().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn test_golden_scenario_matches_independent_session() {
        let mut a = test_session();
        let mut b = test_session();
        a.update_focus(Vec3::ZERO);
        b.update_focus(Vec3::ZERO);

        assert_eq!(a.building_count(), b.building_count());
        assert_eq!(a.world_digest(), b.world_digest());
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_repeat_update_is_noop() {
        let mut session = test_session();
        session.update_focus(Vec3::new(3.0, 0.0, -4.0));
        let digest = session.world_digest();

        let patch = session.update_focus(Vec3::new(4.0, 0.0, -3.0));
        assert!(patch.is_empty(), "Same-chunk focus move must be a no-op");
        assert_eq!(session.world_digest(), digest);
    }

    #[test]
    fn test_eviction_and_reload_are_identical() {
        let mut session = test_session();
        session.update_focus(Vec3::ZERO);

        let origin = ChunkCoord::new(0, 0);
        let before = session
            .chunk_buildings(origin)
            .expect("origin chunk loaded")
            .to_vec();

        // Move far away; the origin chunk leaves the eviction radius.
        let patch = session.update_focus(Vec3::new(1000.0, 0.0, 1000.0));
        assert!(patch.removed.contains(&origin));
        assert!(!session.is_loaded(origin));

        // Move back; the chunk regenerates from scratch.
        let patch = session.update_focus(Vec3::ZERO);
        assert!(patch.added.contains(&origin));
        let after = session
            .chunk_buildings(origin)
            .expect("origin chunk reloaded");

        assert_eq!(before, after, "Reloaded chunk must match the original");
    }

    #[test]
    fn test_hysteresis_keeps_boundary_chunks() {
        let mut session = test_session();
        session.update_focus(Vec3::ZERO);

        // Move one chunk to the +X: center (1, 0). Chunks at x = -1 are at
        // Chebyshev distance 2 = radius + 1, inside the hysteresis band.
        let patch = session.update_focus(Vec3::new(50.0, 0.0, 0.0));
        assert!(patch.removed.is_empty(), "Hysteresis band must not evict");
        assert!(session.is_loaded(ChunkCoord::new(-1, 0)));
        assert!(session.is_loaded(ChunkCoord::new(2, 0)));
    }

    #[test]
    fn test_degenerate_parameters_load_nothing() {
        let mut zero_size = WorldSession::new("x", 0, 20.0);
        assert!(zero_size.update_focus(Vec3::ZERO).is_empty());
        assert_eq!(zero_size.loaded_count(), 0);

        let mut negative_distance = WorldSession::new("x", 10, -5.0);
        assert!(negative_distance.update_focus(Vec3::ZERO).is_empty());
        assert_eq!(negative_distance.loaded_count(), 0);
    }

    #[test]
    fn test_render_batches_cap_is_a_throttle_not_a_loss() {
        let mut session = WorldSession::new("dense", 10, 100.0);
        session.update_focus(Vec3::ZERO);
        let total = session.building_count();
        assert!(total > 0);

        let capped: usize = session
            .render_batches(1)
            .iter()
            .map(|(_, group)| group.len())
            .sum();
        assert!(capped <= BuildingKind::ALL.len());
        // Generation state is untouched by the throttle.
        assert_eq!(session.building_count(), total);
    }

    #[test]
    fn test_render_batches_group_by_kind() {
        let mut session = WorldSession::new("batches", 10, 100.0);
        session.update_focus(Vec3::ZERO);

        for (kind, group) in session.render_batches(usize::MAX) {
            for building in group {
                assert_eq!(building.kind, kind);
            }
        }
    }
}
