//! Serializable world snapshots.

use serde::{Deserialize, Serialize};
use skyline_worldgen::{Building, ChunkCoord};

/// Errors raised while encoding or decoding a [`WorldState`].
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The input was not a valid world-state document.
    #[error("failed to parse world state: {0}")]
    Parse(#[source] serde_json::Error),

    /// The state could not be encoded (should not occur for well-formed
    /// states; surfaced rather than swallowed).
    #[error("failed to serialize world state: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A building's cell falls outside every chunk listed as loaded.
    #[error("building belongs to unloaded chunk ({cx}, {cz})")]
    OrphanBuilding {
        /// Owning chunk X coordinate.
        cx: i32,
        /// Owning chunk Z coordinate.
        cz: i32,
    },

    /// The snapshot holds buildings but the chunk grid is degenerate.
    #[error("world state contains {count} buildings but chunk size is 0")]
    EmptyChunkGrid {
        /// Number of buildings that cannot be assigned to a chunk.
        count: usize,
    },
}

/// The complete serializable snapshot of a generation session: the seed,
/// the loaded chunk set, and every generated building.
///
/// Round-trip fidelity: decoding an encoded state yields a structurally
/// equal value, with the same seed, the building list in the same order,
/// and an equal (unordered) chunk set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// The string seed the world derives from.
    pub seed: String,
    /// Coordinates of every loaded chunk.
    pub loaded_chunks: Vec<ChunkCoord>,
    /// Every generated building, flattened in sorted-chunk order.
    pub buildings: Vec<Building>,
}

impl WorldState {
    /// Encodes the state as a JSON string.
    pub fn to_json(&self) -> Result<String, StateError> {
        serde_json::to_string(self).map_err(StateError::Serialize)
    }

    /// Decodes a state from a JSON string.
    ///
    /// Malformed input fails with [`StateError::Parse`]; callers should
    /// treat a failed restore as "start a fresh session", never as a
    /// partial state.
    pub fn from_json(input: &str) -> Result<Self, StateError> {
        serde_json::from_str(input).map_err(StateError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::WorldSession;
    use glam::Vec3;
    use std::collections::HashSet;

    fn populated_session() -> WorldSession {
        let mut session = WorldSession::new("round-trip", 10, 20.0);
        session.update_focus(Vec3::ZERO);
        session
    }

    #[test]
    fn test_json_round_trip_preserves_structure() {
        let state = populated_session().snapshot();
        assert!(!state.loaded_chunks.is_empty());
        assert!(!state.buildings.is_empty());

        let encoded = state.to_json().expect("encode");
        let decoded = WorldState::from_json(&encoded).expect("decode");

        assert_eq!(decoded.seed, state.seed);
        assert_eq!(decoded.buildings, state.buildings, "Order must be preserved");
        assert_eq!(
            decoded.loaded_chunks.iter().collect::<HashSet<_>>(),
            state.loaded_chunks.iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn test_restore_rebuilds_equivalent_session() {
        let session = populated_session();
        let digest = session.world_digest();

        let encoded = session.snapshot().to_json().expect("encode");
        let decoded = WorldState::from_json(&encoded).expect("decode");
        let restored = WorldSession::restore(decoded, 10, 20.0).expect("restore");

        assert_eq!(restored.world_digest(), digest);
        assert_eq!(restored.loaded_count(), session.loaded_count());
        assert_eq!(restored.building_count(), session.building_count());
    }

    #[test]
    fn test_restored_session_keeps_streaming() {
        let mut restored =
            WorldSession::restore(populated_session().snapshot(), 10, 20.0).expect("restore");

        // Streaming resumes: moving far away evicts, returning regenerates.
        let patch = restored.update_focus(Vec3::new(500.0, 0.0, 0.0));
        assert!(!patch.added.is_empty());
        assert!(!patch.removed.is_empty());
    }

    #[test]
    fn test_malformed_input_is_a_parse_error() {
        for input in ["", "{", "42", "{\"seed\": 3}", "not json at all"] {
            match WorldState::from_json(input) {
                Err(StateError::Parse(_)) => {}
                other => panic!("Expected parse error for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_orphan_building_is_rejected() {
        let mut state = populated_session().snapshot();
        assert!(!state.buildings.is_empty());
        // Claim no loaded chunks at all; every building becomes an orphan.
        state.loaded_chunks.clear();

        match WorldSession::restore(state, 10, 20.0) {
            Err(StateError::OrphanBuilding { .. }) => {}
            other => panic!("Expected orphan-building error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_zero_chunk_size_with_buildings_is_rejected() {
        let state = populated_session().snapshot();
        assert!(!state.buildings.is_empty());
        match WorldSession::restore(state, 0, 20.0) {
            Err(StateError::EmptyChunkGrid { .. }) => {}
            other => panic!("Expected empty-chunk-grid error, got {:?}", other.map(|_| ())),
        }
    }
}
