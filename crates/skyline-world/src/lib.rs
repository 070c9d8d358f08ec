//! World sessions: chunk streaming around a focus point and snapshot
//! persistence.
//!
//! A [`WorldSession`] is the single authority for which chunks are loaded.
//! It loads chunks entering the render window, evicts chunks leaving it
//! (with a one-chunk hysteresis band), and regenerates evicted chunks
//! bit-identically on return: generation depends only on the seed and
//! coordinates, never on session history.

mod session;
mod state;

pub use session::{ChunkPatch, WorldSession};
pub use state::{StateError, WorldState};
