//! Background chunk generation with a configurable thread pool.
//!
//! Generation is a pure function of `(seed, coord)`, which makes it an ideal
//! offload unit: workers need no shared world state, and an offloaded chunk
//! is bit-identical to one generated inline. Tasks carry a priority hint
//! (squared chunk distance to the focus) so hosts can submit nearest-first;
//! per-task cancellation flags let a host abandon chunks that scrolled out
//! of range before a worker picked them up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use skyline_noise::NoiseField;

use crate::building::Building;
use crate::chunk::{ChunkCoord, generate_chunk};

/// A request to generate a single chunk.
#[derive(Clone, Debug)]
pub struct GenerationTask {
    /// The chunk to generate.
    pub coord: ChunkCoord,
    /// World seed; shared across tasks for the same session.
    pub seed: Arc<str>,
    /// Chunk edge length in cells.
    pub chunk_size: u32,
    /// Priority hint: lower values should be submitted first. Typically the
    /// squared chunk distance to the focus point.
    pub priority: u64,
}

/// A fully generated chunk ready for insertion into a session.
#[derive(Debug)]
pub struct GeneratedChunk {
    /// The chunk coordinate matching the original task.
    pub coord: ChunkCoord,
    /// The generated buildings, in stable cell order.
    pub buildings: Vec<Building>,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

/// Internal wrapper carrying the task and its cancellation flag.
struct PendingTask {
    task: GenerationTask,
    cancelled: Arc<AtomicBool>,
}

/// Manages asynchronous chunk generation across a thread pool.
pub struct ChunkGenPool {
    /// Sender for submitting generation tasks.
    task_sender: Sender<PendingTask>,
    /// Receiver for collecting completed chunks on the host thread.
    result_receiver: Receiver<GeneratedChunk>,
    /// Cancellation flags for queued or running tasks, keyed by coordinate.
    active_tasks: Arc<DashMap<ChunkCoord, Arc<AtomicBool>>>,
    /// Current number of in-flight tasks.
    in_flight: Arc<AtomicU64>,
}

impl ChunkGenPool {
    /// Creates a pool with the given worker count and queue capacities.
    ///
    /// # Arguments
    /// - `thread_count`: number of worker threads.
    /// - `max_concurrent`: maximum in-flight tasks; excess submissions are
    ///   rejected rather than queued unboundedly.
    /// - `result_capacity`: bounded channel capacity for completed chunks.
    pub fn new(thread_count: usize, max_concurrent: usize, result_capacity: usize) -> Self {
        let (task_sender, task_receiver) = bounded::<PendingTask>(max_concurrent.max(1) * 2);
        let (result_sender, result_receiver) = bounded::<GeneratedChunk>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));

        for _ in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);

            std::thread::Builder::new()
                .name("chunk-gen-worker".into())
                .spawn(move || {
                    while let Ok(pending) = receiver.recv() {
                        // Check cancellation before starting work.
                        if pending.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = std::time::Instant::now();
                        let buildings = generate_chunk_task(&pending.task);
                        let elapsed = start.elapsed().as_micros() as u64;

                        // Check again: the host may have cancelled mid-generation.
                        if !pending.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(GeneratedChunk {
                                coord: pending.task.coord,
                                buildings,
                                generation_time_us: elapsed,
                            });
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })
                .expect("Failed to spawn chunk generation worker thread");
        }

        Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
        }
    }

    /// Creates a pool with a sensible worker count based on CPU cores,
    /// leaving headroom for the host thread.
    pub fn with_defaults() -> Self {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 1).max(1);
        Self::new(threads, 64, 128)
    }

    /// Submits a chunk for background generation.
    ///
    /// Returns `Ok(())` if the task was queued, or `Err(task)` if the queue
    /// is full.
    #[allow(clippy::result_large_err)]
    pub fn submit(&self, task: GenerationTask) -> Result<(), GenerationTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active_tasks.insert(task.coord, Arc::clone(&cancelled));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        let pending = PendingTask {
            task: task.clone(),
            cancelled,
        };
        self.task_sender.try_send(pending).map_err(|e| {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            let coord = e.into_inner().task.coord;
            self.active_tasks.remove(&coord);
            task
        })
    }

    /// Cancels a pending or in-progress task.
    ///
    /// If the task already completed, this is a no-op.
    pub fn cancel(&self, coord: &ChunkCoord) {
        if let Some((_, cancelled)) = self.active_tasks.remove(coord) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Drains all completed chunks from the result channel.
    ///
    /// Call once per host tick.
    pub fn drain_results(&self) -> Vec<GeneratedChunk> {
        let mut results = Vec::new();
        while let Ok(chunk) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&chunk.coord);
            results.push(chunk);
        }
        results
    }

    /// Number of tasks currently in flight (queued or executing).
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if a task for the given coordinate is pending.
    pub fn is_pending(&self, coord: &ChunkCoord) -> bool {
        self.active_tasks.contains_key(coord)
    }
}

/// Generates a chunk for a task. This is the CPU-intensive function that
/// runs on worker threads; it is also callable inline for parity checks.
pub fn generate_chunk_task(task: &GenerationTask) -> Vec<Building> {
    let field = NoiseField::new(&task.seed);
    generate_chunk(&task.seed, task.coord, task.chunk_size, &field)
}
