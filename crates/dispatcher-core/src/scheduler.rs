//! Scheduler: the least-loaded-GPU/worker selection, cold-start expansion,
//! and the single mutex guarding all of it.
//!
//! A single `Mutex<SchedulerState>` is the only source of truth for which
//! GPU slots exist and which workers are busy. The worker pool's subprocess
//! spawn is intentionally performed *inside* the critical section on
//! expansion — it is the mechanism that atomically commits the new
//! `worker_load` row alongside the reservation.

use std::sync::Mutex;

use tracing::warn;

use crate::error::DispatchError;
use crate::pool::WorkerPool;

struct SchedulerState {
    gpu_load: Vec<u32>,
    worker_load: Vec<Vec<u8>>,
}

/// Outcome of one `dispatch` call, already shaped for the wire encoder.
pub enum DispatchOutcome {
    Saturated,
    Served { cold_start: bool, response: Vec<u8> },
}

pub struct Scheduler {
    state: Mutex<SchedulerState>,
    pool: WorkerPool,
    num_gpus: u32,
    max_req_per_gpu: u32,
}

impl Scheduler {
    pub fn new(pool: WorkerPool, num_gpus: u32, max_req_per_gpu: u32) -> Self {
        Self {
            state: Mutex::new(SchedulerState { gpu_load: Vec::new(), worker_load: Vec::new() }),
            pool,
            num_gpus,
            max_req_per_gpu,
        }
    }

    fn worker_cap(&self) -> usize {
        self.num_gpus as usize * self.max_req_per_gpu as usize
    }

    /// Run the full selection / expansion / reserve / execute / release
    /// algorithm for one request.
    pub fn dispatch(&self, request: &[u8]) -> DispatchOutcome {
        let m = self.max_req_per_gpu as usize;

        let reservation = {
            let mut state = self.state.lock().expect("scheduler mutex poisoned");

            let candidate = least_loaded(&state.gpu_load, &state.worker_load);

            let (g, i, cold_start) = match candidate {
                Some((g, i)) if state.worker_load[g][i] == 0 => (g, i, false),
                _ => {
                    // Expansion trigger: either no GPU is initialized yet,
                    // or even the least-loaded worker on the least-loaded
                    // GPU is already busy.
                    if self.pool.worker_count() >= self.worker_cap() {
                        warn!(
                            target: "@@@dispatch",
                            workers = self.pool.worker_count(),
                            "saturated: no idle worker and worker cap reached"
                        );
                        return DispatchOutcome::Saturated;
                    }
                    let g = state.gpu_load.len();
                    if let Err(e) = self.pool.boot_batch(g, m) {
                        warn!(gpu = g, error = %e, "boot_batch failed, rolling back without state change");
                        return DispatchOutcome::Saturated;
                    }
                    state.gpu_load.push(0);
                    state.worker_load.push(vec![0; m]);
                    (g, 0, true)
                }
            };

            state.worker_load[g][i] = 1;
            state.gpu_load[g] += 1;
            (g, i, cold_start)
        };

        let (g, i, cold_start) = reservation;
        let w = g * m + i;
        let result = self.pool.send(w, request);

        {
            let mut state = self.state.lock().expect("scheduler mutex poisoned");
            state.worker_load[g][i] = 0;
            state.gpu_load[g] -= 1;
        }

        match result {
            Ok(response) => DispatchOutcome::Served { cold_start, response },
            Err(e) => {
                warn!(worker = w, error = %e, "worker IPC failed, reporting saturation shape");
                DispatchOutcome::Saturated
            }
        }
    }

    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}

/// Index of the least-loaded GPU and, within it, its least-loaded worker.
/// Ties broken by lowest index on both axes. `None` if no GPU is
/// initialized yet.
///
/// Exposed at crate visibility so the benchmark harness can drive it
/// directly against synthetic load vectors, without the overhead of a
/// real worker subprocess.
pub fn least_loaded(gpu_load: &[u32], worker_load: &[Vec<u8>]) -> Option<(usize, usize)> {
    let g = gpu_load
        .iter()
        .enumerate()
        .min_by_key(|&(_, load)| *load)
        .map(|(g, _)| g)?;
    let i = worker_load[g]
        .iter()
        .enumerate()
        .min_by_key(|&(_, busy)| *busy)
        .map(|(i, _)| i)
        .unwrap_or(0);
    Some((g, i))
}
