//! Structured error types for the dispatcher-core library.
//!
//! Most of these never reach the client: the wire protocol is fixed-width
//! and has no error envelope, so failures are logged here and translated to
//! the nearest wire-compatible outcome by the caller.

use std::io;

use thiserror::Error;

/// Errors surfaced by the scheduler, worker pool, and supervisor.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// All `G * M` workers are busy and no further GPU slot can be booted.
    /// Not actually propagated as an `Err` on the hot path (the scheduler
    /// reports this as a typed outcome, see [`crate::scheduler::DispatchOutcome`]);
    /// kept as a variant so logging and tests can refer to it uniformly.
    #[error("all {0} workers are busy, no GPU slots remain")]
    Saturated(usize),

    /// Spawning a worker subprocess failed. A spawn failure inside the
    /// scheduler's critical section must roll back without mutating
    /// scheduler state; this variant is what the rollback reports.
    #[error("failed to spawn worker on GPU {gpu}: {source}")]
    WorkerSpawnFailed { gpu: usize, #[source] source: io::Error },

    /// The IPC round-trip to a worker failed (pipe write/read error, or the
    /// worker exited without a reply). A worker's reply is expected to be
    /// exactly 4 bytes (an `f32`); anything else is also reported through
    /// this variant.
    #[error("worker {worker} IPC failed: {reason}")]
    WorkerIoFailed { worker: usize, reason: String },

    /// The listening socket could not be bound after the full linear
    /// back-off schedule.
    #[error("failed to bind port {port} after {attempts} attempts: {source}")]
    BindFailed { port: u16, attempts: u32, #[source] source: io::Error },

    /// The worker binary could not be located next to the server binary.
    #[error("could not locate worker binary: {0}")]
    WorkerBinaryNotFound(String),

    /// Propagated from filesystem operations (e.g. the readiness marker).
    #[error(transparent)]
    Io(#[from] io::Error),
}
