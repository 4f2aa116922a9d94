//! Foundational configuration type for the dispatcher-core library.
//!
//! A plain, serializable struct that the CLI crate builds from arguments
//! and hands to the library entry point unchanged.

use serde::{Deserialize, Serialize};

/// Default TCP listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default maximum bytes read per incoming request.
pub const DEFAULT_MESSAGE_SIZE: usize = 1024;

/// Worker idle timeout, in seconds, before a worker process exits on its own.
pub const WORKER_IDLE_TIMEOUT_SECS: u64 = 60;

/// Path of the zero-byte readiness marker created after a successful bind.
pub const READINESS_MARKER_PATH: &str = "/tmp/server-ready.nil";

/// Environment variable through which a worker's bound GPU index is
/// advertised to the worker's function module.
pub const WORKER_GPU_ENV: &str = "WORKER_GPU";

/// Configuration governing a single dispatcher server run.
///
/// Constructed once at startup from CLI arguments (see `dispatcher-server`)
/// and shared (by value — it is `Clone`) with the scheduler and worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Dotted name of the worker function registry entry to load in each
    /// worker process.
    pub function: String,

    /// TCP listen port.
    pub port: u16,

    /// Cap on the number of GPU slots (`G`); each slot holds `max_req_per_gpu`
    /// workers once initialized.
    pub num_gpus: u32,

    /// Workers per GPU (`M`) — also the number of concurrent requests a
    /// single GPU slot can serve before it is considered full.
    pub max_req_per_gpu: u32,

    /// Maximum bytes read per incoming request.
    pub message_size: usize,
}

impl DispatcherConfig {
    /// Build a config from the two required CLI arguments plus the
    /// optional ones, applying the documented defaults for the latter.
    pub fn new(function: String, num_gpus: u32, max_req_per_gpu: u32) -> Self {
        Self {
            function,
            port: DEFAULT_PORT,
            num_gpus,
            max_req_per_gpu,
            message_size: DEFAULT_MESSAGE_SIZE,
        }
    }

    /// Total worker cap `G * M`.
    pub fn worker_cap(&self) -> usize {
        self.num_gpus as usize * self.max_req_per_gpu as usize
    }
}
