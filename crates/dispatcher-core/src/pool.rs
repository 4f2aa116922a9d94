//! Worker pool: owns the set of spawned worker subprocesses and their IPC
//! endpoints.
//!
//! ## Design
//!
//! Each worker is an OS subprocess running the `dispatcher-worker` binary,
//! with its stdin and stdout piped back to this process (the request/
//! response IPC channel) and its stderr inherited, so worker diagnostics
//! land directly in the dispatcher's own log stream. A worker never shares
//! its endpoint across threads concurrently: the scheduler's busy bit
//! guarantees at most one caller holds a given worker at a time, so `send`
//! takes `&self` and locks only the one worker's own endpoint mutex, not a
//! pool-wide one.
//!
//! ## Pool growth
//!
//! Workers are appended in GPU-sized batches (`boot_batch`) and are never
//! removed individually; the whole pool tears down together at shutdown.

use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::config::WORKER_GPU_ENV;
use crate::error::DispatchError;
use crate::ipc::{read_frame, write_frame};

/// One spawned worker subprocess and its IPC pipes.
pub struct WorkerHandle {
    gpu: usize,
    child: Mutex<Child>,
    stdin: Mutex<Option<BufWriter<std::process::ChildStdin>>>,
    stdout: Mutex<BufReader<std::process::ChildStdout>>,
}

impl WorkerHandle {
    /// Write one request frame and block for exactly one response frame.
    ///
    /// Not guarded by the scheduler's mutex; called after the worker has
    /// already been marked busy, so only one caller ever reaches this at a
    /// time for a given handle.
    fn send(&self, request: &[u8]) -> Result<Vec<u8>, DispatchError> {
        {
            let mut guard = self.stdin.lock().expect("worker stdin mutex poisoned");
            let stdin = guard.as_mut().ok_or_else(|| DispatchError::WorkerIoFailed {
                worker: self.gpu,
                reason: "worker stdin already closed".to_string(),
            })?;
            write_frame(stdin, request).map_err(|e| DispatchError::WorkerIoFailed {
                worker: self.gpu,
                reason: e.to_string(),
            })?;
        }
        let mut stdout = self.stdout.lock().expect("worker stdout mutex poisoned");
        match read_frame(&mut *stdout) {
            Ok(Some(bytes)) => Ok(bytes),
            Ok(None) => Err(DispatchError::WorkerIoFailed {
                worker: self.gpu,
                reason: "worker closed its IPC channel".to_string(),
            }),
            Err(e) => Err(DispatchError::WorkerIoFailed { worker: self.gpu, reason: e.to_string() }),
        }
    }
}

/// Owns every spawned worker and the parameters needed to spawn more.
pub struct WorkerPool {
    worker_binary: PathBuf,
    function: String,
    workers: Mutex<Vec<Arc<WorkerHandle>>>,
}

impl WorkerPool {
    pub fn new(function: String) -> Result<Self, DispatchError> {
        Ok(Self { worker_binary: locate_worker_binary()?, function, workers: Mutex::new(Vec::new()) })
    }

    /// Spawn `count` fresh workers bound to GPU `gpu`, appending their
    /// handles to `workers`. Must be called only while the scheduler's
    /// mutex is held, and only when the pool has not yet reached its cap —
    /// enforced by the caller, not here.
    pub fn boot_batch(&self, gpu: usize, count: usize) -> Result<(), DispatchError> {
        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            spawned.push(Arc::new(self.spawn_one(gpu)?));
        }
        let mut workers = self.workers.lock().expect("worker list mutex poisoned");
        workers.extend(spawned);
        info!(gpu, count, "booted worker batch");
        Ok(())
    }

    fn spawn_one(&self, gpu: usize) -> Result<WorkerHandle, DispatchError> {
        let mut child = Command::new(&self.worker_binary)
            .arg(&self.function)
            .env(WORKER_GPU_ENV, gpu.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DispatchError::WorkerSpawnFailed { gpu, source })?;

        let stdin = child.stdin.take().expect("piped stdin missing on spawned worker");
        let stdout = child.stdout.take().expect("piped stdout missing on spawned worker");

        Ok(WorkerHandle {
            gpu,
            child: Mutex::new(child),
            stdin: Mutex::new(Some(BufWriter::new(stdin))),
            stdout: Mutex::new(BufReader::new(stdout)),
        })
    }

    /// Number of workers spawned so far, across all GPUs.
    pub fn worker_count(&self) -> usize {
        self.workers.lock().expect("worker list mutex poisoned").len()
    }

    /// Send `request` to worker `w` and block for its response. Not guarded
    /// by the scheduler's mutex.
    pub fn send(&self, w: usize, request: &[u8]) -> Result<Vec<u8>, DispatchError> {
        let handle = {
            let workers = self.workers.lock().expect("worker list mutex poisoned");
            workers
                .get(w)
                .cloned()
                .ok_or(DispatchError::WorkerIoFailed { worker: w, reason: "no such worker index".to_string() })?
        };
        // The list lock is released above; the scheduler's busy bit keeps
        // this call exclusive per worker, so blocking on IPC here never
        // holds up a concurrent `boot_batch` or another worker's `send`.
        handle.send(request)
    }

    /// Attempt an orderly join of every worker with a 1-second deadline,
    /// then force-kill stragglers. Safe to call once; a second call finds
    /// an empty worker list and is a no-op.
    pub fn shutdown(&self) {
        let mut workers = self.workers.lock().expect("worker list mutex poisoned");
        for handle in workers.drain(..) {
            let mut child = handle.child.lock().expect("child mutex poisoned");
            // Dropping the piped stdin closes the worker's read end, which
            // is itself enough to make a well-behaved worker exit.
            handle.stdin.lock().expect("stdin mutex poisoned").take();
            let deadline = std::time::Instant::now() + std::time::Duration::from_secs(1);
            loop {
                match child.try_wait() {
                    Ok(Some(_)) => break,
                    Ok(None) if std::time::Instant::now() >= deadline => {
                        warn!(gpu = handle.gpu, "worker did not exit within 1s, killing");
                        let _ = child.kill();
                        let _ = child.wait();
                        break;
                    }
                    Ok(None) => std::thread::sleep(std::time::Duration::from_millis(20)),
                    Err(e) => {
                        warn!(gpu = handle.gpu, error = %e, "error waiting on worker, killing");
                        let _ = child.kill();
                        break;
                    }
                }
            }
        }
    }
}

/// Locate the `dispatcher-worker` binary alongside the currently running
/// executable, the way a workspace ships a worker binary next to its
/// server binary in the same `target/{debug,release}` directory.
fn locate_worker_binary() -> Result<PathBuf, DispatchError> {
    let exe = std::env::current_exe().map_err(DispatchError::Io)?;
    let dir = exe.parent().ok_or_else(|| {
        DispatchError::WorkerBinaryNotFound("server executable has no parent directory".to_string())
    })?;
    let candidate = dir.join(if cfg!(windows) { "dispatcher-worker.exe" } else { "dispatcher-worker" });
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Err(DispatchError::WorkerBinaryNotFound(candidate.display().to_string()))
    }
}
