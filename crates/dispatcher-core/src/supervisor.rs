//! Lifecycle supervisor: bind-with-backoff, readiness marker, signal-driven
//! shutdown, and the accept loop that ties everything else together.

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::config::{DispatcherConfig, READINESS_MARKER_PATH};
use crate::error::DispatchError;
use crate::frontend::{bind, run_accept_loop};
use crate::pool::WorkerPool;
use crate::scheduler::Scheduler;

/// Bind/back-off schedule in seconds, tried in order.
const BIND_BACKOFF_SECS: &[u64] = &[1, 2, 3, 4, 5];

/// Run the dispatcher until a shutdown signal arrives or the bind retries
/// are exhausted.
pub fn run(config: DispatcherConfig) -> Result<(), DispatchError> {
    let listener = bind_with_backoff(config.port)?;
    std::fs::write(READINESS_MARKER_PATH, []).map_err(DispatchError::Io)?;
    info!(path = READINESS_MARKER_PATH, "wrote readiness marker");

    let pool = WorkerPool::new(config.function.clone())?;
    let scheduler = Arc::new(Scheduler::new(pool, config.num_gpus, config.max_req_per_gpu));

    install_signal_handler(Arc::clone(&scheduler));

    run_accept_loop(listener, scheduler, config.message_size);
    Ok(())
}

/// On SIGINT/SIGTERM, join/kill every worker with a 1-second deadline and
/// exit with success. The accept loop's blocking `incoming()` call never
/// needs to return: the process exits directly from the handler, matching
/// the "no graceful drain beyond signal-driven teardown" scope.
fn install_signal_handler(scheduler: Arc<Scheduler>) {
    ctrlc::set_handler(move || {
        info!("received shutdown signal, joining and killing workers");
        scheduler.shutdown();
        std::process::exit(0);
    })
    .expect("failed to install signal handler");
}

/// Bind with `SO_REUSEADDR`, retrying on failure with linear back-off
/// (1, 2, 3, 4, 5 seconds) for up to five attempts.
fn bind_with_backoff(port: u16) -> Result<TcpListener, DispatchError> {
    let mut last_err = None;
    for (attempt, &delay) in BIND_BACKOFF_SECS.iter().enumerate() {
        match bind(port) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                error!(attempt = attempt + 1, port, error = %e, "bind failed, backing off");
                last_err = Some(e);
                std::thread::sleep(Duration::from_secs(delay));
            }
        }
    }
    Err(DispatchError::BindFailed {
        port,
        attempts: BIND_BACKOFF_SECS.len() as u32,
        source: last_err.expect("loop ran at least once"),
    })
}
