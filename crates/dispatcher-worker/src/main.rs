//! Worker process: a long-lived subprocess hosting one registered function,
//! receiving one request at a time over its piped stdin/stdout.

mod demos;
mod registry;

use std::io::{self, BufReader, BufWriter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::time::Duration;

use dispatcher_core::config::{WORKER_GPU_ENV, WORKER_IDLE_TIMEOUT_SECS};
use dispatcher_core::ipc::{read_frame, write_frame};
use tracing::{error, info, warn};

use registry::WorkerFn;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let function_name = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("usage: dispatcher-worker <function>");
        std::process::exit(1);
    });
    let gpu = std::env::var(WORKER_GPU_ENV).unwrap_or_else(|_| "?".to_string());

    let entry_point = match registry::resolve(&function_name) {
        Some(f) => f,
        None => {
            error!(function = %function_name, gpu, "could not resolve worker function, exiting");
            std::process::exit(1);
        }
    };

    info!(function = %function_name, gpu, "worker ready");
    run_receive_loop(entry_point);
}

/// Forward every request frame from stdin onto `tx`, then let the channel
/// disconnect on EOF or a read error — this is how the main thread learns
/// the IPC channel closed, per the same "channel disconnect ends the loop"
/// discipline the original interpreter pool used for its response channel.
fn spawn_stdin_reader() -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut stdin = BufReader::new(io::stdin());
        loop {
            match read_frame(&mut stdin) {
                Ok(Some(frame)) => {
                    if tx.send(frame).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "error reading request frame");
                    break;
                }
            }
        }
    });
    rx
}

fn run_receive_loop(entry_point: WorkerFn) {
    let requests = spawn_stdin_reader();
    let mut stdout = BufWriter::new(io::stdout());

    loop {
        let request = match requests.recv_timeout(Duration::from_secs(WORKER_IDLE_TIMEOUT_SECS)) {
            Ok(request) => request,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                info!("idle timeout elapsed, exiting");
                std::process::exit(0);
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                info!("IPC channel closed, exiting");
                std::process::exit(0);
            }
        };

        let response = match panic::catch_unwind(AssertUnwindSafe(|| entry_point(&request))) {
            Ok(bytes) => bytes,
            Err(_) => {
                error!("entry point panicked, returning empty response");
                Vec::new()
            }
        };

        if let Err(e) = write_frame(&mut stdout, &response) {
            error!(error = %e, "failed to write response frame, exiting");
            std::process::exit(1);
        }
    }
}
