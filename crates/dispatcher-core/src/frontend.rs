//! TCP front-end: the accept loop and per-connection handler.
//!
//! One OS thread per accepted connection, with no long-lived pooled
//! state — a handler thread lives exactly as long as its connection and
//! touches shared state only through the [`crate::scheduler::Scheduler`].

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::scheduler::{DispatchOutcome, Scheduler};
use crate::wire::encode_client_response;

/// Accept connections until `listener` is closed or a read error signals
/// the listener socket itself has gone away (shutdown tore it down).
pub fn run_accept_loop(listener: TcpListener, scheduler: Arc<Scheduler>, message_size: usize) {
    for incoming in listener.incoming() {
        let stream = match incoming {
            Ok(stream) => stream,
            Err(e) => {
                debug!(error = %e, "accept loop ending");
                break;
            }
        };
        let scheduler = Arc::clone(&scheduler);
        std::thread::spawn(move || handle_connection(stream, &scheduler, message_size));
    }
}

/// Exactly one read, one dispatch, one write, then close.
fn handle_connection(mut stream: TcpStream, scheduler: &Scheduler, message_size: usize) {
    let mut buf = vec![0u8; message_size];
    let n = match stream.read(&mut buf) {
        Ok(n) => n,
        Err(e) => {
            error!(error = %e, "failed to read request");
            return;
        }
    };
    let request = &buf[..n];

    let response_bytes = match scheduler.dispatch(request) {
        DispatchOutcome::Saturated => encode_client_response(false, 0.0),
        DispatchOutcome::Served { cold_start, response } => {
            let inner_time = crate::wire::decode_worker_time(&response).unwrap_or(0.0);
            encode_client_response(cold_start, inner_time)
        }
    };

    if let Err(e) = stream.write_all(&response_bytes) {
        error!(error = %e, "failed to write response");
    }
}

/// Fresh listener on `port` with `SO_REUSEADDR`, used both by the
/// supervisor's bind-with-backoff and directly by tests.
pub fn bind(port: u16) -> std::io::Result<TcpListener> {
    use socket2::{Domain, Socket, Type};
    let addr: std::net::SocketAddr = ([0, 0, 0, 0], port).into();
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    let listener: TcpListener = socket.into();
    info!(port, "bound listener");
    Ok(listener)
}
