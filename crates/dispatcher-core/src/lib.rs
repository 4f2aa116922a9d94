//! dispatcher-core: scheduler, worker pool, wire codecs, and the TCP
//! front-end for an autoscaling GPU dispatch server.

pub mod config;
pub mod error;
pub mod frontend;
pub mod ipc;
pub mod pool;
pub mod scheduler;
pub mod supervisor;
pub mod wire;

pub use config::DispatcherConfig;
pub use error::DispatchError;
pub use scheduler::{least_loaded, DispatchOutcome, Scheduler};
