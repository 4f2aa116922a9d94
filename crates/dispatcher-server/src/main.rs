use anyhow::Context;
use clap::Parser;
use dispatcher_core::config::{DEFAULT_MESSAGE_SIZE, DEFAULT_PORT};
use dispatcher_core::{supervisor, DispatcherConfig};

/// Autoscaling GPU dispatch server.
#[derive(Parser, Debug)]
#[command(name = "dispatcher-server", about = "Autoscaling GPU dispatch server")]
struct Args {
    /// Dotted name of the worker function registry entry to import in each worker.
    function: String,

    /// TCP listen port.
    #[arg(long, short = 'p', default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Cap on the number of GPU slots.
    #[arg(long = "num-gpus", short = 'g')]
    num_gpus: u32,

    /// Workers per GPU (concurrent requests per GPU slot).
    #[arg(long = "max-req-per-gpu", short = 'm')]
    max_req_per_gpu: u32,

    /// Maximum bytes read per incoming request.
    #[arg(long = "message-size", default_value_t = DEFAULT_MESSAGE_SIZE)]
    message_size: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = DispatcherConfig::new(args.function, args.num_gpus, args.max_req_per_gpu);
    config.port = args.port;
    config.message_size = args.message_size;

    supervisor::run(config).context("dispatcher server exited with an error")?;
    Ok(())
}
