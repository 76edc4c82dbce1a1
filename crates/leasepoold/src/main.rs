//! leasepoold — the LeasePool daemon.
//!
//! Serves a fixed pool of worker addresses over HTTP. Callers lease a
//! number of workers for a number of seconds; the daemon returns them to
//! the pool when the lease runs out.
//!
//! # Usage
//!
//! ```text
//! leasepoold --port 8080 --pool-size 10 --first-address 192.168.0.101
//! leasepoold --config /etc/leasepool/leasepool.toml --debug
//! ```

mod server;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::settings::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = settings::resolve(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings::default_log_filter(config.server.debug))),
        )
        .init();

    server::run(config).await
}
