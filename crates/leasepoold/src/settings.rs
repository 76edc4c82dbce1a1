//! Command-line flags and their merge onto the config file.
//!
//! Precedence: flag, then `--config` file, then built-in default.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::Parser;

use leasepool_core::LeasePoolConfig;

#[derive(Debug, Parser)]
#[command(
    name = "leasepoold",
    about = "HTTP server that leases a fixed pool of worker addresses",
    version
)]
pub struct Cli {
    /// Port to listen on [default: 8080].
    #[arg(long)]
    pub port: Option<u16>,

    /// Log every request's result and the pool state.
    #[arg(long)]
    pub debug: bool,

    /// Number of workers in the pool [default: 10].
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// First worker address; the rest follow consecutively [default: 192.168.0.101].
    #[arg(long)]
    pub first_address: Option<Ipv4Addr>,

    /// Path to a leasepool.toml file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn resolve(cli: &Cli) -> anyhow::Result<LeasePoolConfig> {
    let mut config = match &cli.config {
        Some(path) => LeasePoolConfig::from_file(path)?,
        None => LeasePoolConfig::default(),
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.server.debug |= cli.debug;
    if let Some(size) = cli.pool_size {
        config.pool.size = Some(size);
    }
    if let Some(first) = cli.first_address {
        config.pool.first_address = Some(first);
    }

    Ok(config)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter(debug: bool) -> &'static str {
    if debug {
        "info,leasepoold=debug,leasepool_core=debug,leasepool_scheduler=debug,leasepool_api=debug"
    } else {
        "info"
    }
}
