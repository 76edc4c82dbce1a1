//! leasepool.toml configuration parser.
//!
//! ```toml
//! [server]
//! port = 8080
//! debug = false
//!
//! [pool]
//! size = 10
//! first_address = "192.168.0.101"
//! # or list the identifiers explicitly:
//! # resources = ["10.0.0.5", "10.0.0.9"]
//! ```

use std::net::Ipv4Addr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};
use crate::types::ResourceId;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_POOL_SIZE: usize = 10;
pub const DEFAULT_FIRST_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 101);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LeasePoolConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log every request's result and the pool state.
    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PoolConfig {
    /// Number of resources. Defaults to 10, or the length of `resources`.
    pub size: Option<usize>,
    /// First address of the generated range.
    pub first_address: Option<Ipv4Addr>,
    /// Explicit identifiers. Takes precedence over generation.
    pub resources: Option<Vec<String>>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl LeasePoolConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LeasePoolConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl PoolConfig {
    /// Resolve the ordered list of resource identifiers.
    pub fn resource_ids(&self) -> PoolResult<Vec<ResourceId>> {
        if let Some(list) = &self.resources {
            if let Some(size) = self.size {
                if size != list.len() {
                    return Err(PoolError::Config(format!(
                        "size is {size} but {} resources are listed",
                        list.len()
                    )));
                }
            }
            return Ok(list.iter().map(|s| ResourceId::new(s.as_str())).collect());
        }

        let size = self.size.unwrap_or(DEFAULT_POOL_SIZE);
        let first = self.first_address.unwrap_or(DEFAULT_FIRST_ADDRESS);
        address_range(first, size)
    }
}

/// `count` consecutive IPv4 addresses starting at `first`.
pub fn address_range(first: Ipv4Addr, count: usize) -> PoolResult<Vec<ResourceId>> {
    if count == 0 {
        return Err(PoolError::Config("pool size must be at least 1".into()));
    }

    let start = u32::from(first);
    let last = u32::try_from(count - 1)
        .ok()
        .and_then(|offset| start.checked_add(offset))
        .ok_or_else(|| {
            PoolError::Config(format!("{count} addresses starting at {first} overflow IPv4"))
        })?;

    Ok((start..=last)
        .map(|n| ResourceId::new(Ipv4Addr::from(n).to_string()))
        .collect())
}
