// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The runtime configuration file.
//!
//! Written in RON. Every field is optional:
//!
//! ```ron
//! (
//!     locality: 0,
//!     bind: Compact,
//!     pools: [
//!         (name: "default", threads: Some(6)),
//!         (name: "io", threads: Some(2), mode: [DoBackgroundWork, FastIdleMode]),
//!     ],
//! )
//! ```

use meridian_core::{Locality, SchedulerMode, SchedulerModeFlag};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading a [`RuntimeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The text is not a valid configuration.
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// A bind policy name was not recognised.
    #[error("unknown bind policy '{0}', expected one of: none, compact, scatter")]
    UnknownBindPolicy(String),
    /// Two pools share a name.
    #[error("pool name '{0}' is used more than once")]
    DuplicatePool(String),
}

/// How worker threads are bound to processing units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BindPolicy {
    /// Threads are not bound.
    None,
    /// Thread `n` runs on unit `n`.
    #[default]
    Compact,
    /// Consecutive threads go to different cores first.
    Scatter,
}

impl FromStr for BindPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(BindPolicy::None),
            "compact" => Ok(BindPolicy::Compact),
            "scatter" => Ok(BindPolicy::Scatter),
            _ => Err(ConfigError::UnknownBindPolicy(s.to_owned())),
        }
    }
}

/// One pool of worker threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Pool name, unique within the runtime.
    pub name: String,
    /// Number of worker threads. `None` means one per processing unit.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Scheduler mode flags. Empty means the default mode.
    #[serde(default)]
    pub mode: Vec<SchedulerModeFlag>,
}

impl PoolConfig {
    /// A pool named `name` with default mode.
    pub fn new(name: impl Into<String>, threads: Option<usize>) -> Self {
        Self {
            name: name.into(),
            threads,
            mode: Vec::new(),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// The locality this process serves.
    pub locality: u32,
    /// Thread binding policy for every pool.
    pub bind: BindPolicy,
    /// The pools to create. Empty means a single `"default"` pool.
    pub pools: Vec<PoolConfig>,
}

/// A pool with its placement resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolLayout {
    /// Position among the runtime's pools.
    pub index: usize,
    /// Pool name.
    pub name: String,
    /// Number of worker threads.
    pub threads: usize,
    /// Global index of the first worker thread.
    pub thread_offset: usize,
    /// Scheduler mode.
    pub mode: SchedulerMode,
}

impl RuntimeConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        log::info!("Loaded runtime config from {}", path.display());
        Ok(config)
    }

    /// The locality this process serves.
    pub fn locality(&self) -> Locality {
        Locality(self.locality)
    }

    /// Resolves every pool's thread count and offset.
    ///
    /// Pools are laid out back to back in declaration order.
    /// `hardware_concurrency` fills in unspecified thread counts.
    pub fn pool_layout(&self, hardware_concurrency: usize) -> Vec<PoolLayout> {
        let default_pool = [PoolConfig::new("default", None)];
        let pools = if self.pools.is_empty() {
            &default_pool[..]
        } else {
            &self.pools[..]
        };

        let mut offset = 0;
        pools
            .iter()
            .enumerate()
            .map(|(index, pool)| {
                let threads = pool.threads.unwrap_or(hardware_concurrency);
                let layout = PoolLayout {
                    index,
                    name: pool.name.clone(),
                    threads,
                    thread_offset: offset,
                    mode: SchedulerMode::from_flags(&pool.mode),
                };
                offset += threads;
                layout
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, pool) in self.pools.iter().enumerate() {
            if self.pools[..i].iter().any(|other| other.name == pool.name) {
                return Err(ConfigError::DuplicatePool(pool.name.clone()));
            }
        }
        Ok(())
    }
}
