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


mod probe;

use anyhow::{Context, Result};
use clap::Parser;
use meridian_core::Topology;
use meridian_infra::{
    logging, BindPolicy, HardwareTimestamp, PoolConfig, RuntimeConfig, StaticPartitioner,
    SysinfoTopology,
};
use meridian_threads::{overlapping_units, CallbackNotifier, ThreadPoolBase};
use probe::Probe;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// Brings up the configured worker pools on this machine and reports where
/// their threads run.
#[derive(Parser, Debug)]
#[command(name = "meridian-runtime", version, about, long_about = None)]
struct Cli {
    /// RON runtime configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Thread count of the pool named "default".
    #[arg(short, long)]
    threads: Option<usize>,

    /// Binding policy: none, compact or scatter.
    #[arg(short, long)]
    bind: Option<BindPolicy>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log: String,
}

const DEFAULT_POOL: &str = "default";

fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    let config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)
            .with_context(|| format!("loading runtime config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    apply_overrides(config, cli.bind, cli.threads)
}

fn apply_overrides(
    mut config: RuntimeConfig,
    bind: Option<BindPolicy>,
    threads: Option<usize>,
) -> Result<RuntimeConfig> {
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if let Some(threads) = threads {
        if config.pools.is_empty() {
            config
                .pools
                .push(PoolConfig::new(DEFAULT_POOL, Some(threads)));
        } else {
            let pool = config
                .pools
                .iter_mut()
                .find(|pool| pool.name == DEFAULT_POOL)
                .with_context(|| {
                    format!("--threads sets the '{DEFAULT_POOL}' pool, which the config does not declare")
                })?;
            pool.threads = Some(threads);
        }
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(&cli.log);

    let config = load_config(&cli)?;
    let topology = SysinfoTopology::new();
    let units = topology.hardware_concurrency();
    let partitioner = StaticPartitioner::new(config.bind, units);
    let clock = HardwareTimestamp::new();

    let notifier = Arc::new(CallbackNotifier::new());
    notifier.add_on_start_thread(|local, global, pool, _| {
        log::debug!("Worker {pool}/{local} (global {global}) started");
    });
    notifier.add_on_stop_thread(|local, global, pool, _| {
        log::debug!("Worker {pool}/{local} (global {global}) stopped");
    });

    let layout = config.pool_layout(units);
    let pools: Vec<ThreadPoolBase> = layout
        .iter()
        .map(|pool| {
            let base = ThreadPoolBase::new(
                notifier.clone(),
                pool.index,
                pool.name.clone(),
                pool.mode,
                pool.thread_offset,
            );
            base.init(pool.threads, pool.thread_offset, &partitioner, &topology);
            base.init_pool_time_scale(&clock);
            base
        })
        .collect();

    for pool in &pools {
        let used = pool.get_used_processing_units();
        log::info!(
            "{}: {} thread(s) from #{}, mode {:?}, units {:?}",
            pool.pool_id(),
            pool.thread_count(),
            pool.thread_offset(),
            pool.scheduler_mode(),
            used.iter().collect::<Vec<_>>()
        );
    }

    let pool_refs: Vec<&ThreadPoolBase> = pools.iter().collect();
    let shared = overlapping_units(&pool_refs);
    if shared.any() {
        log::warn!(
            "Processing units claimed by more than one pool: {:?}",
            shared.iter().collect::<Vec<_>>()
        );
    }

    let (resolver, instances, context) = probe::local_naming(config.locality());
    let probe = Probe::register(context, &resolver, &instances);

    thread::scope(|scope| -> Result<()> {
        let mut workers = Vec::new();
        for pool in &pools {
            for local in 0..pool.thread_count() {
                let global = pool.thread_offset() + local;
                let probe = &probe;
                workers.push(scope.spawn(move || -> Result<()> {
                    let _worker = pool.enter_worker(local, global);
                    probe
                        .check_in()
                        .with_context(|| format!("worker {} of {}", local, pool.pool_id()))
                }));
            }
        }
        for worker in workers {
            match worker.join() {
                Ok(result) => result?,
                Err(_) => anyhow::bail!("a worker thread panicked"),
            }
        }
        Ok(())
    })?;

    log::info!(
        "{} worker(s) checked in on {} ({})",
        probe.instance.visits(),
        config.locality(),
        probe.id.gid()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threads_override_targets_default_pool() {
        let config = RuntimeConfig {
            pools: vec![
                PoolConfig::new("io", Some(2)),
                PoolConfig::new(DEFAULT_POOL, None),
            ],
            ..RuntimeConfig::default()
        };

        let config = apply_overrides(config, None, Some(6)).unwrap();

        assert_eq!(config.pools[0].threads, Some(2));
        assert_eq!(config.pools[1].threads, Some(6));
    }

    #[test]
    fn test_threads_override_creates_default_pool() {
        let config =
            apply_overrides(RuntimeConfig::default(), Some(BindPolicy::None), Some(3)).unwrap();

        assert_eq!(config.bind, BindPolicy::None);
        assert_eq!(config.pools, vec![PoolConfig::new(DEFAULT_POOL, Some(3))]);
    }

    #[test]
    fn test_threads_override_without_default_pool_is_an_error() {
        let config = RuntimeConfig {
            pools: vec![PoolConfig::new("io", Some(2))],
            ..RuntimeConfig::default()
        };

        assert!(apply_overrides(config, None, Some(4)).is_err());
    }
}
