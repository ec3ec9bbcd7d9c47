//! Allocator Sync Keeper
//!
//! Off-line service that loads a ledger deployment, watches for portfolios
//! whose strategy allocations moved underneath them, re-syncs them (most
//! out-of-date first) and audits ledger invariants every round.

mod config;
mod deployment;
mod health;
mod priority_queue;

use allocator_portfolio::Engine;
use anyhow::{Context, Result};
use config::Config;
use crate::priority_queue::SyncQueue;
use std::time::Duration;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Allocator Sync Keeper");

    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("--write-default") {
        let target = args.next().unwrap_or_else(|| "keeper-config.toml".to_string());
        return Config::write_default(&target);
    }

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default local config", e);
        Config::default_local()
    });

    let deployment = deployment::build(&config).context("Failed to build deployment")?;
    let mut engine = deployment.engine;

    log::info!(
        "Tracking {} portfolios over {} strategies ({} price feeds)",
        engine.portfolios().count(),
        engine.strategies().len(),
        deployment.prices.len()
    );

    let mut queue = SyncQueue::new();
    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs.max(1)));
    let mut round: u64 = 0;

    loop {
        interval.tick().await;
        round += 1;

        if let Err(e) = process_round(&mut engine, &mut queue, &config, round) {
            log::error!("Error in round {}: {:#}", round, e);
        }

        if config.max_rounds != 0 && round >= config.max_rounds {
            log::info!("Reached max_rounds ({}), stopping", config.max_rounds);
            return Ok(());
        }
    }
}

/// Re-sync the most out-of-date portfolios, then audit
fn process_round(engine: &mut Engine, queue: &mut SyncQueue, config: &Config, round: u64) -> Result<()> {
    let stale = engine.stale_portfolios().context("Failed to list stale portfolios")?;
    queue.refresh(&stale, round);

    if queue.is_empty() {
        log::debug!("Round {}: no stale portfolios", round);
    } else {
        log::info!("Round {}: {} stale portfolios", round, queue.len());
    }

    for _ in 0..config.max_syncs_per_round {
        let Some(entry) = queue.pop() else {
            break;
        };
        match engine.portfolio_sync(&entry.portfolio) {
            Ok(_) => log::info!(
                "Synced portfolio {} ({} outdated references, stale since round {})",
                entry.portfolio,
                entry.outdated,
                entry.first_seen
            ),
            Err(e) => log::error!("Failed to sync portfolio {}: {}", entry.portfolio, e),
        }
    }

    let report = health::audit(engine, round)?;
    if report.stale_count() > 0 {
        log::warn!("Round {}: {} portfolios still stale", round, report.stale_count());
    }
    if !report.is_healthy() {
        log::error!("Invariant audit failed: {}", report.to_json()?);
    } else {
        log::debug!("Audit: {}", report.to_json()?);
    }

    Ok(())
}
