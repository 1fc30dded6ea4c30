//! Fleet Rebalancing Keeper
//!
//! Off-chain service that watches ark rates, parks excess buffer capital and
//! consolidates positions into the best-performing ark once its lead has
//! been stable for a full observation window.

mod config;
mod planner;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use config::Config;
use fleet_core::sim::{SharedArk, SimulatedArk};
use fleet_core::{
    AccountId, ArkCap, BufferLeg, Fleet, FleetConfig, FleetError, StaticRoles,
};
use planner::{prepare_rebalance_legs, rank_arks, RateHistory};
use tokio::time;

const KEEPER: AccountId = AccountId([0x01; 32]);
const GOVERNOR: AccountId = AccountId([0x02; 32]);
const TREASURY: AccountId = AccountId([0x03; 32]);
const ASSET: AccountId = AccountId([0xAA; 32]);
const BUFFER: AccountId = AccountId([0xBB; 32]);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Fleet Rebalancing Keeper");

    // Load configuration
    let config = Config::load().unwrap_or_else(|_| {
        log::warn!("Failed to load config, using default local config");
        Config::default_local()
    });

    let (mut fleet, arks) = build_fleet(&config)?;
    log::info!(
        "Fleet seeded: {} arks, buffer {}, minimum {}",
        arks.len(),
        fleet.buffer_balance(),
        config.minimum_buffer_balance
    );

    let mut history = RateHistory::new(config.stability_window);
    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs));

    log::info!("Keeper service started. Watching ark rates...");

    loop {
        interval.tick().await;

        accrue_yield(&arks);

        if let Err(e) = run_cycle(&mut fleet, &mut history, &config) {
            log::error!("Rebalance cycle failed: {}", e);
        }

        for event in fleet.take_events() {
            log::info!("event: {:?}", event);
        }
    }
}

/// Build the simulated fleet from config: register one ark per entry and
/// seed the buffer with the treasury deposit.
fn build_fleet(config: &Config) -> Result<(Fleet, Vec<SharedArk>)> {
    let mut roles = StaticRoles::new();
    roles.add_keeper(KEEPER);
    roles.add_governor(GOVERNOR);

    let mut fleet_config = FleetConfig::new(ASSET, "Fleet USDC", "flUSDC");
    fleet_config.minimum_buffer_balance = u128::from(config.minimum_buffer_balance);
    fleet_config.rebalance_cooldown_secs = config.rebalance_cooldown_secs;

    let mut fleet = Fleet::new(fleet_config, BUFFER, Box::new(roles), unix_now());

    let mut handles = Vec::with_capacity(config.arks.len());
    for (i, ark_config) in config.arks.iter().enumerate() {
        let id = AccountId::from_byte(0x10 + i as u8);
        let handle = SharedArk::new(SimulatedArk::new(id, u128::from(ark_config.rate)));
        let cap = ArkCap::Absolute(ark_config.cap.map(u128::from).unwrap_or(u128::MAX));

        fleet
            .register_ark(GOVERNOR, Box::new(handle.clone()), cap)
            .with_context(|| format!("failed to register ark {}", ark_config.name))?;
        log::info!(
            "Registered ark {} as {} (rate {})",
            ark_config.name,
            id,
            ark_config.rate
        );
        handles.push(handle);
    }

    fleet
        .deposit(ASSET, u128::from(config.initial_deposit), TREASURY)
        .context("seed deposit failed")?;
    fleet.take_events();

    Ok((fleet, handles))
}

/// One observation cycle: sample rates, extend the stability window and,
/// once the leader is stable, move capital into it.
fn run_cycle(fleet: &mut Fleet, history: &mut RateHistory, config: &Config) -> Result<()> {
    let ranked = rank_arks(&fleet.ark_overview());
    let Some(top) = ranked.first() else {
        log::debug!("No active arks to allocate into");
        return Ok(());
    };
    history.record(top.ark);

    let Some(leader) = history.stable_top() else {
        log::debug!("Leader {} not yet stable", top.ark);
        return Ok(());
    };

    // Park excess buffer capital in the leader; a buffer already at its
    // minimum is routine, not an error
    match fleet.adjust_buffer(
        KEEPER,
        &[BufferLeg {
            to: leader,
            amount: u128::MAX,
        }],
    ) {
        Ok(()) => {}
        Err(FleetError::NoExcessFunds { .. }) => {}
        Err(e) => log::warn!("Buffer adjustment failed: {}", e),
    }

    let legs = prepare_rebalance_legs(
        &fleet.ark_overview(),
        leader,
        u128::from(config.dust_threshold),
    );
    if legs.is_empty() {
        log::debug!("All capital already consolidated in {}", leader);
        return Ok(());
    }

    match fleet.rebalance(KEEPER, &legs, unix_now()) {
        Ok(()) => {
            log::info!("Consolidated {} positions into {}", legs.len(), leader);
            history.reset();
        }
        Err(FleetError::CooldownNotElapsed {
            last_action_ts,
            cooldown_secs,
            now,
        }) => {
            log::debug!(
                "Cooldown active: {}s of {}s elapsed",
                now.saturating_sub(last_action_ts),
                cooldown_secs
            );
        }
        Err(e) => log::warn!("Rebalance rejected: {}", e),
    }

    Ok(())
}

/// Accrue one poll's worth of yield on every simulated ark
fn accrue_yield(arks: &[SharedArk]) {
    for ark in arks {
        let gain = ark.assets().saturating_mul(ark.rate()) / 1_000_000;
        ark.accrue(i128::try_from(gain).unwrap_or(i128::MAX));
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
