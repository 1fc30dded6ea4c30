//! Fleet configuration
//!
//! Created once at fleet construction; individual fields are mutated only
//! through governor-gated operations on the fleet itself.

use crate::cooldown::CooldownInit;
use crate::percentage::Percentage;
use crate::types::AccountId;

#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Identity of the single base asset the fleet accepts
    pub asset: AccountId,
    /// Human-readable fleet name
    pub name: String,
    /// Human-readable share symbol
    pub symbol: String,
    /// Liquidity floor the buffer never drops below during maintenance
    pub minimum_buffer_balance: u128,
    /// Minimum elapsed time between successive rebalance batches
    pub rebalance_cooldown_secs: u64,
    /// Whether the first rebalance must wait a full cooldown
    pub cooldown_init: CooldownInit,
    /// Fleet-wide ceiling on pooled assets
    pub deposit_cap: u128,
    /// When a withdrawal pulls from an ark, take at least this fraction of
    /// the position (surplus over the need rests in the buffer)
    pub minimum_position_withdrawal: Percentage,
    /// Ceiling on the buffer's contribution to a withdrawal that also has
    /// to drain arks
    pub maximum_buffer_withdrawal: Percentage,
    /// Largest release shortfall tolerated per rebalance leg before the
    /// batch is failed outright
    pub release_shortfall_tolerance: Percentage,
}

impl FleetConfig {
    /// Configuration with permissive defaults: no cooldown, no caps,
    /// no withdrawal fractions, zero shortfall tolerance.
    pub fn new(asset: AccountId, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        FleetConfig {
            asset,
            name: name.into(),
            symbol: symbol.into(),
            minimum_buffer_balance: 0,
            rebalance_cooldown_secs: 0,
            cooldown_init: CooldownInit::SatisfiedFromGenesis,
            deposit_cap: u128::MAX,
            minimum_position_withdrawal: Percentage::ZERO,
            maximum_buffer_withdrawal: Percentage::ONE_HUNDRED,
            release_shortfall_tolerance: Percentage::ZERO,
        }
    }
}
