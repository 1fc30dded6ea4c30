//! Ark capability - the adapter-facing interface for yield strategies
//!
//! Concrete strategies live behind this trait; the engine never inspects
//! adapter-specific state. The one adapter every fleet carries is the
//! [`BufferArk`]: zero rate, instantly liquid, the resting place for idle
//! capital and the first stop for withdrawals.

use thiserror::Error;

use crate::types::AccountId;

/// Adapter-internal failure surfaced by `accept`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArkError {
    #[error("deposit rejected: {0}")]
    DepositRejected(&'static str),
    #[error("adapter unavailable: {0}")]
    Unavailable(&'static str),
}

/// Pluggable yield-bearing capital adapter
pub trait Ark {
    /// Adapter identity used in registry lookups and rebalance legs
    fn id(&self) -> AccountId;

    /// Pull `amount` of the base asset under the adapter's management.
    /// Failure aborts the calling operation.
    fn accept(&mut self, amount: u128) -> Result<(), ArkError>;

    /// Return up to `amount`; the result is the amount actually returned.
    /// An adapter must not fail merely because it can return less than
    /// requested (e.g. an underlying utilization floor).
    fn release(&mut self, amount: u128) -> u128;

    /// Current value under management, used for cap and conservation checks
    fn total_managed_assets(&self) -> u128;

    /// Comparable yield metric, used only for rebalance ordering
    fn current_rate(&self) -> u128;
}

/// The always-present zero-yield liquidity reservoir
#[derive(Debug, Clone)]
pub struct BufferArk {
    id: AccountId,
    balance: u128,
}

impl BufferArk {
    pub fn new(id: AccountId) -> Self {
        BufferArk { id, balance: 0 }
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Add funds to the buffer. Infallible for any realistic balance.
    pub fn credit(&mut self, amount: u128) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Take up to `amount` from the buffer, returning the amount taken
    pub fn debit(&mut self, amount: u128) -> u128 {
        let taken = self.balance.min(amount);
        self.balance -= taken;
        taken
    }
}

impl Ark for BufferArk {
    fn id(&self) -> AccountId {
        self.id
    }

    fn accept(&mut self, amount: u128) -> Result<(), ArkError> {
        self.credit(amount);
        Ok(())
    }

    fn release(&mut self, amount: u128) -> u128 {
        self.debit(amount)
    }

    fn total_managed_assets(&self) -> u128 {
        self.balance
    }

    fn current_rate(&self) -> u128 {
        0
    }
}
