//! Simulated yield ark for the keeper daemon and tests
//!
//! Models the two adapter behaviors the engine has to survive: a release
//! that returns less than requested (utilization floor) and an accept that
//! fails outright.

use std::sync::{Arc, Mutex, PoisonError};

use crate::ark::{Ark, ArkError};
use crate::percentage::Percentage;
use crate::types::AccountId;

#[derive(Debug, Clone)]
pub struct SimulatedArk {
    id: AccountId,
    rate: u128,
    assets: u128,
    /// Fraction of the position that cannot be released
    liquidity_floor: Percentage,
    /// Force the next accept calls to fail (unwind testing)
    fail_accept: bool,
}

impl SimulatedArk {
    pub fn new(id: AccountId, rate: u128) -> Self {
        SimulatedArk {
            id,
            rate,
            assets: 0,
            liquidity_floor: Percentage::ZERO,
            fail_accept: false,
        }
    }

    pub fn with_liquidity_floor(mut self, floor: Percentage) -> Self {
        self.liquidity_floor = floor;
        self
    }

    pub fn with_failing_accept(mut self) -> Self {
        self.fail_accept = true;
        self
    }

    pub fn set_rate(&mut self, rate: u128) {
        self.rate = rate;
    }

    /// Simulate yield or loss accrued by the underlying strategy
    pub fn accrue(&mut self, delta: i128) {
        if delta >= 0 {
            self.assets = self.assets.saturating_add(delta as u128);
        } else {
            self.assets = self.assets.saturating_sub(delta.unsigned_abs());
        }
    }
}

impl Ark for SimulatedArk {
    fn id(&self) -> AccountId {
        self.id
    }

    fn accept(&mut self, amount: u128) -> Result<(), ArkError> {
        if self.fail_accept {
            return Err(ArkError::DepositRejected("simulated accept failure"));
        }
        self.assets = self.assets.saturating_add(amount);
        Ok(())
    }

    fn release(&mut self, amount: u128) -> u128 {
        let locked = self.liquidity_floor.of(self.assets).unwrap_or(0);
        let releasable = self.assets.saturating_sub(locked);
        let released = amount.min(releasable);
        self.assets -= released;
        released
    }

    fn total_managed_assets(&self) -> u128 {
        self.assets
    }

    fn current_rate(&self) -> u128 {
        self.rate
    }
}

/// Shared handle around a [`SimulatedArk`]. The fleet owns its adapters, so
/// a driver that wants to keep moving rates or accruing yield after
/// registration hands the fleet a clone and keeps the other end.
#[derive(Debug, Clone)]
pub struct SharedArk(Arc<Mutex<SimulatedArk>>);

impl SharedArk {
    pub fn new(ark: SimulatedArk) -> Self {
        SharedArk(Arc::new(Mutex::new(ark)))
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, SimulatedArk> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_rate(&self, rate: u128) {
        self.inner().set_rate(rate);
    }

    pub fn accrue(&self, delta: i128) {
        self.inner().accrue(delta);
    }

    pub fn assets(&self) -> u128 {
        self.inner().total_managed_assets()
    }

    pub fn rate(&self) -> u128 {
        self.inner().current_rate()
    }
}

impl Ark for SharedArk {
    fn id(&self) -> AccountId {
        self.inner().id
    }

    fn accept(&mut self, amount: u128) -> Result<(), ArkError> {
        self.inner().accept(amount)
    }

    fn release(&mut self, amount: u128) -> u128 {
        self.inner().release(amount)
    }

    fn total_managed_assets(&self) -> u128 {
        self.inner().total_managed_assets()
    }

    fn current_rate(&self) -> u128 {
        self.inner().current_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_respects_floor() {
        let mut ark = SimulatedArk::new(AccountId::from_byte(1), 105)
            .with_liquidity_floor(Percentage::from_percent(10));
        ark.accept(1_000).unwrap();

        // 10% of the position stays locked
        assert_eq!(ark.release(1_000), 900);
        assert_eq!(ark.total_managed_assets(), 100);
    }

    #[test]
    fn test_release_partial_request() {
        let mut ark = SimulatedArk::new(AccountId::from_byte(1), 105);
        ark.accept(1_000).unwrap();
        assert_eq!(ark.release(400), 400);
        assert_eq!(ark.total_managed_assets(), 600);
    }

    #[test]
    fn test_failing_accept() {
        let mut ark = SimulatedArk::new(AccountId::from_byte(1), 105).with_failing_accept();
        assert!(ark.accept(100).is_err());
        assert_eq!(ark.total_managed_assets(), 0);
    }

    #[test]
    fn test_shared_handle_sees_mutations() {
        let handle = SharedArk::new(SimulatedArk::new(AccountId::from_byte(1), 105));
        let mut boxed: Box<dyn Ark> = Box::new(handle.clone());

        boxed.accept(500).unwrap();
        assert_eq!(handle.assets(), 500);

        handle.set_rate(120);
        handle.accrue(50);
        assert_eq!(boxed.current_rate(), 120);
        assert_eq!(boxed.total_managed_assets(), 550);
    }

    #[test]
    fn test_accrue() {
        let mut ark = SimulatedArk::new(AccountId::from_byte(1), 105);
        ark.accept(1_000).unwrap();
        ark.accrue(50);
        assert_eq!(ark.total_managed_assets(), 1_050);
        ark.accrue(-100);
        assert_eq!(ark.total_managed_assets(), 950);
    }
}
