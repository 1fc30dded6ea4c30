//! Position ledger - proportional claim-share accounting
//!
//! Shares are minted at the current exchange rate on deposit and burned
//! symmetrically on withdrawal. Rounding always favors the pool: deposits
//! floor the minted shares, withdrawals ceil the burned shares.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::FleetError;
use crate::math::{mul_div_ceil, mul_div_floor};
use crate::types::AccountId;

#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    total_shares: u128,
    balances: BTreeMap<AccountId, u128>,
    /// (owner, operator) pairs approved to withdraw on the owner's behalf
    operators: BTreeSet<(AccountId, AccountId)>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    pub fn balance_of(&self, owner: AccountId) -> u128 {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    /// Shares minted for a deposit of `amount` against `total_assets`
    pub fn shares_for_deposit(&self, amount: u128, total_assets: u128) -> Result<u128, FleetError> {
        // An empty pool (or one wiped out by adapter losses) restarts
        // share pricing at one share per asset unit.
        if self.total_shares == 0 || total_assets == 0 {
            return Ok(amount);
        }
        mul_div_floor(amount, self.total_shares, total_assets).ok_or(FleetError::Overflow)
    }

    /// Shares burned for a withdrawal of `amount` (ceil: pool keeps the dust)
    pub fn shares_for_withdrawal(
        &self,
        amount: u128,
        total_assets: u128,
    ) -> Result<u128, FleetError> {
        if self.total_shares == 0 || total_assets == 0 {
            return Err(FleetError::InsufficientLiquidity {
                requested: amount,
                available: 0,
            });
        }
        mul_div_ceil(amount, self.total_shares, total_assets).ok_or(FleetError::Overflow)
    }

    /// Asset value of an owner's full position at the current exchange rate
    pub fn assets_of(&self, owner: AccountId, total_assets: u128) -> u128 {
        if self.total_shares == 0 {
            return 0;
        }
        mul_div_floor(self.balance_of(owner), total_assets, self.total_shares).unwrap_or(0)
    }

    pub fn mint(&mut self, receiver: AccountId, shares: u128) -> Result<(), FleetError> {
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(FleetError::Overflow)?;
        let balance = self.balances.entry(receiver).or_insert(0);
        *balance = balance.checked_add(shares).ok_or(FleetError::Overflow)?;
        Ok(())
    }

    pub fn burn(&mut self, owner: AccountId, shares: u128) -> Result<(), FleetError> {
        let balance = self.balance_of(owner);
        if balance < shares {
            return Err(FleetError::InsufficientShares {
                owner,
                shares,
                balance,
            });
        }
        if balance == shares {
            self.balances.remove(&owner);
        } else {
            self.balances.insert(owner, balance - shares);
        }
        self.total_shares -= shares;
        Ok(())
    }

    pub fn approve_operator(&mut self, owner: AccountId, operator: AccountId) {
        self.operators.insert((owner, operator));
    }

    pub fn revoke_operator(&mut self, owner: AccountId, operator: AccountId) {
        self.operators.remove(&(owner, operator));
    }

    pub fn is_operator(&self, owner: AccountId, operator: AccountId) -> bool {
        self.operators.contains(&(owner, operator))
    }
}
