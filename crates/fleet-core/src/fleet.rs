//! Fleet engine - deposits, withdrawals, rebalancing and buffer maintenance
//!
//! Every public operation runs to completion as one indivisible unit: either
//! all internal steps succeed and the new state is committed, or the failure
//! unwinds every intermediate move and the prior state is untouched. An
//! operation-in-progress flag is set before any call into an adapter and
//! cleared on exit, so a hostile adapter calling back into the engine is
//! rejected rather than observing (or corrupting) mid-operation state.

use std::collections::BTreeMap;

use crate::access::{AccessManager, Role};
use crate::ark::{Ark, BufferArk};
use crate::config::FleetConfig;
use crate::cooldown::CooldownEnforcer;
use crate::error::FleetError;
use crate::events::FleetEvent;
use crate::ledger::PositionLedger;
use crate::registry::{ArkCap, ArkRegistry};
use crate::types::{AccountId, MAX_REBALANCE_LEGS, MOVE_ALL, WITHDRAW_ALL};

/// One rebalance leg: move `amount` from `from` to `to`.
/// `amount == MOVE_ALL` moves the source's entire position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalanceLeg {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u128,
}

/// One buffer-maintenance leg; the source is implicitly the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLeg {
    pub to: AccountId,
    pub amount: u128,
}

/// Read-only snapshot of one ark, for keepers and telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArkView {
    pub ark: AccountId,
    pub rate: u128,
    pub assets: u128,
    pub active: bool,
}

pub struct Fleet {
    config: FleetConfig,
    buffer: BufferArk,
    registry: ArkRegistry,
    ledger: PositionLedger,
    cooldown: CooldownEnforcer,
    access: Box<dyn AccessManager>,
    op_in_progress: bool,
    events: Vec<FleetEvent>,
}

impl Fleet {
    pub fn new(
        config: FleetConfig,
        buffer_id: AccountId,
        access: Box<dyn AccessManager>,
        created_at: u64,
    ) -> Self {
        let cooldown = CooldownEnforcer::new(
            config.rebalance_cooldown_secs,
            config.cooldown_init,
            created_at,
        );
        Fleet {
            config,
            buffer: BufferArk::new(buffer_id),
            registry: ArkRegistry::new(),
            ledger: PositionLedger::new(),
            cooldown,
            access,
            op_in_progress: false,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Total pooled value: buffer plus every registered position
    pub fn total_assets(&self) -> u128 {
        self.buffer
            .balance()
            .saturating_add(self.registry.total_managed())
    }

    pub fn buffer_balance(&self) -> u128 {
        self.buffer.balance()
    }

    pub fn buffer_id(&self) -> AccountId {
        Ark::id(&self.buffer)
    }

    pub fn total_shares(&self) -> u128 {
        self.ledger.total_shares()
    }

    pub fn share_balance_of(&self, owner: AccountId) -> u128 {
        self.ledger.balance_of(owner)
    }

    /// Asset value of an owner's position at the current exchange rate
    pub fn assets_of(&self, owner: AccountId) -> u128 {
        self.ledger.assets_of(owner, self.total_assets())
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    pub fn cooldown(&self) -> &CooldownEnforcer {
        &self.cooldown
    }

    /// Snapshot of every registered ark, in registration order
    pub fn ark_overview(&self) -> Vec<ArkView> {
        self.registry
            .iter()
            .map(|e| ArkView {
                ark: e.id(),
                rate: e.adapter.current_rate(),
                assets: e.adapter.total_managed_assets(),
                active: e.active,
            })
            .collect()
    }

    pub fn ark_assets(&self, ark: AccountId) -> Option<u128> {
        self.endpoint(ark).map(|(assets, _, _)| assets)
    }

    /// Drain events recorded by successful operations since the last call
    pub fn take_events(&mut self) -> Vec<FleetEvent> {
        core::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Depositor operations
    // ------------------------------------------------------------------

    /// Deposit `amount` of the base asset; mints shares to `receiver` and
    /// routes the funds into the buffer. Returns the minted share count.
    pub fn deposit(
        &mut self,
        asset: AccountId,
        amount: u128,
        receiver: AccountId,
    ) -> Result<u128, FleetError> {
        self.begin_op()?;
        let result = self.deposit_locked(asset, amount, receiver);
        self.end_op();
        result
    }

    fn deposit_locked(
        &mut self,
        asset: AccountId,
        amount: u128,
        receiver: AccountId,
    ) -> Result<u128, FleetError> {
        if amount == 0 {
            return Err(FleetError::ZeroAmount);
        }
        if asset != self.config.asset {
            return Err(FleetError::WrongAsset {
                expected: self.config.asset,
                got: asset,
            });
        }
        let total = self.total_assets();
        if total.saturating_add(amount) > self.config.deposit_cap {
            return Err(FleetError::DepositCapExceeded {
                total,
                amount,
                cap: self.config.deposit_cap,
            });
        }

        let shares = self.ledger.shares_for_deposit(amount, total)?;
        if shares == 0 {
            // Too small to mint a single share at the current exchange rate
            return Err(FleetError::ZeroAmount);
        }

        self.buffer.credit(amount);
        self.ledger.mint(receiver, shares)?;
        self.events.push(FleetEvent::Deposited {
            receiver,
            amount,
            shares,
        });
        log::debug!("deposit: {} assets -> {} shares for {}", amount, shares, receiver);
        Ok(shares)
    }

    /// Withdraw `amount` of the base asset (or the owner's entire position
    /// with `WITHDRAW_ALL`), burning shares from `owner`. The caller must be
    /// the owner or an approved operator. Returns the shares burned.
    pub fn withdraw(
        &mut self,
        caller: AccountId,
        amount: u128,
        receiver: AccountId,
        owner: AccountId,
    ) -> Result<u128, FleetError> {
        self.begin_op()?;
        let result = self.withdraw_locked(caller, amount, receiver, owner);
        self.end_op();
        result
    }

    fn withdraw_locked(
        &mut self,
        caller: AccountId,
        amount: u128,
        receiver: AccountId,
        owner: AccountId,
    ) -> Result<u128, FleetError> {
        if caller != owner && !self.ledger.is_operator(owner, caller) {
            return Err(FleetError::WithdrawalNotApproved { owner, caller });
        }

        let total_assets = self.total_assets();
        let amount = if amount == WITHDRAW_ALL {
            self.ledger.assets_of(owner, total_assets)
        } else {
            amount
        };
        if amount == 0 {
            return Err(FleetError::ZeroAmount);
        }

        let shares = self.ledger.shares_for_withdrawal(amount, total_assets)?;
        let balance = self.ledger.balance_of(owner);
        if balance < shares {
            return Err(FleetError::InsufficientShares {
                owner,
                shares,
                balance,
            });
        }

        let buffer_balance = self.buffer.balance();
        if buffer_balance < amount {
            self.drain_arks_into_buffer(amount, buffer_balance)?;
        }
        self.buffer.debit(amount);
        self.ledger.burn(owner, shares)?;

        self.events.push(FleetEvent::Withdrawn {
            owner,
            receiver,
            amount,
            shares,
        });
        log::debug!(
            "withdraw: {} assets ({} shares) from {} to {}",
            amount,
            shares,
            owner,
            receiver
        );
        Ok(shares)
    }

    /// Approve `operator` to withdraw on the caller's behalf
    pub fn approve_operator(&mut self, caller: AccountId, operator: AccountId) {
        self.ledger.approve_operator(caller, operator);
    }

    pub fn revoke_operator(&mut self, caller: AccountId, operator: AccountId) {
        self.ledger.revoke_operator(caller, operator);
    }

    /// Pull liquidity from active arks into the buffer until it can cover
    /// `amount`. Rolls every release back if the arks come up short.
    fn drain_arks_into_buffer(
        &mut self,
        amount: u128,
        buffer_balance: u128,
    ) -> Result<(), FleetError> {
        let buffer_take = self
            .config
            .maximum_buffer_withdrawal
            .of(buffer_balance)
            .ok_or(FleetError::Overflow)?
            .min(buffer_balance);

        // Upper-bound availability check before touching any adapter
        let active_total = self
            .registry
            .iter()
            .filter(|e| e.active)
            .fold(0u128, |acc, e| {
                acc.saturating_add(e.adapter.total_managed_assets())
            });
        let available = buffer_take.saturating_add(active_total);
        if available < amount {
            return Err(FleetError::InsufficientLiquidity {
                requested: amount,
                available,
            });
        }

        let min_pull_pct = self.config.minimum_position_withdrawal;
        let mut needed = amount - buffer_take;
        let mut journal: Vec<(AccountId, u128)> = Vec::new();

        for entry in self.registry.iter_mut() {
            if needed == 0 {
                break;
            }
            if !entry.active {
                continue;
            }
            let position = entry.adapter.total_managed_assets();
            if position == 0 {
                continue;
            }
            // Pull at least the configured position fraction; surplus over
            // the need simply rests in the buffer.
            let min_pull = min_pull_pct.of(position).unwrap_or(0);
            let request = needed.max(min_pull).min(position);
            let released = entry.adapter.release(request);
            if released == 0 {
                continue;
            }
            self.buffer.credit(released);
            journal.push((entry.id(), released));
            needed = needed.saturating_sub(released);
        }

        if needed > 0 {
            // Utilization floors bit deeper than the positions suggested;
            // return every release to its ark and fail the whole withdrawal.
            for &(ark, moved) in journal.iter().rev() {
                let taken = self.buffer.debit(moved);
                self.restore(ark, taken);
            }
            return Err(FleetError::InsufficientLiquidity {
                requested: amount,
                available: amount - needed,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Keeper operations
    // ------------------------------------------------------------------

    /// Move excess buffer capital (above the configured minimum) into arks.
    /// No cooldown and no rate check: parking idle capital in any permitted,
    /// under-cap ark is always acceptable. Legs are clamped so the buffer
    /// never drops below the minimum.
    pub fn adjust_buffer(
        &mut self,
        caller: AccountId,
        legs: &[BufferLeg],
    ) -> Result<(), FleetError> {
        self.require_role(Role::Keeper, caller)?;
        self.begin_op()?;
        let result = self.adjust_buffer_locked(legs);
        self.end_op();
        result
    }

    fn adjust_buffer_locked(&mut self, legs: &[BufferLeg]) -> Result<(), FleetError> {
        let minimum = self.config.minimum_buffer_balance;
        let buffer_balance = self.buffer.balance();
        let mut remaining_excess = buffer_balance.saturating_sub(minimum);
        if remaining_excess == 0 {
            return Err(FleetError::NoExcessFunds {
                buffer: buffer_balance,
                minimum,
            });
        }

        let total_assets = self.total_assets();

        // Validate and clamp every leg before any capital moves
        let mut planned: Vec<(AccountId, u128, u128)> = Vec::with_capacity(legs.len());
        let mut inflow: BTreeMap<AccountId, u128> = BTreeMap::new();
        for leg in legs {
            let entry = self
                .registry
                .find(leg.to)
                .ok_or(FleetError::ArkNotFound { ark: leg.to })?;
            if !entry.active {
                return Err(FleetError::ArkInactive { ark: leg.to });
            }

            let amount = leg.amount.min(remaining_excess);
            let pending = inflow.entry(leg.to).or_insert(0);
            let projected = entry
                .adapter
                .total_managed_assets()
                .saturating_add(*pending)
                .saturating_add(amount);
            let cap = entry.cap.effective(total_assets);
            if projected > cap {
                return Err(FleetError::CapExceeded {
                    ark: leg.to,
                    attempted: projected,
                    cap,
                });
            }

            *pending += amount;
            remaining_excess -= amount;
            planned.push((leg.to, leg.amount, amount));
        }

        // Execute; unwind on any adapter failure
        let mut journal: Vec<(AccountId, u128)> = Vec::new();
        let mut events: Vec<FleetEvent> = Vec::with_capacity(planned.len());
        for (to, requested, amount) in planned {
            if amount > 0 {
                self.buffer.debit(amount);
                if let Err(e) = self.accept_into(to, amount) {
                    self.buffer.credit(amount);
                    for &(ark, moved) in journal.iter().rev() {
                        let returned = self.release_from(ark, moved).unwrap_or(0);
                        self.buffer.credit(returned);
                    }
                    return Err(e);
                }
                journal.push((to, amount));
            }
            log::debug!("adjust_buffer: moved {} of {} into {}", amount, requested, to);
            events.push(FleetEvent::BufferAdjusted {
                to,
                requested,
                moved: amount,
            });
        }
        self.events.extend(events);
        Ok(())
    }

    /// Apply a batch of rebalance legs in caller-supplied order, all or
    /// nothing, gated by the cooldown. On success the cooldown clock resets.
    pub fn rebalance(
        &mut self,
        caller: AccountId,
        legs: &[RebalanceLeg],
        now: u64,
    ) -> Result<(), FleetError> {
        self.require_role(Role::Keeper, caller)?;
        self.cooldown.check(now)?;
        if legs.len() > MAX_REBALANCE_LEGS {
            return Err(FleetError::TooManyLegs {
                legs: legs.len(),
                max: MAX_REBALANCE_LEGS,
            });
        }
        self.begin_op()?;
        let result = self.rebalance_locked(legs, now);
        self.end_op();
        result
    }

    fn rebalance_locked(&mut self, legs: &[RebalanceLeg], now: u64) -> Result<(), FleetError> {
        let total_assets = self.total_assets();

        // Phase 1: validate every leg against scratch balances. Requested
        // amounts are an upper bound on moved amounts, so a cap that holds
        // here also holds after execution.
        let mut planned: Vec<(AccountId, AccountId, u128)> = Vec::with_capacity(legs.len());
        let mut inflow: BTreeMap<AccountId, u128> = BTreeMap::new();
        let mut outflow: BTreeMap<AccountId, u128> = BTreeMap::new();
        for leg in legs {
            if leg.amount == 0 {
                return Err(FleetError::ZeroRebalanceAmount { to: leg.to });
            }

            let (from_assets, from_rate, _) = self
                .endpoint(leg.from)
                .ok_or(FleetError::ArkNotFound { ark: leg.from })?;
            let (to_assets, to_rate, to_active) = self
                .endpoint(leg.to)
                .ok_or(FleetError::ArkNotFound { ark: leg.to })?;
            // Draining a deactivated source is allowed; inflow is not
            if !to_active {
                return Err(FleetError::ArkInactive { ark: leg.to });
            }

            let projected_from = from_assets
                .saturating_add(inflow.get(&leg.from).copied().unwrap_or(0))
                .saturating_sub(outflow.get(&leg.from).copied().unwrap_or(0));
            let amount = if leg.amount == MOVE_ALL {
                projected_from
            } else {
                leg.amount
            };
            if amount == 0 {
                return Err(FleetError::ZeroRebalanceAmount { to: leg.to });
            }

            if !self.is_buffer(leg.to) {
                let projected_to = to_assets
                    .saturating_add(inflow.get(&leg.to).copied().unwrap_or(0))
                    .saturating_sub(outflow.get(&leg.to).copied().unwrap_or(0))
                    .saturating_add(amount);
                let cap = self.cap_of(leg.to, total_assets);
                if projected_to > cap {
                    return Err(FleetError::CapExceeded {
                        ark: leg.to,
                        attempted: projected_to,
                        cap,
                    });
                }
            }

            // Rate ordering applies only between yield arks; the buffer is
            // a rate-neutral endpoint
            if !self.is_buffer(leg.from) && !self.is_buffer(leg.to) && to_rate < from_rate {
                return Err(FleetError::TargetRateTooLow {
                    from: leg.from,
                    to: leg.to,
                    from_rate,
                    to_rate,
                });
            }

            *outflow.entry(leg.from).or_insert(0) += amount;
            *inflow.entry(leg.to).or_insert(0) += amount;
            planned.push((leg.from, leg.to, amount));
        }

        // Phase 2: execute in order; any failure unwinds the journal
        let mut journal: Vec<(AccountId, AccountId, u128)> = Vec::new();
        let mut events: Vec<FleetEvent> = Vec::with_capacity(planned.len());
        for (from, to, amount) in planned {
            let released = match self.release_from(from, amount) {
                Ok(r) => r,
                Err(e) => {
                    self.unwind(&journal);
                    return Err(e);
                }
            };

            let shortfall = amount - released;
            let tolerated = self
                .config
                .release_shortfall_tolerance
                .of(amount)
                .unwrap_or(0);
            if shortfall > tolerated {
                self.restore(from, released);
                self.unwind(&journal);
                return Err(FleetError::ShortfallExceeded {
                    ark: from,
                    requested: amount,
                    released,
                });
            }

            // Validation projected balances with requested outflows, but a
            // tolerated shortfall leaves funds in the source; re-check the
            // destination's real position before accepting into it.
            if !self.is_buffer(to) {
                let current = self
                    .registry
                    .find(to)
                    .map(|e| e.adapter.total_managed_assets())
                    .unwrap_or(0);
                let attempted = current.saturating_add(released);
                let cap = self.cap_of(to, total_assets);
                if attempted > cap {
                    self.restore(from, released);
                    self.unwind(&journal);
                    return Err(FleetError::CapExceeded {
                        ark: to,
                        attempted,
                        cap,
                    });
                }
            }

            if let Err(e) = self.accept_into(to, released) {
                self.restore(from, released);
                self.unwind(&journal);
                return Err(e);
            }

            journal.push((from, to, released));
            log::debug!("rebalance: moved {} of {} from {} to {}", released, amount, from, to);
            events.push(FleetEvent::Rebalanced {
                from,
                to,
                requested: amount,
                moved: released,
            });
        }

        self.cooldown.record(now);
        self.events.extend(events);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Governor operations
    // ------------------------------------------------------------------

    pub fn register_ark(
        &mut self,
        caller: AccountId,
        adapter: Box<dyn Ark>,
        cap: ArkCap,
    ) -> Result<(), FleetError> {
        self.require_role(Role::Governor, caller)?;
        let ark = adapter.id();
        if self.is_buffer(ark) {
            return Err(FleetError::DuplicateArk { ark });
        }
        self.registry.register(adapter, cap)?;
        self.events.push(FleetEvent::ArkRegistered { ark, cap });
        log::info!("ark registered: {}", ark);
        Ok(())
    }

    pub fn set_ark_max_allocation(
        &mut self,
        caller: AccountId,
        ark: AccountId,
        cap: ArkCap,
    ) -> Result<(), FleetError> {
        self.require_role(Role::Governor, caller)?;
        self.registry.set_cap(ark, cap)?;
        self.events.push(FleetEvent::ArkCapUpdated { ark, cap });
        Ok(())
    }

    pub fn deactivate_ark(&mut self, caller: AccountId, ark: AccountId) -> Result<(), FleetError> {
        self.require_role(Role::Governor, caller)?;
        self.registry.deactivate(ark)?;
        self.events.push(FleetEvent::ArkDeactivated { ark });
        log::info!("ark deactivated: {}", ark);
        Ok(())
    }

    /// Remove an ark entirely; fails while it still manages a position
    pub fn remove_ark(&mut self, caller: AccountId, ark: AccountId) -> Result<(), FleetError> {
        self.require_role(Role::Governor, caller)?;
        self.registry.remove(ark)?;
        self.events.push(FleetEvent::ArkRemoved { ark });
        log::info!("ark removed: {}", ark);
        Ok(())
    }

    pub fn update_rebalance_cooldown(
        &mut self,
        caller: AccountId,
        duration_secs: u64,
    ) -> Result<(), FleetError> {
        self.require_role(Role::Governor, caller)?;
        let old_secs = self.cooldown.set_duration(duration_secs);
        self.config.rebalance_cooldown_secs = duration_secs;
        self.events.push(FleetEvent::CooldownUpdated {
            old_secs,
            new_secs: duration_secs,
        });
        log::info!("rebalance cooldown: {}s -> {}s", old_secs, duration_secs);
        Ok(())
    }

    pub fn set_minimum_buffer_balance(
        &mut self,
        caller: AccountId,
        minimum: u128,
    ) -> Result<(), FleetError> {
        self.require_role(Role::Governor, caller)?;
        let old = core::mem::replace(&mut self.config.minimum_buffer_balance, minimum);
        self.events.push(FleetEvent::MinimumBufferUpdated { old, new: minimum });
        Ok(())
    }

    pub fn set_deposit_cap(&mut self, caller: AccountId, cap: u128) -> Result<(), FleetError> {
        self.require_role(Role::Governor, caller)?;
        let old = core::mem::replace(&mut self.config.deposit_cap, cap);
        self.events.push(FleetEvent::DepositCapUpdated { old, new: cap });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_role(&self, role: Role, account: AccountId) -> Result<(), FleetError> {
        if self.access.has_role(role, account) {
            Ok(())
        } else {
            Err(FleetError::Unauthorized { account, role })
        }
    }

    fn begin_op(&mut self) -> Result<(), FleetError> {
        if self.op_in_progress {
            return Err(FleetError::ReentrantCall);
        }
        self.op_in_progress = true;
        Ok(())
    }

    fn end_op(&mut self) {
        self.op_in_progress = false;
    }

    fn is_buffer(&self, id: AccountId) -> bool {
        id == Ark::id(&self.buffer)
    }

    /// Resolve an endpoint to (assets, rate, active); `None` if unknown
    fn endpoint(&self, id: AccountId) -> Option<(u128, u128, bool)> {
        if self.is_buffer(id) {
            return Some((self.buffer.balance(), 0, true));
        }
        self.registry.find(id).map(|e| {
            (
                e.adapter.total_managed_assets(),
                e.adapter.current_rate(),
                e.active,
            )
        })
    }

    /// Effective cap of a registered ark (unbounded for the buffer)
    fn cap_of(&self, id: AccountId, total_assets: u128) -> u128 {
        self.registry
            .find(id)
            .map(|e| e.cap.effective(total_assets))
            .unwrap_or(u128::MAX)
    }

    fn release_from(&mut self, ark: AccountId, amount: u128) -> Result<u128, FleetError> {
        if self.is_buffer(ark) {
            return Ok(self.buffer.debit(amount));
        }
        let entry = self
            .registry
            .find_mut(ark)
            .ok_or(FleetError::ArkNotFound { ark })?;
        Ok(entry.adapter.release(amount))
    }

    fn accept_into(&mut self, ark: AccountId, amount: u128) -> Result<(), FleetError> {
        if self.is_buffer(ark) {
            self.buffer.credit(amount);
            return Ok(());
        }
        let entry = self
            .registry
            .find_mut(ark)
            .ok_or(FleetError::ArkNotFound { ark })?;
        entry
            .adapter
            .accept(amount)
            .map_err(|source| FleetError::Adapter { ark, source })
    }

    /// Best-effort return of funds to an ark during rollback. If the ark
    /// refuses them, the funds rest in the buffer so conservation holds.
    fn restore(&mut self, ark: AccountId, amount: u128) {
        if amount == 0 {
            return;
        }
        if self.accept_into(ark, amount).is_err() {
            log::warn!("rollback: ark {} refused {}; parking in buffer", ark, amount);
            self.buffer.credit(amount);
        }
    }

    /// Reverse every journaled move, newest first
    fn unwind(&mut self, journal: &[(AccountId, AccountId, u128)]) {
        for &(from, to, moved) in journal.iter().rev() {
            let returned = self.release_from(to, moved).unwrap_or(0);
            self.restore(from, returned);
        }
    }
}
