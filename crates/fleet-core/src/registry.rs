//! Ark registry - per-adapter caps, activity flags and lookup
//!
//! Bounded at `MAX_ARKS` entries. An ark can be deactivated (no new inflow,
//! still releasable and still counted in totals) but not removed while it
//! holds a nonzero position.

use arrayvec::ArrayVec;

use crate::ark::Ark;
use crate::error::FleetError;
use crate::percentage::Percentage;
use crate::types::{AccountId, MAX_ARKS};

/// Maximum allocation for an ark, absolute or relative to pooled value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArkCap {
    Absolute(u128),
    PercentOfPool(Percentage),
}

impl ArkCap {
    /// Resolve to an absolute amount for the given pool size
    pub fn effective(&self, total_assets: u128) -> u128 {
        match *self {
            ArkCap::Absolute(cap) => cap,
            // Overflow can only happen for caps far above 100% of an
            // astronomically large pool; treat that as unbounded.
            ArkCap::PercentOfPool(pct) => pct.of(total_assets).unwrap_or(u128::MAX),
        }
    }
}

/// Per-adapter registry record
pub struct ArkEntry {
    pub adapter: Box<dyn Ark>,
    pub cap: ArkCap,
    pub active: bool,
}

impl ArkEntry {
    pub fn id(&self) -> AccountId {
        self.adapter.id()
    }
}

/// Registration-ordered set of yield arks (buffer excluded)
#[derive(Default)]
pub struct ArkRegistry {
    entries: ArrayVec<ArkEntry, MAX_ARKS>,
}

impl ArkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a new adapter with its allocation cap
    pub fn register(&mut self, adapter: Box<dyn Ark>, cap: ArkCap) -> Result<(), FleetError> {
        let ark = adapter.id();
        if self.find(ark).is_some() {
            return Err(FleetError::DuplicateArk { ark });
        }
        self.entries
            .try_push(ArkEntry {
                adapter,
                cap,
                active: true,
            })
            .map_err(|_| FleetError::RegistryFull)
    }

    pub fn find(&self, ark: AccountId) -> Option<&ArkEntry> {
        self.entries.iter().find(|e| e.id() == ark)
    }

    pub fn find_mut(&mut self, ark: AccountId) -> Option<&mut ArkEntry> {
        self.entries.iter_mut().find(|e| e.id() == ark)
    }

    pub fn set_cap(&mut self, ark: AccountId, cap: ArkCap) -> Result<(), FleetError> {
        let entry = self
            .find_mut(ark)
            .ok_or(FleetError::ArkNotFound { ark })?;
        entry.cap = cap;
        Ok(())
    }

    /// Stop new inflow into an ark; its position remains releasable
    pub fn deactivate(&mut self, ark: AccountId) -> Result<(), FleetError> {
        let entry = self
            .find_mut(ark)
            .ok_or(FleetError::ArkNotFound { ark })?;
        entry.active = false;
        Ok(())
    }

    /// Drop an ark from the registry; fails while it manages a position
    pub fn remove(&mut self, ark: AccountId) -> Result<(), FleetError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id() == ark)
            .ok_or(FleetError::ArkNotFound { ark })?;
        let assets = self.entries[idx].adapter.total_managed_assets();
        if assets > 0 {
            return Err(FleetError::ArkNotEmpty { ark, assets });
        }
        self.entries.remove(idx);
        Ok(())
    }

    /// Sum of all registered positions, active or not
    pub fn total_managed(&self) -> u128 {
        self.entries
            .iter()
            .fold(0u128, |acc, e| acc.saturating_add(e.adapter.total_managed_assets()))
    }

    /// Registration-order iteration (the deterministic withdrawal order)
    pub fn iter(&self) -> impl Iterator<Item = &ArkEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ArkEntry> {
        self.entries.iter_mut()
    }
}
