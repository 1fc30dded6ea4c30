//! Capability checks consumed by keeper/governor operations
//!
//! The engine never stores identity or role state; it queries an injected
//! collaborator before any restricted operation.

use crate::types::AccountId;

/// Capabilities the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May trigger rebalancing and buffer maintenance
    Keeper,
    /// May change caps, cooldown duration and adapter registration
    Governor,
}

/// Injected access-control collaborator
pub trait AccessManager {
    fn has_role(&self, role: Role, account: AccountId) -> bool;
}

/// Fixed role lists, used by the keeper daemon and tests
#[derive(Debug, Clone, Default)]
pub struct StaticRoles {
    keepers: Vec<AccountId>,
    governors: Vec<AccountId>,
}

impl StaticRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_keeper(&mut self, account: AccountId) {
        self.keepers.push(account);
    }

    pub fn add_governor(&mut self, account: AccountId) {
        self.governors.push(account);
    }
}

impl AccessManager for StaticRoles {
    fn has_role(&self, role: Role, account: AccountId) -> bool {
        match role {
            Role::Keeper => self.keepers.contains(&account),
            Role::Governor => self.governors.contains(&account),
        }
    }
}
