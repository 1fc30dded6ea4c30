//! Observable effects of successful operations
//!
//! Each successful operation appends events describing exactly what moved;
//! failed operations emit nothing. Consumers drain them with
//! `Fleet::take_events`. Wire format for indexers is out of scope.

use crate::registry::ArkCap;
use crate::types::AccountId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetEvent {
    Deposited {
        receiver: AccountId,
        amount: u128,
        shares: u128,
    },
    Withdrawn {
        owner: AccountId,
        receiver: AccountId,
        amount: u128,
        shares: u128,
    },
    /// One rebalance leg: requested vs. actually-moved amounts
    Rebalanced {
        from: AccountId,
        to: AccountId,
        requested: u128,
        moved: u128,
    },
    /// One buffer-maintenance leg (source is implicitly the buffer)
    BufferAdjusted {
        to: AccountId,
        requested: u128,
        moved: u128,
    },
    CooldownUpdated {
        old_secs: u64,
        new_secs: u64,
    },
    ArkRegistered {
        ark: AccountId,
        cap: ArkCap,
    },
    ArkCapUpdated {
        ark: AccountId,
        cap: ArkCap,
    },
    ArkDeactivated {
        ark: AccountId,
    },
    ArkRemoved {
        ark: AccountId,
    },
    MinimumBufferUpdated {
        old: u128,
        new: u128,
    },
    DepositCapUpdated {
        old: u128,
        new: u128,
    },
}
