//! Pooled-capital allocation engine
//!
//! Depositors pool a single base asset and hold proportional claim shares.
//! Capital sits in a zero-yield buffer until keepers park it in registered
//! yield arks, subject to per-ark caps, a buffer liquidity floor, a rate
//! ordering guard and a cooldown between rebalance batches. Every operation
//! is all-or-nothing.

pub mod access;
pub mod ark;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod events;
pub mod fleet;
pub mod ledger;
pub mod math;
pub mod percentage;
pub mod registry;
pub mod sim;
pub mod types;

// Re-export the surface most callers need
pub use access::{AccessManager, Role, StaticRoles};
pub use ark::{Ark, ArkError, BufferArk};
pub use config::FleetConfig;
pub use cooldown::{CooldownEnforcer, CooldownInit};
pub use error::FleetError;
pub use events::FleetEvent;
pub use fleet::{ArkView, BufferLeg, Fleet, RebalanceLeg};
pub use percentage::{Percentage, PERCENTAGE_FACTOR};
pub use registry::{ArkCap, ArkRegistry};
pub use types::{AccountId, MAX_ARKS, MAX_REBALANCE_LEGS, MOVE_ALL, WITHDRAW_ALL};
