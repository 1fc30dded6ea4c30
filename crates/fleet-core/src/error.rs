//! Typed failures for every engine operation
//!
//! Every guard either returns success or one of these variants; a failure
//! aborts the whole calling operation with no partial commit. Variants carry
//! enough structure (offending ark, compared values, timestamps) for a keeper
//! to decide whether to retry with different parameters.

use thiserror::Error;

use crate::access::Role;
use crate::ark::ArkError;
use crate::types::AccountId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetError {
    #[error("amount must be nonzero")]
    ZeroAmount,

    #[error("zero rebalance amount for destination ark {to}")]
    ZeroRebalanceAmount { to: AccountId },

    #[error("wrong asset: expected {expected}, got {got}")]
    WrongAsset { expected: AccountId, got: AccountId },

    #[error("ark not found: {ark}")]
    ArkNotFound { ark: AccountId },

    #[error("ark inactive: {ark}")]
    ArkInactive { ark: AccountId },

    #[error("cap exceeded for ark {ark}: allocation would reach {attempted}, cap {cap}")]
    CapExceeded {
        ark: AccountId,
        attempted: u128,
        cap: u128,
    },

    #[error("target rate too low: ark {to} reports {to_rate}, source ark {from} reports {from_rate}")]
    TargetRateTooLow {
        from: AccountId,
        to: AccountId,
        from_rate: u128,
        to_rate: u128,
    },

    #[error("cooldown not elapsed: last action at {last_action_ts}, cooldown {cooldown_secs}s, now {now}")]
    CooldownNotElapsed {
        last_action_ts: u64,
        cooldown_secs: u64,
        now: u64,
    },

    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u128, available: u128 },

    #[error("insufficient shares: owner {owner} holds {balance}, needs {shares}")]
    InsufficientShares {
        owner: AccountId,
        shares: u128,
        balance: u128,
    },

    #[error("withdrawal not approved: {caller} is neither owner {owner} nor an approved operator")]
    WithdrawalNotApproved {
        owner: AccountId,
        caller: AccountId,
    },

    #[error("no excess funds: buffer {buffer} at or below minimum {minimum}")]
    NoExcessFunds { buffer: u128, minimum: u128 },

    #[error("deposit cap exceeded: pool holds {total}, deposit {amount}, cap {cap}")]
    DepositCapExceeded {
        total: u128,
        amount: u128,
        cap: u128,
    },

    #[error("account {account} lacks the {role:?} capability")]
    Unauthorized { account: AccountId, role: Role },

    #[error("reentrant call rejected: an operation is already in progress")]
    ReentrantCall,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("too many rebalance legs: {legs} exceeds maximum {max}")]
    TooManyLegs { legs: usize, max: usize },

    #[error("release shortfall beyond tolerance for ark {ark}: requested {requested}, released {released}")]
    ShortfallExceeded {
        ark: AccountId,
        requested: u128,
        released: u128,
    },

    #[error("ark registry full")]
    RegistryFull,

    #[error("ark already registered: {ark}")]
    DuplicateArk { ark: AccountId },

    #[error("ark {ark} still manages {assets}; deactivate and drain before removal")]
    ArkNotEmpty { ark: AccountId, assets: u128 },

    #[error("adapter failure in ark {ark}: {source}")]
    Adapter {
        ark: AccountId,
        #[source]
        source: ArkError,
    },
}
