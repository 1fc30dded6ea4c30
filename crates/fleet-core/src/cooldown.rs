//! Cooldown enforcement for keeper-gated reallocation
//!
//! "Waiting" is a precondition check against a stored timestamp, never an
//! awaited duration. The gate is checked before a rebalance starts and the
//! timestamp is recorded only after the whole batch commits.

use crate::error::FleetError;

/// Genesis behavior selected at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownInit {
    /// First gated action must wait a full cooldown from creation
    ActiveFromGenesis,
    /// First gated action is immediately permitted
    SatisfiedFromGenesis,
}

#[derive(Debug, Clone)]
pub struct CooldownEnforcer {
    /// `None` until the first gated action when satisfied from genesis
    last_action_ts: Option<u64>,
    duration_secs: u64,
}

impl CooldownEnforcer {
    pub fn new(duration_secs: u64, init: CooldownInit, created_at: u64) -> Self {
        let last_action_ts = match init {
            CooldownInit::ActiveFromGenesis => Some(created_at),
            CooldownInit::SatisfiedFromGenesis => None,
        };
        CooldownEnforcer {
            last_action_ts,
            duration_secs,
        }
    }

    /// Guard: fails unless a full cooldown has elapsed since the last action
    pub fn check(&self, now: u64) -> Result<(), FleetError> {
        let Some(last_action_ts) = self.last_action_ts else {
            return Ok(());
        };
        if now.saturating_sub(last_action_ts) < self.duration_secs {
            return Err(FleetError::CooldownNotElapsed {
                last_action_ts,
                cooldown_secs: self.duration_secs,
                now,
            });
        }
        Ok(())
    }

    /// Record a successful gated action
    pub fn record(&mut self, now: u64) {
        self.last_action_ts = Some(now);
    }

    /// Pure configuration mutation; does not reset `last_action_ts`.
    /// Returns the previous duration.
    pub fn set_duration(&mut self, duration_secs: u64) -> u64 {
        core::mem::replace(&mut self.duration_secs, duration_secs)
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn last_action_ts(&self) -> Option<u64> {
        self.last_action_ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary() {
        let mut cd = CooldownEnforcer::new(300, CooldownInit::SatisfiedFromGenesis, 0);
        cd.record(1_000);

        // One second short of the boundary fails
        let err = cd.check(1_299).unwrap_err();
        assert_eq!(
            err,
            FleetError::CooldownNotElapsed {
                last_action_ts: 1_000,
                cooldown_secs: 300,
                now: 1_299,
            }
        );

        // Exactly at the boundary passes
        assert!(cd.check(1_300).is_ok());
    }

    #[test]
    fn test_active_from_genesis() {
        let cd = CooldownEnforcer::new(300, CooldownInit::ActiveFromGenesis, 1_000);
        assert!(cd.check(1_000).is_err());
        assert!(cd.check(1_299).is_err());
        assert!(cd.check(1_300).is_ok());
    }

    #[test]
    fn test_satisfied_from_genesis() {
        let cd = CooldownEnforcer::new(300, CooldownInit::SatisfiedFromGenesis, 1_000);
        assert!(cd.check(1_000).is_ok());

        // Also at a genesis timestamp smaller than the duration
        let cd = CooldownEnforcer::new(300, CooldownInit::SatisfiedFromGenesis, 0);
        assert!(cd.check(0).is_ok());
    }

    #[test]
    fn test_set_duration_keeps_timestamp() {
        let mut cd = CooldownEnforcer::new(300, CooldownInit::SatisfiedFromGenesis, 0);
        cd.record(1_000);

        let old = cd.set_duration(100);
        assert_eq!(old, 300);
        assert_eq!(cd.last_action_ts(), Some(1_000));

        // Next action is gated by the new duration from the stored timestamp
        assert!(cd.check(1_099).is_err());
        assert!(cd.check(1_100).is_ok());
    }
}
