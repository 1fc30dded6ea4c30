//! Rebalance planning
//!
//! Ranks arks by rate and consolidates every other position into the leader,
//! but only once the same ark has led for a full stability window. Transient
//! rate spikes should not bounce capital back and forth.

use std::collections::VecDeque;

use fleet_core::{AccountId, ArkView, RebalanceLeg};

/// Active arks ranked by rate, best first
pub fn rank_arks(views: &[ArkView]) -> Vec<ArkView> {
    let mut ranked: Vec<ArkView> = views.iter().copied().filter(|v| v.active).collect();
    ranked.sort_by(|a, b| b.rate.cmp(&a.rate));
    ranked
}

/// Tracks which ark ranked best across recent polls
pub struct RateHistory {
    window: usize,
    samples: VecDeque<AccountId>,
}

impl RateHistory {
    pub fn new(window: usize) -> Self {
        RateHistory {
            window: window.max(1),
            samples: VecDeque::new(),
        }
    }

    pub fn record(&mut self, top: AccountId) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(top);
    }

    /// The stable leader, once one ark has topped every sample in the window
    pub fn stable_top(&self) -> Option<AccountId> {
        if self.samples.len() < self.window {
            return None;
        }
        let first = *self.samples.front()?;
        self.samples.iter().all(|s| *s == first).then_some(first)
    }

    /// Restart the window, e.g. after capital has moved
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

/// Legs moving every non-leader position above the dust threshold into the
/// leader. Deactivated arks are drained too; outflow from them is allowed.
pub fn prepare_rebalance_legs(
    views: &[ArkView],
    top: AccountId,
    dust_threshold: u128,
) -> Vec<RebalanceLeg> {
    views
        .iter()
        .filter(|v| v.ark != top && v.assets > dust_threshold)
        .map(|v| RebalanceLeg {
            from: v.ark,
            to: top,
            amount: v.assets,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(byte: u8, rate: u128, assets: u128, active: bool) -> ArkView {
        ArkView {
            ark: AccountId::from_byte(byte),
            rate,
            assets,
            active,
        }
    }

    #[test]
    fn test_rank_orders_by_rate_descending() {
        let views = vec![
            view(1, 105, 0, true),
            view(2, 120, 0, true),
            view(3, 95, 0, true),
        ];
        let ranked = rank_arks(&views);
        assert_eq!(ranked[0].rate, 120);
        assert_eq!(ranked[1].rate, 105);
        assert_eq!(ranked[2].rate, 95);
    }

    #[test]
    fn test_rank_skips_inactive() {
        let views = vec![view(1, 200, 0, false), view(2, 100, 0, true)];
        let ranked = rank_arks(&views);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].ark, AccountId::from_byte(2));
    }

    #[test]
    fn test_stable_top_needs_full_window() {
        let a = AccountId::from_byte(1);
        let mut history = RateHistory::new(3);

        history.record(a);
        history.record(a);
        assert_eq!(history.stable_top(), None);

        history.record(a);
        assert_eq!(history.stable_top(), Some(a));
    }

    #[test]
    fn test_leader_change_breaks_stability() {
        let a = AccountId::from_byte(1);
        let b = AccountId::from_byte(2);
        let mut history = RateHistory::new(3);

        history.record(a);
        history.record(a);
        history.record(b);
        assert_eq!(history.stable_top(), None);

        // Window slides; three b samples in a row restore stability
        history.record(b);
        history.record(b);
        assert_eq!(history.stable_top(), Some(b));
    }

    #[test]
    fn test_reset_clears_window() {
        let a = AccountId::from_byte(1);
        let mut history = RateHistory::new(2);
        history.record(a);
        history.record(a);
        assert_eq!(history.stable_top(), Some(a));

        history.reset();
        assert_eq!(history.stable_top(), None);
    }

    #[test]
    fn test_legs_exclude_leader_and_dust() {
        let top = AccountId::from_byte(1);
        let views = vec![
            view(1, 120, 5_000, true),
            view(2, 105, 3_000, true),
            view(3, 95, 100, true),   // at the dust threshold: skipped
            view(4, 90, 101, false),  // deactivated but drainable
        ];

        let legs = prepare_rebalance_legs(&views, top, 100);
        assert_eq!(
            legs,
            vec![
                RebalanceLeg {
                    from: AccountId::from_byte(2),
                    to: top,
                    amount: 3_000,
                },
                RebalanceLeg {
                    from: AccountId::from_byte(4),
                    to: top,
                    amount: 101,
                },
            ]
        );
    }
}
