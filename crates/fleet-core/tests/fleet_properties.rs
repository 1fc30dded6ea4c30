//! Property tests driving the engine with randomized operation sequences

use fleet_core::sim::{SharedArk, SimulatedArk};
use fleet_core::{
    AccountId, ArkCap, BufferLeg, Fleet, FleetConfig, RebalanceLeg, StaticRoles, WITHDRAW_ALL,
};
use proptest::prelude::*;

const ASSET: AccountId = AccountId([0xAA; 32]);
const BUFFER: AccountId = AccountId([0xBB; 32]);
const KEEPER: AccountId = AccountId([0x01; 32]);
const GOVERNOR: AccountId = AccountId([0x02; 32]);
const ALICE: AccountId = AccountId([0x03; 32]);
const BOB: AccountId = AccountId([0x04; 32]);
const ARK_A: AccountId = AccountId([0x0A; 32]);
const ARK_B: AccountId = AccountId([0x0B; 32]);

const CAP_A: u128 = 5_000_000;
const CAP_B: u128 = 8_000_000;

fn roles() -> Box<StaticRoles> {
    let mut roles = StaticRoles::new();
    roles.add_keeper(KEEPER);
    roles.add_governor(GOVERNOR);
    Box::new(roles)
}

fn two_ark_fleet() -> Fleet {
    let mut config = FleetConfig::new(ASSET, "Fleet USDC", "flUSDC");
    config.minimum_buffer_balance = 1_000;
    let mut fleet = Fleet::new(config, BUFFER, roles(), 0);
    fleet
        .register_ark(
            GOVERNOR,
            Box::new(SimulatedArk::new(ARK_A, 100)),
            ArkCap::Absolute(CAP_A),
        )
        .unwrap();
    fleet
        .register_ark(
            GOVERNOR,
            Box::new(SimulatedArk::new(ARK_B, 110)),
            ArkCap::Absolute(CAP_B),
        )
        .unwrap();
    fleet
}

#[derive(Debug, Clone)]
enum Op {
    Deposit(u128),
    Withdraw(u128),
    Park { a: u128, b: u128 },
    Shift(u128),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u128..1_000_000).prop_map(Op::Deposit),
        (1u128..1_000_000).prop_map(Op::Withdraw),
        (0u128..500_000, 0u128..500_000).prop_map(|(a, b)| Op::Park { a, b }),
        (1u128..500_000).prop_map(Op::Shift),
    ]
}

proptest! {
    /// No operation, successful or failed, creates or destroys assets, and
    /// no ark position ever exceeds its cap.
    #[test]
    fn conservation_and_caps_hold(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut fleet = two_ark_fleet();
        let mut expected: u128 = 0;
        let mut now: u64 = 0;

        for op in ops {
            now += 1;
            match op {
                Op::Deposit(amount) => {
                    if fleet.deposit(ASSET, amount, ALICE).is_ok() {
                        expected += amount;
                    }
                }
                Op::Withdraw(amount) => {
                    let amount = amount.min(fleet.assets_of(ALICE));
                    if amount > 0 && fleet.withdraw(ALICE, amount, ALICE, ALICE).is_ok() {
                        expected -= amount;
                    }
                }
                Op::Park { a, b } => {
                    let _ = fleet.adjust_buffer(
                        KEEPER,
                        &[
                            BufferLeg { to: ARK_A, amount: a },
                            BufferLeg { to: ARK_B, amount: b },
                        ],
                    );
                }
                Op::Shift(amount) => {
                    let _ = fleet.rebalance(
                        KEEPER,
                        &[RebalanceLeg { from: ARK_A, to: ARK_B, amount }],
                        now,
                    );
                }
            }

            prop_assert_eq!(fleet.total_assets(), expected);
            for view in fleet.ark_overview() {
                let cap = if view.ark == ARK_A { CAP_A } else { CAP_B };
                prop_assert!(view.assets <= cap);
            }
        }
    }

    /// Buffer maintenance never drops the buffer below its minimum.
    #[test]
    fn buffer_floor_holds(
        deposit in 1_001u128..1_000_000,
        a in 0u128..1_000_000,
        b in 0u128..1_000_000,
    ) {
        let mut fleet = two_ark_fleet();
        fleet.deposit(ASSET, deposit, ALICE).unwrap();

        let _ = fleet.adjust_buffer(
            KEEPER,
            &[
                BufferLeg { to: ARK_A, amount: a },
                BufferLeg { to: ARK_B, amount: b },
            ],
        );
        prop_assert!(fleet.buffer_balance() >= fleet.config().minimum_buffer_balance.min(deposit));
    }

    /// A depositor entering after yield accrued can never exit with more
    /// than they put in; rounding dust stays with the pool.
    #[test]
    fn round_trip_never_profits(
        seed in 1_000u128..1_000_000,
        yield_gain in 0u128..1_000_000,
        amount in 1u128..1_000_000,
    ) {
        let mut config = FleetConfig::new(ASSET, "Fleet USDC", "flUSDC");
        config.minimum_buffer_balance = 0;
        let mut fleet = Fleet::new(config, BUFFER, roles(), 0);
        let ark = SharedArk::new(SimulatedArk::new(ARK_A, 105));
        fleet
            .register_ark(GOVERNOR, Box::new(ark.clone()), ArkCap::Absolute(u128::MAX))
            .unwrap();

        fleet.deposit(ASSET, seed, ALICE).unwrap();
        fleet
            .adjust_buffer(KEEPER, &[BufferLeg { to: ARK_A, amount: seed / 2 }])
            .unwrap();
        ark.accrue(yield_gain as i128);

        // Dust deposits that round to zero shares are rejected outright
        if fleet.deposit(ASSET, amount, BOB).is_ok() {
            let exit_value = fleet.assets_of(BOB);
            prop_assert!(exit_value <= amount);
            fleet.withdraw(BOB, WITHDRAW_ALL, BOB, BOB).unwrap();
            prop_assert_eq!(fleet.share_balance_of(BOB), 0);
        }
    }
}
