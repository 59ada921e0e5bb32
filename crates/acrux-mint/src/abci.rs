//! Per-block emission.

use acrux_core::error::AcruxError;
use acrux_core::types::{Balance, BlockContext, Coin};
use acrux_state::{KvStore, RewardPool};
use tracing::{debug, info};

use crate::keeper::MintKeeper;
use crate::minter::split_provision;

/// What `end_blocker` did for one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MintOutcome {
    /// Block time is before the distribution start; nothing was touched.
    PreDistribution,
    Minted {
        minted: Balance,
        staking: Balance,
        community: Balance,
        /// Whether this block crossed a reduction boundary.
        reduced: bool,
    },
}

impl<S: KvStore> MintKeeper<S> {
    /// Mint for the time elapsed since the previous block, then apply at most
    /// one reduction step.
    ///
    /// Precondition: called exactly once per finalized block, with block
    /// times that never decrease. Where this runs relative to other modules'
    /// end-block hooks is fixed by the block executor, not by this module.
    ///
    /// Any store or pool failure is returned as-is and the caller must abort
    /// the block. Writes against a plain store are not rolled back, so a
    /// caller that needs all-or-nothing runs this over a staged keeper and
    /// commits the result in one transaction.
    pub fn end_blocker<C, P>(&mut self, ctx: &C, pool: &mut P) -> Result<MintOutcome, AcruxError>
    where
        C: BlockContext,
        P: RewardPool,
    {
        let params = self.get_params()?;
        let now = ctx.block_time();

        if now < params.minting_rewards_distribution_start_time {
            return Ok(MintOutcome::PreDistribution);
        }

        let mut minter = self.get_minter()?;
        let elapsed = minter.elapsed_at(now)?;
        let minted = minter.provisions_for(elapsed)?;
        let (staking, community) = split_provision(minted, &params.distribution_proportions)?;

        minter.last_mint_time = now;
        let reduced = now >= params.next_reduction_time;
        let next_reduction_time = if reduced {
            minter.reduce(&params.reduction_factor);
            Some(
                now.checked_add(params.reduction_period_seconds)
                    .ok_or_else(|| AcruxError::Arithmetic("next reduction time overflow".into()))?,
            )
        } else {
            None
        };

        // Everything is computed; from here on only writes.
        if staking > 0 {
            pool.credit_staking_rewards(&Coin::new(&params.mint_denom, staking))?;
        }
        if community > 0 {
            pool.credit_community_pool(&Coin::new(&params.mint_denom, community))?;
        }
        self.set_minter(&minter)?;
        if let Some(next) = next_reduction_time {
            self.set_next_reduction_time(next)?;
            info!(
                height = ctx.block_height(),
                daily_provisions = %minter.daily_provisions,
                next_reduction_time = next,
                "mint: reduction applied"
            );
        }

        debug!(
            height = ctx.block_height(),
            elapsed,
            minted,
            staking,
            community,
            "mint: block provisions"
        );

        Ok(MintOutcome::Minted {
            minted,
            staking,
            community,
            reduced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acrux_core::constants::MINT_MODULE_NAME;
    use acrux_core::dec::Dec;
    use acrux_core::types::{BlockHeader, Timestamp};
    use acrux_state::{MemLedger, MemStore, Subspace};
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::genesis::GenesisState;
    use crate::minter::Minter;
    use crate::params::{DistributionProportions, Params};

    const NOW: Timestamp = 1_700_000_000;
    const DENOM: &str = "aacrx";

    fn scenario_params() -> Params {
        Params {
            mint_denom: DENOM.into(),
            genesis_daily_provisions: Params::default().genesis_daily_provisions,
            reduction_period_seconds: 1000,
            reduction_factor: Dec::new_with_prec(66, 2),
            distribution_proportions: DistributionProportions {
                staking: Dec::new_with_prec(2, 1),
            },
            next_reduction_time: NOW + 1000,
            minting_rewards_distribution_start_time: NOW + 1,
        }
    }

    fn setup(params: Params, genesis_time: Timestamp) -> (MintKeeper<MemStore>, MemLedger) {
        let mut keeper =
            MintKeeper::new(MemStore::new(), Subspace::new(MINT_MODULE_NAME, MemStore::new()));
        let mut ledger = MemLedger::new();
        keeper
            .init_genesis(
                &BlockHeader::new(0, genesis_time),
                &mut ledger,
                Some(&GenesisState::new(params)),
            )
            .unwrap();
        (keeper, ledger)
    }

    fn at(time: Timestamp) -> BlockHeader {
        BlockHeader::new(1, time)
    }

    #[test]
    fn end_blocker_schedule() {
        let params = scenario_params();
        let genesis_provisions = params.genesis_daily_provisions.clone();
        let (mut keeper, mut ledger) = setup(params.clone(), NOW);

        // at genesis
        let minter = keeper.get_minter().unwrap();
        assert_eq!(minter.daily_provisions, genesis_provisions);
        assert_eq!(minter.last_mint_time, 0);
        assert_eq!(ledger.community_pool_of(DENOM), 0);

        // 1st block: before distribution start, nothing changes
        let outcome = keeper.end_blocker(&at(NOW), &mut ledger).unwrap();
        assert_eq!(outcome, MintOutcome::PreDistribution);
        let minter = keeper.get_minter().unwrap();
        assert_eq!(minter.daily_provisions, genesis_provisions);
        assert_eq!(minter.last_mint_time, 0);
        assert_eq!(keeper.get_next_reduction_time().unwrap(), params.next_reduction_time);
        assert_eq!(ledger.community_pool_of(DENOM), 0);

        // 2nd block: first mint only records the time
        keeper.end_blocker(&at(NOW + 2), &mut ledger).unwrap();
        let minter = keeper.get_minter().unwrap();
        assert_eq!(minter.daily_provisions, genesis_provisions);
        assert_eq!(minter.last_mint_time, NOW + 2);
        assert_eq!(keeper.get_next_reduction_time().unwrap(), params.next_reduction_time);
        assert_eq!(ledger.community_pool_of(DENOM), 0);

        // 3rd block: one second of provisions
        let outcome = keeper.end_blocker(&at(NOW + 3), &mut ledger).unwrap();
        assert_eq!(
            outcome,
            MintOutcome::Minted {
                minted: 9_512_928_240_740_740_740,
                staking: 1_902_585_648_148_148_148,
                community: 7_610_342_592_592_592_592,
                reduced: false,
            }
        );
        let minter = keeper.get_minter().unwrap();
        assert_eq!(minter.daily_provisions, genesis_provisions);
        assert_eq!(minter.last_mint_time, NOW + 3);
        assert_eq!(ledger.community_pool_of(DENOM), 7_610_342_592_592_592_592);

        // 4th block: past the reduction time; 998s minted at the old rate,
        // then one reduction
        let outcome = keeper.end_blocker(&at(NOW + 1001), &mut ledger).unwrap();
        assert_eq!(
            outcome,
            MintOutcome::Minted {
                minted: 9_493_902_384_259_259_259_259,
                staking: 1_898_780_476_851_851_851_851,
                community: 7_595_121_907_407_407_407_408,
                reduced: true,
            }
        );
        let minter = keeper.get_minter().unwrap();
        assert_eq!(minter.daily_provisions, &genesis_provisions * &params.reduction_factor);
        assert_eq!(
            minter.daily_provisions.to_string(),
            "542465220000000000000000.000000000000000000"
        );
        assert_eq!(minter.last_mint_time, NOW + 1001);
        let reduction_time = keeper.get_next_reduction_time().unwrap();
        assert_eq!(reduction_time, NOW + 1001 + params.reduction_period_seconds);
        assert_eq!(keeper.get_params().unwrap().next_reduction_time, reduction_time);
        assert_eq!(ledger.community_pool_of(DENOM), 7_602_732_250_000_000_000_000);
        assert_eq!(
            ledger.staking_rewards_of(DENOM),
            1_902_585_648_148_148_148 + 1_898_780_476_851_851_851_851
        );
        assert_eq!(
            ledger.supply_of(DENOM),
            9_512_928_240_740_740_740 + 9_493_902_384_259_259_259_259
        );
    }

    #[test]
    fn pre_distribution_blocks_change_nothing() {
        let (mut keeper, mut ledger) = setup(scenario_params(), NOW - 500);
        let before = keeper.get_minter().unwrap();
        for t in [NOW - 500, NOW - 1, NOW, NOW] {
            assert_eq!(
                keeper.end_blocker(&at(t), &mut ledger).unwrap(),
                MintOutcome::PreDistribution
            );
        }
        assert_eq!(keeper.get_minter().unwrap(), before);
        assert_eq!(keeper.get_params().unwrap(), scenario_params());
        assert_eq!(ledger.supply_of(DENOM), 0);
    }

    #[test]
    fn last_mint_time_tracks_latest_block() {
        let (mut keeper, mut ledger) = setup(scenario_params(), NOW);
        for t in [NOW + 1, NOW + 7, NOW + 7, NOW + 60, NOW + 61] {
            keeper.end_blocker(&at(t), &mut ledger).unwrap();
            assert_eq!(keeper.get_minter().unwrap().last_mint_time, t);
        }
    }

    #[test]
    fn block_far_past_boundary_reduces_once() {
        let params = Params {
            reduction_period_seconds: 10,
            next_reduction_time: NOW + 10,
            minting_rewards_distribution_start_time: NOW,
            ..scenario_params()
        };
        let (mut keeper, mut ledger) = setup(params.clone(), NOW - 1);

        keeper.end_blocker(&at(NOW), &mut ledger).unwrap();
        let outcome = keeper.end_blocker(&at(NOW + 10_000), &mut ledger).unwrap();
        assert!(matches!(outcome, MintOutcome::Minted { reduced: true, .. }));

        let minter = keeper.get_minter().unwrap();
        assert_eq!(
            minter.daily_provisions,
            &params.genesis_daily_provisions * &params.reduction_factor
        );
        assert_eq!(keeper.get_next_reduction_time().unwrap(), NOW + 10_010);

        // next block is before the new boundary: no further reduction
        let outcome = keeper.end_blocker(&at(NOW + 10_005), &mut ledger).unwrap();
        assert!(matches!(outcome, MintOutcome::Minted { reduced: false, .. }));
        assert_eq!(keeper.get_minter().unwrap().daily_provisions, minter.daily_provisions);
    }

    #[test]
    fn zero_staking_share_routes_everything_to_community_pool() {
        let params = Params {
            distribution_proportions: DistributionProportions { staking: Dec::zero() },
            ..scenario_params()
        };
        let (mut keeper, mut ledger) = setup(params, NOW);
        keeper.end_blocker(&at(NOW + 2), &mut ledger).unwrap();
        keeper.end_blocker(&at(NOW + 3), &mut ledger).unwrap();
        assert_eq!(ledger.staking_rewards_of(DENOM), 0);
        assert_eq!(ledger.community_pool_of(DENOM), 9_512_928_240_740_740_740);
    }

    #[test]
    fn resumed_chain_mints_from_import_time() {
        // re-import after distribution started: the first block already mints
        let (mut keeper, mut ledger) = setup(scenario_params(), NOW + 100);
        assert_eq!(keeper.get_minter().unwrap().last_mint_time, NOW + 100);
        let outcome = keeper.end_blocker(&at(NOW + 101), &mut ledger).unwrap();
        assert!(matches!(outcome, MintOutcome::Minted { minted: 9_512_928_240_740_740_740, .. }));
    }

    #[test]
    fn block_time_going_backwards_is_an_error() {
        let (mut keeper, mut ledger) = setup(scenario_params(), NOW);
        keeper.end_blocker(&at(NOW + 10), &mut ledger).unwrap();
        assert!(matches!(
            keeper.end_blocker(&at(NOW + 5), &mut ledger),
            Err(AcruxError::Arithmetic(_))
        ));
        assert_eq!(keeper.get_minter().unwrap().last_mint_time, NOW + 10);
    }

    #[test]
    fn missing_state_propagates() {
        let mut keeper =
            MintKeeper::new(MemStore::new(), Subspace::new(MINT_MODULE_NAME, MemStore::new()));
        let mut ledger = MemLedger::new();
        assert!(matches!(
            keeper.end_blocker(&at(NOW), &mut ledger),
            Err(AcruxError::MissingState(_))
        ));

        keeper.set_params(&scenario_params()).unwrap();
        assert!(matches!(
            keeper.end_blocker(&at(NOW + 5), &mut ledger),
            Err(AcruxError::MissingState(_))
        ));
        keeper.set_minter(&Minter::new(Dec::one(), 0)).unwrap();
        keeper.end_blocker(&at(NOW + 5), &mut ledger).unwrap();
    }

    // ── Store and pool failures ──────────────────────────────────────────────

    /// Memory store that fails every read and write while `down` is set.
    struct FlakyStore {
        inner: MemStore,
        down: Rc<Cell<bool>>,
    }

    impl KvStore for FlakyStore {
        fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, AcruxError> {
            if self.down.get() {
                return Err(AcruxError::Storage("disk unavailable".into()));
            }
            self.inner.get(key)
        }

        fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), AcruxError> {
            if self.down.get() {
                return Err(AcruxError::Storage("disk unavailable".into()));
            }
            self.inner.set(key, value)
        }
    }

    fn flaky_keeper(down: &Rc<Cell<bool>>) -> MintKeeper<FlakyStore> {
        let store = |down: &Rc<Cell<bool>>| FlakyStore {
            inner: MemStore::new(),
            down: Rc::clone(down),
        };
        MintKeeper::new(store(down), Subspace::new(MINT_MODULE_NAME, store(down)))
    }

    /// Ledger whose community pool rejects credits.
    #[derive(Default)]
    struct CommunityPoolDown {
        ledger: MemLedger,
    }

    impl RewardPool for CommunityPoolDown {
        fn credit_staking_rewards(&mut self, coin: &Coin) -> Result<(), AcruxError> {
            self.ledger.credit_staking_rewards(coin)
        }

        fn credit_community_pool(&mut self, _coin: &Coin) -> Result<(), AcruxError> {
            Err(AcruxError::Storage("community pool unavailable".into()))
        }
    }

    #[test]
    fn store_failures_surface_as_storage_errors() {
        let down = Rc::new(Cell::new(true));
        let mut keeper = flaky_keeper(&down);
        let mut ledger = MemLedger::new();
        let genesis = GenesisState::new(scenario_params());

        assert!(matches!(
            keeper.init_genesis(&at(NOW), &mut ledger, Some(&genesis)),
            Err(AcruxError::Storage(_))
        ));
        assert!(matches!(keeper.set_params(&scenario_params()), Err(AcruxError::Storage(_))));

        down.set(false);
        keeper.init_genesis(&at(NOW), &mut ledger, Some(&genesis)).unwrap();
        keeper.end_blocker(&at(NOW + 2), &mut ledger).unwrap();

        down.set(true);
        assert!(matches!(
            keeper.end_blocker(&at(NOW + 3), &mut ledger),
            Err(AcruxError::Storage(_))
        ));
        assert_eq!(ledger.supply_of(DENOM), 0);

        // nothing was retried behind the caller's back
        down.set(false);
        assert_eq!(keeper.get_minter().unwrap().last_mint_time, NOW + 2);
    }

    #[test]
    fn pool_failure_leaves_minter_untouched() {
        let (mut keeper, _) = setup(scenario_params(), NOW);
        let mut pool = CommunityPoolDown::default();
        keeper.end_blocker(&at(NOW + 2), &mut pool).unwrap();

        assert!(matches!(
            keeper.end_blocker(&at(NOW + 3), &mut pool),
            Err(AcruxError::Storage(_))
        ));
        assert_eq!(keeper.get_minter().unwrap().last_mint_time, NOW + 2);
    }
}
