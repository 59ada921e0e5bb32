use acrux_core::constants::SECONDS_PER_DAY;
use acrux_core::dec::Dec;
use acrux_core::error::AcruxError;
use acrux_core::types::{Balance, Timestamp};
use serde::{Deserialize, Serialize};

use crate::params::{DistributionProportions, Params};

/// Runtime minting state. Persisted every block once distribution starts;
/// never exported in genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minter {
    /// Current amount minted per 24h.
    pub daily_provisions: Dec,
    /// Block time of the last mint, `0` until the first one.
    pub last_mint_time: Timestamp,
}

impl Minter {
    pub fn new(daily_provisions: Dec, last_mint_time: Timestamp) -> Self {
        Self {
            daily_provisions,
            last_mint_time,
        }
    }

    /// Minter for a genesis import at `block_time`. An import after the
    /// distribution start resumes minting from `block_time` (hard-fork case).
    pub fn from_genesis(params: &Params, block_time: Timestamp) -> Self {
        let last_mint_time = if block_time > params.minting_rewards_distribution_start_time {
            block_time
        } else {
            0
        };
        Self::new(params.genesis_daily_provisions.clone(), last_mint_time)
    }

    pub fn validate(&self) -> Result<(), AcruxError> {
        if self.daily_provisions.is_negative() {
            return Err(AcruxError::validation(
                "daily_provisions",
                format!("must be non-negative: {}", self.daily_provisions),
            ));
        }
        if self.last_mint_time < 0 {
            return Err(AcruxError::validation(
                "last_mint_time",
                format!("must be non-negative: {}", self.last_mint_time),
            ));
        }
        Ok(())
    }

    /// Seconds to mint for at `now`. Zero on the first mint.
    pub fn elapsed_at(&self, now: Timestamp) -> Result<i64, AcruxError> {
        if self.last_mint_time == 0 {
            return Ok(0);
        }
        if now < self.last_mint_time {
            return Err(AcruxError::Arithmetic(format!(
                "block time {now} precedes last mint time {}",
                self.last_mint_time
            )));
        }
        Ok(now - self.last_mint_time)
    }

    /// `daily_provisions × elapsed / 86400`, truncated at 18 digits and then
    /// to a whole base-unit amount.
    pub fn provisions_for(&self, elapsed_secs: i64) -> Result<Balance, AcruxError> {
        self.daily_provisions
            .mul_int(elapsed_secs)
            .quo_int(SECONDS_PER_DAY)?
            .truncate_u128()
    }

    /// Apply one reduction step.
    pub fn reduce(&mut self, factor: &Dec) {
        self.daily_provisions = &self.daily_provisions * factor;
    }
}

/// Split `minted` into (staking, community). The staking share is truncated
/// and the community pool takes the exact remainder, so nothing leaks.
pub fn split_provision(
    minted: Balance,
    proportions: &DistributionProportions,
) -> Result<(Balance, Balance), AcruxError> {
    let staking = (&Dec::from_u128(minted) * &proportions.staking).truncate_u128()?;
    let community = minted.checked_sub(staking).ok_or_else(|| {
        AcruxError::Arithmetic(format!("staking share {staking} exceeds minted {minted}"))
    })?;
    Ok((staking, community))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_starting_at(start: Timestamp) -> Params {
        Params {
            minting_rewards_distribution_start_time: start,
            ..Params::default()
        }
    }

    #[test]
    fn genesis_minter_starts_from_genesis_provisions() {
        let params = params_starting_at(100);
        let m = Minter::from_genesis(&params, 50);
        assert_eq!(m.daily_provisions, params.genesis_daily_provisions);
        assert_eq!(m.last_mint_time, 0);
    }

    #[test]
    fn import_at_start_time_does_not_resume() {
        let m = Minter::from_genesis(&params_starting_at(100), 100);
        assert_eq!(m.last_mint_time, 0);
    }

    #[test]
    fn import_after_start_time_resumes_from_block_time() {
        let m = Minter::from_genesis(&params_starting_at(100), 101);
        assert_eq!(m.last_mint_time, 101);
    }

    #[test]
    fn first_mint_has_no_elapsed_time() {
        let m = Minter::new(Dec::from_int(86_400), 0);
        assert_eq!(m.elapsed_at(1_700_000_000).unwrap(), 0);
    }

    #[test]
    fn elapsed_rejects_time_going_backwards() {
        let m = Minter::new(Dec::from_int(1), 500);
        assert_eq!(m.elapsed_at(510).unwrap(), 10);
        assert!(m.elapsed_at(499).is_err());
    }

    #[test]
    fn provisions_are_prorated_and_truncated() {
        let m = Minter::new(Dec::from_int(86_400), 1);
        assert_eq!(m.provisions_for(1).unwrap(), 1);
        assert_eq!(m.provisions_for(86_400).unwrap(), 86_400);

        let m = Minter::new(Dec::from_int(100), 1);
        // 100 / 86400 per second, 1000s → 1.157… → 1
        assert_eq!(m.provisions_for(1_000).unwrap(), 1);
        assert_eq!(m.provisions_for(0).unwrap(), 0);
    }

    #[test]
    fn reduction_multiplies_once() {
        let mut m = Minter::new(Dec::from_int(1_000), 0);
        m.reduce(&Dec::new_with_prec(66, 2));
        assert_eq!(m.daily_provisions, Dec::from_int(660));
    }

    #[test]
    fn split_conserves_minted_amount() {
        let proportions = DistributionProportions {
            staking: Dec::new_with_prec(2, 1),
        };
        let (staking, community) = split_provision(9_512_928_240_740_740_740, &proportions).unwrap();
        assert_eq!(staking, 1_902_585_648_148_148_148);
        assert_eq!(community, 7_610_342_592_592_592_592);

        let (staking, community) = split_provision(7, &proportions).unwrap();
        assert_eq!((staking, community), (1, 6));
    }

    #[test]
    fn split_edges() {
        let all_staking = DistributionProportions { staking: Dec::one() };
        assert_eq!(split_provision(99, &all_staking).unwrap(), (99, 0));
        let none_staking = DistributionProportions { staking: Dec::zero() };
        assert_eq!(split_provision(99, &none_staking).unwrap(), (0, 99));
        let too_much = DistributionProportions { staking: Dec::from_int(2) };
        assert!(split_provision(99, &too_much).is_err());
    }

    #[test]
    fn negative_provisions_are_invalid() {
        assert!(Minter::new(Dec::from_int(-1), 0).validate().is_err());
        Minter::new(Dec::zero(), 0).validate().unwrap();
    }
}
