use std::fmt;

use acrux_core::constants::{
    BASE_DENOM, DECIMAL_REDUCTION, DEFAULT_REDUCTION_FACTOR, DEFAULT_REDUCTION_PERIOD_SECS,
    DEFAULT_STAKING_PROPORTION, GENESIS_DAILY_PROVISIONS_ACRX,
};
use acrux_core::dec::Dec;
use acrux_core::error::AcruxError;
use acrux_core::types::{validate_denom, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ── Parameter store keys ─────────────────────────────────────────────────────

pub const KEY_MINT_DENOM: &[u8] = b"MintDenom";
pub const KEY_GENESIS_DAILY_PROVISIONS: &[u8] = b"GenesisDailyProvisions";
pub const KEY_REDUCTION_PERIOD_IN_SECONDS: &[u8] = b"ReductionPeriodInSeconds";
pub const KEY_REDUCTION_FACTOR: &[u8] = b"ReductionFactor";
pub const KEY_DISTRIBUTION_PROPORTIONS: &[u8] = b"DistributionProportions";
pub const KEY_NEXT_REWARDS_REDUCTION_TIME: &[u8] = b"NextRewardsReductionTime";
pub const KEY_MINTING_REWARDS_DISTRIBUTION_START_TIME: &[u8] =
    b"MintingRewardsDistributionStartTime";

// ── Types ────────────────────────────────────────────────────────────────────

/// How new currency is split. Whatever staking does not take goes to the
/// community pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionProportions {
    pub staking: Dec,
}

impl DistributionProportions {
    /// Share routed to the community pool: `1 − staking`.
    pub fn community_pool(&self) -> Dec {
        &Dec::one() - &self.staking
    }
}

/// Mint module parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Denomination of minted currency.
    pub mint_denom: String,
    /// Daily provisions at genesis; the minter starts from this rate.
    pub genesis_daily_provisions: Dec,
    /// Seconds between reductions.
    pub reduction_period_seconds: i64,
    /// Multiplier applied to daily provisions at each reduction.
    pub reduction_factor: Dec,
    pub distribution_proportions: DistributionProportions,
    /// Next instant at which a reduction fires.
    pub next_reduction_time: Timestamp,
    /// Minting is a no-op strictly before this instant.
    pub minting_rewards_distribution_start_time: Timestamp,
}

impl Params {
    pub fn new(
        mint_denom: impl Into<String>,
        genesis_daily_provisions: Dec,
        reduction_factor: Dec,
        reduction_period_seconds: i64,
        distribution_proportions: DistributionProportions,
        next_reduction_time: Timestamp,
        minting_rewards_distribution_start_time: Timestamp,
    ) -> Self {
        Self {
            mint_denom: mint_denom.into(),
            genesis_daily_provisions,
            reduction_period_seconds,
            reduction_factor,
            distribution_proportions,
            next_reduction_time,
            minting_rewards_distribution_start_time,
        }
    }

    /// Check every field. Returns the first violation.
    pub fn validate(&self) -> Result<(), AcruxError> {
        validate_mint_denom(&self.mint_denom)?;
        validate_genesis_daily_provisions(&self.genesis_daily_provisions)?;
        validate_reduction_period(self.reduction_period_seconds)?;
        validate_reduction_factor(&self.reduction_factor)?;
        validate_distribution_proportions(&self.distribution_proportions)?;
        validate_next_reduction_time(self.next_reduction_time)?;
        validate_distribution_start_time(self.minting_rewards_distribution_start_time)?;
        Ok(())
    }

    /// Each field JSON-encoded under its subspace key.
    pub(crate) fn to_pairs(&self) -> Result<Vec<(&'static [u8], Vec<u8>)>, AcruxError> {
        Ok(vec![
            (KEY_MINT_DENOM, encode(&self.mint_denom)?),
            (KEY_GENESIS_DAILY_PROVISIONS, encode(&self.genesis_daily_provisions)?),
            (KEY_REDUCTION_PERIOD_IN_SECONDS, encode(&self.reduction_period_seconds)?),
            (KEY_REDUCTION_FACTOR, encode(&self.reduction_factor)?),
            (KEY_DISTRIBUTION_PROPORTIONS, encode(&self.distribution_proportions)?),
            (KEY_NEXT_REWARDS_REDUCTION_TIME, encode(&self.next_reduction_time)?),
            (
                KEY_MINTING_REWARDS_DISTRIBUTION_START_TIME,
                encode(&self.minting_rewards_distribution_start_time)?,
            ),
        ])
    }
}

impl Default for Params {
    fn default() -> Self {
        let (factor, factor_prec) = DEFAULT_REDUCTION_FACTOR;
        let (staking, staking_prec) = DEFAULT_STAKING_PROPORTION;
        Self {
            mint_denom: BASE_DENOM.to_string(),
            genesis_daily_provisions: Dec::from_u128(GENESIS_DAILY_PROVISIONS_ACRX * DECIMAL_REDUCTION),
            reduction_period_seconds: DEFAULT_REDUCTION_PERIOD_SECS,
            reduction_factor: Dec::new_with_prec(factor, factor_prec),
            distribution_proportions: DistributionProportions {
                staking: Dec::new_with_prec(staking, staking_prec),
            },
            next_reduction_time: 0,
            minting_rewards_distribution_start_time: 0,
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, AcruxError> {
    serde_json::to_vec(value).map_err(|e| AcruxError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(field: &'static str, raw: &[u8]) -> Result<T, AcruxError> {
    serde_json::from_slice(raw)
        .map_err(|e| AcruxError::validation(field, format!("invalid parameter type: {e}")))
}

// ── Validators ───────────────────────────────────────────────────────────────

pub fn validate_mint_denom(denom: &str) -> Result<(), AcruxError> {
    if denom.trim().is_empty() {
        return Err(AcruxError::validation("mint_denom", "mint denom cannot be blank"));
    }
    validate_denom(denom).map_err(|e| match e {
        AcruxError::Validation { reason, .. } => AcruxError::validation("mint_denom", reason),
        other => other,
    })
}

pub fn validate_genesis_daily_provisions(v: &Dec) -> Result<(), AcruxError> {
    if v.is_negative() {
        return Err(AcruxError::validation(
            "genesis_daily_provisions",
            format!("must be non-negative: {v}"),
        ));
    }
    Ok(())
}

pub fn validate_reduction_period(v: i64) -> Result<(), AcruxError> {
    if v <= 0 {
        return Err(AcruxError::validation(
            "reduction_period_seconds",
            format!("reduction period must be positive: {v}"),
        ));
    }
    Ok(())
}

pub fn validate_reduction_factor(v: &Dec) -> Result<(), AcruxError> {
    if v > &Dec::one() {
        return Err(AcruxError::validation(
            "reduction_factor",
            format!("reduction factor cannot be greater than 1: {v}"),
        ));
    }
    if v.is_negative() {
        return Err(AcruxError::validation(
            "reduction_factor",
            format!("reduction factor cannot be negative: {v}"),
        ));
    }
    Ok(())
}

pub fn validate_distribution_proportions(v: &DistributionProportions) -> Result<(), AcruxError> {
    if v.staking.is_negative() {
        return Err(AcruxError::validation(
            "distribution_proportions.staking",
            "staking distribution ratio should not be negative",
        ));
    }
    if v.community_pool().is_negative() {
        return Err(AcruxError::validation(
            "distribution_proportions.staking",
            "staking distribution ratio cannot be greater than 1",
        ));
    }
    Ok(())
}

pub fn validate_next_reduction_time(v: Timestamp) -> Result<(), AcruxError> {
    if v < 0 {
        return Err(AcruxError::validation(
            "next_reduction_time",
            format!("next reduction time must be non-negative: {v}"),
        ));
    }
    Ok(())
}

pub fn validate_distribution_start_time(v: Timestamp) -> Result<(), AcruxError> {
    if v < 0 {
        return Err(AcruxError::validation(
            "minting_rewards_distribution_start_time",
            format!("start time must be non-negative: {v}"),
        ));
    }
    Ok(())
}

/// Decode a raw subspace value for `key` and run that field's validator.
pub fn validate_param_value(key: &[u8], raw: &[u8]) -> Result<(), AcruxError> {
    match key {
        KEY_MINT_DENOM => validate_mint_denom(&decode::<String>("mint_denom", raw)?),
        KEY_GENESIS_DAILY_PROVISIONS => validate_genesis_daily_provisions(&decode(
            "genesis_daily_provisions",
            raw,
        )?),
        KEY_REDUCTION_PERIOD_IN_SECONDS => {
            validate_reduction_period(decode("reduction_period_seconds", raw)?)
        }
        KEY_REDUCTION_FACTOR => validate_reduction_factor(&decode("reduction_factor", raw)?),
        KEY_DISTRIBUTION_PROPORTIONS => validate_distribution_proportions(&decode(
            "distribution_proportions",
            raw,
        )?),
        KEY_NEXT_REWARDS_REDUCTION_TIME => {
            validate_next_reduction_time(decode("next_reduction_time", raw)?)
        }
        KEY_MINTING_REWARDS_DISTRIBUTION_START_TIME => validate_distribution_start_time(decode(
            "minting_rewards_distribution_start_time",
            raw,
        )?),
        other => Err(AcruxError::validation(
            "key",
            format!("unknown mint parameter {:?}", String::from_utf8_lossy(other)),
        )),
    }
}
