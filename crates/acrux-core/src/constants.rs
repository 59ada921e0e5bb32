/// ─── Acrux Chain Constants ──────────────────────────────────────────────────
///
/// Base unit:  aacrx  (1 ACRX = 10^18 aacrx)
/// Ticker:     ACRX
///
/// Everything here is consensus-relevant: nodes that disagree on any of these
/// values will compute different genesis states or mint different amounts.

use crate::types::{Balance, Timestamp};

// ── Denomination ─────────────────────────────────────────────────────────────

/// Smallest currency unit, used as the mint and bond denom.
pub const BASE_DENOM: &str = "aacrx";

/// 1 ACRX expressed in the base unit (10^18).
pub const DECIMAL_REDUCTION: Balance = 1_000_000_000_000_000_000;

// ── Supply ───────────────────────────────────────────────────────────────────

/// Total supply at genesis: 350,000,000 ACRX.
pub const TOTAL_SUPPLY: Balance = 350_000_000 * DECIMAL_REDUCTION;

/// Initial credit for each genesis validator: 120 ACRX.
pub const VALIDATOR_INITIAL_CREDIT: Balance = 120 * DECIMAL_REDUCTION;

// ── Emission ─────────────────────────────────────────────────────────────────

/// Genesis daily provisions in whole ACRX (≈ 300M / 365).
pub const GENESIS_DAILY_PROVISIONS_ACRX: Balance = 821_917;

/// Default interval between reductions: one year of 365 days.
pub const DEFAULT_REDUCTION_PERIOD_SECS: i64 = 86_400 * 365;

/// Default reduction factor, as (value, precision): 0.6666.
pub const DEFAULT_REDUCTION_FACTOR: (i64, u32) = (6666, 4);

/// Default share of new currency routed to bonded-stake rewards: 0.25.
pub const DEFAULT_STAKING_PROPORTION: (i64, u32) = (25, 2);

/// Seconds in one day; daily provisions are prorated against this.
pub const SECONDS_PER_DAY: i64 = 86_400;

// ── Genesis timestamps (Unix seconds UTC) ────────────────────────────────────

/// Chain genesis: 2022-11-21 15:00:00 UTC
pub const GENESIS_TIMESTAMP: Timestamp = 1_669_042_800;

/// Minting starts: 2022-12-14 16:00:00 UTC
pub const MINTING_START_TIMESTAMP: Timestamp = 1_671_033_600;

/// First reduction: 2023-02-14 16:00:00 UTC
pub const FIRST_REDUCTION_TIMESTAMP: Timestamp = 1_676_390_400;

// ── Modules ──────────────────────────────────────────────────────────────────

/// Name of the minting module; also names its module account and store.
pub const MINT_MODULE_NAME: &str = "mint";
