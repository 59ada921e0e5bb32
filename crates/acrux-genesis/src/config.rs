use acrux_core::constants::{
    BASE_DENOM, FIRST_REDUCTION_TIMESTAMP, GENESIS_TIMESTAMP, MINTING_START_TIMESTAMP,
    TOTAL_SUPPLY, VALIDATOR_INITIAL_CREDIT,
};
use acrux_core::types::{Balance, Timestamp};
use acrux_mint::Params;
use serde::{Deserialize, Serialize};

fn default_denom() -> String { BASE_DENOM.to_string() }
fn default_total_supply() -> Balance { TOTAL_SUPPLY }
fn default_validator_credit() -> Balance { VALIDATOR_INITIAL_CREDIT }
fn default_genesis_time() -> Timestamp { GENESIS_TIMESTAMP }
fn default_start_time() -> Timestamp { MINTING_START_TIMESTAMP }
fn default_first_reduction() -> Timestamp { FIRST_REDUCTION_TIMESTAMP }

/// Inputs to the genesis allocation.
///
/// Only the addresses are mandatory in the JSON form; everything else falls
/// back to the chain constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Absorbs whatever the validators do not receive.
    pub reserve_address: String,
    /// Genesis validators, credited in this order.
    #[serde(default)]
    pub validators: Vec<String>,
    #[serde(default = "default_validator_credit")]
    pub validator_credit: Balance,
    #[serde(default = "default_total_supply")]
    pub total_supply: Balance,
    #[serde(default = "default_denom")]
    pub denom: String,
    #[serde(default = "default_genesis_time")]
    pub genesis_time: Timestamp,
    #[serde(default = "default_start_time")]
    pub minting_rewards_distribution_start_time: Timestamp,
    #[serde(default = "default_first_reduction")]
    pub next_reduction_time: Timestamp,
}

impl GenesisConfig {
    pub fn new(reserve_address: impl Into<String>, validators: Vec<String>) -> Self {
        Self {
            reserve_address: reserve_address.into(),
            validators,
            validator_credit: default_validator_credit(),
            total_supply: default_total_supply(),
            denom: default_denom(),
            genesis_time: default_genesis_time(),
            minting_rewards_distribution_start_time: default_start_time(),
            next_reduction_time: default_first_reduction(),
        }
    }

    /// Mint params for this chain: the module defaults with this config's
    /// denom and schedule anchors.
    pub fn mint_params(&self) -> Params {
        Params {
            mint_denom: self.denom.clone(),
            minting_rewards_distribution_start_time: self.minting_rewards_distribution_start_time,
            next_reduction_time: self.next_reduction_time,
            ..Params::default()
        }
    }
}
