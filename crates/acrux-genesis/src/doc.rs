use std::collections::BTreeSet;

use acrux_core::account::{BaseAccount, GenesisBalance};
use acrux_core::error::AcruxError;
use acrux_core::types::{Balance, Coin, Timestamp};
use acrux_mint::{validate_genesis, GenesisState as MintGenesis};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{allocate, GenesisConfig};

/// The chain's founding document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisDoc {
    pub chain_id: String,
    pub genesis_time: DateTime<Utc>,
    pub app_state: AppState,
}

/// Per-module genesis payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub mint: MintGenesis,
    pub bank: BankGenesis,
    pub auth: AuthGenesis,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankGenesis {
    pub supply: Coin,
    pub balances: Vec<GenesisBalance>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGenesis {
    pub accounts: Vec<BaseAccount>,
}

impl GenesisDoc {
    /// Allocate the initial supply and assemble the document.
    pub fn prepare(chain_id: &str, config: &GenesisConfig) -> Result<Self, AcruxError> {
        if chain_id.trim().is_empty() {
            return Err(AcruxError::FatalConfig("chain id cannot be blank".into()));
        }
        let genesis_time = Utc
            .timestamp_opt(config.genesis_time, 0)
            .single()
            .ok_or_else(|| {
                AcruxError::FatalConfig(format!("genesis time {} out of range", config.genesis_time))
            })?;

        let allocation = allocate(config)?;
        Ok(Self {
            chain_id: chain_id.to_string(),
            genesis_time,
            app_state: AppState {
                mint: MintGenesis::new(allocation.params),
                bank: BankGenesis {
                    supply: allocation.supply,
                    balances: allocation.balances,
                },
                auth: AuthGenesis {
                    accounts: allocation.accounts,
                },
            },
        })
    }

    pub fn genesis_timestamp(&self) -> Timestamp {
        self.genesis_time.timestamp()
    }

    /// Check the mint params and that balances account for the supply exactly.
    pub fn validate(&self) -> Result<(), AcruxError> {
        if self.chain_id.trim().is_empty() {
            return Err(AcruxError::FatalConfig("chain id cannot be blank".into()));
        }
        validate_genesis(&self.app_state.mint)?;

        let bank = &self.app_state.bank;
        let mut seen = BTreeSet::new();
        let mut total: Balance = 0;
        for balance in &bank.balances {
            if !seen.insert(balance.address) {
                return Err(AcruxError::DuplicateAllocation(balance.address.to_string()));
            }
            if balance.coins.denom != bank.supply.denom {
                return Err(AcruxError::FatalConfig(format!(
                    "balance of {} is in {}, supply is in {}",
                    balance.address, balance.coins.denom, bank.supply.denom
                )));
            }
            total = total.checked_add(balance.coins.amount).ok_or(
                AcruxError::AllocationOverflow {
                    supply: bank.supply.amount,
                    allocated: Balance::MAX,
                },
            )?;
        }
        if total != bank.supply.amount {
            return Err(AcruxError::GenesisSupplyMismatch {
                expected: bank.supply.amount,
                got: total,
            });
        }
        Ok(())
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, AcruxError> {
        serde_json::from_slice(bytes)
            .map_err(|e| AcruxError::FatalConfig(format!("unparseable genesis document: {e}")))
    }

    pub fn to_json(&self) -> Result<String, AcruxError> {
        serde_json::to_string_pretty(self).map_err(|e| AcruxError::Serialization(e.to_string()))
    }
}
