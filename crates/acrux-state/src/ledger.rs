//! Ledger collaborators credited by the mint module.
//!
//! `StateDb` is the persistent implementation used by the node; `MemLedger`
//! keeps the same bookkeeping in memory for tests and dry runs.

use std::collections::BTreeMap;

use acrux_core::account::BaseAccount;
use acrux_core::error::AcruxError;
use acrux_core::types::{Address, Balance, Coin};
use tracing::{debug, info};

use crate::db::{StateDb, COMMUNITY_POOL, STAKING_REWARDS_POOL};

/// Receives newly minted currency. Each credit also grows total supply.
pub trait RewardPool {
    /// Route `coin` to bonded-stake rewards.
    fn credit_staking_rewards(&mut self, coin: &Coin) -> Result<(), AcruxError>;

    /// Route `coin` to the community pool.
    fn credit_community_pool(&mut self, coin: &Coin) -> Result<(), AcruxError>;
}

/// Registry of accounts that modules can lazily create their account in.
pub trait AccountRegistry {
    /// Return the module's account, creating it on first use.
    fn ensure_module_account(&mut self, name: &str) -> Result<BaseAccount, AcruxError>;
}

// ── StateDb ──────────────────────────────────────────────────────────────────

impl RewardPool for StateDb {
    fn credit_staking_rewards(&mut self, coin: &Coin) -> Result<(), AcruxError> {
        let pool = self.add_to_pool(STAKING_REWARDS_POOL, &coin.denom, coin.amount)?;
        self.increase_supply(&coin.denom, coin.amount)?;
        debug!(amount = %coin, pool_total = pool, "credited staking rewards");
        Ok(())
    }

    fn credit_community_pool(&mut self, coin: &Coin) -> Result<(), AcruxError> {
        let pool = self.add_to_pool(COMMUNITY_POOL, &coin.denom, coin.amount)?;
        self.increase_supply(&coin.denom, coin.amount)?;
        debug!(amount = %coin, pool_total = pool, "credited community pool");
        Ok(())
    }
}

impl AccountRegistry for StateDb {
    fn ensure_module_account(&mut self, name: &str) -> Result<BaseAccount, AcruxError> {
        let address = Address::for_module(name);
        if let Some(existing) = self.get_account(&address)? {
            return Ok(existing);
        }
        let account = BaseAccount::module(name, self.next_account_number()?);
        self.put_account(&account)?;
        info!(module = name, address = %address, "created module account");
        Ok(account)
    }
}

// ── In-memory ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct MemLedger {
    pub accounts: BTreeMap<Address, BaseAccount>,
    pub staking_rewards: BTreeMap<String, Balance>,
    pub community_pool: BTreeMap<String, Balance>,
    pub supply: BTreeMap<String, Balance>,
}

impl MemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staking_rewards_of(&self, denom: &str) -> Balance {
        self.staking_rewards.get(denom).copied().unwrap_or(0)
    }

    pub fn community_pool_of(&self, denom: &str) -> Balance {
        self.community_pool.get(denom).copied().unwrap_or(0)
    }

    pub fn supply_of(&self, denom: &str) -> Balance {
        self.supply.get(denom).copied().unwrap_or(0)
    }

    fn credit(
        bucket: &mut BTreeMap<String, Balance>,
        supply: &mut BTreeMap<String, Balance>,
        coin: &Coin,
    ) -> Result<(), AcruxError> {
        for (map, what) in [(bucket, "pool"), (supply, "supply")] {
            let entry = map.entry(coin.denom.clone()).or_insert(0);
            *entry = entry
                .checked_add(coin.amount)
                .ok_or_else(|| AcruxError::Arithmetic(format!("{what} overflow")))?;
        }
        Ok(())
    }
}

impl RewardPool for MemLedger {
    fn credit_staking_rewards(&mut self, coin: &Coin) -> Result<(), AcruxError> {
        Self::credit(&mut self.staking_rewards, &mut self.supply, coin)
    }

    fn credit_community_pool(&mut self, coin: &Coin) -> Result<(), AcruxError> {
        Self::credit(&mut self.community_pool, &mut self.supply, coin)
    }
}

impl AccountRegistry for MemLedger {
    fn ensure_module_account(&mut self, name: &str) -> Result<BaseAccount, AcruxError> {
        let next_number = self.accounts.len() as u64;
        let account = self
            .accounts
            .entry(Address::for_module(name))
            .or_insert_with(|| BaseAccount::module(name, next_number));
        Ok(account.clone())
    }
}
