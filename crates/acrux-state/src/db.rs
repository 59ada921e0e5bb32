use acrux_core::account::BaseAccount;
use acrux_core::error::AcruxError;
use acrux_core::types::{Address, Balance, ADDRESS_LEN};
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
    TransactionalTree,
};
use sled::Transactional;
use std::collections::BTreeMap;
use std::path::Path;

use crate::store::{Subspace, TreeStore};

/// Pool credited with the staking-reward share of new currency.
pub const STAKING_REWARDS_POOL: &str = "staking_rewards";

/// Pool credited with the community share of new currency.
pub const COMMUNITY_POOL: &str = "community_pool";

const NEXT_ACCOUNT_NUMBER_KEY: &str = "next_account_number";

/// Persistent state database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees (analogous to column families):
///   accounts:  Address bytes           → bincode(BaseAccount)
///   balances:  Address bytes ‖ denom   → u128 BE
///   pools:     pool name ‖ "/" ‖ denom → u128 BE
///   supply:    denom                   → u128 BE
///   meta:      utf8 key bytes          → raw bytes
///   module/*:  one namespace per module store
///   params/*:  one namespace per module parameter subspace
pub struct StateDb {
    db: sled::Db,
    accounts: sled::Tree,
    balances: sled::Tree,
    pools: sled::Tree,
    supply: sled::Tree,
    meta: sled::Tree,
}

fn storage(e: sled::Error) -> AcruxError {
    AcruxError::Storage(e.to_string())
}

fn encode_amount(amount: Balance) -> [u8; 16] {
    amount.to_be_bytes()
}

fn decode_amount(bytes: &[u8]) -> Result<Balance, AcruxError> {
    let arr: [u8; 16] = bytes
        .try_into()
        .map_err(|_| AcruxError::Serialization(format!("amount must be 16 bytes, got {}", bytes.len())))?;
    Ok(Balance::from_be_bytes(arr))
}

fn add_amount_in_tx(
    tree: &TransactionalTree,
    key: &[u8],
    amount: Balance,
) -> ConflictableTransactionResult<(), AcruxError> {
    let current = match tree.get(key)? {
        Some(bytes) => decode_amount(&bytes).map_err(ConflictableTransactionError::Abort)?,
        None => 0,
    };
    let updated = current.checked_add(amount).ok_or_else(|| {
        ConflictableTransactionError::Abort(AcruxError::Arithmetic(format!(
            "{} overflow",
            String::from_utf8_lossy(key)
        )))
    })?;
    tree.insert(key, encode_amount(updated).to_vec())?;
    Ok(())
}

/// Everything one block changes. Applied by [`StateDb::commit_block`] in a
/// single transaction, so a failed block leaves no trace.
#[derive(Default)]
pub struct BlockWrites {
    /// Buffered key/value writes per module namespace.
    pub stores: Vec<(TreeStore, BTreeMap<Vec<u8>, Vec<u8>>)>,
    /// Pool credits as (pool, denom, amount). Each also grows total supply.
    pub credits: Vec<(&'static str, String, Balance)>,
    pub meta: Vec<(String, Vec<u8>)>,
}

fn balance_key(address: &Address, denom: &str) -> Vec<u8> {
    let mut key = address.as_bytes().to_vec();
    key.extend_from_slice(denom.as_bytes());
    key
}

fn pool_key(pool: &str, denom: &str) -> Vec<u8> {
    format!("{pool}/{denom}").into_bytes()
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AcruxError> {
        let db = sled::open(path).map_err(storage)?;
        Self::from_db(db)
    }

    /// In-memory database removed on drop. Used by tests and dry runs.
    pub fn temporary() -> Result<Self, AcruxError> {
        let db = sled::Config::new().temporary(true).open().map_err(storage)?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, AcruxError> {
        let accounts = db.open_tree("accounts").map_err(storage)?;
        let balances = db.open_tree("balances").map_err(storage)?;
        let pools    = db.open_tree("pools").map_err(storage)?;
        let supply   = db.open_tree("supply").map_err(storage)?;
        let meta     = db.open_tree("meta").map_err(storage)?;
        Ok(Self { db, accounts, balances, pools, supply, meta })
    }

    // ── Module namespaces ────────────────────────────────────────────────────

    /// The private store of module `name`.
    pub fn module_store(&self, name: &str) -> Result<TreeStore, AcruxError> {
        let tree = self.db.open_tree(format!("module/{name}")).map_err(storage)?;
        Ok(TreeStore::new(tree))
    }

    /// The parameter subspace of module `name`.
    pub fn param_subspace(&self, name: &str) -> Result<Subspace<TreeStore>, AcruxError> {
        let tree = self.db.open_tree(format!("params/{name}")).map_err(storage)?;
        Ok(Subspace::new(name, TreeStore::new(tree)))
    }

    // ── Accounts ─────────────────────────────────────────────────────────────

    pub fn get_account(&self, address: &Address) -> Result<Option<BaseAccount>, AcruxError> {
        match self.accounts.get(address.as_bytes()).map_err(storage)? {
            Some(bytes) => {
                let acc = bincode::deserialize(&bytes)
                    .map_err(|e| AcruxError::Serialization(e.to_string()))?;
                Ok(Some(acc))
            }
            None => Ok(None),
        }
    }

    pub fn put_account(&self, account: &BaseAccount) -> Result<(), AcruxError> {
        let bytes = bincode::serialize(account)
            .map_err(|e| AcruxError::Serialization(e.to_string()))?;
        self.accounts
            .insert(account.address.as_bytes(), bytes)
            .map_err(storage)?;
        Ok(())
    }

    pub fn account_exists(&self, address: &Address) -> Result<bool, AcruxError> {
        self.accounts.contains_key(address.as_bytes()).map_err(storage)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn account_number_counter(&self) -> Result<u64, AcruxError> {
        match self.get_meta(NEXT_ACCOUNT_NUMBER_KEY)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    AcruxError::Serialization("account number counter must be 8 bytes".into())
                })?;
                Ok(u64::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    /// Hand out the next account number and advance the counter.
    pub fn next_account_number(&self) -> Result<u64, AcruxError> {
        let current = self.account_number_counter()?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| AcruxError::Arithmetic("account number overflow".into()))?;
        self.put_meta(NEXT_ACCOUNT_NUMBER_KEY, &next.to_be_bytes())?;
        Ok(current)
    }

    /// Make sure numbers below `next` are never handed out. Never lowers the counter.
    pub fn reserve_account_numbers(&self, next: u64) -> Result<(), AcruxError> {
        if next > self.account_number_counter()? {
            self.put_meta(NEXT_ACCOUNT_NUMBER_KEY, &next.to_be_bytes())?;
        }
        Ok(())
    }

    // ── Balances ─────────────────────────────────────────────────────────────

    pub fn get_balance(&self, address: &Address, denom: &str) -> Result<Balance, AcruxError> {
        match self.balances.get(balance_key(address, denom)).map_err(storage)? {
            Some(bytes) => decode_amount(&bytes),
            None => Ok(0),
        }
    }

    pub fn set_balance(&self, address: &Address, denom: &str, amount: Balance) -> Result<(), AcruxError> {
        self.balances
            .insert(balance_key(address, denom), encode_amount(amount).to_vec())
            .map_err(storage)?;
        Ok(())
    }

    /// Sum of every stored balance of `denom`.
    pub fn sum_balances(&self, denom: &str) -> Result<Balance, AcruxError> {
        let mut total: Balance = 0;
        for item in self.balances.iter() {
            let (key, value) = item.map_err(storage)?;
            if key.len() > ADDRESS_LEN && &key[ADDRESS_LEN..] == denom.as_bytes() {
                total = total
                    .checked_add(decode_amount(&value)?)
                    .ok_or_else(|| AcruxError::Arithmetic("balance sum overflow".into()))?;
            }
        }
        Ok(total)
    }

    // ── Pools & supply ───────────────────────────────────────────────────────

    pub fn get_pool(&self, pool: &str, denom: &str) -> Result<Balance, AcruxError> {
        match self.pools.get(pool_key(pool, denom)).map_err(storage)? {
            Some(bytes) => decode_amount(&bytes),
            None => Ok(0),
        }
    }

    pub fn add_to_pool(&self, pool: &str, denom: &str, amount: Balance) -> Result<Balance, AcruxError> {
        let updated = self
            .get_pool(pool, denom)?
            .checked_add(amount)
            .ok_or_else(|| AcruxError::Arithmetic(format!("{pool} overflow")))?;
        self.pools
            .insert(pool_key(pool, denom), encode_amount(updated).to_vec())
            .map_err(storage)?;
        Ok(updated)
    }

    pub fn get_supply(&self, denom: &str) -> Result<Balance, AcruxError> {
        match self.supply.get(denom.as_bytes()).map_err(storage)? {
            Some(bytes) => decode_amount(&bytes),
            None => Ok(0),
        }
    }

    pub fn set_supply(&self, denom: &str, amount: Balance) -> Result<(), AcruxError> {
        self.supply
            .insert(denom.as_bytes(), encode_amount(amount).to_vec())
            .map_err(storage)?;
        Ok(())
    }

    pub fn increase_supply(&self, denom: &str, amount: Balance) -> Result<Balance, AcruxError> {
        let updated = self
            .get_supply(denom)?
            .checked_add(amount)
            .ok_or_else(|| AcruxError::Arithmetic("supply overflow".into()))?;
        self.set_supply(denom, updated)?;
        Ok(updated)
    }

    // ── Meta ─────────────────────────────────────────────────────────────────

    pub fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), AcruxError> {
        self.meta.insert(key.as_bytes(), value).map_err(storage)?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, AcruxError> {
        self.meta
            .get(key.as_bytes())
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(storage)
    }

    // ── Block commit ─────────────────────────────────────────────────────────

    /// Apply `writes` atomically: either every credit, supply change, meta
    /// entry and module write lands, or none does.
    pub fn commit_block(&self, writes: &BlockWrites) -> Result<(), AcruxError> {
        let mut trees = vec![self.pools.clone(), self.supply.clone(), self.meta.clone()];
        trees.extend(writes.stores.iter().map(|(store, _)| store.tree().clone()));

        trees
            .as_slice()
            .transaction(|views| {
                let (pools, supply, meta) = (&views[0], &views[1], &views[2]);
                for (pool, denom, amount) in &writes.credits {
                    add_amount_in_tx(pools, &pool_key(pool, denom), *amount)?;
                    add_amount_in_tx(supply, denom.as_bytes(), *amount)?;
                }
                for (key, value) in &writes.meta {
                    meta.insert(key.as_bytes(), value.as_slice())?;
                }
                for (view, (_, pending)) in views[3..].iter().zip(&writes.stores) {
                    for (key, value) in pending {
                        view.insert(key.as_slice(), value.as_slice())?;
                    }
                }
                Ok(())
            })
            .map_err(|e: TransactionError<AcruxError>| match e {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => storage(e),
            })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), AcruxError> {
        self.db.flush().map_err(storage)?;
        Ok(())
    }
}
