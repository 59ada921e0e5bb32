//! acrux-genesis
//!
//! Builds the Acrux genesis state. The allocator credits every genesis
//! validator a fixed amount, in input order, and gives the reserve address
//! whatever is left of the total supply. The reserve is derived as
//! `supply − Σ credits`, never computed independently, so the balances always
//! sum to the supply exactly.
//!
//! `apply_genesis` then writes the document into a fresh `StateDb` and runs
//! the mint module's genesis import at the genesis time.

pub mod config;
pub mod doc;

pub use config::GenesisConfig;
pub use doc::{AppState, AuthGenesis, BankGenesis, GenesisDoc};

use std::collections::BTreeSet;

use acrux_core::account::{BaseAccount, GenesisBalance};
use acrux_core::error::AcruxError;
use acrux_core::types::{parse_address, validate_denom, Balance, BlockHeader, Coin};
use acrux_mint::{MintKeeper, Minter, Params};
use acrux_state::StateDb;
use tracing::info;

const CHAIN_ID_META_KEY: &str = "chain_id";

/// Result of allocating the genesis supply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenesisAllocation {
    pub supply: Coin,
    /// Validators in input order, then the reserve.
    pub balances: Vec<GenesisBalance>,
    /// Reserve first, then validators in input order.
    pub accounts: Vec<BaseAccount>,
    pub params: Params,
}

impl GenesisAllocation {
    pub fn total_allocated(&self) -> Balance {
        self.balances.iter().map(|b| b.coins.amount).sum()
    }
}

/// Allocate the genesis supply described by `config`.
///
/// Nothing is produced unless every address parses and the validator
/// credits fit inside the supply.
pub fn allocate(config: &GenesisConfig) -> Result<GenesisAllocation, AcruxError> {
    validate_denom(&config.denom)?;
    let reserve = parse_address(&config.reserve_address)?;
    let supply = config.total_supply;

    let mut seen = BTreeSet::from([reserve]);
    let mut balances = Vec::with_capacity(config.validators.len() + 1);
    let mut accounts = Vec::with_capacity(config.validators.len() + 1);
    accounts.push(BaseAccount::new(reserve));

    let mut credited: Balance = 0;
    for raw in &config.validators {
        let address = parse_address(raw)?;
        if !seen.insert(address) {
            return Err(AcruxError::DuplicateAllocation(address.to_string()));
        }
        credited = credited
            .checked_add(config.validator_credit)
            .filter(|total| *total <= supply)
            .ok_or(AcruxError::AllocationOverflow {
                supply,
                allocated: credited.saturating_add(config.validator_credit),
            })?;
        balances.push(GenesisBalance {
            address,
            coins: Coin::new(&config.denom, config.validator_credit),
        });
        accounts.push(BaseAccount::new(address));
    }

    let reserve_amount = supply
        .checked_sub(credited)
        .ok_or(AcruxError::AllocationOverflow { supply, allocated: credited })?;
    balances.push(GenesisBalance {
        address: reserve,
        coins: Coin::new(&config.denom, reserve_amount),
    });

    let params = config.mint_params();
    params.validate()?;

    info!(
        validators = config.validators.len(),
        validator_credit = config.validator_credit,
        reserve = %reserve,
        reserve_amount,
        "genesis: supply allocated"
    );

    Ok(GenesisAllocation {
        supply: Coin::new(&config.denom, supply),
        balances,
        accounts,
        params,
    })
}

/// Write `doc` into an empty `StateDb` and import mint genesis at the
/// genesis time. Returns the initial minter.
pub fn apply_genesis(db: &mut StateDb, doc: &GenesisDoc) -> Result<Minter, AcruxError> {
    info!(chain_id = %doc.chain_id, "applying genesis state");
    doc.validate()?;

    let bank = &doc.app_state.bank;
    if db.get_meta(CHAIN_ID_META_KEY)?.is_some() || db.get_supply(&bank.supply.denom)? != 0 {
        return Err(AcruxError::FatalConfig("state database is already initialized".into()));
    }

    for account in &doc.app_state.auth.accounts {
        db.put_account(account)?;
    }
    // genesis accounts all carry number 0; later accounts start after them
    let reserved = u64::try_from(doc.app_state.auth.accounts.len())
        .map_err(|_| AcruxError::Arithmetic("account count overflow".into()))?;
    db.reserve_account_numbers(reserved)?;
    for balance in &bank.balances {
        db.set_balance(&balance.address, &balance.coins.denom, balance.coins.amount)?;
    }
    db.set_supply(&bank.supply.denom, bank.supply.amount)?;
    info!(
        accounts = doc.app_state.auth.accounts.len(),
        balances = bank.balances.len(),
        supply = %bank.supply,
        "genesis: accounts and balances written"
    );

    verify_genesis_supply(db, &bank.supply)?;

    let mut keeper = MintKeeper::open(db)?;
    let header = BlockHeader::new(0, doc.genesis_timestamp());
    let minter = keeper.init_genesis(&header, db, Some(&doc.app_state.mint))?;

    db.put_meta(CHAIN_ID_META_KEY, doc.chain_id.as_bytes())?;
    db.flush()?;
    info!("genesis state committed to disk");
    Ok(minter)
}

/// Chain id recorded by `apply_genesis`, if any.
pub fn stored_chain_id(db: &StateDb) -> Result<Option<String>, AcruxError> {
    Ok(db
        .get_meta(CHAIN_ID_META_KEY)?
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

/// Verify that the balances written to `db` sum to exactly the supply.
fn verify_genesis_supply(db: &StateDb, supply: &Coin) -> Result<(), AcruxError> {
    let total = db.sum_balances(&supply.denom)?;
    if total != supply.amount {
        return Err(AcruxError::GenesisSupplyMismatch {
            expected: supply.amount,
            got: total,
        });
    }
    info!(total, "genesis supply verified");
    Ok(())
}
