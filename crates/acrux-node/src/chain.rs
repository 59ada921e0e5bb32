//! Block bookkeeping for the node: the last processed header, per-block
//! execution of the mint end-blocker, and the status snapshot.

use std::borrow::Borrow;

use acrux_core::error::AcruxError;
use acrux_core::types::{Balance, BlockHeader, Timestamp};
use acrux_mint::{MintKeeper, MintOutcome, Minter, Params};
use acrux_state::db::{COMMUNITY_POOL, STAKING_REWARDS_POOL};
use acrux_state::{BlockWrites, MemLedger, RewardPool, StateDb};
use serde::Serialize;

const LAST_BLOCK_META_KEY: &str = "last_block";

pub fn last_block(db: &StateDb) -> Result<Option<BlockHeader>, AcruxError> {
    db.get_meta(LAST_BLOCK_META_KEY)?
        .map(|bytes| bincode::deserialize(&bytes).map_err(|e| AcruxError::Serialization(e.to_string())))
        .transpose()
}

fn encode_header(header: &BlockHeader) -> Result<Vec<u8>, AcruxError> {
    bincode::serialize(header).map_err(|e| AcruxError::Serialization(e.to_string()))
}

pub fn set_last_block(db: &StateDb, header: &BlockHeader) -> Result<(), AcruxError> {
    db.put_meta(LAST_BLOCK_META_KEY, &encode_header(header)?)
}

/// Header of the block after `last`, `interval` seconds later. `from_time`
/// overrides the time of that block.
pub fn next_header(
    last: &BlockHeader,
    interval: Timestamp,
    from_time: Option<Timestamp>,
) -> Result<BlockHeader, AcruxError> {
    let height = last
        .height
        .checked_add(1)
        .ok_or_else(|| AcruxError::Arithmetic("block height overflow".into()))?;
    let time = match from_time {
        Some(t) => t,
        None => last
            .time
            .checked_add(interval)
            .ok_or_else(|| AcruxError::Arithmetic("block time overflow".into()))?,
    };
    Ok(BlockHeader::new(height, time))
}

/// Run the end-of-block hooks for `header` and record it as processed.
///
/// The hooks run against staged stores and an in-memory pool; the result is
/// committed in one transaction. A failed block changes nothing on disk.
pub fn process_block(db: &StateDb, header: &BlockHeader) -> Result<MintOutcome, AcruxError> {
    execute_block(db, header, &mut MemLedger::new())
}

fn execute_block<P>(db: &StateDb, header: &BlockHeader, pool: &mut P) -> Result<MintOutcome, AcruxError>
where
    P: RewardPool + Borrow<MemLedger>,
{
    let mut keeper = MintKeeper::staged(db)?;
    let outcome = keeper.end_blocker(header, pool)?;

    let (store, params) = keeper.into_stores();
    let credited: &MemLedger = Borrow::<MemLedger>::borrow(&*pool);
    let mut writes = BlockWrites::default();
    writes.stores.push(store.into_parts());
    writes.stores.push(params.into_parts());
    for (denom, amount) in &credited.staking_rewards {
        writes.credits.push((STAKING_REWARDS_POOL, denom.clone(), *amount));
    }
    for (denom, amount) in &credited.community_pool {
        writes.credits.push((COMMUNITY_POOL, denom.clone(), *amount));
    }
    writes.meta.push((LAST_BLOCK_META_KEY.to_string(), encode_header(header)?));

    db.commit_block(&writes)?;
    Ok(outcome)
}

#[derive(Debug, Serialize)]
pub struct Status {
    pub chain_id: Option<String>,
    pub last_block: Option<BlockHeader>,
    pub minter: Minter,
    pub next_reduction_time: Timestamp,
    pub params: Params,
    #[serde(serialize_with = "as_string")]
    pub supply: Balance,
    #[serde(serialize_with = "as_string")]
    pub staking_rewards: Balance,
    #[serde(serialize_with = "as_string")]
    pub community_pool: Balance,
}

// JSON numbers lose precision past 2^53.
fn as_string<S: serde::Serializer>(value: &Balance, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

pub fn status(db: &StateDb) -> Result<Status, AcruxError> {
    let keeper = MintKeeper::open(db)?;
    let params = keeper.get_params()?;
    let denom = params.mint_denom.clone();
    Ok(Status {
        chain_id: acrux_genesis::stored_chain_id(db)?,
        last_block: last_block(db)?,
        minter: keeper.get_minter()?,
        next_reduction_time: keeper.get_next_reduction_time()?,
        supply: db.get_supply(&denom)?,
        staking_rewards: db.get_pool(STAKING_REWARDS_POOL, &denom)?,
        community_pool: db.get_pool(COMMUNITY_POOL, &denom)?,
        params,
    })
}
