use acrux_core::constants::MINT_MODULE_NAME;
use acrux_core::error::AcruxError;
use acrux_core::types::Timestamp;
use acrux_state::{KvStore, Overlay, StateDb, Subspace, TreeStore};
use tracing::debug;

use crate::minter::Minter;
use crate::params::{
    validate_next_reduction_time, validate_param_value, DistributionProportions, Params,
    KEY_DISTRIBUTION_PROPORTIONS, KEY_GENESIS_DAILY_PROVISIONS, KEY_MINTING_REWARDS_DISTRIBUTION_START_TIME,
    KEY_MINT_DENOM, KEY_NEXT_REWARDS_REDUCTION_TIME, KEY_REDUCTION_FACTOR,
    KEY_REDUCTION_PERIOD_IN_SECONDS,
};

/// Key of the `Minter` singleton in the module store.
pub const MINTER_KEY: &[u8] = &[0x00];

/// Owns the mint module's store and parameter subspace.
///
/// The keeper is the only writer of the minter key and, apart from
/// governance, of the mint parameters.
pub struct MintKeeper<S> {
    store: S,
    subspace: Subspace<S>,
}

impl MintKeeper<TreeStore> {
    /// Keeper over the mint namespaces of a state database.
    pub fn open(db: &StateDb) -> Result<Self, AcruxError> {
        Ok(Self::new(
            db.module_store(MINT_MODULE_NAME)?,
            db.param_subspace(MINT_MODULE_NAME)?,
        ))
    }
}

impl MintKeeper<Overlay<TreeStore>> {
    /// Keeper whose writes are buffered until the caller commits them with
    /// [`StateDb::commit_block`].
    pub fn staged(db: &StateDb) -> Result<Self, AcruxError> {
        let params = db.param_subspace(MINT_MODULE_NAME)?.into_store();
        Ok(Self::new(
            Overlay::new(db.module_store(MINT_MODULE_NAME)?),
            Subspace::new(MINT_MODULE_NAME, Overlay::new(params)),
        ))
    }
}

impl<S: KvStore> MintKeeper<S> {
    pub fn new(store: S, subspace: Subspace<S>) -> Self {
        Self { store, subspace }
    }

    /// Give back the module store and the parameter store.
    pub fn into_stores(self) -> (S, S) {
        (self.store, self.subspace.into_store())
    }

    // ── Minter ───────────────────────────────────────────────────────────────

    /// Stored minter. A decoded minter that breaks its invariants is an error.
    pub fn get_minter(&self) -> Result<Minter, AcruxError> {
        let bytes = self
            .store
            .get(MINTER_KEY)?
            .ok_or(AcruxError::MissingState("stored minter should not have been nil"))?;
        let minter: Minter =
            bincode::deserialize(&bytes).map_err(|e| AcruxError::Serialization(e.to_string()))?;
        minter.validate()?;
        Ok(minter)
    }

    pub fn set_minter(&mut self, minter: &Minter) -> Result<(), AcruxError> {
        let bytes =
            bincode::serialize(minter).map_err(|e| AcruxError::Serialization(e.to_string()))?;
        self.store.set(MINTER_KEY, &bytes)
    }

    // ── Params ───────────────────────────────────────────────────────────────

    pub fn get_params(&self) -> Result<Params, AcruxError> {
        Ok(Params {
            mint_denom: self.required(KEY_MINT_DENOM)?,
            genesis_daily_provisions: self.required(KEY_GENESIS_DAILY_PROVISIONS)?,
            reduction_period_seconds: self.required(KEY_REDUCTION_PERIOD_IN_SECONDS)?,
            reduction_factor: self.required(KEY_REDUCTION_FACTOR)?,
            distribution_proportions: self
                .required::<DistributionProportions>(KEY_DISTRIBUTION_PROPORTIONS)?,
            next_reduction_time: self.required(KEY_NEXT_REWARDS_REDUCTION_TIME)?,
            minting_rewards_distribution_start_time: self
                .required(KEY_MINTING_REWARDS_DISTRIBUTION_START_TIME)?,
        })
    }

    /// Validate and store every parameter. Nothing is written if any field
    /// is invalid.
    pub fn set_params(&mut self, params: &Params) -> Result<(), AcruxError> {
        params.validate()?;
        for (key, value) in params.to_pairs()? {
            self.subspace.set_raw(key, &value)?;
        }
        Ok(())
    }

    /// Set a single parameter from its JSON encoding, as a governance change
    /// would. The value is validated against that field's rule first.
    pub fn set_param(&mut self, key: &[u8], raw: &[u8]) -> Result<(), AcruxError> {
        validate_param_value(key, raw)?;
        self.subspace.set_raw(key, raw)?;
        debug!(
            subspace = self.subspace.name(),
            key = %String::from_utf8_lossy(key),
            "parameter updated"
        );
        Ok(())
    }

    pub fn get_next_reduction_time(&self) -> Result<Timestamp, AcruxError> {
        self.required(KEY_NEXT_REWARDS_REDUCTION_TIME)
    }

    pub fn set_next_reduction_time(&mut self, time: Timestamp) -> Result<(), AcruxError> {
        validate_next_reduction_time(time)?;
        self.subspace.set(KEY_NEXT_REWARDS_REDUCTION_TIME, &time)
    }

    fn required<T: serde::de::DeserializeOwned>(&self, key: &[u8]) -> Result<T, AcruxError> {
        self.subspace
            .get(key)?
            .ok_or(AcruxError::MissingState("mint params have not been initialized"))
    }
}
