//! Genesis import and export.
//!
//! Only `Params` travel through genesis. The minter is rebuilt on every
//! import from `genesis_daily_provisions`, so minted-amount history never
//! round-trips.

use acrux_core::constants::MINT_MODULE_NAME;
use acrux_core::error::AcruxError;
use acrux_core::types::BlockContext;
use acrux_state::{AccountRegistry, KvStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::keeper::MintKeeper;
use crate::minter::Minter;
use crate::params::Params;

/// The mint module's genesis payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
}

impl GenesisState {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Parse the JSON payload. Unparseable genesis is fatal.
    pub fn from_json(bytes: &[u8]) -> Result<Self, AcruxError> {
        serde_json::from_slice(bytes)
            .map_err(|e| AcruxError::FatalConfig(format!("unparseable mint genesis state: {e}")))
    }

    pub fn to_json(&self) -> Result<String, AcruxError> {
        serde_json::to_string_pretty(self).map_err(|e| AcruxError::Serialization(e.to_string()))
    }
}

/// Stateless check of a genesis payload.
pub fn validate_genesis(state: &GenesisState) -> Result<(), AcruxError> {
    state.params.validate()
}

impl<S: KvStore> MintKeeper<S> {
    /// Import mint genesis at the current block time.
    ///
    /// An absent payload is fatal. An import after the distribution start
    /// time resumes minting from the import's block time.
    pub fn init_genesis<C, R>(
        &mut self,
        ctx: &C,
        accounts: &mut R,
        data: Option<&GenesisState>,
    ) -> Result<Minter, AcruxError>
    where
        C: BlockContext,
        R: AccountRegistry,
    {
        let data = data.ok_or_else(|| AcruxError::FatalConfig("empty mint genesis state".into()))?;
        validate_genesis(data)?;

        let block_time = ctx.block_time();
        let minter = Minter::from_genesis(&data.params, block_time);
        if minter.last_mint_time != 0 {
            warn!(
                block_time,
                start_time = data.params.minting_rewards_distribution_start_time,
                "mint genesis imported after distribution start; resuming from block time"
            );
        }

        self.set_minter(&minter)?;
        self.set_params(&data.params)?;
        accounts.ensure_module_account(MINT_MODULE_NAME)?;
        self.set_next_reduction_time(data.params.next_reduction_time)?;

        info!(
            denom = %data.params.mint_denom,
            daily_provisions = %minter.daily_provisions,
            start_time = data.params.minting_rewards_distribution_start_time,
            next_reduction_time = data.params.next_reduction_time,
            "mint genesis initialized"
        );
        Ok(minter)
    }

    /// Export the current params. The minter is not part of genesis.
    pub fn export_genesis(&self) -> Result<GenesisState, AcruxError> {
        Ok(GenesisState::new(self.get_params()?))
    }
}
