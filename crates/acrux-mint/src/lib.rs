//! acrux-mint
//!
//! Time-based token emission. Every block, new currency is minted in
//! proportion to the wall-clock time elapsed since the previous mint, at a
//! daily rate (`daily_provisions`) that is multiplied by `reduction_factor`
//! each time block time crosses `next_reduction_time`.
//!
//! Lifecycle:
//!   1. `init_genesis`:   once, at chain creation or re-import
//!   2. `end_blocker`:    once per block, at finalization
//!   3. `export_genesis`: params only; the minter is rebuilt on import

pub mod abci;
pub mod genesis;
pub mod keeper;
pub mod minter;
pub mod params;

pub use abci::MintOutcome;
pub use genesis::{validate_genesis, GenesisState};
pub use keeper::{MintKeeper, MINTER_KEY};
pub use minter::Minter;
pub use params::{DistributionProportions, Params};
