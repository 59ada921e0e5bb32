use serde::{Deserialize, Serialize};

use crate::types::{Address, Coin};

/// An account record: the identifier plus its replay-protection counters.
/// Both counters are zero for every account created at genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAccount {
    pub address: Address,
    pub account_number: u64,
    pub sequence: u64,
    /// Set for module accounts; `None` for user accounts.
    #[serde(default)]
    pub module_name: Option<String>,
}

impl BaseAccount {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            account_number: 0,
            sequence: 0,
            module_name: None,
        }
    }

    /// Account owned by a module, at its derived address.
    pub fn module(name: &str, account_number: u64) -> Self {
        Self {
            address: Address::for_module(name),
            account_number,
            sequence: 0,
            module_name: Some(name.to_string()),
        }
    }
}

/// Initial balance of one address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub address: Address,
    pub coins: Coin,
}
