pub mod constants;
pub mod dec;
pub mod error;
pub mod types;
pub mod account;

pub use constants::*;
pub use dec::Dec;
pub use error::AcruxError;
pub use types::*;
pub use account::*;
