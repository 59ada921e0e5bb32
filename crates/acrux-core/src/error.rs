use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcruxError {
    // ── Configuration / genesis ──────────────────────────────────────────────
    #[error("fatal configuration error: {0}")]
    FatalConfig(String),

    #[error("invalid parameter {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("genesis supply mismatch: expected {expected}, got {got}")]
    GenesisSupplyMismatch { expected: u128, got: u128 },

    // ── Allocation ───────────────────────────────────────────────────────────
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("allocation overflow: {allocated} allocated exceeds total supply {supply}")]
    AllocationOverflow { supply: u128, allocated: u128 },

    #[error("address allocated more than once: {0}")]
    DuplicateAllocation(String),

    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("missing state: {0}")]
    MissingState(&'static str),
}

impl AcruxError {
    /// Shorthand for a parameter validation failure.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
