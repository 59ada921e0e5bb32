use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AcruxError;

/// Amount in the base unit (10^-18 ACRX). u128 holds the full genesis supply
/// of 3.5 × 10^26 with room for centuries of emission.
pub type Balance = u128;

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

/// Block height.
pub type Height = u64;

// ── Address ──────────────────────────────────────────────────────────────────

/// Length of an account identifier in bytes.
pub const ADDRESS_LEN: usize = 20;

/// 20-byte account identifier. Canonical text form is `0x` + 40 hex digits,
/// which is also its serialized form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    pub fn from_bytes(b: [u8; ADDRESS_LEN]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Deterministic address of a module account: the first 20 bytes of
    /// BLAKE3(module name).
    pub fn for_module(name: &str) -> Self {
        let hash = blake3::hash(name.as_bytes());
        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(&hash.as_bytes()[..ADDRESS_LEN]);
        Self(arr)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AcruxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address(s)
    }
}

/// Parse an address in canonical form. The `0x` prefix is optional and hex
/// digits may be either case.
pub fn parse_address(s: &str) -> Result<Address, AcruxError> {
    let digits = s.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    let bytes = hex::decode(digits).map_err(|_| AcruxError::InvalidAddress(s.to_string()))?;
    let arr: [u8; ADDRESS_LEN] = bytes
        .try_into()
        .map_err(|_| AcruxError::InvalidAddress(s.to_string()))?;
    Ok(Address(arr))
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_address(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}…)", &self.to_hex()[..10])
    }
}

// ── Denomination ─────────────────────────────────────────────────────────────

/// Check a denomination against `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), AcruxError> {
    let invalid = |reason: &str| AcruxError::validation("denom", format!("{denom:?}: {reason}"));
    let mut chars = denom.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(invalid("must start with a letter")),
    }
    if !(3..=128).contains(&denom.len()) {
        return Err(invalid("length must be between 3 and 128"));
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || "/:._-".contains(*c))) {
        return Err(invalid(&format!("invalid character {bad:?}")));
    }
    Ok(())
}

// ── Coin ─────────────────────────────────────────────────────────────────────

/// An amount of one denomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Balance,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Balance) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// ── Block context ────────────────────────────────────────────────────────────

/// What the framework exposes about the block being finalized.
pub trait BlockContext {
    fn block_time(&self) -> Timestamp;

    fn block_height(&self) -> Height {
        0
    }
}

/// Minimal block header used by the node and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: Height,
    pub time: Timestamp,
}

impl BlockHeader {
    pub fn new(height: Height, time: Timestamp) -> Self {
        Self { height, time }
    }
}

impl BlockContext for BlockHeader {
    fn block_time(&self) -> Timestamp {
        self.time
    }

    fn block_height(&self) -> Height {
        self.height
    }
}
