//! Shared identity type and engine-wide constants

use core::fmt;

/// Maximum number of arks a fleet can register (buffer excluded)
pub const MAX_ARKS: usize = 16;

/// Maximum legs accepted in a single rebalance batch
pub const MAX_REBALANCE_LEGS: usize = 50;

/// Sentinel amount: withdraw the owner's entire position
pub const WITHDRAW_ALL: u128 = u128::MAX;

/// Sentinel amount: move the source ark's entire position
pub const MOVE_ALL: u128 = u128::MAX;

/// Opaque 32-byte identity for depositors, arks and callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub const ZERO: AccountId = AccountId([0; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        AccountId(bytes)
    }

    /// Deterministic test/simulation identity from a single byte
    pub fn from_byte(b: u8) -> Self {
        AccountId([b; 32])
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        AccountId(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short hex form: first four bytes are enough to tell ids apart in logs
        for b in &self.0[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "..")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_short_hex() {
        let id = AccountId::new([0xab; 32]);
        assert_eq!(id.to_string(), "abababab..");
    }

    #[test]
    fn test_from_byte_distinct() {
        assert_ne!(AccountId::from_byte(1), AccountId::from_byte(2));
        assert_eq!(AccountId::from_byte(0), AccountId::ZERO);
    }
}
