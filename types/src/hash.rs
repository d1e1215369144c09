//! Timelock transaction keys.

use crate::action::Action;
use crate::time::Timestamp;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// A 32-byte key identifying one queued timelock transaction.
///
/// Derived from `(target, value, signature, calldata, eta)`, so the same
/// action queued for two different ETAs yields two distinct keys.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Compute the timelock key of `action` scheduled at `eta`.
    ///
    /// Variable-length fields are length-prefixed so distinct tuples can
    /// never produce the same preimage.
    pub fn for_action(action: &Action, eta: Timestamp) -> Self {
        let mut hasher = Blake2b256::new();
        let target = action.target.as_bytes();
        hasher.update((target.len() as u64).to_le_bytes());
        hasher.update(target);
        hasher.update(action.value.to_le_bytes());
        hasher.update((action.signature.len() as u64).to_le_bytes());
        hasher.update(action.signature.as_bytes());
        hasher.update((action.calldata.len() as u64).to_le_bytes());
        hasher.update(&action.calldata);
        hasher.update(eta.as_secs().to_le_bytes());
        let mut output = [0u8; 32];
        output.copy_from_slice(&hasher.finalize());
        Self(output)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

// Inline hex encoding to avoid adding the `hex` crate as a dependency of types.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccountId;

    fn action(sig: &str) -> Action {
        Action {
            target: AccountId::new("token-ledger"),
            value: 0,
            signature: sig.to_string(),
            calldata: vec![1, 2, 3],
        }
    }

    #[test]
    fn key_depends_on_eta() {
        let a = action("issue(address,uint256)");
        assert_ne!(
            TxHash::for_action(&a, Timestamp::new(100)),
            TxHash::for_action(&a, Timestamp::new(101))
        );
    }

    #[test]
    fn key_is_deterministic() {
        let a = action("retire(uint256)");
        let k1 = TxHash::for_action(&a, Timestamp::new(7));
        let k2 = TxHash::for_action(&a.clone(), Timestamp::new(7));
        assert_eq!(k1, k2);
        assert!(!k1.is_zero());
    }

    #[test]
    fn length_prefix_separates_fields() {
        let mut a = action("ab");
        a.calldata = b"c".to_vec();
        let mut b = action("a");
        b.calldata = b"bc".to_vec();
        assert_ne!(
            TxHash::for_action(&a, Timestamp::EPOCH),
            TxHash::for_action(&b, Timestamp::EPOCH)
        );
    }
}
