//! Canonical ERC-721 event definition for transfer decoding
//!
//! ERC-721 reuses the ERC-20 `Transfer(address,address,uint256)` signature but
//! indexes all three arguments, so a log carries four topics:
//!
//! - topic0: event signature hash
//! - topic1: `from` (left-padded to 32 bytes)
//! - topic2: `to` (left-padded to 32 bytes)
//! - topic3: `tokenId` (32-byte big-endian)
//!
//! and an empty data section. An ERC-20 log with the same topic0 has only
//! three topics and fails to decode as [`Transfer`].
//!
//! # Example
//!
//! ```rust,ignore
//! use holdscan::events::Transfer;
//! use alloy_sol_types::SolEvent;
//!
//! for log in provider.get_logs(&filter).await? {
//!     match Transfer::decode_log(&log.inner) {
//!         Ok(event) => println!("{} -> {} (#{})", event.from, event.to, event.tokenId),
//!         Err(e) => eprintln!("Failed to decode: {e}"),
//!     }
//! }
//! ```

use std::fmt::Debug;

use alloy_sol_types::sol;

sol! {
    /// ERC-721 Transfer event
    ///
    /// Emitted on every ownership change, including:
    /// - Minting (from = 0x0)
    /// - Burning (to = 0x0)
    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
}

impl Debug for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transfer(from: {}, to: {}, tokenId: {})",
            self.from, self.to, self.tokenId
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::TRANSFER_TOPIC0;
    use alloy_primitives::{address, Address, Bytes, LogData, B256, U256};
    use alloy_sol_types::SolEvent;

    fn topic_for(address: Address) -> B256 {
        address.into_word()
    }

    #[test]
    fn test_signature_hash_is_transfer_topic() {
        assert_eq!(Transfer::SIGNATURE_HASH, TRANSFER_TOPIC0);
    }

    #[test]
    fn test_decodes_four_topic_log() {
        let from = address!("1111111111111111111111111111111111111111");
        let to = address!("2222222222222222222222222222222222222222");
        let token_id = U256::from(1u64) << 200;

        let log = alloy_primitives::Log {
            address: address!("9be117c8f9a2a11b6ee1b7e0f4a5eb1f2bb9a7c1"),
            data: LogData::new_unchecked(
                vec![
                    TRANSFER_TOPIC0,
                    topic_for(from),
                    topic_for(to),
                    B256::from(token_id),
                ],
                Bytes::new(),
            ),
        };

        let event = Transfer::decode_log(&log).unwrap();
        assert_eq!(event.from, from);
        assert_eq!(event.to, to);
        assert_eq!(event.tokenId, token_id);
    }

    #[test]
    fn test_erc20_shaped_log_is_rejected() {
        let log = alloy_primitives::Log {
            address: Address::ZERO,
            data: LogData::new_unchecked(
                vec![TRANSFER_TOPIC0, B256::ZERO, B256::ZERO],
                Bytes::from(vec![0u8; 32]),
            ),
        };

        assert!(Transfer::decode_log(&log).is_err());
    }
}
