//! Filter builder for a collection's transfer logs
//!
//! Hides topic layout behind a small builder, so callers say what they want
//! ("transfers of this collection in these blocks") rather than which topic
//! slot holds what.
//!
//! ```rust,ignore
//! use holdscan::events::TransferFilterBuilder;
//!
//! let filter = TransferFilterBuilder::for_collection(contract)
//!     .in_block_range(from_block, to_block)
//!     .build();
//! let logs = provider.get_logs(&filter).await?;
//! ```

use alloy_primitives::{Address, BlockNumber};
use alloy_rpc_types::Filter;
use alloy_sol_types::SolEvent;

use super::definitions::Transfer;

/// Builder for ERC-721 `Transfer` log filters
#[derive(Debug, Clone)]
pub struct TransferFilterBuilder {
    collection: Address,
    from_block: Option<BlockNumber>,
    to_block: Option<BlockNumber>,
}

impl TransferFilterBuilder {
    /// Transfers emitted by `collection`
    pub fn for_collection(collection: Address) -> Self {
        Self {
            collection,
            from_block: None,
            to_block: None,
        }
    }

    /// Restrict to the inclusive range `[from_block, to_block]`
    pub fn in_block_range(mut self, from_block: BlockNumber, to_block: BlockNumber) -> Self {
        self.from_block = Some(from_block);
        self.to_block = Some(to_block);
        self
    }

    pub fn build(self) -> Filter {
        let mut filter = Filter::new()
            .address(self.collection)
            .event_signature(Transfer::SIGNATURE_HASH);

        if let Some(from_block) = self.from_block {
            filter = filter.from_block(from_block);
        }
        if let Some(to_block) = self.to_block {
            filter = filter.to_block(to_block);
        }

        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const COLLECTION: Address = address!("9be117c8f9a2a11b6ee1b7e0f4a5eb1f2bb9a7c1");

    #[test]
    fn test_filter_targets_collection_and_signature() {
        let filter = TransferFilterBuilder::for_collection(COLLECTION).build();

        assert!(filter.address.matches(&COLLECTION));
        assert!(filter.topics[0].matches(&Transfer::SIGNATURE_HASH));
        // Sender, recipient and token id are left open
        assert!(filter.topics[1].is_empty());
        assert!(filter.topics[2].is_empty());
        assert!(filter.topics[3].is_empty());
    }

    #[test]
    fn test_block_range_is_inclusive() {
        let filter = TransferFilterBuilder::for_collection(COLLECTION)
            .in_block_range(100, 3099)
            .build();

        assert_eq!(filter.get_from_block(), Some(100));
        assert_eq!(filter.get_to_block(), Some(3099));
    }

    #[test]
    fn test_no_range_until_requested() {
        let filter = TransferFilterBuilder::for_collection(COLLECTION).build();

        assert_eq!(filter.get_from_block(), None);
        assert_eq!(filter.get_to_block(), None);
    }
}
