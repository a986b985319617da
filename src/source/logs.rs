// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Raw `eth_getLogs` transfer source

use std::collections::HashMap;

use alloy_primitives::{Address, BlockNumber};
use alloy_provider::Provider;
use alloy_rpc_types::{BlockNumberOrTag, Log};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn, Instrument};

use crate::errors::{RpcError, SourceError};
use crate::events::{Transfer, TransferFilterBuilder};
use crate::tracing::spans;
use crate::types::time::UnixTimestamp;
use crate::types::token::TokenId;
use crate::types::transfer::{ChainPosition, TransferEvent};

use super::TransferLogSource;

/// Transfer logs read directly from a JSON-RPC node
///
/// Retries and pacing belong to the provider's transport (see
/// [`create_http_provider`](crate::provider::create_http_provider)); this type
/// only decodes. Block timestamps come from the log's `blockTimestamp` when
/// the node supplies it, otherwise from `eth_getBlockByNumber`, memoised per
/// block for the lifetime of the source.
pub struct RpcLogSource<P> {
    provider: P,
    contract: Address,
    block_times: Mutex<HashMap<BlockNumber, UnixTimestamp>>,
}

impl<P: Provider> RpcLogSource<P> {
    pub fn new(provider: P, contract: Address) -> Self {
        Self {
            provider,
            contract,
            block_times: Mutex::new(HashMap::new()),
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    async fn block_timestamp(&self, block_number: BlockNumber) -> Result<UnixTimestamp, SourceError> {
        if let Some(ts) = self.block_times.lock().await.get(&block_number) {
            return Ok(*ts);
        }

        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await
            .map_err(|e| RpcError::get_block_failed(block_number, e))?
            .ok_or(RpcError::BlockNotFound { block_number })?;

        let ts = UnixTimestamp::new(block.header.timestamp);
        self.block_times.lock().await.insert(block_number, ts);
        Ok(ts)
    }

    /// Decode one log, or `None` if it is not a live ERC-721 transfer.
    async fn decode(&self, log: &Log) -> Result<Option<TransferEvent>, SourceError> {
        if log.removed {
            return Ok(None);
        }

        let event = match Transfer::decode_log(&log.inner) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = ?e, tx_hash = ?log.transaction_hash, "Failed to decode Transfer log");
                return Ok(None);
            }
        };

        let operation = "eth_getLogs";
        let block_number = log
            .block_number
            .ok_or_else(|| SourceError::malformed(operation, "log without blockNumber"))?;
        let log_index = log
            .log_index
            .ok_or_else(|| SourceError::malformed(operation, "log without logIndex"))?;

        let timestamp = match log.block_timestamp {
            Some(ts) => UnixTimestamp::new(ts),
            None => self.block_timestamp(block_number).await?,
        };

        Ok(Some(TransferEvent {
            position: ChainPosition::new(block_number, log_index),
            timestamp,
            from: event.from,
            to: event.to,
            token_id: TokenId::from(event.tokenId),
        }))
    }
}

#[async_trait]
impl<P: Provider + Send + Sync> TransferLogSource for RpcLogSource<P> {
    async fn latest_block(&self) -> Result<BlockNumber, SourceError> {
        let head = self
            .provider
            .get_block_number()
            .await
            .map_err(RpcError::get_block_number_failed)?;
        Ok(head)
    }

    async fn transfers_in_range(
        &self,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<TransferEvent>, SourceError> {
        let span = spans::fetch_transfer_logs(self.contract, from_block, to_block);

        async {
            let filter = TransferFilterBuilder::for_collection(self.contract)
                .in_block_range(from_block, to_block)
                .build();

            let logs = self
                .provider
                .get_logs(&filter)
                .await
                .map_err(|e| RpcError::get_logs_failed(from_block, to_block, e))?;

            let mut events = Vec::with_capacity(logs.len());
            for log in &logs {
                if let Some(event) = self.decode(log).await? {
                    events.push(event);
                }
            }

            debug!(
                logs = logs.len(),
                transfers = events.len(),
                "Fetched transfer logs"
            );
            Ok(events)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::TRANSFER_TOPIC0;
    use alloy_primitives::{address, Bytes, LogData, B256, U256, U64};
    use alloy_provider::{ProviderBuilder, RootProvider};
    use alloy_transport::mock::Asserter;
    use serde_json::json;

    const CONTRACT: Address = address!("9be117c8f9a2a11b6ee1b7e0f4a5eb1f2bb9a7c1");
    const ALICE: Address = address!("1111111111111111111111111111111111111111");
    const BOB: Address = address!("2222222222222222222222222222222222222222");

    fn source() -> (Asserter, RpcLogSource<RootProvider>) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone());
        (asserter, RpcLogSource::new(provider, CONTRACT))
    }

    fn log(topics: Vec<B256>, data: Bytes, block: u64, log_index: Option<u64>) -> Log {
        Log {
            inner: alloy_primitives::Log {
                address: CONTRACT,
                data: LogData::new_unchecked(topics, data),
            },
            block_hash: Some(B256::with_last_byte(block as u8)),
            block_number: Some(block),
            block_timestamp: None,
            transaction_hash: Some(B256::repeat_byte(0xab)),
            transaction_index: Some(0),
            log_index,
            removed: false,
        }
    }

    fn transfer_log(block: u64, log_index: u64, from: Address, to: Address, token: u64) -> Log {
        let topics = vec![
            TRANSFER_TOPIC0,
            from.into_word(),
            to.into_word(),
            B256::from(U256::from(token)),
        ];
        log(topics, Bytes::new(), block, Some(log_index))
    }

    /// Minimal `eth_getBlockByNumber` result carrying only what decoding reads
    fn block_json(number: u64, timestamp: u64) -> serde_json::Value {
        let zero = B256::ZERO;
        json!({
            "hash": B256::with_last_byte(number as u8),
            "parentHash": zero,
            "sha3Uncles": zero,
            "miner": Address::ZERO,
            "stateRoot": zero,
            "transactionsRoot": zero,
            "receiptsRoot": zero,
            "logsBloom": format!("0x{}", "0".repeat(512)),
            "difficulty": "0x0",
            "number": format!("{number:#x}"),
            "gasLimit": "0x1c9c380",
            "gasUsed": "0x0",
            "timestamp": format!("{timestamp:#x}"),
            "extraData": "0x",
            "mixHash": zero,
            "nonce": "0x0000000000000000",
            "uncles": [],
            "transactions": []
        })
    }

    #[tokio::test]
    async fn test_decodes_live_transfer_logs() {
        let (asserter, source) = source();

        let mut mint = transfer_log(5, 3, Address::ZERO, ALICE, 42);
        mint.block_timestamp = Some(1_755_511_300);

        let mut reorged = transfer_log(5, 4, ALICE, BOB, 42);
        reorged.block_timestamp = Some(1_755_511_300);
        reorged.removed = true;

        // ERC-20 Transfer: same topic0, amount in data instead of a third indexed arg
        let mut fungible = log(
            vec![TRANSFER_TOPIC0, ALICE.into_word(), BOB.into_word()],
            Bytes::from(B256::from(U256::from(1_000u64)).to_vec()),
            5,
            Some(5),
        );
        fungible.block_timestamp = Some(1_755_511_300);

        asserter.push_success(&vec![mint, reorged, fungible]);

        let events = source.transfers_in_range(1, 10).await.unwrap();

        assert_eq!(
            events,
            vec![TransferEvent {
                position: ChainPosition::new(5, 3),
                timestamp: UnixTimestamp::new(1_755_511_300),
                from: Address::ZERO,
                to: ALICE,
                token_id: TokenId::from(42u64),
            }]
        );
    }

    #[tokio::test]
    async fn test_large_token_ids_survive_decoding() {
        let (asserter, source) = source();

        let token_id = U256::from(1u64) << 200;
        let mut transfer = log(
            vec![
                TRANSFER_TOPIC0,
                ALICE.into_word(),
                BOB.into_word(),
                B256::from(token_id),
            ],
            Bytes::new(),
            9,
            Some(0),
        );
        transfer.block_timestamp = Some(1_755_600_000);
        asserter.push_success(&vec![transfer]);

        let events = source.transfers_in_range(9, 9).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].token_id, TokenId::from(token_id));
        assert_eq!((events[0].from, events[0].to), (ALICE, BOB));
    }

    #[tokio::test]
    async fn test_block_timestamp_is_fetched_once_per_block() {
        let (asserter, source) = source();

        asserter.push_success(&vec![
            transfer_log(7, 0, Address::ZERO, ALICE, 1),
            transfer_log(7, 1, Address::ZERO, BOB, 2),
        ]);
        // Only one block response is queued; a second lookup would find the queue empty
        asserter.push_success(&block_json(7, 1_755_520_000));

        let events = source.transfers_in_range(7, 7).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|event| event.timestamp == UnixTimestamp::new(1_755_520_000)));

        // Later ranges reuse the memoised block
        asserter.push_success(&vec![transfer_log(7, 2, ALICE, BOB, 1)]);
        let events = source.transfers_in_range(7, 7).await.unwrap();
        assert_eq!(events[0].timestamp, UnixTimestamp::new(1_755_520_000));
    }

    #[tokio::test]
    async fn test_block_timestamp_prefers_the_log_field() {
        let (asserter, source) = source();

        let mut stamped = transfer_log(8, 0, Address::ZERO, ALICE, 1);
        stamped.block_timestamp = Some(1_755_530_000);
        let unstamped = transfer_log(11, 0, Address::ZERO, BOB, 2);

        asserter.push_success(&vec![stamped, unstamped]);
        asserter.push_success(&block_json(11, 1_755_540_000));

        let events = source.transfers_in_range(8, 11).await.unwrap();
        let timestamps: Vec<_> = events.iter().map(|event| event.timestamp).collect();
        assert_eq!(
            timestamps,
            vec![UnixTimestamp::new(1_755_530_000), UnixTimestamp::new(1_755_540_000)]
        );
    }

    #[tokio::test]
    async fn test_failed_block_lookup_is_an_rpc_error() {
        let (asserter, source) = source();

        asserter.push_success(&vec![transfer_log(7, 0, Address::ZERO, ALICE, 1)]);
        asserter.push_failure_msg("header not found");

        let err = source.transfers_in_range(7, 7).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Rpc(RpcError::GetBlockFailed { block_number: 7, .. })
        ));
    }

    #[tokio::test]
    async fn test_logs_without_position_are_malformed() {
        let (asserter, source) = source();

        let mut no_index = transfer_log(7, 0, Address::ZERO, ALICE, 1);
        no_index.log_index = None;
        no_index.block_timestamp = Some(1_755_520_000);
        asserter.push_success(&vec![no_index]);

        let err = source.transfers_in_range(7, 7).await.unwrap_err();
        assert!(
            matches!(err, SourceError::MalformedResponse { ref details, .. } if details == "log without logIndex")
        );

        let mut no_block = transfer_log(7, 0, Address::ZERO, ALICE, 1);
        no_block.block_number = None;
        asserter.push_success(&vec![no_block]);

        let err = source.transfers_in_range(7, 7).await.unwrap_err();
        assert!(
            matches!(err, SourceError::MalformedResponse { ref details, .. } if details == "log without blockNumber")
        );
    }

    #[tokio::test]
    async fn test_failed_log_fetch_names_the_range() {
        let (asserter, source) = source();
        asserter.push_failure_msg("query returned more than 10000 results");

        let err = source.transfers_in_range(100, 3_099).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Rpc(RpcError::GetLogsFailed {
                from_block: 100,
                to_block: 3_099,
                ..
            })
        ));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_latest_block_reads_chain_head() {
        let (asserter, source) = source();
        asserter.push_success(&U64::from(12_345_678u64));

        assert_eq!(source.latest_block().await.unwrap(), 12_345_678);
        assert_eq!(source.contract(), CONTRACT);
    }
}
