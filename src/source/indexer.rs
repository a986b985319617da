// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Etherscan-compatible explorer client (`module=account&action=tokennfttx`)

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, Instrument};
use url::Url;

use crate::config::LeaderboardConfig;
use crate::errors::SourceError;
use crate::tracing::spans;
use crate::transport::{retry_with_backoff, BackoffPolicy, RequestPacer};
use crate::types::time::UnixTimestamp;
use crate::types::token::TokenId;
use crate::types::transfer::{ChainPosition, TransferEvent};

use super::{SortOrder, TransferIndex};

/// Messages an explorer uses for "this page is empty".
const EMPTY_RESULT_MARKERS: [&str; 3] = ["no records", "no transactions", "no token transfers"];

/// Settings for [`ExplorerClient`]
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// API root, e.g. `https://hyperliquid.cloud.blockscout.com/api`
    pub api_base: Url,
    pub api_key: Option<String>,
    pub contract: Address,
    pub timeout: Duration,
    pub backoff: BackoffPolicy,
    pub pacer: RequestPacer,
}

impl ExplorerConfig {
    pub fn new(api_base: Url, contract: Address) -> Self {
        Self {
            api_base,
            api_key: None,
            contract,
            timeout: Duration::from_secs(30),
            backoff: BackoffPolicy::default(),
            pacer: RequestPacer::unpaced(),
        }
    }

    /// Explorer settings for a run, sharing `pacer` with other clients.
    pub fn for_run(run: &LeaderboardConfig, pacer: RequestPacer) -> Self {
        Self {
            api_base: run.explorer_api_base.clone(),
            api_key: run.explorer_api_key.clone(),
            contract: run.contract,
            timeout: run.request_timeout,
            backoff: run.backoff.clone(),
            pacer,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_pacer(mut self, pacer: RequestPacer) -> Self {
        self.pacer = pacer;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    /// An array of rows on success, a string on most errors
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferRow {
    block_number: Numberish,
    time_stamp: Numberish,
    from: String,
    to: String,
    #[serde(rename = "tokenID")]
    token_id: Numberish,
    #[serde(default)]
    log_index: Option<Numberish>,
}

/// Explorers disagree on whether numeric fields are JSON strings or numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numberish {
    Text(String),
    Number(u64),
}

impl Numberish {
    fn as_u64(&self, field: &str) -> Result<u64, String> {
        match self {
            Numberish::Number(n) => Ok(*n),
            Numberish::Text(s) => {
                let s = s.trim();
                let parsed = match s.strip_prefix("0x") {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => s.parse::<u64>(),
                };
                parsed.map_err(|e| format!("{field} {s:?}: {e}"))
            }
        }
    }

    fn as_token_id(&self) -> Result<TokenId, String> {
        match self {
            Numberish::Number(n) => Ok(TokenId::from(*n)),
            Numberish::Text(s) if s.trim().is_empty() => Err("empty tokenID".to_string()),
            Numberish::Text(s) => {
                TokenId::from_str(s.trim()).map_err(|e| format!("tokenID {s:?}: {e}"))
            }
        }
    }
}

impl TransferRow {
    fn into_event(self) -> Result<TransferEvent, String> {
        let block_number = self.block_number.as_u64("blockNumber")?;
        let timestamp = self.time_stamp.as_u64("timeStamp")?;
        // Rows without a log index sort first within their block
        let log_index = match &self.log_index {
            Some(value) => value.as_u64("logIndex")?,
            None => 0,
        };
        let from = Address::from_str(self.from.trim()).map_err(|e| format!("from {:?}: {e}", self.from))?;
        let to = Address::from_str(self.to.trim()).map_err(|e| format!("to {:?}: {e}", self.to))?;

        Ok(TransferEvent {
            position: ChainPosition::new(block_number, log_index),
            timestamp: UnixTimestamp::new(timestamp),
            from,
            to,
            token_id: self.token_id.as_token_id()?,
        })
    }
}

/// Client for an explorer's NFT transfer index
///
/// Each page request is paced through the shared [`RequestPacer`] and retried
/// under the configured [`BackoffPolicy`]. Malformed bodies (HTML error pages,
/// truncated JSON) are retried, never read as "no data".
///
/// # Example
///
/// ```rust,ignore
/// use holdscan::source::{ExplorerClient, ExplorerConfig, SortOrder, TransferIndex};
///
/// let client = ExplorerClient::new(ExplorerConfig::new(api_base, contract))?;
/// let newest = client.transfers_page(1, 100, SortOrder::Descending).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: Client,
    config: ExplorerConfig,
}

impl ExplorerClient {
    pub fn new(config: ExplorerConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::http("building explorer client", e))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// The newest transfer of the collection, if any.
    pub async fn latest_transfer(&self) -> Result<Option<TransferEvent>, SourceError> {
        TransferIndex::latest_transfer(self).await
    }

    fn page_url(&self, page: u32, page_size: u32, sort: SortOrder) -> Url {
        let mut url = self.config.api_base.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("module", "account")
                .append_pair("action", "tokennfttx")
                .append_pair("contractaddress", &format!("{:#x}", self.config.contract))
                .append_pair("page", &page.to_string())
                .append_pair("offset", &page_size.to_string())
                .append_pair("sort", sort.as_query());
            if let Some(key) = &self.config.api_key {
                query.append_pair("apikey", key);
            }
        }
        url
    }

    /// One attempt at a page, without retries.
    async fn fetch_page_once(
        &self,
        operation: &str,
        url: Url,
    ) -> Result<Vec<TransferEvent>, SourceError> {
        self.config.pacer.wait().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::http(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::http(operation, e))?;

        let parsed: ExplorerResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::malformed(operation, e.to_string()))?;

        parse_page(operation, parsed)
    }
}

/// Interpret an explorer envelope as a page of transfers.
fn parse_page(operation: &str, response: ExplorerResponse) -> Result<Vec<TransferEvent>, SourceError> {
    if response.status != "1" {
        let message = response.message.unwrap_or_default();
        let detail = match &response.result {
            serde_json::Value::String(s) => s.clone(),
            _ => String::new(),
        };
        let lowered = format!("{message} {detail}").to_ascii_lowercase();
        if EMPTY_RESULT_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Ok(Vec::new());
        }
        let message = if detail.is_empty() {
            message
        } else {
            format!("{message}: {detail}")
        };
        return Err(SourceError::api(operation, message));
    }

    let rows: Vec<TransferRow> = match response.result {
        serde_json::Value::Null => Vec::new(),
        value => serde_json::from_value(value)
            .map_err(|e| SourceError::malformed(operation, format!("result rows: {e}")))?,
    };

    rows.into_iter()
        .map(|row| {
            row.into_event()
                .map_err(|details| SourceError::malformed(operation, details))
        })
        .collect()
}

#[async_trait]
impl TransferIndex for ExplorerClient {
    async fn transfers_page(
        &self,
        page: u32,
        page_size: u32,
        sort: SortOrder,
    ) -> Result<Vec<TransferEvent>, SourceError> {
        let span = spans::fetch_transfer_page(page, page_size, sort);
        let operation = format!("tokennfttx page {page} ({sort})");

        async {
            let rows = retry_with_backoff(&self.config.backoff, &operation, || {
                self.fetch_page_once(&operation, self.page_url(page, page_size, sort))
            })
            .await?;

            debug!(rows = rows.len(), "Fetched transfer page");
            Ok(rows)
        }
        .instrument(span)
        .await
    }
}
