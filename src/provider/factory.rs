// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider factory for the raw-log source

use alloy_network::Ethereum;
use alloy_provider::ProviderBuilder;
use alloy_rpc_client::ClientBuilder;
use alloy_transport_http::Http;

use crate::errors::RpcError;
use crate::transport::{BackoffPolicy, PaceLayer, RequestPacer, RetryLayer};

use super::config::ProviderConfig;
use super::HttpProvider;

/// Create an HTTP provider with the given configuration
///
/// Every request passes through a [`RetryLayer`] (outermost) and a
/// [`PaceLayer`], so each retry attempt is paced as well. Unset options fall
/// back to "no retries" and "no pacing".
///
/// # Examples
///
/// ```rust,ignore
/// use holdscan::provider::{create_http_provider, ProviderConfig};
/// use holdscan::transport::BackoffPolicy;
///
/// let provider = create_http_provider(
///     ProviderConfig::new("https://rpc.hyperliquid.xyz/evm")
///         .with_backoff(BackoffPolicy::default())
/// )?;
/// let head = provider.get_block_number().await?;
/// ```
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed or the HTTP client cannot be
/// constructed.
pub fn create_http_provider(config: ProviderConfig) -> Result<HttpProvider, RpcError> {
    let url: url::Url = config
        .url
        .parse()
        .map_err(|e| RpcError::ProviderUrlInvalid(format!("{}: {e}", config.url)))?;

    let mut http_client = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        http_client = http_client.timeout(timeout);
    }
    let http_client = http_client
        .build()
        .map_err(|e| RpcError::HttpClient(e.to_string()))?;

    let is_local = alloy_transport::utils::guess_local_url(url.as_str());
    let transport = Http::with_client(http_client, url);

    let retry = RetryLayer::new(config.backoff.clone().unwrap_or_else(BackoffPolicy::none));
    let pace = PaceLayer::new(config.pacer.clone().unwrap_or_else(RequestPacer::unpaced));

    let client = ClientBuilder::default()
        .layer(retry)
        .layer(pace)
        .transport(transport, is_local);

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .network::<Ethereum>()
        .connect_client(client))
}
