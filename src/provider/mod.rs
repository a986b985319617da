// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC provider construction
//!
//! The raw-log source only needs `eth_blockNumber`, `eth_getLogs` and
//! `eth_getBlockByNumber`, so a plain Ethereum-typed [`RootProvider`] without
//! fillers is enough for any EVM chain.
//!
//! # Example
//!
//! ```rust,ignore
//! use holdscan::provider::{create_http_provider, ProviderConfig};
//! use holdscan::transport::RequestPacer;
//! use std::time::Duration;
//!
//! let provider = create_http_provider(
//!     ProviderConfig::new("https://rpc.hyperliquid.xyz/evm")
//!         .with_pacer(RequestPacer::new(Duration::from_millis(120))),
//! )?;
//! ```
//!
//! [`RootProvider`]: alloy_provider::RootProvider

mod config;
mod factory;

pub use config::ProviderConfig;
pub use factory::create_http_provider;

use alloy_network::Ethereum;

/// HTTP provider returned by [`create_http_provider`]
pub type HttpProvider = alloy_provider::RootProvider<Ethereum>;
