// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer utilities for Alloy providers and the explorer client.
//!
//! # Retries
//!
//! [`RetryLayer`] retries transient JSON-RPC failures with exponential backoff.
//! [`retry_with_backoff`] applies the same [`BackoffPolicy`] to plain HTTP
//! requests.
//!
//! # Pacing
//!
//! [`PaceLayer`] spaces requests by a minimum interval. Share one
//! [`RequestPacer`] between the RPC client and the explorer client to keep both
//! under a single budget.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use holdscan::transport::{BackoffPolicy, PaceLayer, RequestPacer, RetryLayer};
//! use alloy_rpc_client::ClientBuilder;
//! use alloy_provider::ProviderBuilder;
//! use std::time::Duration;
//!
//! let pacer = RequestPacer::new(Duration::from_millis(120));
//! let client = ClientBuilder::default()
//!     .layer(RetryLayer::new(BackoffPolicy::default()))
//!     .layer(PaceLayer::new(pacer))
//!     .http(rpc_url);
//!
//! let provider = ProviderBuilder::new()
//!     .connect_client(client);
//! ```

mod pace;
mod retry;

pub use pace::{PaceLayer, PaceService, RequestPacer};
pub use retry::{retry_with_backoff, BackoffPolicy, RetryLayer, RetryService};
