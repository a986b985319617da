// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Event processing for ERC-721 transfers.
//!
//! This module handles:
//! - The Transfer event definition and its decoding
//! - Filter construction for a collection's transfer logs
//! - Chunked, concurrent, newest-first range scanning

pub mod definitions;
pub mod filter;
pub mod scanner;

pub use definitions::Transfer;
pub use filter::TransferFilterBuilder;
pub use scanner::{RangeScanReport, RangeScanner, ScanTolerance};
