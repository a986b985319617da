// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for type safety across holdscan.
//!
//! This module provides newtype wrappers for the domain concepts the pipeline
//! passes between stages:
//! - Token ids (full `uint256`, never squeezed through a float)
//! - Chain positions and normalized transfer events
//! - Whole-second timestamps
//! - Configuration values (block ranges)

pub mod config;
pub mod time;
pub mod token;
pub mod transfer;

// Note: Public types are re-exported from lib.rs, not here
