// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block span resolution for the accrual window.

pub mod bounds;

pub use bounds::{BoundsResolver, ScanBounds};
