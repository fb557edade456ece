// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for flockcheck integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without a real chat transport.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock channel with event injection and effect capture
//! - [`FlakyRecordStore`] - Record store wrapper that fails on demand
//! - [`TestHarness`] - Controller over a temp database and temp image directory

pub mod flaky_store;
pub mod harness;
pub mod mock_channel;

pub use flaky_store::FlakyRecordStore;
pub use harness::{TestHarness, TestHarnessBuilder, headlines};
pub use mock_channel::MockChannel;
