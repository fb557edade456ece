// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence layer for flockcheck.
//!
//! Provides WAL-mode SQLite storage of inspection records with embedded
//! migrations and a single-writer concurrency model via `tokio-rusqlite`,
//! plus a filesystem store for photo attachments.

pub mod adapter;
pub mod attachments;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteRecordStore;
pub use attachments::FsAttachmentStore;
pub use database::Database;
