// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules for flockcheck-storage.
//!
//! Each function takes `&Database` and goes through `connection().call(...)`.

pub mod records;
