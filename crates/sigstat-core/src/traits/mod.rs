// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the store and its consumers.
//!
//! Traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod source;

pub use source::MessageSource;
