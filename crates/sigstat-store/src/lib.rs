// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only access to the encrypted Signal Desktop store.
//!
//! Resolves the database key from the store's `config.json`, opens scoped
//! SQLCipher connections through `tokio-rusqlite`, normalizes message rows
//! into typed values, writes raw SQL dumps, and caches the message table
//! behind a staleness threshold.

pub mod cache;
pub mod cipher;
pub mod database;
pub mod dump;
pub mod key;
pub mod normalize;
pub mod queries;
pub mod source;

pub use cache::RefreshCache;
pub use cipher::CipherParams;
pub use database::SignalStore;
pub use dump::{DumpSummary, dump_raw};
pub use key::resolve_key;
pub use normalize::{RawMessageRow, millis_to_local};
pub use queries::conversations::{fetch_conversations, fetch_conversations_of_type};
pub use queries::messages::{fetch_messages, fetch_raw_messages};
pub use source::StoreSource;
