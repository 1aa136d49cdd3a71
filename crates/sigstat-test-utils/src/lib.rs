// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for sigstat integration tests.
//!
//! # Components
//!
//! - [`FixtureStore`] - Real SQLCipher-encrypted Signal store in a temp directory
//! - [`MessageBuilder`] - Normalized messages for aggregation and dashboard tests
//! - [`MockSource`] - In-memory message source with load counting

pub mod builders;
pub mod fixture;
pub mod mock_source;

pub use builders::{
    MessageBuilder, at, group_conversation, incoming, outgoing, private_conversation,
};
pub use fixture::{FIXTURE_KEY, FixtureConversation, FixtureMessage, FixtureStore};
pub use mock_source::MockSource;
