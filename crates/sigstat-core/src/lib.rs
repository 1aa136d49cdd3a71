// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for sigstat.
//!
//! This crate provides the error taxonomy, the domain types read from the
//! Signal Desktop store, and the [`MessageSource`] trait that decouples the
//! refresh cache from the encrypted store.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SigstatError;
pub use traits::MessageSource;
pub use types::{
    AttachmentDescriptor, Conversation, ConversationId, ConversationType, Direction, Message,
    MessagePayload,
};
