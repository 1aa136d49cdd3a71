// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types read from the Signal Desktop store.
//!
//! All types here are produced by a fetch and never mutated afterwards.
//! Derived values (word counts, weekdays, emoji) live in `sigstat-analysis`.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};

use crate::error::SigstatError;

/// Opaque conversation identifier, stored as a BLOB in the database.
///
/// Private conversations use a printable identifier (phone number or UUID);
/// group identifiers may be arbitrary bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub Vec<u8>);

impl ConversationId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Base64 rendering, used when listing group conversations.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    /// Text rendering: the UTF-8 contents when valid, base64 otherwise.
    pub fn to_text(&self) -> String {
        match std::str::from_utf8(&self.0) {
            Ok(s) => s.to_string(),
            Err(_) => self.to_base64(),
        }
    }

    /// Whether this id matches a textual id as produced by [`to_text`](Self::to_text)
    /// or [`to_base64`](Self::to_base64).
    pub fn matches_text(&self, text: &str) -> bool {
        self.0 == text.as_bytes() || self.to_base64() == text
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for ConversationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

/// Kind of conversation as recorded in the `conversations.type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    /// Two-party conversation.
    Private,
    /// Multi-party conversation.
    Group,
}

impl ConversationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for ConversationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationType {
    type Err = SigstatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "group" => Ok(Self::Group),
            other => Err(SigstatError::InvalidFilter(other.to_string())),
        }
    }
}

/// A conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub id: ConversationId,
    /// Explicit name, falling back to the profile name, then to the id.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConversationType,
    /// Member addresses, present for group conversations only.
    pub members: Option<Vec<String>>,
}

/// Whether a message was received or sent by the local user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Attachment descriptor nested in a message payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    /// Path relative to the store's `attachments.noindex` directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Keys not listed above, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The structured `json` column of a message.
///
/// The known time and flag keys are typed; every other key is kept in
/// `extra` exactly as stored so new fields in the source schema survive
/// an export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decrypted_at: Option<NaiveDateTime>,
    #[serde(
        rename = "expirationStartTimestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_start_timestamp: Option<NaiveDateTime>,
    #[serde(rename = "hasAttachments", skip_serializing_if = "Option::is_none")]
    pub has_attachments: Option<bool>,
    #[serde(
        rename = "hasVisualMediaAttachments",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_visual_media_attachments: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentDescriptor>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A normalized message.
///
/// Times are naive local date-times: the store keeps no timezone, so the
/// whole pipeline interprets epoch milliseconds in the local zone. `sent_at`
/// may be later than `received_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: ConversationId,
    pub sent_at: NaiveDateTime,
    pub received_at: NaiveDateTime,
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub body: Option<String>,
    pub has_attachments: bool,
    #[serde(rename = "json")]
    pub payload: MessagePayload,
}

impl Message {
    /// Body text, or the empty string when the message has none.
    pub fn text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    pub fn is_incoming(&self) -> bool {
        self.direction == Direction::Incoming
    }

    pub fn is_outgoing(&self) -> bool {
        self.direction == Direction::Outgoing
    }
}
