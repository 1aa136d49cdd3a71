// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for normalized [`Message`] and [`Conversation`] values.

use chrono::NaiveDateTime;
use sigstat_core::{Conversation, ConversationId, ConversationType, Direction, Message, MessagePayload};

/// Parse `YYYY-MM-DD HH:MM:SS`. Panics on bad input; test use only.
pub fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|e| panic!("bad fixture time `{text}`: {e}"))
}

/// Builder for a normalized message.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    pub fn new(direction: Direction, sent_at: &str) -> Self {
        Self::at_time(direction, at(sent_at))
    }

    pub fn at_time(direction: Direction, sent_at: NaiveDateTime) -> Self {
        Self {
            message: Message {
                id: format!("msg-{}", sent_at.and_utc().timestamp_millis()),
                conversation_id: ConversationId::from("+15550001111"),
                sent_at,
                received_at: sent_at,
                source: None,
                direction,
                body: None,
                has_attachments: false,
                payload: MessagePayload {
                    sent_at: Some(sent_at),
                    received_at: Some(sent_at),
                    timestamp: Some(sent_at),
                    ..MessagePayload::default()
                },
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.message.id = id.to_string();
        self
    }

    pub fn conversation(mut self, id: &str) -> Self {
        self.message.conversation_id = ConversationId::from(id);
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.message.body = Some(body.to_string());
        self
    }

    pub fn received_at(mut self, received_at: &str) -> Self {
        self.message.received_at = at(received_at);
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}

/// Incoming message with a body.
pub fn incoming(sent_at: &str, body: &str) -> Message {
    MessageBuilder::new(Direction::Incoming, sent_at).body(body).build()
}

/// Outgoing message with a body.
pub fn outgoing(sent_at: &str, body: &str) -> Message {
    MessageBuilder::new(Direction::Outgoing, sent_at).body(body).build()
}

pub fn private_conversation(id: &str, name: &str) -> Conversation {
    Conversation {
        id: ConversationId::from(id),
        name: name.to_string(),
        kind: ConversationType::Private,
        members: None,
    }
}

pub fn group_conversation(id: &[u8], name: &str, members: &[&str]) -> Conversation {
    Conversation {
        id: ConversationId(id.to_vec()),
        name: name.to_string(),
        kind: ConversationType::Group,
        members: Some(members.iter().map(|m| m.to_string()).collect()),
    }
}
