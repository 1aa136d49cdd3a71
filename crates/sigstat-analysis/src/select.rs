// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message selection by direction and conversation.

use sigstat_core::{ConversationId, Message};

/// Split into (incoming, outgoing), each in input order.
pub fn split_by_direction(messages: &[Message]) -> (Vec<&Message>, Vec<&Message>) {
    messages.iter().partition(|m| m.is_incoming())
}

/// Messages of one conversation, or all of them when `conversation` is `None`.
pub fn for_conversation(messages: &[Message], conversation: Option<&ConversationId>) -> Vec<Message> {
    match conversation {
        Some(id) => messages
            .iter()
            .filter(|m| &m.conversation_id == id)
            .cloned()
            .collect(),
        None => messages.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use sigstat_core::Direction;
    use sigstat_test_utils::{MessageBuilder, incoming, outgoing};

    use super::*;

    #[test]
    fn split_keeps_order() {
        let messages = vec![
            incoming("2024-01-01 10:00:00", "a"),
            outgoing("2024-01-01 10:01:00", "b"),
            incoming("2024-01-01 10:02:00", "c"),
        ];
        let (inc, out) = split_by_direction(&messages);
        let inc: Vec<&str> = inc.iter().map(|m| m.text()).collect();
        assert_eq!(inc, ["a", "c"]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn filters_by_conversation() {
        let messages = vec![
            MessageBuilder::new(Direction::Incoming, "2024-01-01 10:00:00")
                .conversation("+1")
                .build(),
            MessageBuilder::new(Direction::Incoming, "2024-01-01 10:01:00")
                .conversation("+2")
                .build(),
        ];
        let id = ConversationId::from("+2");
        assert_eq!(for_conversation(&messages, Some(&id)).len(), 1);
        assert_eq!(for_conversation(&messages, None).len(), 2);
    }

    #[test]
    fn empty_input_selects_nothing() {
        let (inc, out) = split_by_direction(&[]);
        assert!(inc.is_empty() && out.is_empty());
        assert!(for_conversation(&[], None).is_empty());
    }
}
