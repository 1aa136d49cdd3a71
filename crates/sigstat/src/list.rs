// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sigstat list-conversations` command implementation.
//!
//! Prints private conversations, then group conversations, then the total.
//! Colors are used only when stdout is a TTY and `--plain` is not given.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::IsTerminal;

use colored::Colorize;
use sigstat_config::model::SigstatConfig;
use sigstat_core::{Conversation, ConversationId, ConversationType, Message, SigstatError};
use sigstat_store::{SignalStore, fetch_conversations, fetch_messages};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub show_id: bool,
    pub show_message_count: bool,
    pub plain: bool,
}

/// Run the `sigstat list-conversations` command.
pub async fn run_list(config: &SigstatConfig, options: &ListOptions) -> Result<(), SigstatError> {
    debug!("listing all conversations in the store");
    let store = SignalStore::from_config(&config.store);

    let private = fetch_conversations(&store, Some(ConversationType::Private)).await?;
    let group = fetch_conversations(&store, Some(ConversationType::Group)).await?;

    let counts = if options.show_message_count {
        let messages = fetch_messages(
            &store,
            config.store.include_expiring,
            false,
            config.store.on_malformed,
        )
        .await?;
        Some(message_counts(&messages))
    } else {
        None
    };

    let use_color = !options.plain && std::io::stdout().is_terminal();
    print!(
        "{}",
        render_listing(&private, &group, counts.as_ref(), options.show_id, use_color)
    );
    Ok(())
}

pub fn message_counts(messages: &[Message]) -> HashMap<ConversationId, usize> {
    let mut counts = HashMap::new();
    for message in messages {
        *counts.entry(message.conversation_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Render the listing. Group ids are shown base64 encoded.
pub fn render_listing(
    private: &[Conversation],
    group: &[Conversation],
    counts: Option<&HashMap<ConversationId, usize>>,
    show_id: bool,
    use_color: bool,
) -> String {
    let mut out = String::new();
    let heading = |text: &str| {
        if use_color {
            text.white().bold().to_string()
        } else {
            text.to_string()
        }
    };

    let _ = writeln!(out, "{}", heading("Private conversations:"));
    for conversation in private {
        let _ = writeln!(out, "{}", render_line(conversation, counts, show_id, use_color));
    }
    out.push('\n');

    let _ = writeln!(out, "{}", heading("Group conversations:"));
    for conversation in group {
        let _ = writeln!(out, "{}", render_line(conversation, counts, show_id, use_color));
    }
    out.push('\n');

    let total = format!("{} conversations in total.", private.len() + group.len());
    let _ = writeln!(out, "{}", if use_color { total.green().to_string() } else { total });
    out
}

fn render_line(
    conversation: &Conversation,
    counts: Option<&HashMap<ConversationId, usize>>,
    show_id: bool,
    use_color: bool,
) -> String {
    let mut parts = Vec::new();
    parts.push(if use_color { "->".blue().to_string() } else { "->".to_string() });

    if show_id {
        let id = match conversation.kind {
            ConversationType::Private => conversation.id.to_text(),
            ConversationType::Group => conversation.id.to_base64(),
        };
        parts.push(if use_color { id.green().to_string() } else { id });
    }

    parts.push(conversation.name.clone());

    if let Some(members) = &conversation.members {
        parts.push(format!("({} members)", members.len()));
    }

    if let Some(counts) = counts {
        let n = counts.get(&conversation.id).copied().unwrap_or(0);
        let label = format!("[{n} messages]");
        parts.push(if use_color { label.dimmed().to_string() } else { label });
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use sigstat_test_utils::{
        FixtureConversation, FixtureMessage, FixtureStore, MessageBuilder, group_conversation,
        private_conversation,
    };

    use super::*;

    const GROUP_ID: &[u8] = &[0xfb, 0xff, 0x00];

    #[test]
    fn plain_listing_layout() {
        let private = vec![private_conversation("+15550001111", "Alice")];
        let group = vec![group_conversation(GROUP_ID, "Climbing", &["+1", "+2", "+3"])];
        let messages = vec![
            MessageBuilder::new(sigstat_core::Direction::Incoming, "2024-01-01 10:00:00").build(),
            MessageBuilder::new(sigstat_core::Direction::Outgoing, "2024-01-01 10:01:00").build(),
        ];
        let counts = message_counts(&messages);

        let text = render_listing(&private, &group, Some(&counts), true, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Private conversations:",
                "-> +15550001111 Alice [2 messages]",
                "",
                "Group conversations:",
                "-> +/8A Climbing (3 members) [0 messages]",
                "",
                "2 conversations in total.",
            ]
        );
    }

    #[test]
    fn ids_and_counts_can_be_hidden() {
        let private = vec![private_conversation("+15550001111", "Alice")];
        let text = render_listing(&private, &[], None, false, false);
        assert!(text.contains("-> Alice\n"));
        assert!(!text.contains("messages]"));
        assert!(text.contains("1 conversations in total."));
    }

    #[test]
    fn empty_store_lists_nothing() {
        let text = render_listing(&[], &[], None, false, false);
        assert!(text.contains("0 conversations in total."));
    }

    #[tokio::test]
    async fn lists_fixture_store() {
        let fixture = FixtureStore::builder()
            .conversation(FixtureConversation::private("+15550001111", "Alice"))
            .message(FixtureMessage::incoming("m1", b"+15550001111", 1_600_000_000_000).with_body("hi"))
            .build()
            .unwrap();
        let config = SigstatConfig {
            store: fixture.store_config(),
            ..SigstatConfig::default()
        };

        let options = ListOptions {
            show_id: true,
            show_message_count: true,
            plain: true,
        };
        run_list(&config, &options).await.unwrap();
    }
}
