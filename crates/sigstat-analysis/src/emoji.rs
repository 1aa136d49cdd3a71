// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emoji extraction and usage counts.

use std::collections::HashMap;

use serde::Serialize;
use sigstat_core::{Direction, Message};
use unicode_segmentation::UnicodeSegmentation;

const VARIATION_SELECTOR_16: char = '\u{fe0f}';

/// Emoji in `text`, one entry per grapheme cluster, in order of appearance.
///
/// Whole clusters are matched so skin tones, ZWJ sequences and flags count
/// as one emoji.
pub fn extract_emoji(text: &str) -> Vec<String> {
    text.graphemes(true)
        .filter(|g| is_emoji(g))
        .map(str::to_string)
        .collect()
}

fn is_emoji(grapheme: &str) -> bool {
    if emojis::get(grapheme).is_some() {
        return true;
    }
    // Some senders omit or add the presentation selector.
    let stripped: String = grapheme.chars().filter(|&c| c != VARIATION_SELECTOR_16).collect();
    !stripped.is_empty() && stripped != grapheme && emojis::get(&stripped).is_some()
}

/// How often one emoji was received and sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmojiCount {
    pub emoji: String,
    pub incoming: u64,
    pub outgoing: u64,
    pub total: u64,
}

/// Emoji use per direction, most used first (ties ordered by emoji text).
pub fn emoji_usage(messages: &[Message]) -> Vec<EmojiCount> {
    let mut counts: HashMap<String, (u64, u64)> = HashMap::new();
    for message in messages {
        for emoji in extract_emoji(message.text()) {
            let entry = counts.entry(emoji).or_default();
            match message.direction {
                Direction::Incoming => entry.0 += 1,
                Direction::Outgoing => entry.1 += 1,
            }
        }
    }

    let mut usage: Vec<EmojiCount> = counts
        .into_iter()
        .map(|(emoji, (incoming, outgoing))| EmojiCount {
            emoji,
            incoming,
            outgoing,
            total: incoming + outgoing,
        })
        .collect();
    usage.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.emoji.cmp(&b.emoji)));
    usage
}
