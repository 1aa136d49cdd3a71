// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation segmentation and who starts each segment.

use std::time::Duration;

use chrono::TimeDelta;
use serde::Serialize;
use sigstat_core::{Direction, Message};
use strum::Display;

/// Who sent the first message of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum Starter {
    /// The local user (outgoing).
    Me,
    /// Anyone else (incoming).
    Other,
}

impl From<Direction> for Starter {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Outgoing => Self::Me,
            Direction::Incoming => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarterCount {
    pub starter: Starter,
    pub count: u64,
}

/// Split sent-time-ordered messages into segments.
///
/// A new segment starts whenever the gap to the previous message is at
/// least `gap`.
pub fn conversation_segments(messages: &[Message], gap: Duration) -> Vec<&[Message]> {
    let gap = TimeDelta::from_std(gap).unwrap_or(TimeDelta::MAX);
    let mut segments = Vec::new();
    let mut start = 0;
    for i in 1..messages.len() {
        if messages[i].sent_at - messages[i - 1].sent_at >= gap {
            segments.push(&messages[start..i]);
            start = i;
        }
    }
    if !messages.is_empty() {
        segments.push(&messages[start..]);
    }
    segments
}

/// Segments started by each side, most frequent first. Sides that started
/// no segment are left out.
pub fn conversation_starters(messages: &[Message], gap: Duration) -> Vec<StarterCount> {
    let (mut me, mut other) = (0u64, 0u64);
    for segment in conversation_segments(messages, gap) {
        match Starter::from(segment[0].direction) {
            Starter::Me => me += 1,
            Starter::Other => other += 1,
        }
    }

    let mut counts: Vec<StarterCount> = [(Starter::Me, me), (Starter::Other, other)]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(starter, count)| StarterCount { starter, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use sigstat_test_utils::{incoming, outgoing};

    use super::*;

    const GAP: Duration = Duration::from_secs(90 * 60);

    #[test]
    fn gap_splits_segments() {
        let messages = vec![
            outgoing("2024-01-01 09:00:00", "morning"),
            incoming("2024-01-01 09:10:00", "hi"),
            incoming("2024-01-01 12:00:00", "lunch?"),
            outgoing("2024-01-01 12:01:00", "sure"),
            outgoing("2024-01-01 20:00:00", "dinner?"),
        ];
        let segments = conversation_segments(&messages, GAP);
        let sizes: Vec<usize> = segments.iter().map(|s| s.len()).collect();
        assert_eq!(sizes, [2, 2, 1]);

        let starters = conversation_starters(&messages, GAP);
        assert_eq!(
            starters,
            [
                StarterCount { starter: Starter::Me, count: 2 },
                StarterCount { starter: Starter::Other, count: 1 },
            ]
        );
    }

    #[test]
    fn exact_gap_starts_new_segment() {
        let messages = vec![
            incoming("2024-01-01 09:00:00", "a"),
            outgoing("2024-01-01 10:30:00", "b"),
        ];
        assert_eq!(conversation_segments(&messages, GAP).len(), 2);
    }

    #[test]
    fn single_message_is_one_segment() {
        let messages = vec![incoming("2024-01-01 09:00:00", "a")];
        assert_eq!(conversation_segments(&messages, GAP).len(), 1);
        assert_eq!(
            conversation_starters(&messages, GAP),
            [StarterCount { starter: Starter::Other, count: 1 }]
        );
    }

    #[test]
    fn starter_labels() {
        assert_eq!(Starter::Me.to_string(), "Me");
        assert_eq!(Starter::Other.to_string(), "Other");
    }

    #[test]
    fn empty_input_has_no_segments() {
        assert!(conversation_segments(&[], GAP).is_empty());
        assert!(conversation_starters(&[], GAP).is_empty());
    }
}
