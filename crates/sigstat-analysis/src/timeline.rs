// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-day totals split by direction.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use sigstat_core::{Direction, Message};
use strum::{Display, EnumString};

use crate::derive::{character_count, word_count};

/// Quantity summed per day on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Messages with a non-empty body.
    #[default]
    Messages,
    Words,
    Characters,
}

impl Metric {
    /// Contribution of one message.
    pub fn value(&self, message: &Message) -> u64 {
        let text = message.text();
        let n = match self {
            Self::Messages => usize::from(!text.is_empty()),
            Self::Words => word_count(text),
            Self::Characters => character_count(text),
        };
        n as u64
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Messages => "Messages",
            Self::Words => "Words",
            Self::Characters => "Characters",
        }
    }
}

/// Totals for one calendar day (local time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub incoming: u64,
    pub outgoing: u64,
}

fn per_day(messages: &[Message], value: impl Fn(&Message) -> u64) -> Vec<DailyTotal> {
    let mut days: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for message in messages {
        let entry = days.entry(message.sent_at.date()).or_default();
        match message.direction {
            Direction::Incoming => entry.0 += value(message),
            Direction::Outgoing => entry.1 += value(message),
        }
    }
    days.into_iter()
        .map(|(day, (incoming, outgoing))| DailyTotal {
            day,
            incoming,
            outgoing,
        })
        .collect()
}

/// Sum `metric` per day, days ascending. Days without messages are absent.
pub fn daily_totals(messages: &[Message], metric: Metric) -> Vec<DailyTotal> {
    per_day(messages, |m| metric.value(m))
}

/// Count every message per day, with or without a body.
pub fn messages_per_day(messages: &[Message]) -> Vec<DailyTotal> {
    per_day(messages, |_| 1)
}

/// Sum words per day.
pub fn words_per_day(messages: &[Message]) -> Vec<DailyTotal> {
    daily_totals(messages, Metric::Words)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sigstat_test_utils::{MessageBuilder, incoming, outgoing};

    use super::*;

    fn sample() -> Vec<Message> {
        vec![
            incoming("2024-01-01 09:00:00", "hi there"),
            outgoing("2024-01-01 09:05:00", "hello"),
            MessageBuilder::new(Direction::Outgoing, "2024-01-01 09:06:00").build(),
            incoming("2024-01-03 23:59:59", "late night words here"),
        ]
    }

    #[test]
    fn metric_parses_lowercase_names() {
        assert_eq!(Metric::from_str("words").unwrap(), Metric::Words);
        assert_eq!(Metric::from_str("characters").unwrap(), Metric::Characters);
        assert!(Metric::from_str("bytes").is_err());
        assert_eq!(Metric::Messages.to_string(), "messages");
    }

    #[test]
    fn messages_metric_counts_bodies_only() {
        let totals = daily_totals(&sample(), Metric::Messages);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].day, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!((totals[0].incoming, totals[0].outgoing), (1, 1));
        assert_eq!((totals[1].incoming, totals[1].outgoing), (1, 0));
    }

    #[test]
    fn messages_per_day_counts_everything() {
        let totals = messages_per_day(&sample());
        assert_eq!((totals[0].incoming, totals[0].outgoing), (1, 2));
    }

    #[test]
    fn words_and_characters() {
        let words = words_per_day(&sample());
        assert_eq!((words[0].incoming, words[0].outgoing), (2, 1));
        assert_eq!(words[1].incoming, 4);

        let chars = daily_totals(&sample(), Metric::Characters);
        assert_eq!((chars[0].incoming, chars[0].outgoing), (8, 5));
    }

    #[test]
    fn empty_input_has_no_days() {
        assert!(daily_totals(&[], Metric::Words).is_empty());
        assert!(messages_per_day(&[]).is_empty());
        assert!(words_per_day(&[]).is_empty());
    }
}
