// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Day-of-week and time-of-day distributions.

use serde::Serialize;
use sigstat_core::{Direction, Message};

use crate::derive::{time_of_day, weekday_index};

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Counts for one bucket (weekday or hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: u32,
    pub incoming: u64,
    pub outgoing: u64,
}

fn bucketed(messages: &[Message], buckets: u32, key: impl Fn(&Message) -> u32) -> Vec<BucketCount> {
    if messages.is_empty() {
        return Vec::new();
    }
    let mut counts: Vec<BucketCount> = (0..buckets)
        .map(|bucket| BucketCount {
            bucket,
            incoming: 0,
            outgoing: 0,
        })
        .collect();
    for message in messages {
        let slot = &mut counts[key(message) as usize];
        match message.direction {
            Direction::Incoming => slot.incoming += 1,
            Direction::Outgoing => slot.outgoing += 1,
        }
    }
    counts
}

/// Seven buckets, Monday first. Empty when there are no messages.
pub fn day_of_week_counts(messages: &[Message]) -> Vec<BucketCount> {
    bucketed(messages, 7, |m| weekday_index(m.sent_at))
}

/// Twenty-four hourly buckets. Empty when there are no messages.
pub fn time_of_day_counts(messages: &[Message]) -> Vec<BucketCount> {
    bucketed(messages, 24, |m| (time_of_day(m.sent_at) as u32).min(23))
}

/// Raw time-of-day values per direction, for client-side binning.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeOfDayValues {
    pub incoming: Vec<f64>,
    pub outgoing: Vec<f64>,
}

pub fn time_of_day_values(messages: &[Message]) -> TimeOfDayValues {
    let mut values = TimeOfDayValues::default();
    for message in messages {
        let t = time_of_day(message.sent_at);
        match message.direction {
            Direction::Incoming => values.incoming.push(t),
            Direction::Outgoing => values.outgoing.push(t),
        }
    }
    values
}
