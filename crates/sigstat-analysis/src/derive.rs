// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message derived values.
//!
//! Computed on demand from a [`Message`]; never stored on it.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use sigstat_core::{Direction, Message};

use crate::emoji::extract_emoji;

/// Values derived from one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedColumns {
    pub id: String,
    pub direction: Direction,
    /// Whitespace-separated words in the body.
    pub words: usize,
    /// Unicode scalar values in the body.
    pub characters: usize,
    /// Whether the body is non-empty.
    pub has_text: bool,
    /// Hours since local midnight, `h + m/60 + s/3600`.
    pub time_of_day: f64,
    /// Monday = 0 .. Sunday = 6.
    pub weekday: u32,
    /// Emoji in order of appearance.
    pub emoji: Vec<String>,
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn character_count(text: &str) -> usize {
    text.chars().count()
}

pub fn time_of_day(t: NaiveDateTime) -> f64 {
    f64::from(t.hour()) + f64::from(t.minute()) / 60.0 + f64::from(t.second()) / 3600.0
}

pub fn weekday_index(t: NaiveDateTime) -> u32 {
    t.weekday().num_days_from_monday()
}

/// Derive the columns for one message.
pub fn derive(message: &Message) -> DerivedColumns {
    let text = message.text();
    DerivedColumns {
        id: message.id.clone(),
        direction: message.direction,
        words: word_count(text),
        characters: character_count(text),
        has_text: !text.is_empty(),
        time_of_day: time_of_day(message.sent_at),
        weekday: weekday_index(message.sent_at),
        emoji: extract_emoji(text),
    }
}

/// Derive the columns for every message, in input order.
pub fn derive_columns(messages: &[Message]) -> Vec<DerivedColumns> {
    messages.iter().map(derive).collect()
}
