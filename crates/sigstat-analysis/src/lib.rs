// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure aggregations over normalized Signal messages.
//!
//! Nothing here touches the store or the clock. Every function takes a
//! slice of [`sigstat_core::Message`] (ordered by sent time where order
//! matters) and returns an empty result for empty input.

pub mod derive;
pub mod emoji;
pub mod histogram;
pub mod segments;
pub mod select;
pub mod timeline;

pub use derive::{DerivedColumns, derive_columns};
pub use emoji::{EmojiCount, emoji_usage, extract_emoji};
pub use histogram::{
    BucketCount, TimeOfDayValues, WEEKDAY_NAMES, day_of_week_counts, time_of_day_counts,
    time_of_day_values,
};
pub use segments::{Starter, StarterCount, conversation_segments, conversation_starters};
pub use select::{for_conversation, split_by_direction};
pub use timeline::{DailyTotal, Metric, daily_totals, messages_per_day, words_per_day};
