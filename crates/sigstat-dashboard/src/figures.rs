// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plotly figure construction.
//!
//! Each figure is a `{data, layout}` object that plotly.js renders as is.
//! Direction traces are named "Received" (incoming) and "Sent" (outgoing).
//! When a selection holds fewer incoming than outgoing messages the sent
//! trace is drawn first so the larger series stays underneath.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use sigstat_analysis::{
    BucketCount, DailyTotal, Metric, WEEKDAY_NAMES, conversation_starters, daily_totals,
    day_of_week_counts, emoji_usage, messages_per_day, split_by_direction, time_of_day_values,
    words_per_day,
};
use sigstat_core::Message;
use strum::{AsRefStr, Display, EnumIter, EnumString};

const RECEIVED: &str = "Received";
const SENT: &str = "Sent";

/// Figures served by the dashboard, addressed by their kebab-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum FigureKind {
    MessagesPerDay,
    WordsPerDay,
    /// Per-day totals of the selected [`Metric`].
    Timeline,
    DayOfWeek,
    TimeOfDay,
    ConversationStarters,
    EmojiUse,
}

/// A plotly figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

/// Build one figure from a message selection.
///
/// `metric` only affects [`FigureKind::Timeline`]; `gap` only affects
/// [`FigureKind::ConversationStarters`].
pub fn build_figure(kind: FigureKind, messages: &[Message], metric: Metric, gap: Duration) -> Figure {
    match kind {
        FigureKind::MessagesPerDay => {
            daily_figure(messages, &messages_per_day(messages), "Messages per day")
        }
        FigureKind::WordsPerDay => daily_figure(messages, &words_per_day(messages), "Words per day"),
        FigureKind::Timeline => daily_figure(
            messages,
            &daily_totals(messages, metric),
            &format!("{} per day", metric.label()),
        ),
        FigureKind::DayOfWeek => day_of_week_figure(messages),
        FigureKind::TimeOfDay => time_of_day_figure(messages),
        FigureKind::ConversationStarters => starters_figure(messages, gap),
        FigureKind::EmojiUse => emoji_figure(messages),
    }
}

/// Order the direction traces: received first unless it is the smaller series.
fn directed(messages: &[Message], received: Value, sent: Value) -> Vec<Value> {
    let (incoming, outgoing) = split_by_direction(messages);
    if incoming.len() < outgoing.len() {
        vec![sent, received]
    } else {
        vec![received, sent]
    }
}

fn date_axis() -> Value {
    json!({
        "title": {"text": "Date"},
        "type": "date",
        "rangeselector": {
            "buttons": [
                {"count": 1, "label": "1m", "step": "month", "stepmode": "backward"},
                {"count": 6, "label": "6m", "step": "month", "stepmode": "backward"},
                {"step": "all"},
            ]
        },
        "rangeslider": {"visible": true},
    })
}

fn daily_figure(messages: &[Message], totals: &[DailyTotal], title: &str) -> Figure {
    let days: Vec<String> = totals.iter().map(|d| d.day.format("%Y-%m-%d").to_string()).collect();
    let trace = |name: &str, values: Vec<u64>| {
        json!({"type": "bar", "name": name, "x": days, "y": values, "opacity": 0.5})
    };
    let received = trace(RECEIVED, totals.iter().map(|d| d.incoming).collect());
    let sent = trace(SENT, totals.iter().map(|d| d.outgoing).collect());

    Figure {
        data: directed(messages, received, sent),
        layout: json!({
            "title": {"text": title},
            "xaxis": date_axis(),
            "barmode": "overlay",
        }),
    }
}

fn bucket_traces(messages: &[Message], labels: &[String], counts: &[BucketCount]) -> Vec<Value> {
    let trace = |name: &str, values: Vec<u64>| {
        json!({"type": "bar", "name": name, "x": labels, "y": values})
    };
    let received = trace(RECEIVED, counts.iter().map(|b| b.incoming).collect());
    let sent = trace(SENT, counts.iter().map(|b| b.outgoing).collect());
    directed(messages, received, sent)
}

fn day_of_week_figure(messages: &[Message]) -> Figure {
    let counts = day_of_week_counts(messages);
    let labels: Vec<String> = WEEKDAY_NAMES
        .iter()
        .take(counts.len())
        .map(|d| d.to_string())
        .collect();
    Figure {
        data: bucket_traces(messages, &labels, &counts),
        layout: json!({
            "title": {"text": "Messages per day of the week"},
            "xaxis": {"type": "category"},
            "bargap": 0.2,
            "bargroupgap": 0.0,
        }),
    }
}

fn time_of_day_figure(messages: &[Message]) -> Figure {
    let values = time_of_day_values(messages);
    let trace = |name: &str, x: &[f64]| {
        json!({
            "type": "histogram",
            "name": name,
            "x": x,
            "xbins": {"start": 0, "end": 24, "size": 1},
            "opacity": 0.5,
        })
    };
    Figure {
        data: directed(
            messages,
            trace(RECEIVED, &values.incoming),
            trace(SENT, &values.outgoing),
        ),
        layout: json!({
            "title": {"text": "Messages per time of day"},
            "xaxis": {"title": {"text": "Hour"}, "range": [0, 24], "dtick": 1},
            "barmode": "overlay",
        }),
    }
}

fn starters_figure(messages: &[Message], gap: Duration) -> Figure {
    let starters = conversation_starters(messages, gap);
    let labels: Vec<String> = starters.iter().map(|s| s.starter.to_string()).collect();
    let values: Vec<u64> = starters.iter().map(|s| s.count).collect();
    Figure {
        data: vec![json!({"type": "pie", "labels": labels, "values": values})],
        layout: json!({"title": {"text": "Conversation starter"}}),
    }
}

fn emoji_figure(messages: &[Message]) -> Figure {
    let usage = emoji_usage(messages);
    let emoji: Vec<&str> = usage.iter().map(|e| e.emoji.as_str()).collect();
    let trace = |name: &str, values: Vec<u64>| {
        json!({"type": "bar", "name": name, "x": emoji, "y": values})
    };
    Figure {
        data: vec![
            trace(RECEIVED, usage.iter().map(|e| e.incoming).collect()),
            trace(SENT, usage.iter().map(|e| e.outgoing).collect()),
        ],
        layout: json!({
            "title": {"text": "Emoji used"},
            "bargap": 0.2,
            "bargroupgap": 0.0,
        }),
    }
}
