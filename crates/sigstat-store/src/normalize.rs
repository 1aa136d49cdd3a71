// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of raw message rows into typed [`Message`] values.
//!
//! All epoch-millisecond values go through [`millis_to_local`], once, at
//! fetch time. Nothing downstream ever sees a raw timestamp.

use std::str::FromStr;

use chrono::{Local, NaiveDateTime, TimeZone};
use serde_json::{Map, Value};
use sigstat_config::model::MalformedPolicy;
use sigstat_core::{
    AttachmentDescriptor, ConversationId, Direction, Message, MessagePayload, SigstatError,
};
use tracing::warn;

/// A `messages` row exactly as selected, before any conversion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMessageRow {
    pub id: String,
    pub conversation_id: Option<Vec<u8>>,
    pub sent_at: Option<i64>,
    pub received_at: Option<i64>,
    pub source: Option<String>,
    pub has_attachments: Option<i64>,
    /// The `type` column.
    pub kind: Option<String>,
    pub body: Option<String>,
    pub json: Option<String>,
}

/// Interpret epoch milliseconds as a naive local date-time.
pub fn millis_to_local(ms: i64) -> Option<NaiveDateTime> {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.naive_local())
}

/// Normalize one row.
pub fn normalize_row(row: RawMessageRow) -> Result<Message, SigstatError> {
    let malformed = |reason: String| SigstatError::MalformedRecord {
        id: row.id.clone(),
        reason,
    };

    let conversation_id = row
        .conversation_id
        .clone()
        .ok_or_else(|| malformed("missing conversationId".to_string()))?;
    let sent_at = row_time(row.sent_at, "sent_at").map_err(malformed)?;
    let received_at = row_time(row.received_at, "received_at").map_err(malformed)?;

    let kind = row.kind.as_deref().unwrap_or("");
    let direction = Direction::from_str(kind)
        .map_err(|_| malformed(format!("unknown message type `{kind}`")))?;

    let payload = match row.json.as_deref() {
        Some(json) => parse_payload(json).map_err(malformed)?,
        None => return Err(malformed("missing json payload".to_string())),
    };

    Ok(Message {
        id: row.id,
        conversation_id: ConversationId(conversation_id),
        sent_at,
        received_at,
        source: row.source,
        direction,
        body: row.body,
        has_attachments: row.has_attachments.is_some_and(|v| v != 0),
        payload,
    })
}

fn row_time(value: Option<i64>, column: &str) -> Result<NaiveDateTime, String> {
    let ms = value.ok_or_else(|| format!("missing {column}"))?;
    millis_to_local(ms).ok_or_else(|| format!("{column} {ms} is out of range"))
}

/// Parse the `json` column into a [`MessagePayload`].
///
/// `received_at`, `sent_at` and `timestamp` are required. `decrypted_at` and
/// `expirationStartTimestamp` are converted when present and non-null. Keys
/// outside the known set are kept in `extra` untouched.
pub fn parse_payload(json: &str) -> Result<MessagePayload, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| format!("invalid json: {e}"))?;
    let Value::Object(mut map) = value else {
        return Err("json payload is not an object".to_string());
    };

    let received_at = required_time(&mut map, "received_at")?;
    let sent_at = required_time(&mut map, "sent_at")?;
    let timestamp = required_time(&mut map, "timestamp")?;
    let decrypted_at = optional_time(&mut map, "decrypted_at")?;
    let expiration_start_timestamp = optional_time(&mut map, "expirationStartTimestamp")?;
    let has_attachments = optional_flag(&mut map, "hasAttachments")?;
    let has_visual_media_attachments = optional_flag(&mut map, "hasVisualMediaAttachments")?;

    let attachments = match map.remove("attachments") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(parse_attachment)
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(format!("attachments is not an array: {other}")),
    };

    Ok(MessagePayload {
        received_at: Some(received_at),
        sent_at: Some(sent_at),
        timestamp: Some(timestamp),
        decrypted_at,
        expiration_start_timestamp,
        has_attachments,
        has_visual_media_attachments,
        attachments,
        extra: map,
    })
}

fn required_time(map: &mut Map<String, Value>, key: &str) -> Result<NaiveDateTime, String> {
    optional_time(map, key)?.ok_or_else(|| format!("payload is missing `{key}`"))
}

fn optional_time(map: &mut Map<String, Value>, key: &str) -> Result<Option<NaiveDateTime>, String> {
    let ms = match map.remove(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(ms) => ms,
            None => n
                .as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
                .ok_or_else(|| format!("`{key}` {n} is not a timestamp"))?,
        },
        Some(other) => return Err(format!("`{key}` is not a number: {other}")),
    };
    millis_to_local(ms)
        .map(Some)
        .ok_or_else(|| format!("`{key}` {ms} is out of range"))
}

fn optional_flag(map: &mut Map<String, Value>, key: &str) -> Result<Option<bool>, String> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Some(i != 0)),
            None => Err(format!("`{key}` is not an integer flag: {n}")),
        },
        Some(other) => Err(format!("`{key}` is not a flag: {other}")),
    }
}

fn parse_attachment(value: Value) -> Result<AttachmentDescriptor, String> {
    let Value::Object(mut map) = value else {
        return Err("attachment is not an object".to_string());
    };

    let mut text = |key: &str| match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => {
            // Non-string values stay in `extra`.
            map.insert(key.to_string(), other);
            None
        }
    };
    let path = text("path");
    let content_type = text("contentType");
    let file_name = text("fileName");

    let size = match map.remove("size") {
        Some(Value::Number(n)) if n.as_u64().is_some() => n.as_u64(),
        Some(Value::Null) | None => None,
        Some(other) => {
            map.insert("size".to_string(), other);
            None
        }
    };

    Ok(AttachmentDescriptor {
        path,
        content_type,
        file_name,
        size,
        extra: map,
    })
}

/// Normalize a batch of rows under `policy`.
///
/// With [`MalformedPolicy::Skip`] every bad row is logged and dropped; with
/// [`MalformedPolicy::Abort`] the first bad row fails the batch.
pub fn normalize_batch(
    rows: Vec<RawMessageRow>,
    policy: MalformedPolicy,
) -> Result<Vec<Message>, SigstatError> {
    let mut messages = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;

    for row in rows {
        match normalize_row(row) {
            Ok(message) => messages.push(message),
            Err(err) => match policy {
                MalformedPolicy::Abort => return Err(err),
                MalformedPolicy::Skip => {
                    warn!(error = %err, "skipping malformed message");
                    skipped += 1;
                }
            },
        }
    }

    if skipped > 0 {
        warn!(skipped, kept = messages.len(), "malformed messages were skipped");
    }
    Ok(messages)
}
