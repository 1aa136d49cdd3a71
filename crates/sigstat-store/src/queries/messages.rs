// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message queries.

use rusqlite::Row;
use sigstat_config::model::MalformedPolicy;
use sigstat_core::{Message, SigstatError};
use tracing::debug;

use crate::database::SignalStore;
use crate::normalize::{RawMessageRow, normalize_batch};
use crate::queries::{identifier, identifier_text};

/// Build the message query for the given filters.
///
/// Only `incoming` and `outgoing` rows are selected; every other row type is
/// a control message with no direction.
pub fn message_query(include_expiring: bool, attachments_only: bool) -> String {
    let mut conditions = vec!["type IN ('incoming', 'outgoing')"];
    if !include_expiring {
        conditions.push("expires_at IS NULL");
    }
    if attachments_only {
        conditions.push("hasAttachments = 1");
    }
    format!(
        "SELECT CAST(id AS TEXT), conversationId, sent_at, received_at,
                source, hasAttachments, type, CAST(body AS TEXT), json
         FROM messages
         WHERE {}
         ORDER BY sent_at ASC",
        conditions.join(" AND ")
    )
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawMessageRow> {
    Ok(RawMessageRow {
        id: row.get(0)?,
        conversation_id: identifier(row, 1)?,
        sent_at: row.get(2)?,
        received_at: row.get(3)?,
        source: identifier_text(row, 4)?,
        has_attachments: row.get(5)?,
        kind: row.get(6)?,
        body: row.get(7)?,
        json: row.get(8)?,
    })
}

/// Fetch message rows without normalizing them.
pub async fn fetch_raw_messages(
    store: &SignalStore,
    include_expiring: bool,
    attachments_only: bool,
) -> Result<Vec<RawMessageRow>, SigstatError> {
    let sql = message_query(include_expiring, attachments_only);
    let rows = store
        .with_connection("fetch messages", move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], read_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await?;
    debug!(rows = rows.len(), include_expiring, attachments_only, "fetched messages");
    Ok(rows)
}

/// Fetch and normalize messages, ordered by sent time ascending.
pub async fn fetch_messages(
    store: &SignalStore,
    include_expiring: bool,
    attachments_only: bool,
    policy: MalformedPolicy,
) -> Result<Vec<Message>, SigstatError> {
    let rows = fetch_raw_messages(store, include_expiring, attachments_only).await?;
    normalize_batch(rows, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_excludes_expiring() {
        let sql = message_query(false, false);
        assert!(sql.contains("expires_at IS NULL"));
        assert!(!sql.contains("hasAttachments = 1"));
        assert!(sql.contains("ORDER BY sent_at ASC"));
    }

    #[test]
    fn flags_toggle_conditions() {
        let sql = message_query(true, true);
        assert!(!sql.contains("expires_at"));
        assert!(sql.contains("WHERE type IN ('incoming', 'outgoing') AND hasAttachments = 1"));
    }
}
