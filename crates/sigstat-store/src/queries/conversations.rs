// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation queries.

use std::str::FromStr;

use rusqlite::Row;
use sigstat_core::{Conversation, ConversationId, ConversationType, SigstatError};
use tracing::{debug, warn};

use crate::database::SignalStore;
use crate::queries::identifier;

const SELECT_CONVERSATIONS: &str = "SELECT id, name, profileName, members, type
     FROM conversations";

struct ConversationRow {
    id: Vec<u8>,
    name: Option<String>,
    profile_name: Option<String>,
    members: Option<String>,
    kind: Option<String>,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: identifier(row, 0)?.ok_or(rusqlite::Error::InvalidColumnType(
            0,
            "id".to_string(),
            rusqlite::types::Type::Null,
        ))?,
        name: row.get(1)?,
        profile_name: row.get(2)?,
        members: row.get(3)?,
        kind: row.get(4)?,
    })
}

/// Fetch conversations, optionally restricted to one kind, in store order.
///
/// Rows whose `type` is neither `private` nor `group` are logged and left out.
pub async fn fetch_conversations(
    store: &SignalStore,
    filter: Option<ConversationType>,
) -> Result<Vec<Conversation>, SigstatError> {
    let rows = store
        .with_connection("fetch conversations", move |conn| {
            let rows = match filter {
                Some(kind) => {
                    let mut stmt =
                        conn.prepare(&format!("{SELECT_CONVERSATIONS} WHERE type = ?1"))?;
                    let rows = stmt
                        .query_map([kind.as_str()], read_row)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(SELECT_CONVERSATIONS)?;
                    let rows = stmt
                        .query_map([], read_row)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
            };
            Ok(rows)
        })
        .await?;
    debug!(rows = rows.len(), filter = ?filter, "fetched conversations");

    let conversations = rows
        .into_iter()
        .filter_map(|row| {
            let kind_text = row.kind.as_deref().unwrap_or("");
            match ConversationType::from_str(kind_text) {
                Ok(kind) => Some(into_conversation(row, kind)),
                Err(_) => {
                    warn!(kind = kind_text, "skipping conversation of unknown type");
                    None
                }
            }
        })
        .collect();
    Ok(conversations)
}

/// Parse `filter` text and fetch. Fails with [`SigstatError::InvalidFilter`]
/// before touching the store when the text is not `private` or `group`.
pub async fn fetch_conversations_of_type(
    store: &SignalStore,
    filter: Option<&str>,
) -> Result<Vec<Conversation>, SigstatError> {
    let filter = filter.map(ConversationType::from_str).transpose()?;
    fetch_conversations(store, filter).await
}

fn into_conversation(row: ConversationRow, kind: ConversationType) -> Conversation {
    let id = ConversationId(row.id);
    let name = [row.name, row.profile_name]
        .into_iter()
        .flatten()
        .find(|n| !n.is_empty())
        .unwrap_or_else(|| id.to_text());
    let members = match kind {
        ConversationType::Group => Some(parse_members(row.members.as_deref())),
        ConversationType::Private => None,
    };
    Conversation {
        id,
        name,
        kind,
        members,
    }
}

/// Members are stored as a JSON array or as a space-separated list.
pub(crate) fn parse_members(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };
    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return list;
    }
    raw.split_whitespace().map(str::to_string).collect()
}
