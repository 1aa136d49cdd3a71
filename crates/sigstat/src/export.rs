// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sigstat export` command implementation.
//!
//! `sql` writes one raw dump to `<output>/messages.sql`. `csv` and `json`
//! write one directory per conversation, named after the conversation.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write as _;
use std::path::Path;

use serde::Serialize;
use sigstat_config::model::{ExportFormat, SigstatConfig};
use sigstat_core::{Conversation, ConversationId, Message, SigstatError};
use sigstat_store::{SignalStore, dump_raw, fetch_conversations, fetch_messages};
use tracing::{debug, info};

use crate::attachments::export_attachments;

pub const SQL_DUMP_FILE: &str = "messages.sql";

/// Run the `sigstat export` command.
pub async fn run_export(
    config: &SigstatConfig,
    format: ExportFormat,
    attachments: bool,
) -> Result<(), SigstatError> {
    let output_dir = config.export.output_path();
    info!(output = %output_dir.display(), %format, "exporting all conversations");
    fs::create_dir_all(&output_dir)
        .map_err(|e| SigstatError::export(format!("create {}", output_dir.display()), e))?;

    let store = SignalStore::from_config(&config.store);

    if format == ExportFormat::Sql {
        let summary = dump_raw(&store, &output_dir.join(SQL_DUMP_FILE)).await?;
        info!(tables = summary.tables.len(), rows = summary.rows, "raw dump written");
        return Ok(());
    }

    let conversations = fetch_conversations(&store, None).await?;
    let messages = fetch_messages(
        &store,
        config.store.include_expiring,
        false,
        config.store.on_malformed,
    )
    .await?;
    let dirs = conversation_dirs(&conversations);

    for conversation in &conversations {
        let Some(name) = dirs.get(&conversation.id) else {
            continue;
        };
        info!(conversation = %conversation.name, "exporting conversation");
        let selected: Vec<&Message> = messages
            .iter()
            .filter(|m| m.conversation_id == conversation.id)
            .collect();
        write_conversation(&output_dir.join(name), format, &selected)?;
    }

    if attachments {
        let with_attachments = fetch_messages(
            &store,
            config.store.include_expiring,
            true,
            config.store.on_malformed,
        )
        .await?;
        let summary = export_attachments(&store.attachments_dir(), &output_dir, &dirs, &with_attachments)?;
        info!(
            copied = summary.copied,
            existing = summary.existing,
            missing = summary.missing,
            "attachments exported"
        );
    }

    Ok(())
}

/// Directory name for every conversation, unique within one export.
///
/// Path separators and control characters are replaced; a name that is
/// empty or only dots falls back to the id. Clashing names get a numeric
/// suffix in listing order.
pub fn conversation_dirs(conversations: &[Conversation]) -> HashMap<ConversationId, String> {
    let mut used = HashSet::new();
    let mut dirs = HashMap::new();
    for conversation in conversations {
        let mut base = sanitize_dir_name(&conversation.name);
        if base.is_empty() {
            base = sanitize_dir_name(&conversation.id.to_base64());
        }
        let mut name = base.clone();
        let mut n = 2;
        while !used.insert(name.clone()) {
            name = format!("{base} ({n})");
            n += 1;
        }
        dirs.insert(conversation.id.clone(), name);
    }
    dirs
}

fn sanitize_dir_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.chars().all(|c| c == '.') {
        String::new()
    } else {
        cleaned.to_string()
    }
}

/// One CSV row. The payload is kept as a JSON string column.
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    id: &'a str,
    conversation_id: String,
    sent_at: String,
    received_at: String,
    source: Option<&'a str>,
    #[serde(rename = "type")]
    direction: &'a str,
    body: Option<&'a str>,
    has_attachments: bool,
    json: String,
}

impl<'a> CsvRecord<'a> {
    fn new(message: &'a Message) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: &message.id,
            conversation_id: message.conversation_id.to_text(),
            sent_at: message.sent_at.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            received_at: message.received_at.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            source: message.source.as_deref(),
            direction: message.direction.as_ref(),
            body: message.body.as_deref(),
            has_attachments: message.has_attachments,
            json: serde_json::to_string(&message.payload)?,
        })
    }
}

fn write_conversation(dir: &Path, format: ExportFormat, messages: &[&Message]) -> Result<(), SigstatError> {
    fs::create_dir_all(dir).map_err(|e| SigstatError::export(format!("create {}", dir.display()), e))?;
    match format {
        ExportFormat::Csv => write_csv(&dir.join("messages.csv"), messages),
        ExportFormat::Json => write_json(&dir.join("messages.json"), messages),
        ExportFormat::Sql => Err(SigstatError::Internal(
            "sql exports are written as one dump, not per conversation".to_string(),
        )),
    }
}

fn write_csv(path: &Path, messages: &[&Message]) -> Result<(), SigstatError> {
    let context = || format!("write {}", path.display());
    let mut writer = csv::Writer::from_path(path).map_err(|e| SigstatError::export(context(), e))?;
    for message in messages {
        let record = CsvRecord::new(message).map_err(|e| SigstatError::export(context(), e))?;
        writer
            .serialize(record)
            .map_err(|e| SigstatError::export(context(), e))?;
    }
    writer.flush().map_err(|e| SigstatError::export(context(), e))?;
    debug!(path = %path.display(), messages = messages.len(), "csv written");
    Ok(())
}

fn write_json(path: &Path, messages: &[&Message]) -> Result<(), SigstatError> {
    let context = || format!("write {}", path.display());
    let file = fs::File::create(path).map_err(|e| SigstatError::export(context(), e))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer(&mut writer, messages).map_err(|e| SigstatError::export(context(), e))?;
    writer.flush().map_err(|e| SigstatError::export(context(), e))?;
    debug!(path = %path.display(), messages = messages.len(), "json written");
    Ok(())
}
