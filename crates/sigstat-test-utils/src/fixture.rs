// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted Signal store fixtures.
//!
//! `FixtureStore` lays out a temporary directory the way Signal Desktop does
//! (`config.json`, `sql/db.sqlite`, `attachments.noindex/`) and writes a real
//! SQLCipher database with the same cipher parameters the reader uses.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use secrecy::SecretString;
use serde_json::json;
use sigstat_config::model::StoreConfig;
use sigstat_store::cipher::{CipherParams, apply_cipher};
use sigstat_store::{SignalStore, StoreSource};

/// Raw 256-bit key written to every fixture's `config.json`.
pub const FIXTURE_KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c762e7160f38b4da56a784d9045190cfe";

const SCHEMA: &str = "
CREATE TABLE conversations (
    id STRING PRIMARY KEY ASC,
    json TEXT,
    active_at INTEGER,
    type STRING,
    members TEXT,
    name TEXT,
    profileName TEXT
);
CREATE TABLE messages (
    id STRING PRIMARY KEY ASC,
    json TEXT,
    unread INTEGER,
    expires_at INTEGER,
    sent_at INTEGER,
    schemaVersion INTEGER,
    conversationId STRING,
    received_at INTEGER,
    source STRING,
    sourceDevice STRING,
    hasAttachments INTEGER,
    hasFileAttachments INTEGER,
    hasVisualMediaAttachments INTEGER,
    type STRING,
    body TEXT
);
CREATE INDEX messages_conversation ON messages (conversationId, received_at);
";

/// Ids that are valid UTF-8 are stored as TEXT, anything else as BLOB, the
/// way Signal stores private and group ids.
fn id_value(id: &[u8]) -> Value {
    match std::str::from_utf8(id) {
        Ok(text) => Value::Text(text.to_string()),
        Err(_) => Value::Blob(id.to_vec()),
    }
}

/// A `conversations` row.
#[derive(Debug, Clone)]
pub struct FixtureConversation {
    pub id: Vec<u8>,
    pub kind: String,
    pub name: Option<String>,
    pub profile_name: Option<String>,
    pub members: Option<String>,
}

impl FixtureConversation {
    pub fn private(id: &str, name: &str) -> Self {
        Self {
            id: id.as_bytes().to_vec(),
            kind: "private".to_string(),
            name: Some(name.to_string()),
            profile_name: None,
            members: None,
        }
    }

    /// A group with a binary id and space-separated members.
    pub fn group(id: &[u8], name: &str, members: &[&str]) -> Self {
        Self {
            id: id.to_vec(),
            kind: "group".to_string(),
            name: Some(name.to_string()),
            profile_name: None,
            members: Some(members.join(" ")),
        }
    }

    pub fn with_profile_name(mut self, profile_name: &str) -> Self {
        self.name = None;
        self.profile_name = Some(profile_name.to_string());
        self
    }
}

/// A `messages` row. The `json` column is generated unless overridden.
#[derive(Debug, Clone)]
pub struct FixtureMessage {
    pub id: String,
    pub conversation_id: Vec<u8>,
    pub kind: String,
    pub sent_at: i64,
    pub received_at: i64,
    pub source: Option<String>,
    pub body: Option<String>,
    pub expires_at: Option<i64>,
    pub attachments: Vec<serde_json::Value>,
    pub raw_json: Option<String>,
}

impl FixtureMessage {
    fn new(id: &str, conversation_id: &[u8], kind: &str, sent_at: i64) -> Self {
        Self {
            id: id.to_string(),
            conversation_id: conversation_id.to_vec(),
            kind: kind.to_string(),
            sent_at,
            received_at: sent_at + 1_000,
            source: None,
            body: None,
            expires_at: None,
            attachments: Vec::new(),
            raw_json: None,
        }
    }

    pub fn incoming(id: &str, conversation_id: &[u8], sent_at: i64) -> Self {
        let mut message = Self::new(id, conversation_id, "incoming", sent_at);
        message.source = std::str::from_utf8(conversation_id).ok().map(str::to_string);
        message
    }

    pub fn outgoing(id: &str, conversation_id: &[u8], sent_at: i64) -> Self {
        Self::new(id, conversation_id, "outgoing", sent_at)
    }

    /// A non-message row type such as `keychange` or `verified-change`.
    pub fn control(id: &str, conversation_id: &[u8], kind: &str, sent_at: i64) -> Self {
        Self::new(id, conversation_id, kind, sent_at)
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn with_received_at(mut self, received_at: i64) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn expiring(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Attach a file stored at `attachments.noindex/<path>`.
    pub fn with_attachment(mut self, path: &str, content_type: &str) -> Self {
        self.attachments.push(json!({
            "path": path,
            "contentType": content_type,
            "size": 3,
        }));
        self
    }

    /// Attachment descriptor without a `path` key.
    pub fn with_pathless_attachment(mut self, content_type: &str) -> Self {
        self.attachments.push(json!({ "contentType": content_type }));
        self
    }

    /// Replace the generated `json` column verbatim.
    pub fn with_raw_json(mut self, json: &str) -> Self {
        self.raw_json = Some(json.to_string());
        self
    }

    fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    fn json(&self) -> String {
        if let Some(raw) = &self.raw_json {
            return raw.clone();
        }
        let mut payload = json!({
            "id": self.id,
            "type": self.kind,
            "body": self.body,
            "sent_at": self.sent_at,
            "received_at": self.received_at,
            "timestamp": self.sent_at,
            "hasAttachments": i64::from(self.has_attachments()),
            "attachments": self.attachments,
            "schemaVersion": 10,
        });
        if self.kind == "incoming" {
            payload["decrypted_at"] = json!(self.received_at + 50);
        }
        if let Some(expires_at) = self.expires_at {
            payload["expirationStartTimestamp"] = json!(expires_at);
        }
        payload.to_string()
    }
}

/// Builder for [`FixtureStore`].
pub struct FixtureStoreBuilder {
    conversations: Vec<FixtureConversation>,
    messages: Vec<FixtureMessage>,
    files: Vec<(String, Vec<u8>)>,
    extra_sql: Vec<String>,
    key: String,
    write_key: bool,
}

impl FixtureStoreBuilder {
    fn new() -> Self {
        Self {
            conversations: Vec::new(),
            messages: Vec::new(),
            files: Vec::new(),
            extra_sql: Vec::new(),
            key: FIXTURE_KEY.to_string(),
            write_key: true,
        }
    }

    pub fn conversation(mut self, conversation: FixtureConversation) -> Self {
        self.conversations.push(conversation);
        self
    }

    pub fn message(mut self, message: FixtureMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Place a file under `attachments.noindex/<path>`.
    pub fn attachment_file(mut self, path: &str, contents: &[u8]) -> Self {
        self.files.push((path.to_string(), contents.to_vec()));
        self
    }

    /// Run extra statements against the encrypted database after the schema.
    pub fn sql(mut self, statement: &str) -> Self {
        self.extra_sql.push(statement.to_string());
        self
    }

    /// Write a different key into `config.json` than the one the database
    /// was encrypted with.
    pub fn with_config_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    /// Leave out `config.json` entirely.
    pub fn without_key_file(mut self) -> Self {
        self.write_key = false;
        self
    }

    /// Create the directory layout and the encrypted database.
    pub fn build(self) -> Result<FixtureStore, Box<dyn std::error::Error + Send + Sync>> {
        let dir = tempfile::TempDir::new()?;
        let root = dir.path();
        std::fs::create_dir_all(root.join("sql"))?;
        std::fs::create_dir_all(root.join("attachments.noindex"))?;

        if self.write_key {
            let config = json!({ "key": self.key });
            std::fs::write(root.join("config.json"), config.to_string())?;
        }

        let conn = rusqlite::Connection::open(root.join("sql").join("db.sqlite"))?;
        apply_cipher(
            &conn,
            &SecretString::from(FIXTURE_KEY.to_string()),
            &CipherParams::default(),
        )?;
        conn.execute_batch(SCHEMA)?;

        for c in &self.conversations {
            conn.execute(
                "INSERT INTO conversations (id, type, name, profileName, members)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id_value(&c.id), c.kind, c.name, c.profile_name, c.members],
            )?;
        }

        for m in &self.messages {
            conn.execute(
                "INSERT INTO messages (id, json, expires_at, sent_at, conversationId,
                     received_at, source, hasAttachments, type, body)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    m.id,
                    m.json(),
                    m.expires_at,
                    m.sent_at,
                    id_value(&m.conversation_id),
                    m.received_at,
                    m.source,
                    i64::from(m.has_attachments()),
                    m.kind,
                    m.body,
                ],
            )?;
        }

        for statement in &self.extra_sql {
            conn.execute_batch(statement)?;
        }
        drop(conn);

        for (path, contents) in &self.files {
            let target = root.join("attachments.noindex").join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, contents)?;
        }

        Ok(FixtureStore { dir })
    }
}

/// A temporary, encrypted Signal Desktop data directory.
///
/// Removed from disk when dropped.
pub struct FixtureStore {
    dir: tempfile::TempDir,
}

impl FixtureStore {
    pub fn builder() -> FixtureStoreBuilder {
        FixtureStoreBuilder::new()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.dir.path().join("attachments.noindex")
    }

    /// Store configuration pointing at this fixture, with default settings.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            store_dir: self.dir.path().to_string_lossy().into_owned(),
            ..StoreConfig::default()
        }
    }

    pub fn store(&self) -> SignalStore {
        SignalStore::from_config(&self.store_config())
    }

    /// Message source over this fixture with default settings.
    pub fn source(&self) -> StoreSource {
        StoreSource::from_config(&self.store_config())
    }
}
