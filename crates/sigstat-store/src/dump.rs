// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text SQL dump of the raw Signal tables.
//!
//! The output follows the layout of the sqlite shell's `.dump`: one
//! transaction, each table's `CREATE` statement followed by one `INSERT`
//! per row, then the table's indexes and triggers. Virtual tables are
//! registered through `writable_schema`; their shadow tables are created
//! with `IF NOT EXISTS` so replaying the dump does not clash with the
//! tables the virtual table creates itself. The key is never written.

use std::fmt::Write as _;
use std::path::Path;

use rusqlite::Connection;
use rusqlite::types::Value;
use sigstat_core::SigstatError;
use tracing::{debug, info};

use crate::database::SignalStore;

/// Tables included in the dump, in output order.
pub const DUMP_TABLES: &[&str] = &[
    "conversations",
    "messages",
    "messages_fts",
    "messages_fts_config",
    "messages_fts_content",
    "messages_fts_data",
    "messages_fts_docsize",
    "messages_fts_idx",
];

/// What a dump contained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    /// Tables found in the store and written.
    pub tables: Vec<String>,
    /// Total `INSERT` statements written.
    pub rows: usize,
}

#[derive(Debug, Clone)]
struct SchemaEntry {
    kind: String,
    name: String,
    sql: String,
}

struct TableDump {
    entry: SchemaEntry,
    rows: Vec<Vec<Value>>,
    /// Indexes and triggers attached to the table.
    dependents: Vec<SchemaEntry>,
}

/// Write a SQL dump of [`DUMP_TABLES`] to `output_path`.
///
/// Tables missing from the store are skipped. The parent directory must
/// exist.
pub async fn dump_raw(store: &SignalStore, output_path: &Path) -> Result<DumpSummary, SigstatError> {
    let tables = store
        .with_connection("dump tables", |conn| {
            DUMP_TABLES
                .iter()
                .filter_map(|name| read_table(conn, name).transpose())
                .collect::<Result<Vec<_>, _>>()
        })
        .await?;

    let (sql, summary) = render_dump(&tables);
    std::fs::write(output_path, sql)
        .map_err(|e| SigstatError::export(format!("write {}", output_path.display()), e))?;

    info!(
        path = %output_path.display(),
        tables = summary.tables.len(),
        rows = summary.rows,
        "raw dump written"
    );
    Ok(summary)
}

fn read_table(conn: &Connection, name: &str) -> rusqlite::Result<Option<TableDump>> {
    let entry = {
        let mut stmt = conn.prepare(
            "SELECT type, name, sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
        )?;
        let mut rows = stmt.query_map([name], |row| {
            Ok(SchemaEntry {
                kind: row.get(0)?,
                name: row.get(1)?,
                sql: row.get(2)?,
            })
        })?;
        rows.next().transpose()?
    };
    let Some(entry) = entry else {
        debug!(table = name, "table not present, skipping");
        return Ok(None);
    };

    let dependents = {
        let mut stmt = conn.prepare(
            "SELECT type, name, sql FROM sqlite_master
             WHERE tbl_name = ?1 AND type IN ('index', 'trigger') AND sql IS NOT NULL
             ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([name], |row| {
                Ok(SchemaEntry {
                    kind: row.get(0)?,
                    name: row.get(1)?,
                    sql: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    let rows = if is_virtual(&entry) {
        // Contents live in the shadow tables.
        Vec::new()
    } else {
        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_identifier(name)))?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..columns)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    debug!(table = name, rows = rows.len(), "table read for dump");
    Ok(Some(TableDump {
        entry,
        rows,
        dependents,
    }))
}

fn is_virtual(entry: &SchemaEntry) -> bool {
    entry
        .sql
        .trim_start()
        .get(..20)
        .is_some_and(|head| head.eq_ignore_ascii_case("CREATE VIRTUAL TABLE"))
}

fn render_dump(tables: &[TableDump]) -> (String, DumpSummary) {
    let virtual_names: Vec<&str> = tables
        .iter()
        .filter(|t| is_virtual(&t.entry))
        .map(|t| t.entry.name.as_str())
        .collect();
    let is_shadow = |name: &str| {
        virtual_names
            .iter()
            .any(|v| name.len() > v.len() + 1 && name.starts_with(v) && name[v.len()..].starts_with('_'))
    };

    let mut out = String::from("PRAGMA foreign_keys=OFF;\nBEGIN TRANSACTION;\n");
    let mut summary = DumpSummary::default();
    let mut writable_schema = false;

    for table in tables {
        let entry = &table.entry;
        summary.tables.push(entry.name.clone());

        if is_virtual(entry) {
            if !writable_schema {
                out.push_str("PRAGMA writable_schema=ON;\n");
                writable_schema = true;
            }
            let _ = writeln!(
                out,
                "INSERT INTO sqlite_schema(type,name,tbl_name,rootpage,sql)VALUES('table',{},{},0,{});",
                quote_text(&entry.name),
                quote_text(&entry.name),
                quote_text(&entry.sql)
            );
        } else if is_shadow(&entry.name) {
            let create = entry
                .sql
                .strip_prefix("CREATE TABLE ")
                .map(|rest| format!("CREATE TABLE IF NOT EXISTS {rest}"))
                .unwrap_or_else(|| entry.sql.clone());
            let _ = writeln!(out, "{create};");
        } else {
            let _ = writeln!(out, "{};", entry.sql);
        }

        let target = quote_identifier(&entry.name);
        for row in &table.rows {
            let values: Vec<String> = row.iter().map(render_value).collect();
            let _ = writeln!(out, "INSERT INTO {target} VALUES({});", values.join(","));
            summary.rows += 1;
        }

        for dependent in &table.dependents {
            debug!(kind = %dependent.kind, name = %dependent.name, "dumping schema object");
            let _ = writeln!(out, "{};", dependent.sql);
        }
    }

    if writable_schema {
        out.push_str("PRAGMA writable_schema=OFF;\n");
    }
    out.push_str("COMMIT;\n");
    (out, summary)
}

/// Render one value as a SQL literal.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) if f.is_finite() => format!("{f:?}"),
        Value::Real(f) if f.is_nan() => "NULL".to_string(),
        Value::Real(f) if *f > 0.0 => "1e999".to_string(),
        Value::Real(_) => "-1e999".to_string(),
        Value::Text(s) => quote_text(s),
        Value::Blob(b) => format!("X'{}'", hex::encode_upper(b)),
    }
}

fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn quote_identifier(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, sql: &str) -> SchemaEntry {
        SchemaEntry {
            kind: "table".to_string(),
            name: name.to_string(),
            sql: sql.to_string(),
        }
    }

    fn table(name: &str, sql: &str, rows: Vec<Vec<Value>>) -> TableDump {
        TableDump {
            entry: entry(name, sql),
            rows,
            dependents: Vec::new(),
        }
    }

    #[test]
    fn values_render_as_sql_literals() {
        assert_eq!(render_value(&Value::Null), "NULL");
        assert_eq!(render_value(&Value::Integer(-3)), "-3");
        assert_eq!(render_value(&Value::Real(1.0)), "1.0");
        assert_eq!(render_value(&Value::Text("it's".into())), "'it''s'");
        assert_eq!(render_value(&Value::Blob(vec![0xde, 0xad])), "X'DEAD'");
    }

    #[test]
    fn identifiers_are_quoted_only_when_needed() {
        assert_eq!(quote_identifier("messages_fts"), "messages_fts");
        assert_eq!(quote_identifier("odd name"), "\"odd name\"");
    }

    #[test]
    fn plain_tables_dump_create_and_inserts() {
        let tables = vec![table(
            "conversations",
            "CREATE TABLE conversations (id STRING PRIMARY KEY, name TEXT)",
            vec![
                vec![Value::Text("+1".into()), Value::Text("Alice".into())],
                vec![Value::Text("+2".into()), Value::Null],
            ],
        )];
        let (sql, summary) = render_dump(&tables);
        assert!(sql.starts_with("PRAGMA foreign_keys=OFF;\nBEGIN TRANSACTION;\n"));
        assert!(sql.contains("CREATE TABLE conversations (id STRING PRIMARY KEY, name TEXT);\n"));
        assert!(sql.contains("INSERT INTO conversations VALUES('+1','Alice');\n"));
        assert!(sql.contains("INSERT INTO conversations VALUES('+2',NULL);\n"));
        assert!(sql.ends_with("COMMIT;\n"));
        assert!(!sql.contains("writable_schema"));
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.tables, ["conversations"]);
    }

    #[test]
    fn virtual_and_shadow_tables_use_shell_layout() {
        let tables = vec![
            table(
                "messages_fts",
                "CREATE VIRTUAL TABLE messages_fts USING fts5(body)",
                Vec::new(),
            ),
            table(
                "messages_fts_data",
                "CREATE TABLE 'messages_fts_data'(id INTEGER PRIMARY KEY, block BLOB)",
                vec![vec![Value::Integer(1), Value::Blob(vec![0x00, 0x01])]],
            ),
        ];
        let (sql, _) = render_dump(&tables);
        assert!(sql.contains("PRAGMA writable_schema=ON;\n"));
        assert!(sql.contains(
            "INSERT INTO sqlite_schema(type,name,tbl_name,rootpage,sql)VALUES('table','messages_fts','messages_fts',0,'CREATE VIRTUAL TABLE messages_fts USING fts5(body)');"
        ));
        assert!(sql.contains(
            "CREATE TABLE IF NOT EXISTS 'messages_fts_data'(id INTEGER PRIMARY KEY, block BLOB);"
        ));
        assert!(sql.contains("INSERT INTO messages_fts_data VALUES(1,X'0001');"));
        assert!(sql.contains("PRAGMA writable_schema=OFF;\nCOMMIT;\n"));
    }

    #[test]
    fn dependents_follow_their_table() {
        let mut t = table("messages", "CREATE TABLE messages (id STRING)", Vec::new());
        t.dependents.push(SchemaEntry {
            kind: "index".to_string(),
            name: "messages_id".to_string(),
            sql: "CREATE INDEX messages_id ON messages (id)".to_string(),
        });
        let (sql, _) = render_dump(&[t]);
        let create = sql.find("CREATE TABLE messages").unwrap();
        let index = sql.find("CREATE INDEX messages_id ON messages (id);").unwrap();
        assert!(create < index);
    }
}
