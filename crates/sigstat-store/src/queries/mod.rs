// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only queries against the Signal schema.

pub mod conversations;
pub mod messages;

use rusqlite::Row;
use rusqlite::types::ValueRef;

/// Read an identifier column (`conversations.id`, `messages.conversationId`,
/// `messages.source`).
///
/// These columns are declared `STRING`, which has NUMERIC affinity, so SQLite
/// stores a phone number such as `+15550001111` as the INTEGER `15550001111`.
/// Positive integers are read back with the `+` restored.
pub(crate) fn identifier(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<u8>>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(n) if n > 0 => Some(format!("+{n}").into_bytes()),
        ValueRef::Integer(n) => Some(n.to_string().into_bytes()),
        ValueRef::Real(f) => Some(f.to_string().into_bytes()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(bytes.to_vec()),
    })
}

/// [`identifier`] as text.
pub(crate) fn identifier_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(identifier(row, idx)?.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::*;

    fn read_all(values: &[&str]) -> Vec<Option<Vec<u8>>> {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (n INTEGER PRIMARY KEY, v STRING);")
            .unwrap();
        for value in values {
            conn.execute(&format!("INSERT INTO t (v) VALUES ({value})"), [])
                .unwrap();
        }
        let mut stmt = conn.prepare("SELECT v FROM t ORDER BY n").unwrap();
        stmt.query_map([], |row| identifier(row, 0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn phone_numbers_stored_as_integers_keep_their_plus() {
        let values = read_all(&["'+15550001111'", "'15550002222'"]);
        assert_eq!(values[0].as_deref(), Some(&b"+15550001111"[..]));
        // Affinity makes both forms the same INTEGER.
        assert_eq!(values[1].as_deref(), Some(&b"+15550002222"[..]));
    }

    #[test]
    fn text_blob_and_null_pass_through() {
        let values = read_all(&[
            "'8a7c2f1e-0000-4000-8000-000000000001'",
            "x'9f01'",
            "NULL",
        ]);
        assert_eq!(
            values[0].as_deref(),
            Some(&b"8a7c2f1e-0000-4000-8000-000000000001"[..])
        );
        assert_eq!(values[1].as_deref(), Some(&[0x9f, 0x01][..]));
        assert_eq!(values[2], None);
    }
}
