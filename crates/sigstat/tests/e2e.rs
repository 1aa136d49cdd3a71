// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests running the `sigstat` binary against encrypted fixture stores.
//!
//! Each test gets its own store and an empty config file so local
//! `sigstat.toml` files never leak in.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use sigstat_test_utils::{FixtureConversation, FixtureMessage, FixtureStore};

const ALICE: &[u8] = b"+15550001111";
const GROUP: &[u8] = &[0xfb, 0xff, 0x00];
const T0: i64 = 1_600_000_000_000;

fn fixture() -> FixtureStore {
    FixtureStore::builder()
        .conversation(FixtureConversation::private("+15550001111", "Alice"))
        .conversation(FixtureConversation::group(GROUP, "Climbing", &["+1", "+2", "+3"]))
        .message(FixtureMessage::incoming("m1", ALICE, T0).with_body("hi"))
        .message(
            FixtureMessage::outgoing("m2", ALICE, T0 + 1000)
                .with_body("photo")
                .with_attachment("aa/aabbccddeeff0011", "image/jpeg"),
        )
        .message(FixtureMessage::incoming("m3", GROUP, T0 + 2000).with_body("climb?"))
        .message(FixtureMessage::incoming("m4", ALICE, T0 + 3000).with_body("secret").expiring(T0 + 9000))
        .attachment_file("aa/aabbccddeeff0011", b"jpeg bytes")
        .build()
        .unwrap()
}

fn sigstat(store: &Path, config_dir: &Path, args: &[&str]) -> Output {
    let config = config_dir.join("sigstat.toml");
    fs::write(&config, "").unwrap();
    Command::new(env!("CARGO_BIN_EXE_sigstat"))
        .arg("--config")
        .arg(&config)
        .arg("--store-dir")
        .arg(store)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn list_conversations_plain() {
    let store = fixture();
    let tmp = tempfile::tempdir().unwrap();
    let output = sigstat(store.path(), tmp.path(), &["list-conversations", "--plain", "--show-id"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.contains("-> +15550001111 Alice [2 messages]"), "{text}");
    assert!(text.contains("-> +/8A Climbing (3 members) [1 messages]"), "{text}");
    assert!(text.contains("2 conversations in total."));
}

#[test]
fn include_expiring_counts_disappearing_messages() {
    let store = fixture();
    let tmp = tempfile::tempdir().unwrap();
    let output = sigstat(
        store.path(),
        tmp.path(),
        &["--include-expiring", "list-conversations", "--plain"],
    );
    assert!(stdout(&output).contains("Alice [3 messages]"));
}

#[test]
fn export_csv_with_attachments_twice() {
    let store = fixture();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let out_arg = out.to_string_lossy().into_owned();

    for _ in 0..2 {
        let output = sigstat(
            store.path(),
            tmp.path(),
            &["export", "-f", "csv", "-o", &out_arg, "--attachments"],
        );
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    }

    assert!(out.join("Alice/messages.csv").is_file());
    assert!(out.join("Climbing/messages.csv").is_file());
    let files: Vec<_> = fs::read_dir(out.join("Alice/files")).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[test]
fn export_sql_dump() {
    let store = fixture();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let output = sigstat(
        store.path(),
        tmp.path(),
        &["export", "-f", "sql", "-o", &out.to_string_lossy()],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let dump = fs::read_to_string(out.join("messages.sql")).unwrap();
    assert!(dump.contains("CREATE TABLE"));
    assert!(dump.trim_end().ends_with("COMMIT;"));
}

#[test]
fn missing_key_file_exits_non_zero() {
    let store = FixtureStore::builder().without_key_file().build().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let output = sigstat(store.path(), tmp.path(), &["list-conversations"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("configuration error"));
}

#[test]
fn unknown_config_key_exits_non_zero() {
    let store = fixture();
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("bad.toml");
    fs::write(&config, "[store]\nstore_dri = \"x\"\n").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_sigstat"))
        .arg("--config")
        .arg(&config)
        .arg("--store-dir")
        .arg(store.path())
        .arg("list-conversations")
        .output()
        .unwrap();
    assert!(!output.status.success());
}
