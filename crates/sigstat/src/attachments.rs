// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment export.
//!
//! Files are copied from `<store>/attachments.noindex/<path>` to
//! `<output>/<conversation>/files/<sent time>.<id prefix>.<ext>` with their
//! modification time set to the message's sent time. Re-running an export
//! copies nothing that is already there.

use std::collections::HashMap;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{Local, NaiveDateTime, TimeZone};
use sigstat_core::{AttachmentDescriptor, ConversationId, Message, SigstatError};
use tracing::{debug, warn};

/// Outcome of one attachment export run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentSummary {
    pub copied: usize,
    /// Destination already present.
    pub existing: usize,
    /// No path in the descriptor, or no file at the source.
    pub missing: usize,
}

/// Export name: `YYYY-MM-DD-HH:MM:SS.<first 8 chars of the file id>.<ext>`.
///
/// The extension is the lowercased subtype of the content type, `bin` when
/// there is none.
pub fn attachment_file_name(sent_at: NaiveDateTime, path: &str, content_type: Option<&str>) -> String {
    let file_id = path.rsplit('/').next().unwrap_or(path);
    let prefix: String = file_id.chars().take(8).collect();
    let ext = content_type
        .and_then(|ct| ct.rsplit('/').next())
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "bin".to_string());
    format!("{}.{prefix}.{ext}", sent_at.format("%Y-%m-%d-%H:%M:%S"))
}

/// Copy every attachment of `messages` into its conversation directory.
///
/// Missing sources are logged and skipped; existing destinations are left
/// untouched. Messages of conversations absent from `dirs` are skipped.
pub fn export_attachments(
    attachments_dir: &Path,
    output_dir: &Path,
    dirs: &HashMap<ConversationId, String>,
    messages: &[Message],
) -> Result<AttachmentSummary, SigstatError> {
    let mut summary = AttachmentSummary::default();

    for message in messages.iter().filter(|m| m.has_attachments) {
        let Some(conversation_dir) = dirs.get(&message.conversation_id) else {
            debug!(id = %message.id, "skipping attachments of unlisted conversation");
            continue;
        };
        let files_dir = output_dir.join(conversation_dir).join("files");

        for attachment in &message.payload.attachments {
            match copy_attachment(attachments_dir, &files_dir, message, attachment)? {
                CopyOutcome::Copied => summary.copied += 1,
                CopyOutcome::Existing => summary.existing += 1,
                CopyOutcome::Missing => summary.missing += 1,
            }
        }
    }

    Ok(summary)
}

enum CopyOutcome {
    Copied,
    Existing,
    Missing,
}

fn copy_attachment(
    attachments_dir: &Path,
    files_dir: &Path,
    message: &Message,
    attachment: &AttachmentDescriptor,
) -> Result<CopyOutcome, SigstatError> {
    let Some(path) = attachment.path.as_deref() else {
        warn!(id = %message.id, "attachment does not specify a path");
        return Ok(CopyOutcome::Missing);
    };

    let src = attachments_dir.join(path);
    if !src.is_file() {
        warn!(src = %src.display(), "skipping attachment, file does not exist");
        return Ok(CopyOutcome::Missing);
    }

    let name = attachment_file_name(message.sent_at, path, attachment.content_type.as_deref());
    let dst: PathBuf = files_dir.join(name);
    if dst.exists() {
        debug!(dst = %dst.display(), "skipping attachment, destination exists");
        return Ok(CopyOutcome::Existing);
    }

    fs::create_dir_all(files_dir)
        .map_err(|e| SigstatError::export(format!("create {}", files_dir.display()), e))?;
    fs::copy(&src, &dst)
        .map_err(|e| SigstatError::export(format!("copy {} to {}", src.display(), dst.display()), e))?;
    discard_on_error(&dst, set_mtime(&dst, message.sent_at))?;
    debug!(dst = %dst.display(), "attachment copied");
    Ok(CopyOutcome::Copied)
}

/// Remove a copied file whose timestamp could not be set, so the next run
/// copies it again instead of counting it as existing.
fn discard_on_error(dst: &Path, result: Result<(), SigstatError>) -> Result<(), SigstatError> {
    if result.is_err()
        && let Err(e) = fs::remove_file(dst)
    {
        warn!(dst = %dst.display(), error = %e, "failed to remove partially exported attachment");
    }
    result
}

fn local_system_time(t: NaiveDateTime) -> SystemTime {
    let millis = Local
        .from_local_datetime(&t)
        .earliest()
        .map(|d| d.timestamp_millis())
        .unwrap_or_else(|| t.and_utc().timestamp_millis());
    match u64::try_from(millis) {
        Ok(ms) => UNIX_EPOCH + Duration::from_millis(ms),
        Err(_) => UNIX_EPOCH - Duration::from_millis(millis.unsigned_abs()),
    }
}

fn set_mtime(path: &Path, sent_at: NaiveDateTime) -> Result<(), SigstatError> {
    let time = local_system_time(sent_at);
    let context = || format!("set modification time of {}", path.display());
    let file = File::options()
        .write(true)
        .open(path)
        .map_err(|e| SigstatError::export(context(), e))?;
    file.set_times(FileTimes::new().set_accessed(time).set_modified(time))
        .map_err(|e| SigstatError::export(context(), e))
}

#[cfg(test)]
mod tests {
    use sigstat_store::fetch_messages;
    use sigstat_test_utils::{FixtureConversation, FixtureMessage, FixtureStore, at};

    use super::*;

    const ALICE: &[u8] = b"+15550001111";
    const T0: i64 = 1_600_000_000_000;

    #[test]
    fn file_name_format() {
        let sent = at("2024-05-06 07:08:09");
        assert_eq!(
            attachment_file_name(sent, "ab/abcdef0123456789", Some("image/JPEG")),
            "2024-05-06-07:08:09.abcdef01.jpeg"
        );
        assert_eq!(attachment_file_name(sent, "short", None), "2024-05-06-07:08:09.short.bin");
    }

    #[test]
    fn local_time_round_trips_to_epoch() {
        let sent = at("2024-05-06 07:08:09");
        let system = local_system_time(sent);
        let secs = system.duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
        let back = Local.timestamp_opt(secs, 0).single().unwrap().naive_local();
        assert_eq!(back, sent);
    }

    #[test]
    fn failed_stamp_removes_the_copy() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("copied.png");
        fs::write(&dst, b"png").unwrap();

        discard_on_error(&dst, Ok(())).unwrap();
        assert!(dst.is_file());

        let failed = Err(SigstatError::Internal("no timestamp".into()));
        let err = discard_on_error(&dst, failed).unwrap_err();
        assert!(matches!(err, SigstatError::Internal(_)));
        assert!(!dst.exists());
    }

    fn fixture() -> FixtureStore {
        FixtureStore::builder()
            .conversation(FixtureConversation::private("+15550001111", "Alice"))
            .message(
                FixtureMessage::incoming("0123456789abcdef", ALICE, T0)
                    .with_attachment("12/1234567890abcdef", "image/png")
                    .with_attachment("34/gone", "video/mp4")
                    .with_pathless_attachment("audio/aac"),
            )
            .message(FixtureMessage::outgoing("m2", ALICE, T0 + 5000).with_body("no files"))
            .attachment_file("12/1234567890abcdef", b"png")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn export_is_idempotent() {
        let fixture = fixture();
        let store = fixture.store();
        let messages = fetch_messages(&store, false, true, Default::default()).await.unwrap();
        assert_eq!(messages.len(), 1);

        let out = tempfile::tempdir().unwrap();
        let dirs = HashMap::from([(ConversationId::from("+15550001111"), "Alice".to_string())]);

        let first = export_attachments(&fixture.attachments_dir(), out.path(), &dirs, &messages).unwrap();
        assert_eq!(first, AttachmentSummary { copied: 1, existing: 0, missing: 2 });

        let name = attachment_file_name(messages[0].sent_at, "12/1234567890abcdef", Some("image/png"));
        let dst = out.path().join("Alice/files").join(&name);
        assert!(name.ends_with(".12345678.png"));
        assert_eq!(fs::read(&dst).unwrap(), b"png");

        let mtime = fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(mtime, local_system_time(messages[0].sent_at));

        let second = export_attachments(&fixture.attachments_dir(), out.path(), &dirs, &messages).unwrap();
        assert_eq!(second, AttachmentSummary { copied: 0, existing: 1, missing: 2 });
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), mtime);
    }
}
