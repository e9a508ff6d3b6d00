//! Change-detecting output persistence with capped history.
//!
//! The generated playlist is committed to a repo and polled by players, so
//! rewriting identical bytes every run would churn timestamps and diffs for
//! nothing. The writer hashes the newly rendered text against the current
//! file and performs zero filesystem writes when they match. On a real
//! change it writes the target, drops a timestamped snapshot into the
//! history directory, and evicts the oldest snapshots beyond the cap.
//!
//! Safe only under single-process, single-run-at-a-time execution; nothing
//! here locks the history directory.

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// What one persistence call did.
#[derive(Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Content hash matched the stored file; nothing touched disk.
    Unchanged,
    /// Target replaced and a snapshot stored at the given path.
    Written { snapshot: PathBuf },
}

/// Persist `text` to `target` if it differs from what is already stored.
///
/// On change, a copy is stored as
/// `<history_dir>/<stem>_<YYYYMMDD_HHMMSS>.<ext>` and the history is pruned
/// to the `cap` newest snapshots for that stem, oldest-first by
/// modification time.
#[instrument(level = "info", skip_all, fields(target = %target.display()))]
pub async fn write_with_history(
    text: &str,
    target: &Path,
    history_dir: &Path,
    cap: usize,
    now: DateTime<Local>,
) -> Result<WriteOutcome, std::io::Error> {
    if let Ok(existing) = fs::read(target).await {
        if Sha256::digest(&existing) == Sha256::digest(text.as_bytes()) {
            info!("Content unchanged; skipping write");
            return Ok(WriteOutcome::Unchanged);
        }
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::create_dir_all(history_dir).await?;

    fs::write(target, text).await?;
    info!(bytes = text.len(), "Wrote output file");

    let stem = target
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string();
    let ext = target
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("m3u")
        .to_string();

    let snapshot = history_dir.join(format!("{stem}_{}.{ext}", now.format("%Y%m%d_%H%M%S")));
    fs::write(&snapshot, text).await?;
    info!(snapshot = %snapshot.display(), "Stored history snapshot");

    prune_history(history_dir, &stem, &ext, cap).await?;

    Ok(WriteOutcome::Written { snapshot })
}

/// Remove the oldest snapshots for `stem` until at most `cap` remain.
async fn prune_history(
    history_dir: &Path,
    stem: &str,
    ext: &str,
    cap: usize,
) -> Result<(), std::io::Error> {
    let prefix = format!("{stem}_");
    let suffix = format!(".{ext}");

    let mut snapshots = Vec::new();
    let mut entries = fs::read_dir(history_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(&prefix) || !name.ends_with(&suffix) {
            continue;
        }
        let modified = entry.metadata().await?.modified()?;
        snapshots.push((modified, name, entry.path()));
    }

    if snapshots.len() <= cap {
        return Ok(());
    }

    snapshots.sort();
    let excess = snapshots.len() - cap;
    for (_, name, path) in snapshots.into_iter().take(excess) {
        fs::remove_file(&path).await?;
        debug!(snapshot = %name, "Evicted old snapshot");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 6, hour, minute, 0).unwrap()
    }

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ace_events_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn snapshot_count(history: &Path) -> usize {
        std::fs::read_dir(history).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_first_write_creates_target_and_snapshot() {
        let dir = fresh_dir("first_write");
        let target = dir.join("events.m3u");
        let history = dir.join("history");

        let outcome = write_with_history("#EXTM3U\n", &target, &history, 50, stamp(9, 0))
            .await
            .unwrap();

        assert!(matches!(outcome, WriteOutcome::Written { .. }));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "#EXTM3U\n");
        assert_eq!(snapshot_count(&history), 1);
        assert!(history.join("events_20260806_090000.m3u").exists());
    }

    #[tokio::test]
    async fn test_unchanged_content_writes_nothing() {
        let dir = fresh_dir("unchanged");
        let target = dir.join("events.m3u");
        let history = dir.join("history");

        write_with_history("#EXTM3U\n", &target, &history, 50, stamp(9, 0))
            .await
            .unwrap();
        let mtime_before = std::fs::metadata(&target).unwrap().modified().unwrap();

        let outcome = write_with_history("#EXTM3U\n", &target, &history, 50, stamp(10, 0))
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert_eq!(snapshot_count(&history), 1);
        let mtime_after = std::fs::metadata(&target).unwrap().modified().unwrap();
        assert_eq!(mtime_before, mtime_after);
    }

    #[tokio::test]
    async fn test_changed_content_adds_snapshot() {
        let dir = fresh_dir("changed");
        let target = dir.join("events.m3u");
        let history = dir.join("history");

        write_with_history("one\n", &target, &history, 50, stamp(9, 0))
            .await
            .unwrap();
        write_with_history("two\n", &target, &history, 50, stamp(10, 0))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "two\n");
        assert_eq!(snapshot_count(&history), 2);
    }

    #[tokio::test]
    async fn test_history_pruned_to_cap_oldest_first() {
        let dir = fresh_dir("prune");
        let target = dir.join("events.m3u");
        let history = dir.join("history");

        write_with_history("one\n", &target, &history, 2, stamp(9, 0))
            .await
            .unwrap();
        write_with_history("two\n", &target, &history, 2, stamp(10, 0))
            .await
            .unwrap();
        write_with_history("three\n", &target, &history, 2, stamp(11, 0))
            .await
            .unwrap();

        assert_eq!(snapshot_count(&history), 2);
        assert!(!history.join("events_20260806_090000.m3u").exists());
        assert!(history.join("events_20260806_100000.m3u").exists());
        assert!(history.join("events_20260806_110000.m3u").exists());
    }

    #[tokio::test]
    async fn test_prune_only_touches_matching_stem() {
        let dir = fresh_dir("stems");
        let history = dir.join("history");

        write_with_history("a\n", &dir.join("events.m3u"), &history, 1, stamp(9, 0))
            .await
            .unwrap();
        write_with_history("b\n", &dir.join("channels.m3u"), &history, 1, stamp(9, 30))
            .await
            .unwrap();
        write_with_history("c\n", &dir.join("events.m3u"), &history, 1, stamp(10, 0))
            .await
            .unwrap();

        // events pruned to 1, channels untouched
        assert!(history.join("channels_20260806_093000.m3u").exists());
        assert!(history.join("events_20260806_100000.m3u").exists());
        assert!(!history.join("events_20260806_090000.m3u").exists());
    }
}
