use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

pub const EXPECTED_QUESTION_COUNT: u32 = 128;

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn ensure_input_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("input file not found: {}", path.display());
    }
    Ok(())
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    for line in lines {
        file.write_all(line.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Backup directory used when none is given: `archived_backups` beside the
/// file being replaced.
pub fn default_backup_dir(target: &Path) -> PathBuf {
    target
        .parent()
        .map(|parent| parent.join("archived_backups"))
        .unwrap_or_else(|| PathBuf::from("archived_backups"))
}

/// Copies `target` to `<backup_dir>/<name>.backup_<stamp>` before it gets
/// overwritten. Returns `None` when there is nothing to back up.
pub fn backup_file(target: &Path, backup_dir: &Path, now: DateTime<Utc>) -> Result<Option<PathBuf>> {
    if !target.exists() {
        return Ok(None);
    }

    ensure_directory(backup_dir)?;

    let filename = target
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("invalid UTF-8 filename: {}", target.display()))?;
    let backup_path = backup_dir.join(format!(
        "{}.backup_{}",
        filename,
        now.format("%Y%m%d_%H%M%S")
    ));

    fs::copy(target, &backup_path).with_context(|| {
        format!(
            "failed to back up {} to {}",
            target.display(),
            backup_path.display()
        )
    })?;

    Ok(Some(backup_path))
}

/// Returns `(missing, extra)` ids relative to `1..=expected_count`.
pub fn id_coverage(found: impl IntoIterator<Item = u32>, expected_count: u32) -> (Vec<u32>, Vec<u32>) {
    let found = found.into_iter().collect::<BTreeSet<u32>>();
    let expected = (1..=expected_count).collect::<BTreeSet<u32>>();

    let missing = expected.difference(&found).copied().collect();
    let extra = found.difference(&expected).copied().collect();
    (missing, extra)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn id_coverage_reports_missing_and_extra() {
        let (missing, extra) = id_coverage([1, 2, 4, 7], 5);
        assert_eq!(missing, vec![3, 5]);
        assert_eq!(extra, vec![7]);
    }

    #[test]
    fn backup_file_copies_existing_target_with_timestamp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("interview_questions_ko.json");
        fs::write(&target, "[]").expect("seed target");
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();

        let backup = backup_file(&target, &dir.path().join("archived_backups"), now)
            .expect("backup should succeed")
            .expect("backup path");

        assert!(backup.ends_with("archived_backups/interview_questions_ko.json.backup_20250304_050607"));
        assert_eq!(fs::read_to_string(backup).expect("read backup"), "[]");
    }

    #[test]
    fn backup_file_skips_missing_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = backup_file(&dir.path().join("absent.json"), dir.path(), Utc::now())
            .expect("missing target is not an error");
        assert!(result.is_none());
    }

    #[test]
    fn ensure_input_exists_rejects_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = ensure_input_exists(&dir.path().join("missing.txt")).unwrap_err();
        assert!(error.to_string().contains("input file not found"));
    }
}
