//! Snapshot export
//!
//! Writes any serializable snapshot as a pretty JSON file whose name carries
//! a millisecond timestamp.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `<stem>-<epoch millis>.json`
pub fn export_file_name(stem: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.json", stem, at.timestamp_millis())
}

/// Write `snapshot` into `dir`, returning the path of the new file
pub fn write_json_snapshot<T: Serialize>(
    dir: &Path,
    stem: &str,
    snapshot: &T,
) -> Result<PathBuf, ExportError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::create_dir_all(dir)?;

    let base = export_file_name(stem, Utc::now());
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            base.clone()
        } else {
            base.replace(".json", &format!("-{}.json", attempt))
        };
        let path = dir.join(name);

        // create_new so two exports in the same millisecond never clobber each other
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                fill_new_file(file, &path, json.as_bytes())?;
                info!(path = %path.display(), bytes = json.len(), "Snapshot exported");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Write `bytes` into the freshly created `path`, removing it again if the
/// write fails so no truncated export is left behind
fn fill_new_file<W: Write>(mut out: W, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let written = out.write_all(bytes).and_then(|()| out.flush());
    if let Err(e) = written {
        drop(out);
        if let Err(remove_err) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %remove_err, "Could not remove partial export");
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(export_file_name("recipe-nutrition", at), "recipe-nutrition-1700000000123.json");
    }

    #[test]
    fn test_write_and_no_collision() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = serde_json::json!({"hello": "world"});

        let first = write_json_snapshot(dir.path(), "snap", &snapshot).unwrap();
        let second = write_json_snapshot(dir.path(), "snap", &snapshot).unwrap();
        assert_ne!(first, second);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&first).unwrap()).unwrap();
        assert_eq!(written, snapshot);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = write_json_snapshot(&nested, "snap", &vec![1, 2, 3]).unwrap();
        assert!(path.starts_with(&nested));
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::Other, "no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe-nutrition-1.json");
        std::fs::write(&path, "{\"rec").unwrap();

        let err = fill_new_file(FullDisk, &path, b"{}").unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
