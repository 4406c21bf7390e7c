//! Whole-file JSON persistence shared by the request store and the authorizer
//! directory.
//!
//! Files are always read and rewritten in full. There is no locking; a single
//! writer per file is assumed.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use serde::{Serialize, de::DeserializeOwned};

/// Failure to persist a backing file.
///
/// The in-memory state of the owning component is unaffected, but the copy on
/// disk is now stale.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The file or its parent directory could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The value could not be rendered as JSON.
    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
}

/// Failure to read a backing file that exists.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file exists but could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The contents are not valid JSON of the expected shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
}

/// Reads and parses a JSON file.
///
/// Returns `Ok(None)` if the file does not exist.
pub(crate) fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, LoadError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Pretty-prints `value` as JSON into `path`, replacing its contents.
///
/// Parent directories are created if needed.
pub(crate) fn write<T: Serialize>(path: &Path, value: &T) -> Result<(), SaveError> {
    let io_error = |source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
        if source.is_io() {
            SaveError::Io {
                path: path.to_path_buf(),
                source: source.into(),
            }
        } else {
            SaveError::Serialize {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    writer.write_all(b"\n").map_err(io_error)?;
    writer.flush().map_err(io_error)?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Moves an unreadable file aside so a later save cannot destroy it.
///
/// The file is renamed to `<stem>.corrupt-<YYYYMMDD_HHMMSS>.json` next to the
/// original, with a `-<n>` suffix if that name is taken. `path` no longer
/// exists afterwards. Returns the new path.
pub(crate) fn quarantine(path: &Path) -> io::Result<PathBuf> {
    let stem = path
        .file_stem()
        .map_or_else(|| "data".into(), |s| s.to_string_lossy());
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut target = path.with_file_name(format!("{stem}.corrupt-{stamp}.json"));
    let mut n = 1;
    while target.exists() {
        target = path.with_file_name(format!("{stem}.corrupt-{stamp}-{n}.json"));
        n += 1;
    }
    std::fs::rename(path, &target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let tmp = TempDir::new().unwrap();
        let value: Option<BTreeMap<String, u32>> = read(&tmp.path().join("none.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn write_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/data.json");
        let value = BTreeMap::from([("a".to_string(), 1_u32)]);

        write(&path, &value).unwrap();

        let back: BTreeMap<String, u32> = read(&path).unwrap().unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn non_ascii_text_is_written_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");

        write(&path, &"Creación").unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Creación"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<Option<BTreeMap<String, u32>>, _> = read(&path);
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn quarantine_moves_the_original_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("requests.json");
        std::fs::write(&path, "{ broken").unwrap();

        let moved = quarantine(&path).unwrap();

        assert!(!path.exists());
        assert!(moved.file_name().unwrap().to_string_lossy().starts_with("requests.corrupt-"));
        assert_eq!(std::fs::read_to_string(moved).unwrap(), "{ broken");
    }

    #[test]
    fn quarantine_never_overwrites_an_earlier_copy() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("requests.json");

        std::fs::write(&path, "first").unwrap();
        let first = quarantine(&path).unwrap();
        std::fs::write(&path, "second").unwrap();
        let second = quarantine(&path).unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read_to_string(first).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(second).unwrap(), "second");
    }
}
