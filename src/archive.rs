//! Zip packaging of downloaded media.
//!
//! [`build_archive`] writes every input file into one flat zip container,
//! each entry named after the file's base name. It refuses empty input and
//! verifies the written archive is non-empty before reporting success, so a
//! caller never offers a missing or zero-byte archive.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the archive inside a run's working directory.
pub const ARCHIVE_FILE_NAME: &str = "downloaded_media.zip";

/// Name under which the archive is offered to the user.
pub const OFFERED_FILE_NAME: &str = "media_files.zip";

/// MIME type of the offered archive.
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

/// Errors that can occur while packaging.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No files were given; nothing was written.
    #[error("no files to archive")]
    EmptyInput,

    /// The archive was written but has zero size.
    #[error("archive {path} is empty after writing")]
    EmptyArchive {
        /// Archive path.
        path: PathBuf,
    },

    /// An input path has no usable file name.
    #[error("cannot derive an archive entry name from {path}")]
    InvalidEntryName {
        /// Offending input path.
        path: PathBuf,
    },

    /// Two inputs would land on the same entry name.
    #[error("duplicate archive entry name {name}")]
    DuplicateEntry {
        /// The repeated entry name.
        name: String,
    },

    /// File system error reading an input or writing the archive.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The zip encoder or decoder failed.
    #[error("zip error on {path}: {source}")]
    Zip {
        /// Archive path.
        path: PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },
}

impl ArchiveError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Zip {
            path: path.into(),
            source,
        }
    }
}

/// What [`build_archive`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Path of the written archive.
    pub path: PathBuf,
    /// Number of entries written.
    pub entries: usize,
    /// Archive size in bytes.
    pub size_bytes: u64,
}

/// Packages `paths` into a zip archive at `archive_path`.
///
/// Entries are stored under each file's base name, in the order given. An
/// existing file at `archive_path` is overwritten. On failure no archive is
/// left at `archive_path`.
///
/// # Errors
///
/// - [`ArchiveError::EmptyInput`] if `paths` is empty (checked before any
///   file is created)
/// - [`ArchiveError::InvalidEntryName`] / [`ArchiveError::DuplicateEntry`] if
///   the inputs do not map to distinct flat names
/// - [`ArchiveError::EmptyArchive`] if the written archive has zero size
/// - [`ArchiveError::Io`] / [`ArchiveError::Zip`] on read or write failures
#[instrument(skip(paths), fields(files = paths.len(), archive = %archive_path.display()))]
pub fn build_archive(
    paths: &[PathBuf],
    archive_path: &Path,
) -> Result<ArchiveSummary, ArchiveError> {
    if paths.is_empty() {
        return Err(ArchiveError::EmptyInput);
    }

    let entries = entry_names(paths)?;

    let result = write_archive(&entries, archive_path);
    if result.is_err() {
        let _ = std::fs::remove_file(archive_path);
    }
    result?;

    let size_bytes = std::fs::metadata(archive_path)
        .map_err(|e| ArchiveError::io(archive_path, e))?
        .len();
    if size_bytes == 0 {
        let _ = std::fs::remove_file(archive_path);
        return Err(ArchiveError::EmptyArchive {
            path: archive_path.to_path_buf(),
        });
    }

    info!(entries = entries.len(), size_bytes, "archive written");
    Ok(ArchiveSummary {
        path: archive_path.to_path_buf(),
        entries: entries.len(),
        size_bytes,
    })
}

/// Lists entry names of an existing archive, in archive order.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] if the file cannot be opened and
/// [`ArchiveError::Zip`] if it is not a readable zip archive.
pub fn archive_entries(archive_path: &Path) -> Result<Vec<String>, ArchiveError> {
    let file = File::open(archive_path).map_err(|e| ArchiveError::io(archive_path, e))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| ArchiveError::zip(archive_path, e))?;

    (0..archive.len())
        .map(|index| {
            archive
                .by_index(index)
                .map(|entry| entry.name().to_string())
                .map_err(|e| ArchiveError::zip(archive_path, e))
        })
        .collect()
}

fn entry_names(paths: &[PathBuf]) -> Result<Vec<(&Path, String)>, ArchiveError> {
    let mut seen = HashSet::with_capacity(paths.len());
    paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .filter(|name| !name.is_empty())
                .ok_or_else(|| ArchiveError::InvalidEntryName { path: path.clone() })?
                .to_string();
            if !seen.insert(name.clone()) {
                return Err(ArchiveError::DuplicateEntry { name });
            }
            Ok((path.as_path(), name))
        })
        .collect()
}

fn write_archive(entries: &[(&Path, String)], archive_path: &Path) -> Result<(), ArchiveError> {
    let file = File::create(archive_path).map_err(|e| ArchiveError::io(archive_path, e))?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (source, name) in entries {
        debug!(entry = %name, source = %source.display(), "adding archive entry");
        let mut input = File::open(source).map_err(|e| ArchiveError::io(*source, e))?;
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| ArchiveError::zip(archive_path, e))?;
        std::io::copy(&mut input, &mut writer).map_err(|e| ArchiveError::io(*source, e))?;
    }

    writer
        .finish()
        .map_err(|e| ArchiveError::zip(archive_path, e))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Read;

    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_build_archive_empty_input_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let archive_path = temp_dir.path().join(ARCHIVE_FILE_NAME);

        let result = build_archive(&[], &archive_path);

        assert!(matches!(result, Err(ArchiveError::EmptyInput)));
        assert!(!archive_path.exists());
    }

    #[test]
    fn test_build_archive_round_trip_lists_base_names() {
        let temp_dir = TempDir::new().unwrap();
        let media = temp_dir.path().join("media");
        std::fs::create_dir(&media).unwrap();
        let paths = vec![
            write_file(&media, "alice.jpg", b"jpeg"),
            write_file(&media, "alice_1.jpg", b"jpeg two"),
            write_file(&media, "bob.mp4", b"mp4 data"),
        ];
        let archive_path = temp_dir.path().join(ARCHIVE_FILE_NAME);

        let summary = build_archive(&paths, &archive_path).unwrap();

        assert_eq!(summary.entries, 3);
        assert!(summary.size_bytes > 0);
        assert_eq!(summary.path, archive_path);
        assert_eq!(
            archive_entries(&archive_path).unwrap(),
            vec!["alice.jpg", "alice_1.jpg", "bob.mp4"]
        );
    }

    #[test]
    fn test_build_archive_preserves_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "carol.gif", b"GIF89a-content");
        let archive_path = temp_dir.path().join("out.zip");

        build_archive(&[path], &archive_path).unwrap();

        let mut archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let mut entry = archive.by_name("carol.gif").unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"GIF89a-content");
    }

    #[test]
    fn test_build_archive_overwrites_existing_archive() {
        let temp_dir = TempDir::new().unwrap();
        let first = write_file(temp_dir.path(), "a.jpg", b"a");
        let second = write_file(temp_dir.path(), "b.jpg", b"b");
        let archive_path = temp_dir.path().join("out.zip");

        build_archive(&[first.clone(), second], &archive_path).unwrap();
        build_archive(&[first], &archive_path).unwrap();

        assert_eq!(archive_entries(&archive_path).unwrap(), vec!["a.jpg"]);
    }

    #[test]
    fn test_build_archive_missing_input_fails_and_removes_archive() {
        let temp_dir = TempDir::new().unwrap();
        let archive_path = temp_dir.path().join("out.zip");

        let result = build_archive(&[temp_dir.path().join("missing.mp4")], &archive_path);

        assert!(matches!(result, Err(ArchiveError::Io { .. })));
        assert!(!archive_path.exists());
    }

    #[test]
    fn test_build_archive_rejects_duplicate_base_names() {
        let temp_dir = TempDir::new().unwrap();
        let one = temp_dir.path().join("one");
        let two = temp_dir.path().join("two");
        std::fs::create_dir(&one).unwrap();
        std::fs::create_dir(&two).unwrap();
        let paths = vec![
            write_file(&one, "dave.mp4", b"1"),
            write_file(&two, "dave.mp4", b"2"),
        ];

        let result = build_archive(&paths, &temp_dir.path().join("out.zip"));
        assert!(matches!(result, Err(ArchiveError::DuplicateEntry { name }) if name == "dave.mp4"));
    }

    #[test]
    fn test_build_archive_rejects_path_without_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let result = build_archive(&[PathBuf::from("/")], &temp_dir.path().join("out.zip"));
        assert!(matches!(result, Err(ArchiveError::InvalidEntryName { .. })));
    }

    #[test]
    fn test_archive_entries_rejects_non_zip() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "fake.zip", b"not a zip");
        assert!(matches!(
            archive_entries(&path),
            Err(ArchiveError::Zip { .. })
        ));
    }

    #[test]
    fn test_error_display_empty_input() {
        assert_eq!(ArchiveError::EmptyInput.to_string(), "no files to archive");
    }
}
