/// Moving files into category directories.
///
/// This module scans a source directory, decides where each loose file belongs,
/// and relocates it without overwriting anything. Every move is described by a
/// [`MoveRecord`] so the run can later be undone.
use crate::config::CompiledFilters;
use crate::events::{OrganizeEvent, Reporter};
use crate::file_category::CategoryTable;
use crate::history::{CORRUPT_HISTORY_FILE_NAME, HISTORY_FILE_NAME};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// A single file relocation.
///
/// Serialized as `{"from": ..., "to": ..., "dry_run": true}` with the
/// `dry_run` key omitted for executed moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Where the file was before the move.
    #[serde(rename = "from")]
    pub source_path: PathBuf,
    /// Where the file is now, or where it would go for a dry run.
    #[serde(rename = "to")]
    pub dest_path: PathBuf,
    /// True if the move was only planned.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl MoveRecord {
    /// Records a move that was carried out.
    pub fn executed(source_path: PathBuf, dest_path: PathBuf) -> Self {
        Self {
            source_path,
            dest_path,
            dry_run: false,
        }
    }

    /// Records a move that a dry run would have made.
    pub fn planned(source_path: PathBuf, dest_path: PathBuf) -> Self {
        Self {
            source_path,
            dest_path,
            dry_run: true,
        }
    }
}

/// Every move made by one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// UTC completion time, ISO-8601.
    pub timestamp: String,
    /// Moves in the order they were made.
    #[serde(default)]
    pub moves: Vec<MoveRecord>,
}

impl RunRecord {
    /// Stamps a run with the current UTC time.
    pub fn completed_now(moves: Vec<MoveRecord>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            moves,
        }
    }
}

/// Options controlling a single organize run.
#[derive(Debug, Clone, Default)]
pub struct OrganizeOptions {
    /// Root for category folders. Defaults to the source directory.
    pub destination_root: Option<PathBuf>,
    /// Preview only; nothing on disk changes.
    pub dry_run: bool,
    /// Add a `YYYY-MM` folder inside each category.
    pub by_date: bool,
    /// Files smaller than this many kilobytes are left alone. 0 disables.
    pub min_size_kb: u64,
}

/// What an organize run did.
#[derive(Debug)]
pub struct RunOutcome {
    /// The canonical source directory that was organized.
    pub source: PathBuf,
    /// The run record, ready to append to the history.
    pub run: RunRecord,
    /// Files that could not be moved, with the reason.
    pub failures: Vec<(PathBuf, String)>,
    /// Files left in place because of size or exclude rules.
    pub skipped: Vec<PathBuf>,
    category_counts: BTreeMap<String, usize>,
}

impl RunOutcome {
    /// Number of moved (or planned) files per category, sorted by name.
    pub fn category_counts(&self) -> &BTreeMap<String, usize> {
        &self.category_counts
    }

    /// Returns true if every eligible file was handled.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Errors that can occur while organizing or undoing.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source path is missing or not a directory.
    #[error("Source {} is not a directory", .path.display())]
    InvalidSource { path: PathBuf },
    /// The destination root could not be resolved.
    #[error("Invalid destination {}: {source}", .path.display())]
    InvalidDestination { path: PathBuf, source: io::Error },
    /// Listing the source directory failed.
    #[error("Error reading directory {}: {source}", .path.display())]
    ReadDirFailed { path: PathBuf, source: io::Error },
    /// Failed to create a category directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move a file.
    #[error("Failed to move {} to {}: {error}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: io::Error,
    },
    /// Undo was requested but there is no history file.
    #[error("No history file found to undo in {}", .dir.display())]
    NoHistory { dir: PathBuf },
    /// Failed to read the history file.
    #[error("Failed to read history file {}: {source}", .path.display())]
    HistoryReadFailed { path: PathBuf, source: io::Error },
    /// Failed to write the history file.
    #[error("Failed to write history file {}: {source}", .path.display())]
    HistoryWriteFailed { path: PathBuf, source: io::Error },
    /// The history file does not hold a non-empty list of runs.
    #[error("History file corrupt or empty: {reason}")]
    InvalidHistoryFormat { reason: String },
}

/// Result type for organize and undo operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Organizes files by moving them into category subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves every eligible file directly inside `source` into its category folder.
    ///
    /// Subdirectories, symlinks, the history file and the filter config are
    /// never touched. Files are visited in file-name order. A file that cannot
    /// be moved is reported and left out of the run record; the rest of the
    /// run continues.
    ///
    /// In dry-run mode nothing on disk changes and each record carries the
    /// path the file would have been given before collision handling.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidSource`] if `source` is not a directory,
    /// and errors from resolving the destination or listing the source.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use desksort::config::CompiledFilters;
    /// use desksort::events::NullReporter;
    /// use desksort::file_category::CategoryTable;
    /// use desksort::file_organizer::{FileOrganizer, OrganizeOptions};
    /// use std::path::Path;
    ///
    /// let outcome = FileOrganizer::organize(
    ///     Path::new("/home/me/Desktop"),
    ///     &OrganizeOptions { dry_run: true, ..Default::default() },
    ///     &CategoryTable::default(),
    ///     &CompiledFilters::default(),
    ///     &mut NullReporter,
    /// )
    /// .expect("organize failed");
    /// println!("{} files would move", outcome.run.moves.len());
    /// ```
    pub fn organize(
        source: &Path,
        options: &OrganizeOptions,
        table: &CategoryTable,
        filters: &CompiledFilters,
        reporter: &mut dyn Reporter,
    ) -> OrganizeResult<RunOutcome> {
        let source = resolve_source(source)?;
        let destination_root = match &options.destination_root {
            Some(root) => resolve_destination(root)?,
            None => source.clone(),
        };

        let mut entries: Vec<fs::DirEntry> = fs::read_dir(&source)
            .map_err(|e| OrganizeError::ReadDirFailed {
                path: source.clone(),
                source: e,
            })?
            .flatten()
            .collect();
        entries.sort_by_key(|entry| entry.file_name());

        let min_size = options.min_size_kb.saturating_mul(1024);
        let mut moves = Vec::new();
        let mut failures = Vec::new();
        let mut skipped = Vec::new();
        let mut category_counts = BTreeMap::new();

        for entry in entries {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() && table.is_category_dir(&entry.file_name().to_string_lossy()) {
                reporter.report(OrganizeEvent::SkippedCategoryDir { path: entry.path() });
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if is_reserved(&name_str) {
                continue;
            }
            if !filters.should_include(&name_str) {
                reporter.report(OrganizeEvent::Filtered { path: path.clone() });
                skipped.push(path);
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    Self::record_failure(&path, e.to_string(), reporter, &mut failures);
                    continue;
                }
            };
            if metadata.len() < min_size {
                reporter.report(OrganizeEvent::SkippedSmall {
                    path: path.clone(),
                    size: metadata.len(),
                });
                skipped.push(path);
                continue;
            }

            let category = table.category_for(&path);
            let mut target_dir = destination_root.join(category);
            if options.by_date {
                match metadata.modified() {
                    Ok(modified) => target_dir.push(date_bucket(modified)),
                    Err(e) => {
                        Self::record_failure(&path, e.to_string(), reporter, &mut failures);
                        continue;
                    }
                }
            }

            if options.dry_run {
                let candidate = target_dir.join(&name);
                reporter.report(OrganizeEvent::WouldMove {
                    from: path.clone(),
                    to: candidate.clone(),
                });
                moves.push(MoveRecord::planned(path, candidate));
            } else {
                match Self::move_into_dir(&path, &target_dir) {
                    Ok(record) => {
                        reporter.report(OrganizeEvent::Moved {
                            from: record.source_path.clone(),
                            to: record.dest_path.clone(),
                        });
                        moves.push(record);
                    }
                    Err(e) => {
                        Self::record_failure(&path, e.to_string(), reporter, &mut failures);
                        continue;
                    }
                }
            }
            *category_counts.entry(category.to_string()).or_insert(0) += 1;
        }

        Ok(RunOutcome {
            source,
            run: RunRecord::completed_now(moves),
            failures,
            skipped,
            category_counts,
        })
    }

    /// Moves a file into `target_dir`, creating the directory if needed and
    /// picking a free name if the file name is already taken.
    ///
    /// Returns the record of the move with the path actually used.
    pub fn move_into_dir(file_path: &Path, target_dir: &Path) -> OrganizeResult<MoveRecord> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                from: file_path.to_path_buf(),
                to: target_dir.to_path_buf(),
                error: io::Error::new(ErrorKind::InvalidInput, "file has no name component"),
            })?;

        fs::create_dir_all(target_dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: target_dir.to_path_buf(),
            source: e,
        })?;

        let destination = unique_destination(&target_dir.join(file_name));
        relocate(file_path, &destination).map_err(|e| OrganizeError::FileMoveFailure {
            from: file_path.to_path_buf(),
            to: destination.clone(),
            error: e,
        })?;

        Ok(MoveRecord::executed(file_path.to_path_buf(), destination))
    }

    fn record_failure(
        path: &Path,
        reason: String,
        reporter: &mut dyn Reporter,
        failures: &mut Vec<(PathBuf, String)>,
    ) {
        reporter.report(OrganizeEvent::MoveFailed {
            path: path.to_path_buf(),
            reason: reason.clone(),
        });
        failures.push((path.to_path_buf(), reason));
    }
}

/// Canonicalizes `source`, failing unless it is an existing directory.
pub(crate) fn resolve_source(source: &Path) -> OrganizeResult<PathBuf> {
    if !source.is_dir() {
        return Err(OrganizeError::InvalidSource {
            path: source.to_path_buf(),
        });
    }
    fs::canonicalize(source).map_err(|_| OrganizeError::InvalidSource {
        path: source.to_path_buf(),
    })
}

fn resolve_destination(root: &Path) -> OrganizeResult<PathBuf> {
    if root.exists() && !root.is_dir() {
        return Err(OrganizeError::InvalidDestination {
            path: root.to_path_buf(),
            source: io::Error::new(ErrorKind::AlreadyExists, "not a directory"),
        });
    }
    fs::canonicalize(root)
        .or_else(|_| std::path::absolute(root))
        .map_err(|e| OrganizeError::InvalidDestination {
            path: root.to_path_buf(),
            source: e,
        })
}

/// The history file, its `.corrupt` copy and the local config stay put.
fn is_reserved(file_name: &str) -> bool {
    file_name == HISTORY_FILE_NAME
        || file_name == CORRUPT_HISTORY_FILE_NAME
        || file_name == crate::config::CONFIG_FILE_NAME
}

/// Formats a modification time as the `YYYY-MM` bucket in local time.
pub fn date_bucket(modified: SystemTime) -> String {
    DateTime::<Local>::from(modified).format("%Y-%m").to_string()
}

/// Returns `candidate` if nothing exists there, otherwise the first free
/// `stem_N.ext` sibling counting from 1.
///
/// # Examples
///
/// ```no_run
/// use desksort::file_organizer::unique_destination;
/// use std::path::Path;
///
/// // With /tmp/Images/photo.png already present:
/// let free = unique_destination(Path::new("/tmp/Images/photo.png"));
/// assert_eq!(free, Path::new("/tmp/Images/photo_1.png"));
/// ```
pub fn unique_destination(candidate: &Path) -> PathBuf {
    if !candidate.exists() {
        return candidate.to_path_buf();
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = candidate
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let next = candidate.with_file_name(format!("{}_{}{}", stem, counter, extension));
        if !next.exists() {
            return next;
        }
        counter += 1;
    }
}

/// Renames `from` to `to`, copying and deleting when the rename would cross
/// file systems.
pub(crate) fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            copy_then_remove(from, to, |source| fs::remove_file(source))
        }
        Err(e) => Err(e),
    }
}

/// Copies `from` to `to` keeping its modified time, then removes `from` with
/// `remove_source`.
///
/// On any failure the copy at `to` is deleted again, so the file exists in
/// exactly one place whether or not the move succeeded.
fn copy_then_remove(
    from: &Path,
    to: &Path,
    remove_source: impl FnOnce(&Path) -> io::Result<()>,
) -> io::Result<()> {
    let modified = fs::metadata(from)?.modified()?;

    let result = fs::copy(from, to)
        .and_then(|_| File::options().write(true).open(to))
        .and_then(|copy| copy.set_modified(modified))
        .and_then(|()| remove_source(from));

    if result.is_err() {
        let _ = fs::remove_file(to);
    }
    result
}
