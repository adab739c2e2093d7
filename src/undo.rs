/// Undo functionality for reverting the most recent organize run.
///
/// This module pops the newest run from a directory's history and moves each of
/// its files back to where it came from, newest move first.
use crate::events::{OrganizeEvent, Reporter};
use crate::file_organizer::{self, MoveRecord, OrganizeResult};
use crate::history::History;
use std::fs;
use std::path::{Path, PathBuf};

/// Represents the result of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Number of files moved back.
    pub restored_files: usize,
    /// Files that were expected but no longer exist.
    pub skipped_files: Vec<(PathBuf, String)>,
    /// Files that could not be moved back.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files that occupied a restore target, with the name they were given.
    pub backups: Vec<(PathBuf, PathBuf)>,
    /// Runs still recorded after this undo.
    pub remaining_runs: usize,
}

impl UndoReport {
    /// Returns the total number of moves processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    /// Returns true if every move of the run was reversed.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

/// Manages undo operations for file organization.
pub struct UndoManager;

impl UndoManager {
    /// Reverses the most recent run recorded for `source`.
    ///
    /// Moves are replayed newest first. A file that is no longer at its
    /// recorded destination is skipped with a warning, and any other failure
    /// is recorded without stopping the rest of the undo. The popped run is
    /// always removed from the history afterwards, even if some files could
    /// not be restored.
    ///
    /// # Errors
    ///
    /// * `OrganizeError::InvalidSource` if `source` is not a directory
    /// * `OrganizeError::NoHistory` if nothing has been recorded
    /// * `OrganizeError::InvalidHistoryFormat` if the history is corrupt or empty
    ///
    /// In all of these cases nothing on disk is changed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use desksort::events::NullReporter;
    /// use desksort::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// match UndoManager::undo_last(Path::new("/path/to/directory"), &mut NullReporter) {
    ///     Ok(report) => println!("Restored {} files", report.restored_files),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo_last(source: &Path, reporter: &mut dyn Reporter) -> OrganizeResult<UndoReport> {
        let source = file_organizer::resolve_source(source)?;
        let history = History::for_dir(&source);
        let (last, remaining) = history.pop_last()?;

        let mut report = UndoReport {
            remaining_runs: remaining.len(),
            ..Default::default()
        };

        for record in last.moves.iter().rev().filter(|record| !record.dry_run) {
            match Self::restore_file(record) {
                Ok(backup) => {
                    if let Some(backup) = backup {
                        reporter.report(OrganizeEvent::BackedUp {
                            path: record.source_path.clone(),
                            backup: backup.clone(),
                        });
                        report.backups.push((record.source_path.clone(), backup));
                    }
                    reporter.report(OrganizeEvent::Restored {
                        from: record.dest_path.clone(),
                        to: record.source_path.clone(),
                    });
                    report.restored_files += 1;
                }
                Err(RestoreError::Missing) => {
                    reporter.report(OrganizeEvent::RestoreMissing {
                        path: record.dest_path.clone(),
                    });
                    report.skipped_files.push((
                        record.dest_path.clone(),
                        "File not found at expected location".to_string(),
                    ));
                }
                Err(RestoreError::Failed(reason)) => {
                    reporter.report(OrganizeEvent::RestoreFailed {
                        path: record.dest_path.clone(),
                        reason: reason.clone(),
                    });
                    report.failed_restores.push((record.dest_path.clone(), reason));
                }
            }
        }

        history.save(&remaining)?;
        Ok(report)
    }

    /// Moves one file back to its original location.
    ///
    /// Returns the backup path if something had to be moved out of the way.
    fn restore_file(record: &MoveRecord) -> Result<Option<PathBuf>, RestoreError> {
        if !record.dest_path.exists() {
            return Err(RestoreError::Missing);
        }

        if let Some(parent) = record.source_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RestoreError::Failed(format!(
                    "Could not recreate {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let backup = if record.source_path.exists() {
            let backup_path = Self::generate_backup_path(&record.source_path);
            fs::rename(&record.source_path, &backup_path).map_err(|e| {
                RestoreError::Failed(format!("Could not backup conflicting file: {}", e))
            })?;
            Some(backup_path)
        } else {
            None
        };

        file_organizer::relocate(&record.dest_path, &record.source_path)
            .map_err(|e| RestoreError::Failed(format!("Failed to restore file: {}", e)))?;

        Ok(backup)
    }

    /// Generates a backup path for a file by appending a timestamp.
    ///
    /// Example: `file.txt` becomes `file.txt.bak.20251109-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file");

        file_organizer::unique_destination(
            &original_path.with_file_name(format!("{}.bak.{}", filename, timestamp)),
        )
    }
}

enum RestoreError {
    Missing,
    Failed(String),
}
