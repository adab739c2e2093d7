/// Persisted run history for undo.
///
/// Each organized directory owns one hidden JSON file holding every live run,
/// oldest first. Older files that hold a single run object instead of a list
/// are still read and are rewritten as a list the next time history is saved.
use crate::events::{OrganizeEvent, Reporter};
use crate::file_organizer::{OrganizeError, OrganizeResult, RunRecord};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the history file inside the organized directory.
pub const HISTORY_FILE_NAME: &str = ".organize_history.json";

/// Name an unreadable history file is moved to before a fresh one is started.
pub const CORRUPT_HISTORY_FILE_NAME: &str = ".organize_history.json.corrupt";

/// Either shape the history file may hold on disk.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredHistory {
    Runs(Vec<RunRecord>),
    Single(RunRecord),
}

impl From<StoredHistory> for Vec<RunRecord> {
    fn from(stored: StoredHistory) -> Self {
        match stored {
            StoredHistory::Runs(runs) => runs,
            StoredHistory::Single(run) => vec![run],
        }
    }
}

/// Handle to the history file of one directory.
#[derive(Debug, Clone)]
pub struct History {
    dir: PathBuf,
    path: PathBuf,
}

impl History {
    /// Addresses the history file inside `dir`. Nothing is read yet.
    pub fn for_dir(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            path: dir.join(HISTORY_FILE_NAME),
        }
    }

    /// Returns the path of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the history file is present.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads every recorded run, oldest first.
    ///
    /// Returns `Ok(None)` if there is no history file.
    pub fn load(&self) -> OrganizeResult<Option<Vec<RunRecord>>> {
        if !self.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).map_err(|e| OrganizeError::HistoryReadFailed {
            path: self.path.clone(),
            source: e,
        })?;

        let stored: StoredHistory =
            serde_json::from_str(&json).map_err(|e| OrganizeError::InvalidHistoryFormat {
                reason: format!("JSON parse error: {}", e),
            })?;

        Ok(Some(stored.into()))
    }

    /// Writes `runs` as the complete history.
    pub fn save(&self, runs: &[RunRecord]) -> OrganizeResult<()> {
        let json = serde_json::to_string_pretty(runs).map_err(|e| {
            OrganizeError::HistoryWriteFailed {
                path: self.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("JSON serialization failed: {}", e),
                ),
            }
        })?;

        fs::write(&self.path, json).map_err(|e| OrganizeError::HistoryWriteFailed {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Appends a run to the history, creating the file if needed.
    ///
    /// An unreadable history file is kept next to the new one with a
    /// `.corrupt` suffix and a fresh history is started, so the moves that
    /// were just made stay undoable.
    pub fn append_run(&self, run: RunRecord, reporter: &mut dyn Reporter) -> OrganizeResult<()> {
        let mut runs = match self.load() {
            Ok(runs) => runs.unwrap_or_default(),
            Err(OrganizeError::InvalidHistoryFormat { .. }) => {
                let backup = self.corrupt_backup_path();
                fs::rename(&self.path, &backup).map_err(|e| OrganizeError::HistoryWriteFailed {
                    path: backup.clone(),
                    source: e,
                })?;
                reporter.report(OrganizeEvent::HistoryReset {
                    path: self.path.clone(),
                    backup,
                });
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        runs.push(run);
        self.save(&runs)
    }

    /// Removes the most recent run from the loaded history.
    ///
    /// The file itself is not rewritten; callers save the returned remainder
    /// once they are done with the popped run.
    ///
    /// # Errors
    ///
    /// [`OrganizeError::NoHistory`] if the file is absent, and
    /// [`OrganizeError::InvalidHistoryFormat`] if it cannot be parsed or holds
    /// no runs.
    pub fn pop_last(&self) -> OrganizeResult<(RunRecord, Vec<RunRecord>)> {
        let mut runs = self.load()?.ok_or_else(|| OrganizeError::NoHistory {
            dir: self.dir.clone(),
        })?;

        let last = runs.pop().ok_or_else(|| OrganizeError::InvalidHistoryFormat {
            reason: "no recorded runs".to_string(),
        })?;

        Ok((last, runs))
    }

    fn corrupt_backup_path(&self) -> PathBuf {
        self.dir.join(CORRUPT_HISTORY_FILE_NAME)
    }
}
