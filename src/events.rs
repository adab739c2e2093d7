//! Progress events emitted by organize and undo runs.
//!
//! Core operations never log directly. They hand each event to a [`Reporter`],
//! and the caller decides whether it becomes a log line, a test assertion, or
//! nothing at all.

use std::fmt;
use std::path::PathBuf;

/// Severity attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Something that happened while organizing or undoing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeEvent {
    /// Dry run: the file would have been moved to `to`.
    WouldMove { from: PathBuf, to: PathBuf },
    /// The file was relocated.
    Moved { from: PathBuf, to: PathBuf },
    /// Relocating the file failed; the run continues without it.
    MoveFailed { path: PathBuf, reason: String },
    /// The file is below the minimum size.
    SkippedSmall { path: PathBuf, size: u64 },
    /// The file matched an exclude rule.
    Filtered { path: PathBuf },
    /// A folder left behind by an earlier run; never descended into.
    SkippedCategoryDir { path: PathBuf },
    /// Undo moved a file back to its original location.
    Restored { from: PathBuf, to: PathBuf },
    /// Undo expected a file that is no longer there.
    RestoreMissing { path: PathBuf },
    /// Undo could not move a file back.
    RestoreFailed { path: PathBuf, reason: String },
    /// Something occupied the restore target and was renamed out of the way.
    BackedUp { path: PathBuf, backup: PathBuf },
    /// An unreadable history file was set aside before writing a fresh one.
    HistoryReset { path: PathBuf, backup: PathBuf },
}

impl OrganizeEvent {
    /// Returns the severity of this event.
    pub fn level(&self) -> Level {
        match self {
            Self::SkippedSmall { .. } | Self::Filtered { .. } | Self::SkippedCategoryDir { .. } => {
                Level::Debug
            }
            Self::WouldMove { .. } | Self::Moved { .. } | Self::Restored { .. } => Level::Info,
            Self::RestoreMissing { .. } | Self::BackedUp { .. } | Self::HistoryReset { .. } => {
                Level::Warn
            }
            Self::MoveFailed { .. } | Self::RestoreFailed { .. } => Level::Error,
        }
    }
}

impl fmt::Display for OrganizeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WouldMove { from, to } => {
                write!(f, "DRY: would move {} -> {}", from.display(), to.display())
            }
            Self::Moved { from, to } => write!(f, "Moved {} -> {}", file_name(from), to.display()),
            Self::MoveFailed { path, reason } => {
                write!(f, "Could not move {}: {}", path.display(), reason)
            }
            Self::SkippedSmall { path, size } => {
                write!(f, "Skipping small file {} ({} bytes)", file_name(path), size)
            }
            Self::Filtered { path } => write!(f, "Skipping excluded file {}", file_name(path)),
            Self::SkippedCategoryDir { path } => {
                write!(f, "Skipping category folder {}", file_name(path))
            }
            Self::Restored { from, to } => {
                write!(f, "Restored {} -> {}", file_name(from), to.display())
            }
            Self::RestoreMissing { path } => {
                write!(f, "Expected file to restore not found: {}", path.display())
            }
            Self::RestoreFailed { path, reason } => {
                write!(f, "Failed to restore {}: {}", path.display(), reason)
            }
            Self::BackedUp { path, backup } => write!(
                f,
                "Backed up existing {} to {}",
                path.display(),
                backup.display()
            ),
            Self::HistoryReset { path, backup } => write!(
                f,
                "History file {} was unreadable; kept a copy at {}",
                path.display(),
                backup.display()
            ),
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Receives events from organize and undo runs.
pub trait Reporter {
    fn report(&mut self, event: OrganizeEvent);
}

/// Collects events, mostly for tests.
impl Reporter for Vec<OrganizeEvent> {
    fn report(&mut self, event: OrganizeEvent) {
        self.push(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _event: OrganizeEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_levels() {
        let moved = OrganizeEvent::Moved {
            from: PathBuf::from("/a/x.png"),
            to: PathBuf::from("/a/Images/x.png"),
        };
        let missing = OrganizeEvent::RestoreMissing {
            path: PathBuf::from("/a/Images/x.png"),
        };
        let failed = OrganizeEvent::MoveFailed {
            path: PathBuf::from("/a/x.png"),
            reason: "denied".to_string(),
        };
        assert_eq!(moved.level(), Level::Info);
        assert_eq!(missing.level(), Level::Warn);
        assert_eq!(failed.level(), Level::Error);
    }

    #[test]
    fn test_event_display() {
        let event = OrganizeEvent::Moved {
            from: PathBuf::from("/a/x.png"),
            to: PathBuf::from("/a/Images/x.png"),
        };
        assert_eq!(event.to_string(), "Moved x.png -> /a/Images/x.png");
    }

    #[test]
    fn test_vec_reporter_collects() {
        let mut events: Vec<OrganizeEvent> = Vec::new();
        events.report(OrganizeEvent::Filtered {
            path: PathBuf::from("a.tmp"),
        });
        assert_eq!(events.len(), 1);
    }
}
