//! desksort - sort a folder's loose files into category subfolders
//!
//! This library classifies files by extension, moves them into category
//! folders (optionally bucketed by month), records every live run in a
//! per-directory history file, and can undo the most recent run.

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod file_category;
pub mod file_organizer;
pub mod history;
pub mod logging;
pub mod output;
pub mod undo;

pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use error::{Error, Result};
pub use events::{NullReporter, OrganizeEvent, Reporter};
pub use file_category::{CategoryTable, FALLBACK_CATEGORY};
pub use file_organizer::{
    FileOrganizer, MoveRecord, OrganizeError, OrganizeOptions, RunOutcome, RunRecord,
};
pub use history::{HISTORY_FILE_NAME, History};
pub use undo::{UndoManager, UndoReport};

pub use cli::{OrganizeCommand, run_cli};
