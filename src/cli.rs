//! Command-line interface for desksort.
//!
//! This module handles:
//! - Argument parsing
//! - Resolving the source directory (default: the desktop)
//! - Running an organize or undo and reporting the outcome

use crate::config::FilterConfig;
use crate::error::{Error, Result};
use crate::file_category::CategoryTable;
use crate::file_organizer::{FileOrganizer, OrganizeError, OrganizeOptions};
use crate::history::History;
use crate::output::{LogReporter, OutputFormatter};
use crate::undo::UndoManager;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Organize files in a folder by category.
#[derive(Debug, Parser)]
#[command(name = "desksort", version, about)]
pub struct Cli {
    /// Source folder to organize (default: your desktop)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Optional target parent folder. If omitted, subfolders are created in source.
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Show what would happen without moving files.
    #[arg(long)]
    pub dry_run: bool,

    /// Undo the last run recorded for the source folder.
    #[arg(long, conflicts_with_all = ["dry_run", "by_date", "dest", "min_size_kb"])]
    pub undo: bool,

    /// Also bucket into YYYY-MM subfolders by modified time.
    #[arg(long)]
    pub by_date: bool,

    /// Ignore files smaller than this (KB).
    #[arg(long, default_value_t = 0)]
    pub min_size_kb: u64,

    /// Filter configuration file (default: .desksort.toml in the source folder).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print more detail (-v for skipped files, -vv for everything).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Returns the source directory, expanding `~` and falling back to the
    /// user's desktop.
    pub fn source_dir(&self) -> Result<PathBuf> {
        match &self.source {
            Some(path) => Ok(expand_tilde(path)),
            None => default_source().ok_or(Error::NoDefaultSource),
        }
    }

    /// Converts the parsed flags into a command.
    pub fn command(&self) -> OrganizeCommand {
        if self.undo {
            OrganizeCommand::Undo
        } else {
            OrganizeCommand::Organize(OrganizeOptions {
                destination_root: self.dest.as_deref().map(expand_tilde),
                dry_run: self.dry_run,
                by_date: self.by_date,
                min_size_kb: self.min_size_kb,
            })
        }
    }
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize(OrganizeOptions),
    /// Undo the previous organization.
    Undo,
}

/// Runs one command against `source`.
///
/// # Examples
///
/// ```no_run
/// use desksort::cli::{run_cli, OrganizeCommand};
/// use desksort::file_organizer::OrganizeOptions;
/// use std::path::Path;
///
/// let result = run_cli(
///     OrganizeCommand::Organize(OrganizeOptions::default()),
///     Path::new("/path/to/directory"),
///     None,
/// );
/// if let Err(e) = result {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, source: &Path, config_path: Option<&Path>) -> Result<()> {
    match command {
        OrganizeCommand::Organize(options) => organize_directory(source, &options, config_path),
        OrganizeCommand::Undo => undo_organization(source),
    }
}

fn organize_directory(
    source: &Path,
    options: &OrganizeOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    if !source.is_dir() {
        return Err(OrganizeError::InvalidSource {
            path: source.to_path_buf(),
        }
        .into());
    }

    info!(
        "Organizing: source={}, dest_parent={}, dry_run={}",
        source.display(),
        options
            .destination_root
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "None".to_string()),
        options.dry_run
    );

    let filters = FilterConfig::load(config_path, source)?.compile()?;
    let table = CategoryTable::default();
    let mut reporter = LogReporter;

    let outcome = FileOrganizer::organize(source, options, &table, &filters, &mut reporter)?;

    if options.dry_run {
        info!("Dry-run completed. No changes saved.");
        OutputFormatter::dry_run_notice(&format!(
            "{} file(s) would be moved. Run again without --dry-run to apply.",
            outcome.run.moves.len()
        ));
    } else {
        let history = History::for_dir(&outcome.source);
        history.append_run(outcome.run.clone(), &mut reporter)?;
        info!("Saved history to {}", history.path().display());
    }

    if !outcome.is_complete_success() {
        warn!(
            "{} file(s) could not be organized; see errors above",
            outcome.failures.len()
        );
    }

    OutputFormatter::summary_table(outcome.category_counts());
    Ok(())
}

fn undo_organization(source: &Path) -> Result<()> {
    let mut reporter = LogReporter;
    let report = UndoManager::undo_last(source, &mut reporter)?;

    if report.is_complete_success() {
        info!("Undo complete.");
    } else {
        warn!(
            "Undo restored {} of {} file(s): {} missing, {} failed",
            report.restored_files,
            report.total_processed(),
            report.skipped_files.len(),
            report.failed_restores.len()
        );
    }

    OutputFormatter::undo_summary(&report);
    Ok(())
}

fn default_source() -> Option<PathBuf> {
    dirs::desktop_dir().or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
}

/// Expands a leading `~` to the home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("desksort").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_parse_organize_flags() {
        let cli = parse(&[
            "-s",
            "/tmp/in",
            "-d",
            "/tmp/out",
            "--by-date",
            "--min-size-kb",
            "20",
            "--dry-run",
        ]);

        assert_eq!(cli.source_dir().unwrap(), PathBuf::from("/tmp/in"));
        match cli.command() {
            OrganizeCommand::Organize(options) => {
                assert_eq!(options.destination_root, Some(PathBuf::from("/tmp/out")));
                assert!(options.dry_run);
                assert!(options.by_date);
                assert_eq!(options.min_size_kb, 20);
            }
            OrganizeCommand::Undo => panic!("expected organize"),
        }
    }

    #[test]
    fn test_parse_undo() {
        let cli = parse(&["--source", "/tmp/in", "--undo"]);
        assert!(matches!(cli.command(), OrganizeCommand::Undo));
    }

    #[test]
    fn test_undo_conflicts_with_dry_run() {
        let result = Cli::try_parse_from(["desksort", "--undo", "--dry-run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~/Downloads")), home.join("Downloads"));
        }
        assert_eq!(expand_tilde(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde(Path::new("~user/x")), PathBuf::from("~user/x"));
    }

    #[test]
    fn test_run_cli_invalid_source() {
        let result = run_cli(
            OrganizeCommand::Organize(OrganizeOptions::default()),
            Path::new("/non/existent/path"),
            None,
        );
        assert!(matches!(
            result,
            Err(Error::Organize(OrganizeError::InvalidSource { .. }))
        ));
    }
}
