use clap::Parser;
use desksort::cli::{Cli, run_cli};
use desksort::logging::init_logger;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    let result = cli
        .source_dir()
        .and_then(|source| run_cli(cli.command(), &source, cli.config.as_deref()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
