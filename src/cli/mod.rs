//! Command-line layer: argument parsing, dispatch and summary output.

mod args;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, Command, ExtractArgs};
pub use exit_status::ExitStatus;
pub use run::{CommandSummary, ExtractSummary, InitSummary};

use anyhow::Result;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let verbose = args.verbose();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    let summary = run::run(args)?;
    report::print(&summary, verbose);

    Ok(ExitStatus::from_summary(&summary))
}
