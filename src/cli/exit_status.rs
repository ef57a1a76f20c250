use std::process::ExitCode;

use super::run::CommandSummary;

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed, every file was extracted
/// - `Failure` (1): Command completed but some files could not be extracted
/// - `Error` (2): Command failed (config error, missing resource, write error)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl ExitStatus {
    pub fn from_summary(summary: &CommandSummary) -> Self {
        match summary {
            CommandSummary::Extract(extract) if !extract.failures.is_empty() => {
                ExitStatus::Failure
            }
            CommandSummary::Extract(_) | CommandSummary::Init(_) => ExitStatus::Success,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
