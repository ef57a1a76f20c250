//! Summary output for CLI commands.

use std::io::{self, Write};

use colored::Colorize;

use super::run::{CommandSummary, ExtractSummary, InitSummary};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

pub fn print(summary: &CommandSummary, verbose: bool) {
    match summary {
        CommandSummary::Extract(extract) => {
            print_extract_to(extract, &mut io::stdout().lock());
            print_failures_to(extract, verbose, &mut io::stderr().lock());
        }
        CommandSummary::Init(init) => print_init_to(init, &mut io::stdout().lock()),
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

pub fn print_extract_to<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    let messages: usize = summary.written.iter().map(|(_, count)| count).sum();
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Extracted {} {} from {} {}",
            messages,
            plural(messages, "message", "messages"),
            summary.files_extracted,
            plural(summary.files_extracted, "file", "files")
        )
        .green()
    );
    for (path, count) in &summary.written {
        let _ = writeln!(
            writer,
            "  {} {} ({} {})",
            "wrote".dimmed(),
            path.display(),
            count,
            plural(*count, "entry", "entries")
        );
    }
}

/// Print files that could not be extracted. Without `verbose` only the count
/// is shown.
pub fn print_failures_to<W: Write>(summary: &ExtractSummary, verbose: bool, writer: &mut W) {
    if summary.failures.is_empty() {
        return;
    }
    if verbose {
        for (_, reason) in &summary.failures {
            let _ = writeln!(writer, "{} {}", "warning:".bold().yellow(), reason);
        }
    } else {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be extracted (use {} for details)",
            "warning:".bold().yellow(),
            summary.failures.len(),
            "-v".cyan()
        );
    }
}

pub fn print_init_to<W: Write>(summary: &InitSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", summary.path.display()).green()
    );
}
