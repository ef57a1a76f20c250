//! Error types shared across the crate.
//!
//! The library surfaces typed errors so callers can tell authoring mistakes
//! (template syntax, unsupported pluralisation rules) apart from I/O failures.
//! The CLI layer wraps these in `anyhow` for reporting.

use std::path::PathBuf;

use thiserror::Error;

/// A template could not be tokenized or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", location_suffix(.name, .line))]
pub struct SyntaxError {
    pub message: String,
    /// 1-based line the error was detected on.
    pub line: usize,
    /// Template name, when the source had one.
    pub name: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
            name: None,
        }
    }

    pub fn in_template(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

fn location_suffix(name: &Option<String>, line: &usize) -> String {
    match name {
        Some(name) => format!(" in \"{}\" at line {}", name, line),
        None => format!(" at line {}", line),
    }
}

/// A plural message body could not be split into standard rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluralisationError {
    #[error("Interval based pluralisation definitions are not supported.")]
    IntervalRule,
    #[error("A pluralised message must have exactly two alternatives, found {0}.")]
    AlternativeCount(usize),
}

/// Failure while evaluating a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Unknown filter \"{0}\".")]
    UnknownFilter(String),
    #[error("Invalid argument \"{argument}\" for filter \"{filter}\": {message}")]
    InvalidArgument {
        filter: String,
        argument: String,
        message: String,
    },
    #[error("Filter \"{filter}\" has no argument named \"{argument}\".")]
    UnknownArgument { filter: String, argument: String },
}

/// Any failure produced by the template engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Pluralisation(#[from] PluralisationError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A resource could not be turned into catalogues.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unable to read file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to parse template {}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },
    #[error("Unable to parse source file {}: {message}", .path.display())]
    Source { path: PathBuf, message: String },
    #[error("Unable to walk {}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl ExtractionError {
    /// The message followed by every underlying cause, colon separated.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }

    /// Path of the resource the failure relates to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ExtractionError::Read { path, .. }
            | ExtractionError::Template { path, .. }
            | ExtractionError::Source { path, .. }
            | ExtractionError::Walk { path, .. } => path,
        }
    }
}

/// Failure while operating on a message catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("The passed in message catalogue must support metadata lookups.")]
    MetadataUnsupported,
    #[error("Unable to write catalogue file: {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::new("Unexpected end of template.", 3);
        assert_eq!(err.to_string(), "Unexpected end of template. at line 3");

        let err = err.in_template("home.html.twig");
        assert_eq!(
            err.to_string(),
            "Unexpected end of template. in \"home.html.twig\" at line 3"
        );
    }

    #[test]
    fn test_extraction_error_chain() {
        let err = ExtractionError::Template {
            path: PathBuf::from("t/a.twig"),
            source: SyntaxError::new("Unclosed string.", 2).into(),
        };
        assert_eq!(err.to_string(), "Unable to parse template t/a.twig");
        assert_eq!(
            err.chain(),
            "Unable to parse template t/a.twig: Unclosed string. at line 2"
        );
    }

    #[test]
    fn test_template_error_is_transparent() {
        let err: TemplateError = PluralisationError::IntervalRule.into();
        assert_eq!(
            err.to_string(),
            "Interval based pluralisation definitions are not supported."
        );
    }
}
