//! Message extraction from templates and source files.
//!
//! An [`Extractor`] turns a resource (a single file or a directory tree) into
//! [`Catalogues`]. Directory extraction is forgiving: a file that cannot be
//! read or parsed is recorded as a failed [`FileOutcome`] and the batch goes
//! on. Extracting a single explicit file propagates its error.

pub mod message;
pub mod source;
pub mod template;
pub mod visitor;

use std::path::{Path, PathBuf};

use colored::Colorize;
use glob::Pattern;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::catalogue::{Catalogues, TranslationKey};
use crate::error::ExtractionError;
use message::{Message, MessageDomain};

/// Domain used for messages that do not name one.
pub const DEFAULT_DOMAIN: &str = "messages";

pub trait Extractor {
    /// Decides which files of a resource are extracted.
    fn selector(&self) -> &FileSelector;

    /// Extract a single file, without checking its extension.
    fn extract_file(&self, path: &Path) -> Result<Catalogues, ExtractionError>;

    /// Extract a file or directory.
    ///
    /// A file with a foreign extension yields empty catalogues.
    fn extract(&self, resource: &Path) -> Result<Catalogues, ExtractionError> {
        if resource.is_file() {
            if !self.selector().accepts(resource) {
                debug!("Skipping {}: extension not handled", resource.display());
                return Ok(Catalogues::new());
            }
            return self.extract_file(resource);
        }
        Ok(self.extract_batch(resource)?.catalogues)
    }

    /// Extract every selected file of `resource`, recording per-file outcomes.
    fn extract_batch(&self, resource: &Path) -> Result<ExtractionReport, ExtractionError> {
        let mut report = ExtractionReport::default();
        for path in self.selector().collect(resource)? {
            let result = self.extract_file(&path);
            report.record(path, result);
        }
        Ok(report)
    }
}

#[derive(Debug)]
pub enum FileOutcome {
    Extracted { path: PathBuf, messages: usize },
    Failed { path: PathBuf, error: ExtractionError },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Extracted { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

/// Merged catalogues of a batch plus what happened to each file.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub catalogues: Catalogues,
    pub outcomes: Vec<FileOutcome>,
}

impl ExtractionReport {
    pub fn record(&mut self, path: PathBuf, result: Result<Catalogues, ExtractionError>) {
        match result {
            Ok(catalogues) => {
                let messages = catalogues.message_count();
                debug!("Extracted {} messages from {}", messages, path.display());
                self.catalogues.merge(catalogues);
                self.outcomes
                    .push(FileOutcome::Extracted { path, messages });
            }
            Err(error) => {
                warn!("Skipping {}: {}", path.display(), error.chain());
                self.outcomes.push(FileOutcome::Failed { path, error });
            }
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    pub fn merge(&mut self, other: ExtractionReport) {
        self.catalogues.merge(other.catalogues);
        self.outcomes.extend(other.outcomes);
    }
}

/// Add one extracted message to `catalogues`.
///
/// Messages without a domain go to `default_domain`. A domain only known at
/// render time files the message under [`MessageDomain::UNDEFINED_NAME`] so
/// it stays apart from messages of a known domain.
pub fn add_message(
    catalogues: &mut Catalogues,
    message: &Message,
    default_domain: &str,
    reference: &str,
) {
    let domain = match &message.domain {
        Some(MessageDomain::Literal(domain)) if domain.is_empty() => default_domain,
        Some(domain) => {
            if *domain == MessageDomain::Undefined {
                debug!(
                    "Domain of {:?} at {}:{} is not a literal, using {}",
                    message.original,
                    reference,
                    message.line,
                    domain.as_str()
                );
            }
            domain.as_str()
        }
        None => default_domain,
    };

    let key = TranslationKey::new(message.context.clone(), message.original.trim());
    let translation = catalogues.domain_mut(domain).entry(key);
    if translation.plural.is_none() {
        translation.plural.clone_from(&message.plural);
    }
    translation.add_reference(reference, message.line);
    if let Some(notes) = &message.notes {
        translation.comments.push(notes.clone());
    }
}

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Chooses the files of a resource by extension and ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct FileSelector {
    extensions: Vec<String>,
    literal_ignores: Vec<PathBuf>,
    glob_ignores: Vec<Pattern>,
}

impl FileSelector {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Skip paths matching `patterns`. Literal patterns are resolved against
    /// `base_dir` and ignore everything below them.
    pub fn with_ignores(mut self, base_dir: &Path, patterns: &[String]) -> Self {
        for p in patterns {
            if is_glob_pattern(p) {
                match Pattern::new(p) {
                    Ok(pattern) => self.glob_ignores.push(pattern),
                    Err(e) => eprintln!(
                        "{} Invalid ignore pattern '{}': {}",
                        "warning:".bold().yellow(),
                        p,
                        e
                    ),
                }
            } else {
                self.literal_ignores.push(base_dir.join(p));
            }
        }
        self
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn is_ignored(&self, path: &Path) -> bool {
        if !self.literal_ignores.is_empty() {
            // literal ignores are absolute, walked paths may be cwd relative
            let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
            if self
                .literal_ignores
                .iter()
                .any(|ignore_path| absolute.starts_with(ignore_path))
            {
                return true;
            }
        }
        let path_str = path.to_string_lossy();
        self.glob_ignores.iter().any(|p| p.matches(&path_str))
    }

    pub fn accepts(&self, path: &Path) -> bool {
        let extension = path.extension().and_then(|e| e.to_str());
        extension.is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
            && !self.is_ignored(path)
    }

    /// Files of `resource` to extract, sorted by path.
    pub fn collect(&self, resource: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
        if resource.is_file() {
            return Ok(if self.accepts(resource) {
                vec![resource.to_path_buf()]
            } else {
                Vec::new()
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(resource)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_ignored(entry.path()));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(ExtractionError::Walk {
                        path: resource.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!("Cannot access path: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// Reference string for a message found in `path`.
pub fn reference_path(path: &Path) -> String {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) if !dir.as_os_str().is_empty() => {
            format!("{}/{}", dir.display(), name.to_string_lossy())
        }
        _ => path.display().to_string(),
    }
}
