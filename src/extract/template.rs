//! Extraction from templates.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::catalogue::Catalogues;
use crate::error::{ExtractionError, TemplateError};
use crate::extension::TranslationExtension;
use crate::extract::message::Message;
use crate::extract::visitor::TranslationNodeVisitor;
use crate::extract::{DEFAULT_DOMAIN, Extractor, FileSelector, add_message, reference_path};
use crate::template::{Environment, Source};

pub const TEMPLATE_EXTENSION: &str = "twig";

/// Keeps the visitor enabled for the lifetime of the guard.
struct EnabledVisitor<'a>(&'a RefCell<TranslationNodeVisitor>);

impl<'a> EnabledVisitor<'a> {
    fn enable(visitor: &'a RefCell<TranslationNodeVisitor>) -> Self {
        visitor.borrow_mut().enable();
        Self(visitor)
    }

    fn messages(&self) -> Vec<Message> {
        self.0.borrow().messages().to_vec()
    }
}

impl Drop for EnabledVisitor<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().disable();
    }
}

/// Parses templates with the translation extension and collects the
/// messages its visitor records.
pub struct TemplateExtractor {
    environment: Environment,
    visitor: Rc<RefCell<TranslationNodeVisitor>>,
    selector: FileSelector,
    default_domain: String,
}

impl Default for TemplateExtractor {
    fn default() -> Self {
        Self::new(&TranslationExtension::default())
    }
}

impl TemplateExtractor {
    pub fn new(extension: &TranslationExtension) -> Self {
        let mut environment = Environment::new();
        environment.add_extension(extension);
        Self::with_environment(environment, extension.translation_node_visitor())
    }

    /// Use an environment the translation extension is already registered
    /// with. `visitor` must be that extension's visitor.
    pub fn with_environment(
        environment: Environment,
        visitor: Rc<RefCell<TranslationNodeVisitor>>,
    ) -> Self {
        Self {
            environment,
            visitor,
            selector: FileSelector::new([TEMPLATE_EXTENSION]),
            default_domain: DEFAULT_DOMAIN.to_string(),
        }
    }

    pub fn with_selector(mut self, selector: FileSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_default_domain(mut self, domain: impl Into<String>) -> Self {
        self.default_domain = domain.into();
        self
    }

    /// Extract messages from template source code found at `path`.
    pub fn extract_source(&self, code: &str, path: &Path) -> Result<Catalogues, TemplateError> {
        let mut source = Source::new(code);
        if let Some(name) = path.file_name() {
            source = source.with_name(name.to_string_lossy());
        }
        if let Some(dir) = path.parent() {
            source = source.with_path(dir.to_string_lossy());
        }

        let messages = {
            let visitor = EnabledVisitor::enable(&self.visitor);
            self.environment.parse(&source)?;
            visitor.messages()
        };

        let reference = reference_path(path);
        let mut catalogues = Catalogues::new();
        for message in &messages {
            add_message(&mut catalogues, message, &self.default_domain, &reference);
        }
        Ok(catalogues)
    }
}

impl Extractor for TemplateExtractor {
    fn selector(&self) -> &FileSelector {
        &self.selector
    }

    fn extract_file(&self, path: &Path) -> Result<Catalogues, ExtractionError> {
        let code = fs::read_to_string(path).map_err(|source| ExtractionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_source(&code, path)
            .map_err(|source| ExtractionError::Template {
                path: path.to_path_buf(),
                source,
            })
    }
}
