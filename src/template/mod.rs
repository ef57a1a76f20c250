//! Minimal Twig-style template engine.
//!
//! Just enough of a host engine to carry the translation extension: text,
//! `{{ expr | filter(...) }}` prints, `{% set %}` and extension tags. An
//! [`Environment`] owns the registered tag parsers, filters and node
//! visitors, and drives tokenize → parse → visit → compile → render.

pub mod compiler;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod runtime;
pub mod visitor;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::TemplateError;
use compiler::{Program, compile_module};
use node::Module;
use parser::{Parser, SetTagParser, TagParser, TagParsers};
use runtime::{Filter, Filters, Runtime};
use visitor::{NodeVisitor, traverse};

/// A bundle of grammar, filters and visitors added to an [`Environment`].
pub trait Extension {
    fn tag_parsers(&self) -> Vec<Rc<dyn TagParser>> {
        Vec::new()
    }

    fn filters(&self) -> Vec<Rc<dyn Filter>> {
        Vec::new()
    }

    fn node_visitors(&self) -> Vec<Rc<RefCell<dyn NodeVisitor>>> {
        Vec::new()
    }
}

/// Template source code with an optional logical name and file path.
#[derive(Debug, Clone)]
pub struct Source {
    pub code: String,
    pub name: Option<String>,
    pub path: Option<String>,
}

impl Source {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
            path: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

pub struct Environment {
    tags: TagParsers,
    filters: Filters,
    visitors: Vec<Rc<RefCell<dyn NodeVisitor>>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        let mut tags: TagParsers = HashMap::new();
        tags.insert("set", Rc::new(SetTagParser));
        Self {
            tags,
            filters: HashMap::new(),
            visitors: Vec::new(),
        }
    }

    pub fn add_extension(&mut self, extension: &dyn Extension) {
        for tag_parser in extension.tag_parsers() {
            self.tags.insert(tag_parser.tag(), tag_parser);
        }
        for filter in extension.filters() {
            self.filters.insert(filter.name(), filter);
        }
        self.visitors.extend(extension.node_visitors());
        self.visitors.sort_by_key(|v| v.borrow().priority());
    }

    /// Parse a template and run every registered node visitor over it.
    pub fn parse(&self, source: &Source) -> Result<Module, TemplateError> {
        let mut body = lexer::tokenize(&source.code)
            .map_err(TemplateError::from)
            .and_then(|stream| Parser::new(stream, &self.tags).parse())
            .map_err(|err| match (err, &source.name) {
                (TemplateError::Syntax(syntax), Some(name)) => {
                    TemplateError::Syntax(syntax.in_template(name.clone()))
                }
                (err, _) => err,
            })?;

        for visitor in &self.visitors {
            traverse(&mut body, &mut *visitor.borrow_mut());
        }

        Ok(Module {
            name: source.name.clone(),
            path: source.path.clone(),
            body,
        })
    }

    pub fn compile(&self, source: &Source) -> Result<Program, TemplateError> {
        compile_module(&self.parse(source)?)
    }

    pub fn render(
        &self,
        source: &Source,
        context: Map<String, Value>,
    ) -> Result<String, TemplateError> {
        let program = self.compile(source)?;
        Ok(Runtime::new(&self.filters, context).run(&program)?)
    }
}
