//! Extraction of `translate()` calls from JavaScript and TypeScript sources.
//!
//! Every method call `<obj>.translate("text", replacements, domain, context,
//! plural, count)` whose first argument is a string literal becomes a
//! [`Message`]. Files are parsed in parallel, one `SourceMap` per file.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use swc_common::{FileName, GLOBALS, Globals, SourceMap};
use swc_ecma_ast::{CallExpr, Callee, Expr, ExprOrSpread, Lit, MemberProp, Module};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::catalogue::Catalogues;
use crate::error::ExtractionError;
use crate::extract::message::{Message, MessageDomain};
use crate::extract::{
    DEFAULT_DOMAIN, ExtractionReport, Extractor, FileSelector, add_message, reference_path,
};

pub const SOURCE_EXTENSIONS: [&str; 4] = ["js", "jsx", "ts", "tsx"];

const TRANSLATE_METHOD: &str = "translate";

// argument positions after the message text
const DOMAIN_ARG: usize = 2;
const CONTEXT_ARG: usize = 3;
const PLURAL_ARG: usize = 4;

/// Parse with per-thread swc globals so files can be parsed in parallel.
fn parse_module(code: String, path: &Path, source_map: &SourceMap) -> Result<Module, String> {
    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(path.to_path_buf()).into(), code);

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        });
        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
        parser
            .parse_module()
            .map_err(|e| format!("{:?}", e.kind()))
    })
}

fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| s.to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
            .quasis
            .first()
            .and_then(|q| q.cooked.as_ref())
            .and_then(|s| s.as_str())
            .map(|s| s.to_string()),
        Expr::Paren(paren) => string_literal(&paren.expr),
        _ => None,
    }
}

fn is_absent(expr: &Expr) -> bool {
    match expr {
        Expr::Lit(Lit::Null(_)) => true,
        Expr::Ident(ident) => ident.sym.as_str() == "undefined",
        _ => false,
    }
}

/// Collects `translate()` calls of one module.
struct TranslateCallFinder<'a> {
    source_map: &'a SourceMap,
    messages: Vec<Message>,
}

impl<'a> TranslateCallFinder<'a> {
    fn new(source_map: &'a SourceMap) -> Self {
        Self {
            source_map,
            messages: Vec::new(),
        }
    }

    fn find(mut self, module: &Module) -> Vec<Message> {
        module.visit_with(&mut self);
        self.messages
    }

    fn is_translate_call(node: &CallExpr) -> bool {
        if let Callee::Expr(expr) = &node.callee
            && let Expr::Member(member) = &**expr
            && let MemberProp::Ident(prop) = &member.prop
        {
            return prop.sym.as_str() == TRANSLATE_METHOD;
        }
        false
    }

    fn message(&self, node: &CallExpr, original: String) -> Message {
        let arg = |index: usize| node.args.get(index).map(|a: &ExprOrSpread| &*a.expr);

        let domain = arg(DOMAIN_ARG)
            .filter(|expr| !is_absent(expr))
            .map(|expr| match string_literal(expr) {
                Some(domain) => MessageDomain::Literal(domain),
                None => MessageDomain::Undefined,
            });
        let context = arg(CONTEXT_ARG).and_then(string_literal);
        let plural = arg(PLURAL_ARG).and_then(string_literal);

        let line = self.source_map.lookup_char_pos(node.span.lo).line;
        Message::new(original, line)
            .with_domain(domain)
            .with_context(context)
            .with_plural(plural)
    }
}

impl Visit for TranslateCallFinder<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if Self::is_translate_call(node)
            && let Some(original) = node.args.first().and_then(|a| string_literal(&a.expr))
        {
            let message = self.message(node, original);
            self.messages.push(message);
        }
        node.visit_children_with(self);
    }
}

pub struct SourceExtractor {
    selector: FileSelector,
    default_domain: String,
}

impl Default for SourceExtractor {
    fn default() -> Self {
        Self::new(FileSelector::new(SOURCE_EXTENSIONS))
    }
}

impl SourceExtractor {
    pub fn new(selector: FileSelector) -> Self {
        Self {
            selector,
            default_domain: DEFAULT_DOMAIN.to_string(),
        }
    }

    pub fn with_default_domain(mut self, domain: impl Into<String>) -> Self {
        self.default_domain = domain.into();
        self
    }

    /// Extract messages from source code found at `path`.
    pub fn extract_source(&self, code: String, path: &Path) -> Result<Catalogues, ExtractionError> {
        let source_map = SourceMap::default();
        let module =
            parse_module(code, path, &source_map).map_err(|message| ExtractionError::Source {
                path: path.to_path_buf(),
                message,
            })?;

        let reference = reference_path(path);
        let mut catalogues = Catalogues::new();
        for message in TranslateCallFinder::new(&source_map).find(&module) {
            add_message(&mut catalogues, &message, &self.default_domain, &reference);
        }
        Ok(catalogues)
    }
}

impl Extractor for SourceExtractor {
    fn selector(&self) -> &FileSelector {
        &self.selector
    }

    fn extract_file(&self, path: &Path) -> Result<Catalogues, ExtractionError> {
        let code = fs::read_to_string(path).map_err(|source| ExtractionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_source(code, path)
    }

    /// Files are parsed in parallel and merged in path order.
    fn extract_batch(&self, resource: &Path) -> Result<ExtractionReport, ExtractionError> {
        let files = self.selector.collect(resource)?;
        let results: Vec<(PathBuf, Result<Catalogues, ExtractionError>)> = files
            .into_par_iter()
            .map(|path| {
                let result = self.extract_file(&path);
                (path, result)
            })
            .collect();

        let mut report = ExtractionReport::default();
        for (path, result) in results {
            report.record(path, result);
        }
        Ok(report)
    }
}
