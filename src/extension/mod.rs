//! Translation extension for the template engine.
//!
//! Registers the `{% trans %}` and `{% trans_default_domain %}` tags, the
//! `trans` filter and the node visitors with an
//! [`Environment`](crate::template::Environment).

pub mod plural;
pub mod trans_default_domain;
pub mod trans_filter;
pub mod trans_tag;

use std::cell::RefCell;
use std::rc::Rc;

use crate::extract::visitor::TranslationNodeVisitor;
use crate::template::Extension;
use crate::template::parser::TagParser;
use crate::template::runtime::Filter;
use crate::template::visitor::NodeVisitor;
use crate::translator::{GettextCatalog, Translator};

use trans_default_domain::{DefaultDomainNodeVisitor, TransDefaultDomainTagParser};
use trans_filter::TransFilter;
use trans_tag::TransTagParser;

pub struct TranslationExtension {
    translator: Rc<RefCell<Translator>>,
    visitor: Rc<RefCell<TranslationNodeVisitor>>,
    default_domain: Rc<RefCell<DefaultDomainNodeVisitor>>,
}

impl Default for TranslationExtension {
    /// An extension backed by an empty catalog, enough for extraction.
    fn default() -> Self {
        Self::new(Translator::new(GettextCatalog::default()))
    }
}

impl TranslationExtension {
    pub fn new(translator: Translator) -> Self {
        Self {
            translator: Rc::new(RefCell::new(translator)),
            visitor: Rc::new(RefCell::new(TranslationNodeVisitor::new())),
            default_domain: Rc::new(RefCell::new(DefaultDomainNodeVisitor::new())),
        }
    }

    pub fn translator(&self) -> Rc<RefCell<Translator>> {
        self.translator.clone()
    }

    /// The visitor registered with the environment.
    pub fn translation_node_visitor(&self) -> Rc<RefCell<TranslationNodeVisitor>> {
        self.visitor.clone()
    }
}

impl Extension for TranslationExtension {
    fn tag_parsers(&self) -> Vec<Rc<dyn TagParser>> {
        vec![Rc::new(TransTagParser), Rc::new(TransDefaultDomainTagParser)]
    }

    fn filters(&self) -> Vec<Rc<dyn Filter>> {
        vec![Rc::new(TransFilter::new(self.translator.clone()))]
    }

    fn node_visitors(&self) -> Vec<Rc<RefCell<dyn NodeVisitor>>> {
        let translation: Rc<RefCell<dyn NodeVisitor>> = self.visitor.clone();
        let default_domain: Rc<RefCell<dyn NodeVisitor>> = self.default_domain.clone();
        vec![translation, default_domain]
    }
}
