//! Node visitor collecting translatable messages.
//!
//! The visitor is idle until [`TranslationNodeVisitor::enable`] is called, so
//! ordinary template parsing pays nothing for it. Extraction enables it for a
//! single parse, reads [`TranslationNodeVisitor::messages`] and disables it
//! again.

use log::trace;

use crate::extension::trans_filter::{FILTER_NAME, find_argument};
use crate::extension::trans_tag::TransNode;
use crate::extract::message::{Message, MessageDomain};
use crate::template::node::{Expr, Node};
use crate::template::visitor::NodeVisitor;

#[derive(Debug, Default)]
pub struct TranslationNodeVisitor {
    enabled: bool,
    messages: Vec<Message>,
}

impl TranslationNodeVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording, dropping anything buffered before.
    pub fn enable(&mut self) {
        trace!("Translation node visitor enabled");
        self.enabled = true;
        self.messages.clear();
    }

    /// Stop recording and drop the buffer.
    pub fn disable(&mut self) {
        trace!("Translation node visitor disabled");
        self.enabled = false;
        self.messages.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Messages recorded since the last `enable`, in document order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl NodeVisitor for TranslationNodeVisitor {
    fn enter_node(&mut self, node: &mut Node) {
        if !self.enabled {
            return;
        }

        if let Some(trans) = node.downcast_extension::<TransNode>() {
            self.messages.push(
                Message::new(trans.body.clone(), trans.line)
                    .with_plural(trans.plural.clone())
                    .with_domain(trans.domain.as_ref().map(MessageDomain::from_expr))
                    .with_notes(trans.notes.clone())
                    .with_context(trans.context.clone()),
            );
        }
    }

    fn enter_expr(&mut self, expr: &mut Expr) {
        if !self.enabled {
            return;
        }

        let Expr::Filter {
            subject,
            name,
            arguments,
            line,
        } = &*expr
        else {
            return;
        };
        if name != FILTER_NAME {
            return;
        }
        let Some(original) = subject.as_str_constant() else {
            return;
        };

        let literal = |name: &str| {
            find_argument(arguments, name)
                .and_then(Expr::as_str_constant)
                .map(str::to_string)
        };

        self.messages.push(
            Message::new(original, *line)
                .with_plural(literal("plural"))
                .with_domain(find_argument(arguments, "domain").map(MessageDomain::from_expr))
                .with_context(literal("context")),
        );
    }
}
