//! The `{% trans_default_domain %}` tag.
//!
//! ```text
//! {% trans_default_domain "admin" %}
//! ```
//!
//! Every `trans` tag and filter after it in the same template that does not
//! name a domain uses this one. The tag itself renders nothing.

use std::any::Any;

use log::trace;

use crate::error::TemplateError;
use crate::extension::trans_filter::{FILTER_NAME, find_argument};
use crate::extension::trans_tag::TransNode;
use crate::template::compiler::Compiler;
use crate::template::lexer::{Token, TokenKind};
use crate::template::node::{Argument, Expr, ExtensionNode, Node};
use crate::template::parser::{Parser, TagParser};
use crate::template::visitor::NodeVisitor;

pub struct TransDefaultDomainTagParser;

impl TagParser for TransDefaultDomainTagParser {
    fn tag(&self) -> &'static str {
        "trans_default_domain"
    }

    fn parse(&self, token: &Token, parser: &mut Parser<'_>) -> Result<Node, TemplateError> {
        let domain = parser.parse_expression()?;
        parser.stream().expect(&TokenKind::BlockEnd)?;
        Ok(Node::Extension(Box::new(TransDefaultDomainNode {
            domain,
            line: token.line,
        })))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransDefaultDomainNode {
    pub domain: Expr,
    pub line: usize,
}

impl ExtensionNode for TransDefaultDomainNode {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn line(&self) -> usize {
        self.line
    }

    fn expressions_mut(&mut self) -> Vec<&mut Expr> {
        vec![&mut self.domain]
    }

    fn compile(&self, _compiler: &mut Compiler) -> Result<(), TemplateError> {
        Ok(())
    }
}

/// Fills in the template default domain on `trans` tags and filters that
/// lack one.
///
/// Runs before the extraction visitor so extracted messages see the filled
/// domain.
#[derive(Debug, Default)]
pub struct DefaultDomainNodeVisitor {
    depth: usize,
    domain: Option<Expr>,
}

impl DefaultDomainNodeVisitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeVisitor for DefaultDomainNodeVisitor {
    fn enter_node(&mut self, node: &mut Node) {
        if self.depth == 0 {
            // new template
            self.domain = None;
        }
        self.depth += 1;

        if let Some(tag) = node.downcast_extension::<TransDefaultDomainNode>() {
            trace!("Default domain set at line {}", tag.line);
            self.domain = Some(tag.domain.clone());
            return;
        }

        let Some(domain) = &self.domain else {
            return;
        };
        if let Some(trans) = node.downcast_extension_mut::<TransNode>()
            && trans.domain.is_none()
        {
            trans.domain = Some(domain.clone());
        }
    }

    fn enter_expr(&mut self, expr: &mut Expr) {
        let Some(domain) = &self.domain else {
            return;
        };
        let Expr::Filter {
            name, arguments, ..
        } = expr
        else {
            return;
        };
        if name.as_str() != FILTER_NAME || find_argument(arguments.as_slice(), "domain").is_some() {
            return;
        }

        if arguments.iter().any(|a| a.name.is_some()) {
            arguments.push(Argument::named("domain", domain.clone()));
            return;
        }
        if arguments.is_empty() {
            arguments.push(Argument::positional(Expr::Array(Vec::new())));
        }
        arguments.push(Argument::positional(domain.clone()));
    }

    fn leave_node(&mut self, _node: &mut Node) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn priority(&self) -> i32 {
        -10
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::extension::trans_tag::TransTagParser;
    use crate::template::lexer::tokenize;
    use crate::template::parser::TagParsers;
    use crate::template::visitor::traverse;

    fn visit(source: &str) -> Node {
        let mut tags: TagParsers = HashMap::new();
        tags.insert("trans", Rc::new(TransTagParser));
        tags.insert("trans_default_domain", Rc::new(TransDefaultDomainTagParser));
        let mut node = Parser::new(tokenize(source).unwrap(), &tags)
            .parse()
            .unwrap();
        traverse(&mut node, &mut DefaultDomainNodeVisitor::new());
        node
    }

    fn filter_arguments(node: &Node) -> Vec<Argument> {
        match node {
            Node::Print {
                expr: Expr::Filter { arguments, .. },
                ..
            } => arguments.clone(),
            other => panic!("expected a filter print, got {:?}", other),
        }
    }

    fn children(node: &Node) -> &[Node] {
        match node {
            Node::Body { nodes, .. } => nodes,
            other => panic!("expected a body, got {:?}", other),
        }
    }

    #[test]
    fn test_tag_parses_domain() {
        let node = visit("{% trans_default_domain 'admin' %}");
        let tag = node
            .downcast_extension::<TransDefaultDomainNode>()
            .expect("a default domain node");
        assert_eq!(tag.domain, Expr::string("admin"));
    }

    #[test]
    fn test_fills_trans_tag_after_the_tag_only() {
        let node = visit(concat!(
            "{% trans %}before{% endtrans %}",
            "{% trans_default_domain 'admin' %}",
            "{% trans %}after{% endtrans %}",
            "{% trans from 'errors' %}own{% endtrans %}",
        ));
        let domains: Vec<_> = children(&node)
            .iter()
            .filter_map(|n| n.downcast_extension::<TransNode>())
            .map(|t| t.domain.clone())
            .collect();
        assert_eq!(
            domains,
            vec![None, Some(Expr::string("admin")), Some(Expr::string("errors"))]
        );
    }

    #[test]
    fn test_fills_filter_arguments() {
        let node = visit(concat!(
            "{% trans_default_domain 'admin' %}",
            "{{ 'a' | trans }}",
            "{{ 'b' | trans({'%x%': 1}) }}",
            "{{ 'c' | trans(context='menu') }}",
            "{{ 'd' | trans({}, 'errors') }}",
        ));
        let nodes = children(&node);

        assert_eq!(
            filter_arguments(&nodes[1]),
            vec![
                Argument::positional(Expr::Array(vec![])),
                Argument::positional(Expr::string("admin")),
            ]
        );
        assert_eq!(filter_arguments(&nodes[2])[1], Argument::positional(Expr::string("admin")));
        assert_eq!(
            filter_arguments(&nodes[3]),
            vec![
                Argument::named("context", Expr::string("menu")),
                Argument::named("domain", Expr::string("admin")),
            ]
        );
        assert_eq!(filter_arguments(&nodes[4])[1], Argument::positional(Expr::string("errors")));
    }

    #[test]
    fn test_domain_does_not_leak_into_next_template() {
        let mut visitor = DefaultDomainNodeVisitor::new();
        let mut tags: TagParsers = HashMap::new();
        tags.insert("trans", Rc::new(TransTagParser));
        tags.insert("trans_default_domain", Rc::new(TransDefaultDomainTagParser));

        let mut first = Parser::new(tokenize("{% trans_default_domain 'admin' %}").unwrap(), &tags)
            .parse()
            .unwrap();
        traverse(&mut first, &mut visitor);

        let mut second = Parser::new(tokenize("{{ 'x' | trans }}").unwrap(), &tags)
            .parse()
            .unwrap();
        traverse(&mut second, &mut visitor);
        assert!(filter_arguments(&second).is_empty());
    }
}
