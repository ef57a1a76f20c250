//! Template AST.
//!
//! Core node kinds cover what the host engine understands on its own. Tags
//! contributed by extensions produce [`Node::Extension`] nodes that carry
//! their own compilation logic through [`ExtensionNode`].

use std::any::Any;
use std::fmt;

use serde_json::Value;

use crate::error::TemplateError;
use crate::template::compiler::Compiler;

/// An expression inside `{{ ... }}` or a tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    /// Variable lookup. Missing variables evaluate to null.
    Name(String),
    Array(Vec<Expr>),
    /// Mapping literal, keys are evaluated and converted to strings.
    Map(Vec<(Expr, Expr)>),
    /// `subject | name(arguments)`
    Filter {
        subject: Box<Expr>,
        name: String,
        arguments: Vec<Argument>,
        line: usize,
    },
    /// Merge two mappings, entries of the right side win.
    Merge(Box<Expr>, Box<Expr>),
}

/// A filter argument, either positional or `name=value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expr,
}

impl Argument {
    pub fn positional(value: Expr) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

impl Expr {
    pub fn string(value: impl Into<String>) -> Self {
        Expr::Constant(Value::String(value.into()))
    }

    pub fn null() -> Self {
        Expr::Constant(Value::Null)
    }

    /// The value of a constant expression.
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expr::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// The value of a string constant.
    pub fn as_str_constant(&self) -> Option<&str> {
        self.as_constant().and_then(Value::as_str)
    }

    /// True if this is a mapping literal holding a constant key equal to `key`.
    pub fn has_key(&self, key: &str) -> bool {
        match self {
            Expr::Map(entries) => entries
                .iter()
                .any(|(k, _)| k.as_str_constant() == Some(key)),
            _ => false,
        }
    }

    /// Direct child expressions, used by the traverser.
    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Constant(_) | Expr::Name(_) => Vec::new(),
            Expr::Array(items) => items.iter_mut().collect(),
            Expr::Map(entries) => entries.iter_mut().flat_map(|(k, v)| [k, v]).collect(),
            Expr::Filter {
                subject, arguments, ..
            } => std::iter::once(subject.as_mut())
                .chain(arguments.iter_mut().map(|a| &mut a.value))
                .collect(),
            Expr::Merge(left, right) => vec![left.as_mut(), right.as_mut()],
        }
    }
}

/// A node produced by an extension tag parser.
pub trait ExtensionNode: fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 1-based line of the opening tag.
    fn line(&self) -> usize;

    /// Expressions owned by the node, visited by node visitors.
    fn expressions_mut(&mut self) -> Vec<&mut Expr> {
        Vec::new()
    }

    /// Emit instructions for this node.
    fn compile(&self, compiler: &mut Compiler) -> Result<(), TemplateError>;
}

#[derive(Debug)]
pub enum Node {
    Text { data: String, line: usize },
    Print { expr: Expr, line: usize },
    Set { name: String, value: Expr, line: usize },
    Body { nodes: Vec<Node>, line: usize },
    Extension(Box<dyn ExtensionNode>),
}

impl Node {
    /// Collapse a node list the way `subparse` returns it: a single node is
    /// returned as is, anything else becomes a body.
    pub fn from_nodes(mut nodes: Vec<Node>, line: usize) -> Self {
        if nodes.len() == 1
            && let Some(node) = nodes.pop()
        {
            return node;
        }
        Node::Body { nodes, line }
    }

    pub fn line(&self) -> usize {
        match self {
            Node::Text { line, .. }
            | Node::Print { line, .. }
            | Node::Set { line, .. }
            | Node::Body { line, .. } => *line,
            Node::Extension(node) => node.line(),
        }
    }

    /// Literal text of a node: plain text, or a print of a constant.
    pub fn literal_text(&self) -> Option<String> {
        match self {
            Node::Text { data, .. } => Some(data.clone()),
            Node::Print {
                expr: Expr::Constant(value),
                ..
            } => match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Downcast an extension node.
    pub fn downcast_extension<T: 'static>(&self) -> Option<&T> {
        match self {
            Node::Extension(node) => node.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn downcast_extension_mut<T: 'static>(&mut self) -> Option<&mut T> {
        match self {
            Node::Extension(node) => node.as_any_mut().downcast_mut::<T>(),
            _ => None,
        }
    }
}

/// A parsed template.
#[derive(Debug)]
pub struct Module {
    pub name: Option<String>,
    pub path: Option<String>,
    pub body: Node,
}
