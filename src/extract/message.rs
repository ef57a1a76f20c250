use crate::template::node::Expr;
use crate::template::runtime::to_display;

/// Domain a message was declared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageDomain {
    Literal(String),
    /// A domain was given but is not known until render time.
    Undefined,
}

impl MessageDomain {
    /// Name used when an undefined domain has to be printed.
    pub const UNDEFINED_NAME: &'static str = "_undefined";

    pub fn from_expr(expr: &Expr) -> Self {
        match expr.as_constant() {
            Some(value) => MessageDomain::Literal(to_display(value)),
            None => MessageDomain::Undefined,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessageDomain::Literal(domain) => domain,
            MessageDomain::Undefined => Self::UNDEFINED_NAME,
        }
    }
}

/// A translatable message found in a template or source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub original: String,
    /// 1-based line of the construct the message came from.
    pub line: usize,
    pub plural: Option<String>,
    pub domain: Option<MessageDomain>,
    pub notes: Option<String>,
    pub context: Option<String>,
}

impl Message {
    pub fn new(original: impl Into<String>, line: usize) -> Self {
        Self {
            original: original.into(),
            line,
            plural: None,
            domain: None,
            notes: None,
            context: None,
        }
    }

    pub fn with_plural(mut self, plural: Option<String>) -> Self {
        self.plural = plural;
        self
    }

    pub fn with_domain(mut self, domain: Option<MessageDomain>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }
}
