//! Template parser.
//!
//! Builds a [`Node`] tree from a [`TokenStream`]. Block tags are delegated to
//! registered [`TagParser`]s, which is how extensions add grammar.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::error::{SyntaxError, TemplateError};
use crate::template::lexer::{Token, TokenKind, TokenStream};
use crate::template::node::{Argument, Expr, Node};

/// Parses the body of one block tag, e.g. `{% set ... %}`.
///
/// `parse` is called with the stream positioned just after the tag name.
pub trait TagParser {
    fn tag(&self) -> &'static str;

    fn parse(&self, token: &Token, parser: &mut Parser<'_>) -> Result<Node, TemplateError>;
}

pub type TagParsers = HashMap<&'static str, Rc<dyn TagParser>>;

pub struct Parser<'env> {
    stream: TokenStream,
    tags: &'env TagParsers,
}

impl<'env> Parser<'env> {
    pub fn new(stream: TokenStream, tags: &'env TagParsers) -> Self {
        Self { stream, tags }
    }

    pub fn stream(&mut self) -> &mut TokenStream {
        &mut self.stream
    }

    /// Parse a whole template.
    pub fn parse(mut self) -> Result<Node, TemplateError> {
        self.subparse(None)
    }

    /// Parse nodes until a block tag accepted by `end` is reached.
    ///
    /// On return the stream is positioned on the name token of that closing
    /// tag. Without `end`, parsing runs to the end of the template.
    pub fn subparse(
        &mut self,
        end: Option<&dyn Fn(&Token) -> bool>,
    ) -> Result<Node, TemplateError> {
        let line = self.stream.current().line;
        let mut nodes = Vec::new();

        loop {
            let token = self.stream.current().clone();
            match token.kind {
                TokenKind::Text(data) => {
                    self.stream.next();
                    nodes.push(Node::Text {
                        data,
                        line: token.line,
                    });
                }
                TokenKind::VarStart => {
                    self.stream.next();
                    let expr = self.parse_expression()?;
                    self.stream.expect(&TokenKind::VarEnd)?;
                    nodes.push(Node::Print {
                        expr,
                        line: token.line,
                    });
                }
                TokenKind::BlockStart => {
                    self.stream.next();
                    let tag = self.stream.current().clone();
                    let Some(name) = tag.name() else {
                        return Err(
                            SyntaxError::new("A block must start with a tag name.", tag.line)
                                .into(),
                        );
                    };

                    if let Some(end) = end
                        && end(&tag)
                    {
                        return Ok(Node::from_nodes(nodes, line));
                    }

                    let Some(tag_parser) = self.tags.get(name).cloned() else {
                        let message = if end.is_some() {
                            format!("Unexpected \"{}\" tag.", name)
                        } else {
                            format!("Unknown \"{}\" tag.", name)
                        };
                        return Err(SyntaxError::new(message, tag.line).into());
                    };

                    self.stream.next();
                    nodes.push(tag_parser.parse(&tag, self)?);
                }
                TokenKind::Eof => {
                    if end.is_some() {
                        return Err(
                            SyntaxError::new("Unexpected end of template.", token.line).into()
                        );
                    }
                    return Ok(Node::from_nodes(nodes, line));
                }
                _ => {
                    return Err(SyntaxError::new(
                        format!("Unexpected token {}.", token.describe()),
                        token.line,
                    )
                    .into());
                }
            }
        }
    }

    /// Parse an expression followed by any number of filters.
    pub fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;

        while self.stream.current().test_punct('|') {
            let line = self.stream.next().line;
            let name = self.stream.expect_name()?;
            let arguments = if self.stream.current().test_punct('(') {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            expr = Expr::Filter {
                subject: Box::new(expr),
                name,
                arguments,
                line,
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.stream.next();
        match token.kind {
            TokenKind::Name(name) => Ok(match name.as_str() {
                "true" => Expr::Constant(Value::Bool(true)),
                "false" => Expr::Constant(Value::Bool(false)),
                "null" | "none" => Expr::null(),
                _ => Expr::Name(name),
            }),
            TokenKind::Number(number) => Ok(Expr::Constant(Value::Number(number))),
            TokenKind::Str(value) => Ok(Expr::string(value)),
            TokenKind::Punct('[') => self.parse_array(),
            TokenKind::Punct('{') => self.parse_map(),
            TokenKind::Punct('(') => {
                let expr = self.parse_expression()?;
                self.stream.expect(&TokenKind::Punct(')'))?;
                Ok(expr)
            }
            _ => Err(SyntaxError::new(
                format!("Unexpected token {}.", token.describe()),
                token.line,
            )),
        }
    }

    fn parse_array(&mut self) -> Result<Expr, SyntaxError> {
        let mut items = Vec::new();
        while !self.stream.current().test_punct(']') {
            if !items.is_empty() {
                self.stream.expect(&TokenKind::Punct(','))?;
                if self.stream.current().test_punct(']') {
                    break;
                }
            }
            items.push(self.parse_expression()?);
        }
        self.stream.expect(&TokenKind::Punct(']'))?;
        Ok(Expr::Array(items))
    }

    fn parse_map(&mut self) -> Result<Expr, SyntaxError> {
        let mut entries = Vec::new();
        while !self.stream.current().test_punct('}') {
            if !entries.is_empty() {
                self.stream.expect(&TokenKind::Punct(','))?;
                if self.stream.current().test_punct('}') {
                    break;
                }
            }

            let token = self.stream.current().clone();
            let key = match token.kind {
                TokenKind::Str(value) | TokenKind::Name(value) => {
                    self.stream.next();
                    Expr::string(value)
                }
                TokenKind::Number(number) => {
                    self.stream.next();
                    Expr::string(number.to_string())
                }
                TokenKind::Punct('(') => {
                    self.stream.next();
                    let key = self.parse_expression()?;
                    self.stream.expect(&TokenKind::Punct(')'))?;
                    key
                }
                _ => {
                    return Err(SyntaxError::new(
                        format!(
                            "A mapping key must be a quoted string, a name, a number or an expression enclosed in parentheses (unexpected token {}).",
                            token.describe()
                        ),
                        token.line,
                    ));
                }
            };

            self.stream.expect(&TokenKind::Punct(':'))?;
            let value = self.parse_expression()?;
            entries.push((key, value));
        }
        self.stream.expect(&TokenKind::Punct('}'))?;
        Ok(Expr::Map(entries))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Argument>, SyntaxError> {
        self.stream.expect(&TokenKind::Punct('('))?;
        let mut arguments = Vec::new();
        while !self.stream.current().test_punct(')') {
            if !arguments.is_empty() {
                self.stream.expect(&TokenKind::Punct(','))?;
            }

            let named = self.stream.current().name().is_some()
                && (self.stream.look(1).test_punct('=') || self.stream.look(1).test_punct(':'));
            if named {
                let name = self.stream.expect_name()?;
                self.stream.next();
                arguments.push(Argument::named(name, self.parse_expression()?));
            } else {
                arguments.push(Argument::positional(self.parse_expression()?));
            }
        }
        self.stream.expect(&TokenKind::Punct(')'))?;
        Ok(arguments)
    }
}

/// `{% set name = expr %}`
pub struct SetTagParser;

impl TagParser for SetTagParser {
    fn tag(&self) -> &'static str {
        "set"
    }

    fn parse(&self, token: &Token, parser: &mut Parser<'_>) -> Result<Node, TemplateError> {
        let stream = parser.stream();
        let name = stream.expect_name()?;
        stream.expect(&TokenKind::Punct('='))?;
        let value = parser.parse_expression()?;
        parser.stream().expect(&TokenKind::BlockEnd)?;
        Ok(Node::Set {
            name,
            value,
            line: token.line,
        })
    }
}
