//! The `{% trans %}` block tag.
//!
//! ```text
//! {% trans [count EXPR] [with EXPR] [from EXPR] %}
//!     message
//! [{% notes %}a note for translators]
//! [{% context %}disambiguating context]
//! {% endtrans %}
//! ```
//!
//! With `count`, the message must be a `singular|plural` pair.

use std::any::Any;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SyntaxError, TemplateError};
use crate::extension::plural::split_plural;
use crate::template::compiler::{Compiler, Instruction};
use crate::template::lexer::{Token, TokenKind};
use crate::template::node::{Argument, Expr, ExtensionNode, Node};
use crate::template::parser::{Parser, TagParser};

/// Domain used when a trans tag has no `from` clause.
pub const DEFAULT_DOMAIN: &str = "messages";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

pub struct TransTagParser;

impl TransTagParser {
    fn decide_fork(token: &Token) -> bool {
        token.test_any_name(&["context", "notes", "endtrans"])
    }

    /// Parse a `notes` or `context` section body.
    fn parse_section(
        parser: &mut Parser<'_>,
        tag: &str,
        line: usize,
    ) -> Result<String, TemplateError> {
        parser.stream().expect(&TokenKind::BlockEnd)?;
        let section = parser.subparse(Some(&Self::decide_fork))?;
        section.literal_text().ok_or_else(|| {
            SyntaxError::new(
                format!("A message following a {} tag must be a simple text.", tag),
                line,
            )
            .into()
        })
    }
}

impl TagParser for TransTagParser {
    fn tag(&self) -> &'static str {
        "trans"
    }

    fn parse(&self, token: &Token, parser: &mut Parser<'_>) -> Result<Node, TemplateError> {
        let line = token.line;
        let mut count = None;
        let mut vars = None;
        let mut domain = None;

        if !parser.stream().current().is_block_end() {
            if parser.stream().test_name("count") {
                parser.stream().next();
                count = Some(parser.parse_expression()?);
            }
            if parser.stream().test_name("with") {
                parser.stream().next();
                vars = Some(parser.parse_expression()?);
            }
            if parser.stream().test_name("from") {
                parser.stream().next();
                domain = Some(parser.parse_expression()?);
            }

            let current = parser.stream().current();
            if current.test_name("into") {
                return Err(SyntaxError::new(
                    "The \"into\" tag is not available in this iteration of the translation syntax.",
                    current.line,
                )
                .into());
            }
            if !current.is_block_end() {
                return Err(SyntaxError::new(
                    "Unexpected token. Expected the \"with\", \"count\" or \"from\" keyword.",
                    current.line,
                )
                .into());
            }
        }

        parser.stream().expect(&TokenKind::BlockEnd)?;
        let body = parser.subparse(Some(&Self::decide_fork))?;
        let Some(mut body_text) = body.literal_text() else {
            return Err(SyntaxError::new(
                "A message inside a trans tag must be a simple text.",
                body.line(),
            )
            .into());
        };

        let mut notes = None;
        let mut context = None;
        while !parser.stream().test_name("endtrans") {
            let section = parser.stream().next();
            let slot = match section.name() {
                Some("notes") => &mut notes,
                Some("context") => &mut context,
                _ => {
                    return Err(SyntaxError::new(
                        format!("Unexpected token {}.", section.describe()),
                        section.line,
                    )
                    .into());
                }
            };
            let tag = section.name().unwrap_or_default().to_string();
            if slot.is_some() {
                return Err(SyntaxError::new(
                    format!("A trans tag may only have one {} section.", tag),
                    section.line,
                )
                .into());
            }
            *slot = Some(Self::parse_section(parser, &tag, line)?.trim().to_string());
        }

        // endtrans
        parser.stream().next();
        parser.stream().expect(&TokenKind::BlockEnd)?;

        let mut plural = None;
        if count.is_some() {
            let (singular, plural_form) = split_plural(&body_text)?;
            body_text = singular;
            plural = Some(collapse_whitespace(&plural_form));
        }

        Ok(Node::Extension(Box::new(TransNode {
            body: collapse_whitespace(&body_text),
            plural,
            domain,
            count,
            vars,
            notes,
            context,
            line,
        })))
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// A parsed `{% trans %}` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TransNode {
    pub body: String,
    pub plural: Option<String>,
    pub domain: Option<Expr>,
    pub count: Option<Expr>,
    pub vars: Option<Expr>,
    pub notes: Option<String>,
    pub context: Option<String>,
    pub line: usize,
}

impl TransNode {
    /// Replacement mapping passed to the translator.
    ///
    /// Every `%name%` placeholder found in the message gets a same-named
    /// variable lookup unless the `with` mapping already provides it, and
    /// `%count%` binds to the count expression. A `with` value that is not a
    /// mapping literal is merged over the detected defaults when rendering.
    fn replacements(&self) -> Expr {
        let mut entries = match &self.vars {
            Some(Expr::Map(entries)) => entries.clone(),
            _ => Vec::new(),
        };

        let texts = format!("{}{}", self.body, self.plural.as_deref().unwrap_or_default());
        for name in placeholder_names(&texts) {
            let key = format!("%{}%", name);
            if entries.iter().any(|(k, _)| k.as_str_constant() == Some(key.as_str())) {
                continue;
            }
            let value = match &self.count {
                Some(count) if name == "count" => count.clone(),
                _ => Expr::Name(name.to_string()),
            };
            entries.push((Expr::string(key), value));
        }

        match &self.vars {
            Some(vars) if !matches!(vars, Expr::Map(_)) => {
                Expr::Merge(Box::new(Expr::Map(entries)), Box::new(vars.clone()))
            }
            _ => Expr::Map(entries),
        }
    }
}

impl ExtensionNode for TransNode {
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
        [&mut self.count, &mut self.vars, &mut self.domain]
            .into_iter()
            .flatten()
            .collect()
    }

    fn compile(&self, compiler: &mut Compiler) -> Result<(), TemplateError> {
        let mut arguments = vec![
            Argument::positional(self.replacements()),
            Argument::positional(
                self.domain
                    .clone()
                    .unwrap_or_else(|| Expr::string(DEFAULT_DOMAIN)),
            ),
            Argument::positional(
                self.context
                    .as_deref()
                    .map_or_else(Expr::null, |c| Expr::string(c.trim())),
            ),
        ];

        if let (Some(plural), Some(count)) = (&self.plural, &self.count) {
            arguments.push(Argument::positional(Expr::string(unescape_percent(plural))));
            arguments.push(Argument::positional(count.clone()));
        }

        compiler.emit(Instruction::Print(Expr::Filter {
            subject: Box::new(Expr::string(unescape_percent(&self.body))),
            name: "trans".to_string(),
            arguments,
            line: self.line,
        }));
        Ok(())
    }
}

fn unescape_percent(text: &str) -> String {
    text.trim().replace("%%", "%")
}

/// Names of `%name%` placeholders in `text`, in order of appearance.
///
/// A `%` directly preceded by another `%` never opens a placeholder, so
/// `100%%` is not treated as one.
pub fn placeholder_names(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut names = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let opens = bytes[i] == b'%' && (i == 0 || bytes[i - 1] != b'%');
        if opens
            && let Some(len) = text[i + 1..].find('%')
            && len > 0
        {
            names.push(&text[i + 1..i + 1 + len]);
            i += len + 2;
            continue;
        }
        i += 1;
    }
    names
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::error::PluralisationError;
    use crate::template::lexer::tokenize;
    use crate::template::parser::TagParsers;

    fn parse(source: &str) -> Result<Node, TemplateError> {
        let mut tags: TagParsers = HashMap::new();
        tags.insert("trans", Rc::new(TransTagParser));
        Parser::new(tokenize(source)?, &tags).parse()
    }

    fn parse_trans(source: &str) -> TransNode {
        let node = parse(source).unwrap();
        node.downcast_extension::<TransNode>()
            .cloned()
            .expect("a trans node")
    }

    fn syntax_message(source: &str) -> String {
        match parse(source).unwrap_err() {
            TemplateError::Syntax(err) => err.message,
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_body() {
        let node = parse_trans("{% trans %}My Title{% endtrans %}");
        assert_eq!(node.body, "My Title");
        assert_eq!(node.plural, None);
        assert_eq!(node.domain, None);
        assert_eq!(node.line, 1);
    }

    #[test]
    fn test_whitespace_collapsed() {
        let node = parse_trans("{% trans %}\n    Hello,\n    world\n{% endtrans %}");
        assert_eq!(node.body.trim(), "Hello, world");
    }

    #[test]
    fn test_modifiers_in_order() {
        let node = parse_trans(
            "{% trans count n with {'%name%': who} from 'errors' %}one %name%|many %name%{% endtrans %}",
        );
        assert_eq!(node.body, "one %name%");
        assert_eq!(node.plural.as_deref(), Some("many %name%"));
        assert_eq!(node.count, Some(Expr::Name("n".into())));
        assert_eq!(node.domain, Some(Expr::string("errors")));
        assert!(node.vars.as_ref().is_some_and(|v| v.has_key("%name%")));
    }

    #[test]
    fn test_notes_and_context() {
        let node = parse_trans(
            "{% trans %}Open{% context %} menu {% notes %}File menu entry{% endtrans %}",
        );
        assert_eq!(node.body, "Open");
        assert_eq!(node.context.as_deref(), Some("menu"));
        assert_eq!(node.notes.as_deref(), Some("File menu entry"));
    }

    #[test]
    fn test_into_rejected() {
        assert_eq!(
            syntax_message("{% trans into 'fr' %}x{% endtrans %}"),
            "The \"into\" tag is not available in this iteration of the translation syntax."
        );
    }

    #[test]
    fn test_out_of_order_modifier_rejected() {
        assert_eq!(
            syntax_message("{% trans from 'a' count 1 %}x|y{% endtrans %}"),
            "Unexpected token. Expected the \"with\", \"count\" or \"from\" keyword."
        );
    }

    #[test]
    fn test_body_must_be_text() {
        assert_eq!(
            syntax_message("{% trans %}Hello {{ name }}{% endtrans %}"),
            "A message inside a trans tag must be a simple text."
        );
    }

    #[test]
    fn test_constant_print_body_accepted() {
        let node = parse_trans("{% trans %}{{ 'Hello' }}{% endtrans %}");
        assert_eq!(node.body, "Hello");
    }

    #[test]
    fn test_context_must_be_text() {
        assert_eq!(
            syntax_message("{% trans %}x{% context %}{{ c }}{% endtrans %}"),
            "A message following a context tag must be a simple text."
        );
    }

    #[test]
    fn test_repeated_section_rejected() {
        assert_eq!(
            syntax_message("{% trans %}x{% notes %}a{% notes %}b{% endtrans %}"),
            "A trans tag may only have one notes section."
        );
    }

    #[test]
    fn test_interval_plural_rejected() {
        let err = parse("{% trans count 2 %}{0} none|[1,Inf[ some{% endtrans %}").unwrap_err();
        assert_eq!(
            err,
            TemplateError::Pluralisation(PluralisationError::IntervalRule)
        );
    }

    #[test]
    fn test_missing_endtrans() {
        assert_eq!(
            syntax_message("{% trans %}x"),
            "Unexpected end of template."
        );
    }

    #[test]
    fn test_placeholder_names() {
        assert_eq!(
            placeholder_names("%count% of %name%, 100%% sure"),
            vec!["count", "name"]
        );
        assert!(placeholder_names("50%% off").is_empty());
        assert!(placeholder_names("%unterminated").is_empty());
    }

    #[test]
    fn test_compile_binds_placeholders() {
        let node = parse_trans(
            "{% trans count apples with {'%name%': 'Bob'} %}%name% has an apple|%name% has %count% apples{% endtrans %}",
        );
        let mut compiler = Compiler::new();
        node.compile(&mut compiler).unwrap();
        let program = compiler.finish(None);

        let Instruction::Print(Expr::Filter {
            subject,
            name,
            arguments,
            ..
        }) = &program.instructions[0]
        else {
            panic!("expected a trans call");
        };
        assert_eq!(name, "trans");
        assert_eq!(subject.as_str_constant(), Some("%name% has an apple"));
        assert_eq!(
            arguments[0].value,
            Expr::Map(vec![
                (Expr::string("%name%"), Expr::string("Bob")),
                (Expr::string("%count%"), Expr::Name("apples".into())),
            ])
        );
        assert_eq!(arguments[1].value, Expr::string("messages"));
        assert_eq!(arguments[2].value, Expr::null());
        assert_eq!(
            arguments[3].value,
            Expr::string("%name% has %count% apples")
        );
        assert_eq!(arguments[4].value, Expr::Name("apples".into()));
    }

    #[test]
    fn test_compile_dynamic_vars_are_merged() {
        let node = parse_trans("{% trans with vars %}Hi %who%{% endtrans %}");
        let mut compiler = Compiler::new();
        node.compile(&mut compiler).unwrap();
        let program = compiler.finish(None);

        let Instruction::Print(Expr::Filter { arguments, .. }) = &program.instructions[0] else {
            panic!("expected a trans call");
        };
        assert_eq!(
            arguments[0].value,
            Expr::Merge(
                Box::new(Expr::Map(vec![(
                    Expr::string("%who%"),
                    Expr::Name("who".into())
                )])),
                Box::new(Expr::Name("vars".into()))
            )
        );
    }

    #[test]
    fn test_compile_unescapes_percent() {
        let node = parse_trans("{% trans %} 100%% sure {% endtrans %}");
        let mut compiler = Compiler::new();
        node.compile(&mut compiler).unwrap();
        let program = compiler.finish(None);
        let Instruction::Print(Expr::Filter {
            subject, arguments, ..
        }) = &program.instructions[0]
        else {
            panic!("expected a trans call");
        };
        assert_eq!(subject.as_str_constant(), Some("100% sure"));
        assert_eq!(arguments[0].value, Expr::Map(vec![]));
    }
}
