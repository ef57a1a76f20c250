//! Template lexer.
//!
//! Splits template source into text runs and the tokens found inside
//! `{{ ... }}` print tags and `{% ... %}` block tags. `{# ... #}` comments are
//! dropped. Whitespace control follows the usual Twig conventions:
//!
//! - `{%-`, `{{-` and `{#-` trim all whitespace before the tag
//! - `-%}`, `-}}` and `-#}` trim all whitespace after the tag
//! - a single newline directly after `%}` or `#}` is removed

use serde_json::Number;

use crate::error::SyntaxError;

const PUNCTUATION: &[char] = &['(', ')', '[', ']', '{', '}', ',', ':', '|', '.', '='];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Text(String),
    VarStart,
    VarEnd,
    BlockStart,
    BlockEnd,
    Name(String),
    Number(Number),
    Str(String),
    Punct(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based line the token starts on.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Self { kind, line }
    }

    /// True when the token is the name `name`.
    pub fn test_name(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Name(n) if n == name)
    }

    /// True when the token is one of the given names.
    pub fn test_any_name(&self, names: &[&str]) -> bool {
        matches!(&self.kind, TokenKind::Name(n) if names.contains(&n.as_str()))
    }

    pub fn test_punct(&self, punct: char) -> bool {
        matches!(self.kind, TokenKind::Punct(p) if p == punct)
    }

    pub fn is_block_end(&self) -> bool {
        matches!(self.kind, TokenKind::BlockEnd)
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Short human readable description used in syntax errors.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Text(_) => "text".to_string(),
            TokenKind::VarStart => "\"{{\"".to_string(),
            TokenKind::VarEnd => "\"}}\"".to_string(),
            TokenKind::BlockStart => "\"{%\"".to_string(),
            TokenKind::BlockEnd => "\"%}\"".to_string(),
            TokenKind::Name(n) => format!("name \"{}\"", n),
            TokenKind::Number(n) => format!("number \"{}\"", n),
            TokenKind::Str(s) => format!("string \"{}\"", s),
            TokenKind::Punct(p) => format!("punctuation \"{}\"", p),
            TokenKind::Eof => "end of template".to_string(),
        }
    }
}

/// Cursor over the tokens of a single template.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    /// Build a stream. An `Eof` token is appended when missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::Eof, line));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub fn look(&self, offset: usize) -> &Token {
        &self.tokens[(self.position + offset).min(self.tokens.len() - 1)]
    }

    /// Return the current token and move past it.
    pub fn next(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    pub fn test_name(&self, name: &str) -> bool {
        self.current().test_name(name)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    /// Consume the current token if it matches `kind`, otherwise fail.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Token, SyntaxError> {
        let current = self.current();
        if std::mem::discriminant(&current.kind) != std::mem::discriminant(kind)
            || (matches!(kind, TokenKind::Punct(_)) && current.kind != *kind)
        {
            return Err(SyntaxError::new(
                format!(
                    "Unexpected token {} (expected {}).",
                    current.describe(),
                    Token::new(kind.clone(), current.line).describe()
                ),
                current.line,
            ));
        }
        Ok(self.next())
    }

    /// Consume a name token and return its value.
    pub fn expect_name(&mut self) -> Result<String, SyntaxError> {
        let current = self.current();
        match &current.kind {
            TokenKind::Name(name) => {
                let name = name.clone();
                self.next();
                Ok(name)
            }
            _ => Err(SyntaxError::new(
                format!("Unexpected token {} (expected a name).", current.describe()),
                current.line,
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Var,
    Block,
    Comment,
}

impl TagKind {
    fn close(self) -> &'static str {
        match self {
            TagKind::Var => "}}",
            TagKind::Block => "%}",
            TagKind::Comment => "#}",
        }
    }
}

/// Tokenize a template.
pub fn tokenize(source: &str) -> Result<TokenStream, SyntaxError> {
    Lexer::new(source).lex()
}

struct Lexer<'a> {
    source: &'a str,
    cursor: usize,
    line: usize,
    tokens: Vec<Token>,
    /// The previous tag asked for leading whitespace of the next text to be trimmed.
    trim_next_text: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: 0,
            line: 1,
            tokens: Vec::new(),
            trim_next_text: false,
        }
    }

    fn lex(mut self) -> Result<TokenStream, SyntaxError> {
        while self.cursor < self.source.len() {
            let rest = self.rest();
            let next_tag = find_tag_start(rest);
            let text_end = next_tag.map_or(rest.len(), |(offset, _)| offset);

            let mut text = &rest[..text_end];
            let mut line = self.line;
            if let Some((offset, _)) = next_tag
                && rest[offset + 2..].starts_with('-')
            {
                text = text.trim_end();
            }
            if self.trim_next_text {
                let trimmed = text.trim_start();
                line += count_newlines(&text[..text.len() - trimmed.len()]);
                text = trimmed;
                self.trim_next_text = false;
            }
            if !text.is_empty() {
                self.tokens
                    .push(Token::new(TokenKind::Text(text.to_string()), line));
            }
            self.advance(text_end);

            let Some((_, kind)) = next_tag else {
                break;
            };
            self.lex_tag(kind)?;
        }

        self.tokens.push(Token::new(TokenKind::Eof, self.line));
        Ok(TokenStream::new(self.tokens))
    }

    fn rest(&self) -> &'a str {
        &self.source[self.cursor..]
    }

    fn advance(&mut self, len: usize) {
        self.line += count_newlines(&self.source[self.cursor..self.cursor + len]);
        self.cursor += len;
    }

    fn lex_tag(&mut self, kind: TagKind) -> Result<(), SyntaxError> {
        let start_line = self.line;
        self.advance(2);
        if self.rest().starts_with('-') {
            self.advance(1);
        }

        match kind {
            TagKind::Comment => {
                let rest = self.rest();
                let Some(end) = rest.find("#}") else {
                    return Err(SyntaxError::new("Unclosed comment.", start_line));
                };
                let trim = rest[..end].ends_with('-');
                self.advance(end + 2);
                self.finish_tag(kind, trim);
                Ok(())
            }
            TagKind::Var | TagKind::Block => {
                let (open, close) = match kind {
                    TagKind::Var => (TokenKind::VarStart, TokenKind::VarEnd),
                    _ => (TokenKind::BlockStart, TokenKind::BlockEnd),
                };
                self.tokens.push(Token::new(open, start_line));
                loop {
                    self.skip_whitespace();
                    let rest = self.rest();
                    if rest.is_empty() {
                        let what = if kind == TagKind::Var {
                            "variable"
                        } else {
                            "block"
                        };
                        return Err(SyntaxError::new(
                            format!("Unclosed \"{}\".", what),
                            start_line,
                        ));
                    }
                    if rest.starts_with(kind.close()) {
                        self.tokens.push(Token::new(close, self.line));
                        self.advance(2);
                        self.finish_tag(kind, false);
                        return Ok(());
                    }
                    if rest.starts_with('-') && rest[1..].starts_with(kind.close()) {
                        self.tokens.push(Token::new(close, self.line));
                        self.advance(3);
                        self.finish_tag(kind, true);
                        return Ok(());
                    }
                    self.lex_expression_token()?;
                }
            }
        }
    }

    fn finish_tag(&mut self, kind: TagKind, trim: bool) {
        if trim {
            self.trim_next_text = true;
        } else if kind != TagKind::Var && self.rest().starts_with('\n') {
            self.advance(1);
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.advance(rest.len() - trimmed.len());
    }

    fn lex_expression_token(&mut self) -> Result<(), SyntaxError> {
        let rest = self.rest();
        let line = self.line;
        let Some(c) = rest.chars().next() else {
            return Ok(());
        };

        if c.is_ascii_alphabetic() || c == '_' {
            let len = rest
                .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                .unwrap_or(rest.len());
            self.tokens
                .push(Token::new(TokenKind::Name(rest[..len].to_string()), line));
            self.advance(len);
            return Ok(());
        }

        let negative = c == '-' && rest[1..].starts_with(|ch: char| ch.is_ascii_digit());
        if c.is_ascii_digit() || negative {
            let (number, len) = lex_number(rest, line)?;
            self.tokens.push(Token::new(TokenKind::Number(number), line));
            self.advance(len);
            return Ok(());
        }

        if c == '\'' || c == '"' {
            let (value, len) = lex_string(rest, c, line)?;
            self.tokens.push(Token::new(TokenKind::Str(value), line));
            self.advance(len);
            return Ok(());
        }

        if PUNCTUATION.contains(&c) {
            self.tokens.push(Token::new(TokenKind::Punct(c), line));
            self.advance(c.len_utf8());
            return Ok(());
        }

        Err(SyntaxError::new(
            format!("Unexpected character \"{}\".", c),
            line,
        ))
    }
}

fn find_tag_start(text: &str) -> Option<(usize, TagKind)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'{' {
            let kind = match bytes[i + 1] {
                b'{' => Some(TagKind::Var),
                b'%' => Some(TagKind::Block),
                b'#' => Some(TagKind::Comment),
                _ => None,
            };
            if let Some(kind) = kind {
                return Some((i, kind));
            }
        }
        i += 1;
    }
    None
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

fn lex_number(text: &str, line: usize) -> Result<(Number, usize), SyntaxError> {
    let mut len = usize::from(text.starts_with('-'));
    len += text[len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - len);

    let is_float = text[len..].starts_with('.')
        && text[len + 1..].starts_with(|c: char| c.is_ascii_digit());
    if is_float {
        len += 1;
        len += text[len..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len() - len);
    }

    let raw = &text[..len];
    let number = if is_float {
        raw.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        raw.parse::<i64>().ok().map(Number::from)
    };
    number
        .map(|n| (n, len))
        .ok_or_else(|| SyntaxError::new(format!("Invalid number \"{}\".", raw), line))
}

fn lex_string(text: &str, quote: char, line: usize) -> Result<(String, usize), SyntaxError> {
    let mut value = String::new();
    let mut chars = text.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, escaped)) => value.push(escaped),
                None => break,
            },
            c if c == quote => return Ok((value, i + c.len_utf8())),
            c => value.push(c),
        }
    }
    Err(SyntaxError::new("Unclosed string.", line))
}
