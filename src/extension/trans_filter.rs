//! The `trans` filter.
//!
//! `{{ 'message' | trans(replacements, domain, context, plural, count) }}`
//! Every argument is optional and may also be passed by name.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::RenderError;
use crate::template::node::{Argument, Expr};
use crate::template::runtime::{Filter, to_display};
use crate::translator::Translator;

pub const FILTER_NAME: &str = "trans";

/// Parameter names of the filter, in positional order.
pub const PARAMETERS: &[&str] = &["replacements", "domain", "context", "plural", "count"];

/// Find a filter argument by name, or by its position among the positional
/// arguments.
pub fn find_argument<'a>(arguments: &'a [Argument], name: &str) -> Option<&'a Expr> {
    if let Some(named) = arguments
        .iter()
        .find(|a| a.name.as_deref() == Some(name))
    {
        return Some(&named.value);
    }
    let position = PARAMETERS.iter().position(|p| *p == name)?;
    arguments
        .iter()
        .filter(|a| a.name.is_none())
        .nth(position)
        .map(|a| &a.value)
}

pub struct TransFilter {
    translator: Rc<RefCell<Translator>>,
}

impl TransFilter {
    pub fn new(translator: Rc<RefCell<Translator>>) -> Self {
        Self { translator }
    }
}

impl Filter for TransFilter {
    fn name(&self) -> &'static str {
        FILTER_NAME
    }

    fn parameters(&self) -> &'static [&'static str] {
        PARAMETERS
    }

    fn apply(&self, subject: Value, arguments: Vec<Value>) -> Result<Value, RenderError> {
        let mut arguments = arguments.into_iter();
        let replacements = replacements(arguments.next().unwrap_or(Value::Null))?;
        let domain = optional_string(arguments.next());
        let context = optional_string(arguments.next());
        let plural = optional_string(arguments.next());
        let count = count(arguments.next().unwrap_or(Value::Null))?;

        let translated = self.translator.borrow().translate(
            &to_display(&subject),
            &replacements,
            domain.as_deref(),
            context.as_deref(),
            plural.as_deref(),
            count,
        );
        Ok(Value::String(translated))
    }
}

fn invalid(argument: &str, message: impl Into<String>) -> RenderError {
    RenderError::InvalidArgument {
        filter: FILTER_NAME.to_string(),
        argument: argument.to_string(),
        message: message.into(),
    }
}

fn replacements(value: Value) -> Result<IndexMap<String, String>, RenderError> {
    match value {
        Value::Null => Ok(IndexMap::new()),
        Value::Array(items) if items.is_empty() => Ok(IndexMap::new()),
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, to_display(&value)))
            .collect()),
        other => Err(invalid(
            "replacements",
            format!("expected a mapping, got {}", other),
        )),
    }
}

fn optional_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        other => Some(to_display(&other)),
    }
}

fn count(value: Value) -> Result<Option<u64>, RenderError> {
    match &value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(Some)
            .ok_or_else(|| invalid("count", format!("expected a non-negative number, got {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid("count", format!("expected a number, got \"{}\"", s))),
        other => Err(invalid("count", format!("expected a number, got {}", other))),
    }
}
