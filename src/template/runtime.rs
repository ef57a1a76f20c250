//! Evaluator for compiled programs.
//!
//! Values are `serde_json::Value`s. Variables missing from the render context
//! evaluate to null and print as an empty string.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::RenderError;
use crate::template::compiler::{Instruction, Program};
use crate::template::node::{Argument, Expr};

/// A filter callable as `subject | name(arguments)`.
pub trait Filter {
    fn name(&self) -> &'static str;

    /// Parameter names in positional order, used to place named arguments.
    fn parameters(&self) -> &'static [&'static str] {
        &[]
    }

    /// `arguments` holds one slot per positional parameter up to the last
    /// one supplied; skipped slots are null.
    fn apply(&self, subject: Value, arguments: Vec<Value>) -> Result<Value, RenderError>;
}

pub type Filters = HashMap<&'static str, Rc<dyn Filter>>;

pub struct Runtime<'env> {
    filters: &'env Filters,
    context: Map<String, Value>,
}

impl<'env> Runtime<'env> {
    pub fn new(filters: &'env Filters, context: Map<String, Value>) -> Self {
        Self { filters, context }
    }

    pub fn run(mut self, program: &Program) -> Result<String, RenderError> {
        let mut output = String::new();
        for instruction in &program.instructions {
            match instruction {
                Instruction::Text(text) => output.push_str(text),
                Instruction::Print(expr) => {
                    let value = self.evaluate(expr)?;
                    output.push_str(&to_display(&value));
                }
                Instruction::Set { name, value } => {
                    let value = self.evaluate(value)?;
                    self.context.insert(name.clone(), value);
                }
            }
        }
        Ok(output)
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value, RenderError> {
        match expr {
            Expr::Constant(value) => Ok(value.clone()),
            Expr::Name(name) => Ok(self.context.get(name).cloned().unwrap_or(Value::Null)),
            Expr::Array(items) => items
                .iter()
                .map(|item| self.evaluate(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Expr::Map(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let key = to_display(&self.evaluate(key)?);
                    map.insert(key, self.evaluate(value)?);
                }
                Ok(Value::Object(map))
            }
            Expr::Filter {
                subject,
                name,
                arguments,
                ..
            } => {
                let filter = self
                    .filters
                    .get(name.as_str())
                    .ok_or_else(|| RenderError::UnknownFilter(name.clone()))?;
                let subject = self.evaluate(subject)?;
                let arguments = self.bind_arguments(filter.as_ref(), arguments)?;
                filter.apply(subject, arguments)
            }
            Expr::Merge(left, right) => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Ok(merge(left, right))
            }
        }
    }

    fn bind_arguments(
        &self,
        filter: &dyn Filter,
        arguments: &[Argument],
    ) -> Result<Vec<Value>, RenderError> {
        let mut values = Vec::new();
        let mut position = 0;
        for argument in arguments {
            let index = match &argument.name {
                None => {
                    position += 1;
                    position - 1
                }
                Some(name) => filter
                    .parameters()
                    .iter()
                    .position(|p| *p == name.as_str())
                    .ok_or_else(|| RenderError::UnknownArgument {
                        filter: filter.name().to_string(),
                        argument: name.clone(),
                    })?,
            };
            if values.len() <= index {
                values.resize(index + 1, Value::Null);
            }
            values[index] = self.evaluate(&argument.value)?;
        }
        Ok(values)
    }
}

/// Merge two mappings, entries of `right` win. A non-mapping side is ignored.
fn merge(left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Object(mut left), Value::Object(right)) => {
            left.extend(right);
            Value::Object(left)
        }
        (left @ Value::Object(_), _) => left,
        (_, right @ Value::Object(_)) => right,
        (left, _) => left,
    }
}

/// String form of a value when printed.
pub fn to_display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
