//! Compiles a node tree into a flat instruction [`Program`].

use crate::error::TemplateError;
use crate::template::node::{Expr, Module, Node};

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Text(String),
    Print(Expr),
    Set { name: String, value: Expr },
}

/// Output of compiling one template.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: Option<String>,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Default)]
pub struct Compiler {
    instructions: Vec<Instruction>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn compile(&mut self, node: &Node) -> Result<(), TemplateError> {
        match node {
            Node::Text { data, .. } => self.emit(Instruction::Text(data.clone())),
            Node::Print { expr, .. } => self.emit(Instruction::Print(expr.clone())),
            Node::Set { name, value, .. } => self.emit(Instruction::Set {
                name: name.clone(),
                value: value.clone(),
            }),
            Node::Body { nodes, .. } => {
                for child in nodes {
                    self.compile(child)?;
                }
            }
            Node::Extension(extension) => extension.compile(self)?,
        }
        Ok(())
    }

    pub fn finish(self, name: Option<String>) -> Program {
        Program {
            name,
            instructions: self.instructions,
        }
    }
}

/// Compile a parsed module.
pub fn compile_module(module: &Module) -> Result<Program, TemplateError> {
    let mut compiler = Compiler::new();
    compiler.compile(&module.body)?;
    Ok(compiler.finish(module.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_body() {
        let module = Module {
            name: Some("index".into()),
            path: None,
            body: Node::Body {
                nodes: vec![
                    Node::Set {
                        name: "x".into(),
                        value: Expr::string("1"),
                        line: 1,
                    },
                    Node::Text {
                        data: "a".into(),
                        line: 1,
                    },
                    Node::Print {
                        expr: Expr::Name("x".into()),
                        line: 1,
                    },
                ],
                line: 1,
            },
        };

        let program = compile_module(&module).unwrap();
        assert_eq!(program.name.as_deref(), Some("index"));
        assert_eq!(
            program.instructions,
            vec![
                Instruction::Set {
                    name: "x".into(),
                    value: Expr::string("1"),
                },
                Instruction::Text("a".into()),
                Instruction::Print(Expr::Name("x".into())),
            ]
        );
    }
}
