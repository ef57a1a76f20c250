//! Node visitor contract and tree traversal.

use crate::template::node::{Expr, Node};

/// Observes, and may rewrite, a parsed template before it is compiled.
///
/// Visitors see every node in document order, and every expression owned by
/// a node after the node itself.
pub trait NodeVisitor {
    fn enter_node(&mut self, node: &mut Node);

    fn enter_expr(&mut self, _expr: &mut Expr) {}

    fn leave_node(&mut self, _node: &mut Node) {}

    /// Visitors with a lower priority run first.
    fn priority(&self) -> i32 {
        0
    }
}

/// Walk `node` depth-first, calling `visitor` for each node and expression.
pub fn traverse(node: &mut Node, visitor: &mut dyn NodeVisitor) {
    visitor.enter_node(node);

    match node {
        Node::Text { .. } => {}
        Node::Print { expr, .. } => traverse_expr(expr, visitor),
        Node::Set { value, .. } => traverse_expr(value, visitor),
        Node::Body { nodes, .. } => {
            for child in nodes {
                traverse(child, visitor);
            }
        }
        Node::Extension(extension) => {
            for expr in extension.expressions_mut() {
                traverse_expr(expr, visitor);
            }
        }
    }

    visitor.leave_node(node);
}

fn traverse_expr(expr: &mut Expr, visitor: &mut dyn NodeVisitor) {
    visitor.enter_expr(expr);
    for child in expr.children_mut() {
        traverse_expr(child, visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl NodeVisitor for Recorder {
        fn enter_node(&mut self, node: &mut Node) {
            let kind = match node {
                Node::Text { .. } => "text",
                Node::Print { .. } => "print",
                Node::Set { .. } => "set",
                Node::Body { .. } => "body",
                Node::Extension(_) => "extension",
            };
            self.events.push(format!("enter {}", kind));
        }

        fn enter_expr(&mut self, expr: &mut Expr) {
            let label = match expr {
                Expr::Constant(value) => format!("const {}", value),
                Expr::Name(name) => format!("name {}", name),
                Expr::Filter { name, .. } => format!("filter {}", name),
                _ => "other".to_string(),
            };
            self.events.push(label);
        }

        fn leave_node(&mut self, _node: &mut Node) {
            self.events.push("leave".to_string());
        }
    }

    #[test]
    fn test_traverse_order() {
        let mut tree = Node::Body {
            nodes: vec![
                Node::Text {
                    data: "a".into(),
                    line: 1,
                },
                Node::Print {
                    expr: Expr::Filter {
                        subject: Box::new(Expr::string("b")),
                        name: "trans".into(),
                        arguments: vec![],
                        line: 1,
                    },
                    line: 1,
                },
            ],
            line: 1,
        };

        let mut recorder = Recorder::default();
        traverse(&mut tree, &mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "enter body",
                "enter text",
                "leave",
                "enter print",
                "filter trans",
                "const \"b\"",
                "leave",
                "leave",
            ]
        );
    }
}
