//! The AST printer (spec.md §4.2): a fixed, indented, JSON-shaped rendering,
//! not required to be strict JSON. Grounded on the teacher's `ast.rs`
//! `Display` shape and `original_source/.../evaluator.go`'s `ast()` for the
//! exact literal/field/func object shape.

use itertools::Itertools;

use crate::ast::{AstNode, Node};

const INDENT_UNIT: &str = "  ";

/// Renders the top-level root sequence of a compiled formula.
pub fn render(roots: &[AstNode]) -> String {
    render_siblings(roots, 0)
}

fn render_siblings(nodes: &[AstNode], indent: usize) -> String {
    nodes.iter().map(|n| render_node(&n.inner, indent)).join(",\n")
}

/// A `Group` is transparent: it contributes no wrapper object of its own,
/// only its children's lines, at the same indent it was given.
fn render_node(node: &Node, indent: usize) -> String {
    let pad = INDENT_UNIT.repeat(indent);
    match node {
        Node::Field(path) => format!("{pad}{{ \"type\": \"field\", \"name\": \"{path}\" }}"),
        Node::Literal(v) => format!("{pad}{{ \"type\": \"literal\", \"value\": \"{v}\" }}"),
        Node::Group(children) => render_siblings(children, indent),
        Node::Call(name, args) => {
            let args_str = render_siblings(args, indent + 2);
            format!("{pad}{{ \"type\": \"func\", \"name\": \"{name}\", \"args\": [\n{args_str}\n{pad}] }}")
        }
    }
}
