//! The compiled abstract syntax tree.
//!
//! Per spec.md §9 Design Notes, the transient `Function`/`Operator` lexer
//! states are modeled as a separate type ([`crate::parser::PendingToken`])
//! that never leaks past parsing. A compiled [`Node`] tree only ever
//! contains the four variants below.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

use crate::span::Spanned;
use crate::value::Value;

/// One of the six built-in operator symbols recognized by the lexer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Op {
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Sub,
    #[strum(to_string = "*")]
    Mul,
    #[strum(to_string = "/")]
    Div,
    #[strum(to_string = "=")]
    Eq,
    #[strum(to_string = ">")]
    Gt,
}
impl Op {
    pub fn from_char(c: char) -> Option<Op> {
        match c {
            '+' => Some(Op::Add),
            '-' => Some(Op::Sub),
            '*' => Some(Op::Mul),
            '/' => Some(Op::Div),
            '=' => Some(Op::Eq),
            '>' => Some(Op::Gt),
            _ => None,
        }
    }

    /// Binding power used by the per-token precedence reduction in
    /// `parser.rs`. `>` deliberately has no entry (spec.md §4.1, §9): it
    /// returns `None` and is reduced left-to-right like an unlisted operator.
    pub fn precedence(self) -> Option<u8> {
        match self {
            Op::Div | Op::Mul => Some(10),
            Op::Sub | Op::Add => Some(5),
            Op::Eq => Some(0),
            Op::Gt => None,
        }
    }

    /// The name this operator is dispatched under in the built-in
    /// environment -- identical to its `Display` rendering.
    pub fn name(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Eq => "=",
            Op::Gt => ">",
        }
    }
}

pub type AstNode = Spanned<Node>;

/// A node of the compiled AST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// `[price]` or `[lines.price]` -- a dotted path into a host record.
    Field(String),
    /// A number, string, or boolean constant.
    Literal(Value),
    /// A parenthesized sub-expression. Distinct from `Call` even when it
    /// wraps a single child (spec.md §3 invariants) -- a `Group`'s children
    /// are evaluated and concatenated, with no dispatch involved.
    Group(Vec<AstNode>),
    /// An operator or named-function application. `name` is the uppercased
    /// lookup key into the built-in environment for named functions, and the
    /// literal operator symbol (`"+"`, `">"`, ...) for operators.
    Call(String, Vec<AstNode>),
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Field(path) => write!(f, "[{path}]"),
            Node::Literal(v) => write!(f, "{v}"),
            Node::Group(children) => {
                write!(f, "(")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", c.inner)?;
                }
                write!(f, ")")
            }
            Node::Call(name, args) => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a.inner)?;
                }
                write!(f, ")")
            }
        }
    }
}
