//! The evaluator (spec.md §4.5): a recursive AST walker that threads the
//! input records through, dispatches calls to the built-in environment, and
//! returns a flat list of scalars. Grounded on the teacher's `ast.rs`
//! `eval_inner` (de-asynced: the teacher awaits a `GridProxy` fetch, this
//! engine's `Record` trait is synchronous) and `evaluator.go`'s `run`.

use smallvec::SmallVec;

use crate::ast::{AstNode, Node};
use crate::error::{EvalError, EvalErrorMsg};
use crate::functions;
use crate::resolver::{self, Record};
use crate::value::Value;

/// Evaluates the root sequence of a compiled formula, concatenating every
/// root's output and flattening any `Value::List` a top-level `=`/`>` call
/// produced into individual scalars (spec.md §4.5: "returns a flat list of
/// scalars"). A formula with no field references is constant and may be
/// evaluated against zero records.
pub fn eval_formula(roots: &[AstNode], records: &[&dyn Record]) -> Result<Vec<Value>, EvalError> {
    let mut raw = Vec::new();
    for root in roots {
        raw.extend(eval_node(root, records)?);
    }
    let mut flat = Vec::with_capacity(raw.len());
    for v in raw {
        flatten_into(v, &mut flat);
    }
    Ok(flat)
}

fn flatten_into(v: Value, out: &mut Vec<Value>) {
    match v {
        Value::List(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        other => out.push(other),
    }
}

/// Evaluates a single node, *without* the top-level list flattening -- a
/// `Call`'s raw `Value::List` result must survive intact when it's itself an
/// argument to an enclosing call (e.g. `SUMIF`'s filter argument).
fn eval_node(node: &AstNode, records: &[&dyn Record]) -> Result<Vec<Value>, EvalError> {
    match &node.inner {
        Node::Literal(v) => Ok(vec![v.clone()]),
        Node::Group(children) => {
            let mut out = Vec::new();
            for c in children {
                out.extend(eval_node(c, records)?);
            }
            Ok(out)
        }
        Node::Field(path) => {
            let mut out = Vec::new();
            for r in records {
                match resolver::resolve_eval(*r, path) {
                    Some(values) => out.extend(values),
                    None => {
                        return Err(
                            EvalError::new(EvalErrorMsg::UnresolvableField(path.clone())).with_span(node.span)
                        )
                    }
                }
            }
            Ok(out)
        }
        Node::Call(name, args) => {
            let mut flat_args: SmallVec<[Value; 4]> = SmallVec::new();
            for a in args {
                flat_args.extend(eval_node(a, records)?);
            }
            let f = functions::lookup(name)
                .ok_or_else(|| EvalError::new(EvalErrorMsg::UnknownFunction(name.clone())).with_span(node.span))?;
            let result = f(&flat_args, node.span)?;
            Ok(vec![result])
        }
    }
}
