//! The flat, process-wide built-in environment (spec.md §3 Environment,
//! §4.6). Mirrors the teacher's `lookup_function`/`ALL_FUNCTIONS` pattern
//! (`reference-teacher/formulas/functions/mod.rs`) but keyed over plain
//! scalar `Value`s instead of spreadsheet arrays.

mod aggregate;
mod operators;

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::EvalError;
use crate::span::Span;
use crate::value::Value;

/// A built-in's implementation: takes its already-evaluated arguments (in
/// source order) and the call's span (for error attribution), and produces
/// a single result value.
pub type BuiltinFn = fn(&[Value], Span) -> Result<Value, EvalError>;

lazy_static! {
    /// Keyed by uppercased name: `SUM`, `SUMIF`, `CONCAT`, and the operator
    /// symbols `+ - * / = >`. Initialized once, read-only for the life of
    /// the process (spec.md §5).
    static ref ALL_FUNCTIONS: HashMap<&'static str, BuiltinFn> = {
        let mut m: HashMap<&'static str, BuiltinFn> = HashMap::new();
        operators::register(&mut m);
        aggregate::register(&mut m);
        m
    };
}

/// True iff `name`, uppercased, names a built-in function (operator
/// symbols don't go through this path -- the lexer recognizes them
/// directly as single characters).
pub fn is_builtin(name: &str) -> bool {
    ALL_FUNCTIONS.contains_key(name.to_ascii_uppercase().as_str())
}

/// Dispatches a call by uppercased name. `None` means no such built-in --
/// unreachable for a successfully compiled AST, since `is_builtin` gated
/// identifier recognition at parse time, but operator names are looked up
/// through the same table and are always present.
pub fn lookup(name: &str) -> Option<BuiltinFn> {
    ALL_FUNCTIONS.get(name.to_ascii_uppercase().as_str()).copied()
}
