//! An embeddable expression language for calculated fields: short
//! user-authored formulas that reference named fields on host records
//! (possibly nested, possibly collection-valued) and compute a scalar, or a
//! flat list of scalars, from them.
//!
//! A [`Formula`] is compiled once from source and evaluated many times
//! against different record instances. Evaluation is pure and
//! single-threaded per call; independent formulas share only the immutable
//! built-in environment and may be run concurrently without coordination.

mod applicability;
pub mod ast;
mod eval;
pub mod error;
mod functions;
mod lexer;
mod parser;
mod printer;
pub mod record;
pub mod resolver;
pub mod span;
pub mod value;

pub use ast::{Node, Op};
pub use error::{EvalError, EvalErrorMsg, ParseError, ParseErrorMsg};
pub use record::DynamicRecord;
pub use resolver::{FieldValue, Record};
pub use span::{Span, Spanned};
pub use value::Value;

use parser::CompiledAst;

/// A compiled formula. Immutable after a successful [`Formula::compile`] and
/// safe to evaluate repeatedly -- `run` never mutates the AST or the
/// collected field list (spec.md §5).
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    ast: CompiledAst,
}

impl Formula {
    /// Parses `source` into a compiled formula. Fails with a [`ParseError`]
    /// carrying a line and column on malformed input.
    pub fn compile(source: &str) -> Result<Self, ParseError> {
        let ast = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            ast,
        })
    }

    /// The source this formula was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True iff every field path this formula references resolves, in
    /// applicability mode, against every given record (spec.md §4.4).
    pub fn applies_to(&self, records: &[&dyn Record]) -> bool {
        applicability::applies_to(&self.ast.fields, records)
    }

    /// Renders the compiled AST as a fixed, indented JSON-shaped string
    /// (spec.md §4.2). Never fails.
    pub fn render_ast(&self) -> String {
        printer::render(&self.ast.roots)
    }

    /// Evaluates against zero or more records, returning a flat list of
    /// scalars (spec.md §4.5). A formula with no field references is
    /// constant and may be run with an empty record slice.
    pub fn run(&self, records: &[&dyn Record]) -> Result<Vec<Value>, EvalError> {
        eval::eval_formula(&self.ast.roots, records)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn source_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("[price]".to_string()),
            Just("[name]".to_string()),
            Just("1 + 2 / 3".to_string()),
            Just("sum([price])".to_string()),
            Just("sumif([price], [price] > 2)".to_string()),
            Just("[name] + ': ' + [price]".to_string()),
        ]
    }

    proptest! {
        /// spec.md §8: `compile(s)` succeeds iff `compile(s)` succeeds.
        #[test]
        fn compile_is_deterministic(src in source_strategy()) {
            prop_assert_eq!(Formula::compile(&src).is_ok(), Formula::compile(&src).is_ok());
        }

        /// spec.md §8: whitespace/comma insensitivity of the resulting AST.
        #[test]
        fn whitespace_padding_does_not_change_ast(src in source_strategy(), pad in 0..4usize) {
            let padded: String = std::iter::repeat(' ').take(pad).chain(src.chars()).collect();
            let a = Formula::compile(&src).unwrap();
            let b = Formula::compile(&padded).unwrap();
            prop_assert_eq!(a.render_ast(), b.render_ast());
        }
    }
}
