//! `SUM`, `SUMIF`, `CONCAT` -- spec.md §4.6.

use std::collections::HashMap;

use super::BuiltinFn;
use crate::error::{EvalError, EvalErrorMsg};
use crate::span::Span;
use crate::value::Value;

pub fn register(m: &mut HashMap<&'static str, BuiltinFn>) {
    m.insert("SUM", sum);
    m.insert("SUMIF", sumif);
    m.insert("CONCAT", concat);
}

fn sum(args: &[Value], _span: Span) -> Result<Value, EvalError> {
    let mut total = 0.0;
    for v in args {
        total += v
            .as_number()
            .ok_or(EvalError::new(EvalErrorMsg::TypeMismatch { func_name: "SUM" }))?;
    }
    Ok(Value::Number(total))
}

/// `=`/`>` unwrap a lone comparison to a bare bool rather than a one-element
/// list (spec.md §4.6); `SUMIF`'s filter argument accepts either shape.
fn filter_bools(v: &Value, func_name: &'static str) -> Result<Vec<bool>, EvalError> {
    match v {
        Value::Bool(b) => Ok(vec![*b]),
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                Value::Bool(b) => Ok(*b),
                _ => Err(EvalError::new(EvalErrorMsg::BadFilterShape { func_name })),
            })
            .collect(),
        _ => Err(EvalError::new(EvalErrorMsg::BadFilterShape { func_name })),
    }
}

fn sumif(args: &[Value], _span: Span) -> Result<Value, EvalError> {
    let Some((filter, values)) = args.split_last() else {
        return Ok(Value::Number(0.0));
    };
    let filter = filter_bools(filter, "SUMIF")?;
    if filter.len() != values.len() {
        return Err(EvalError::new(EvalErrorMsg::BadFilterShape { func_name: "SUMIF" }));
    }
    let mut total = 0.0;
    for (v, keep) in values.iter().zip(filter) {
        if keep {
            total += v
                .as_number()
                .ok_or(EvalError::new(EvalErrorMsg::TypeMismatch { func_name: "SUMIF" }))?;
        }
    }
    Ok(Value::Number(total))
}

/// String-concatenates every argument's default rendering; unlike `+` this
/// never stays numeric, even when every argument happens to be a number.
fn concat(args: &[Value], _span: Span) -> Result<Value, EvalError> {
    let mut out = String::new();
    for v in args {
        out.push_str(&v.to_string());
    }
    Ok(Value::Str(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn test_sum_basic() {
        let result = sum(
            &[Value::Number(65.25), Value::Number(10.0), Value::Number(24.0)],
            span(),
        )
        .unwrap();
        assert!(matches!(result, Value::Number(n) if (n - 99.25).abs() < 1e-9));
    }

    #[test]
    fn test_sum_rejects_non_numeric() {
        assert!(sum(&[Value::Str("x".into())], span()).is_err());
    }

    #[test]
    fn test_sumif_with_bare_bool_filter() {
        let result = sumif(
            &[Value::Number(65.25), Value::Bool(false)],
            span(),
        )
        .unwrap();
        assert!(matches!(result, Value::Number(n) if n == 0.0));
    }

    #[test]
    fn test_sumif_with_list_filter() {
        let result = sumif(
            &[
                Value::Number(10.0),
                Value::Number(20.0),
                Value::List(vec![Value::Bool(true), Value::Bool(false)]),
            ],
            span(),
        )
        .unwrap();
        assert!(matches!(result, Value::Number(n) if n == 10.0));
    }

    #[test]
    fn test_sumif_mismatched_filter_length_errors() {
        let result = sumif(
            &[
                Value::Number(10.0),
                Value::Number(20.0),
                Value::List(vec![Value::Bool(true)]),
            ],
            span(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_concat_renders_numbers_too() {
        let result = concat(
            &[Value::Str("total: ".into()), Value::Number(65.25)],
            span(),
        )
        .unwrap();
        assert_eq!(result.to_string(), "total: 65.25");
    }
}
