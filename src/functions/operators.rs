//! `+ - * / = >` -- spec.md §4.6.

use std::collections::HashMap;

use super::BuiltinFn;
use crate::error::{EvalError, EvalErrorMsg};
use crate::span::Span;
use crate::value::Value;

pub fn register(m: &mut HashMap<&'static str, BuiltinFn>) {
    m.insert("+", add);
    m.insert("-", sub);
    m.insert("*", mul);
    m.insert("/", div);
    m.insert("=", eq);
    m.insert(">", gt);
}

/// Polymorphic add with string fallback: accumulates numerically as long
/// as every argument seen so far is numeric, then flushes to a string the
/// moment a non-numeric argument appears and concatenates from there.
fn add(args: &[Value], _span: Span) -> Result<Value, EvalError> {
    let mut numeric_mode = true;
    let mut had_numeric = false;
    let mut acc = 0.0_f64;
    let mut out = String::new();

    for v in args {
        match (numeric_mode, v.as_number()) {
            (true, Some(n)) => {
                acc = if had_numeric { acc + n } else { n };
                had_numeric = true;
            }
            (true, None) => {
                numeric_mode = false;
                if had_numeric {
                    out.push_str(&acc.to_string());
                }
                out.push_str(&v.to_string());
            }
            (false, Some(n)) => out.push_str(&Value::Number(n).to_string()),
            (false, None) => out.push_str(&v.to_string()),
        }
    }

    if numeric_mode {
        Ok(Value::Number(acc))
    } else {
        Ok(Value::Str(out))
    }
}

/// Strictly numeric left-fold shared by `-`, `*`, `/`. `-` with a single
/// argument negates it (SPEC_FULL.md's resolution of spec.md §9's open
/// question on unary `-`).
fn numeric_fold(
    func_name: &'static str,
    args: &[Value],
    identity: Option<f64>,
    fold: impl Fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    let mut nums = args.iter();
    let mut acc = match nums.next() {
        Some(v) => v
            .as_number()
            .ok_or(EvalError::new(EvalErrorMsg::TypeMismatch { func_name }))?,
        None => return Ok(Value::Number(identity.unwrap_or(0.0))),
    };
    for v in nums {
        let n = v
            .as_number()
            .ok_or(EvalError::new(EvalErrorMsg::TypeMismatch { func_name }))?;
        acc = fold(acc, n);
    }
    Ok(Value::Number(acc))
}

fn sub(args: &[Value], _span: Span) -> Result<Value, EvalError> {
    if args.len() == 1 {
        let n = args[0]
            .as_number()
            .ok_or(EvalError::new(EvalErrorMsg::TypeMismatch { func_name: "-" }))?;
        return Ok(Value::Number(-n));
    }
    numeric_fold("-", args, None, |a, b| a - b)
}

fn mul(args: &[Value], _span: Span) -> Result<Value, EvalError> {
    numeric_fold("*", args, Some(1.0), |a, b| a * b)
}

/// Host double semantics: division by zero yields infinity, no guard.
fn div(args: &[Value], _span: Span) -> Result<Value, EvalError> {
    numeric_fold("/", args, None, |a, b| a / b)
}

/// Default-rendering equality: numeric values compare within `1e-5`;
/// everything else compares its default `Display` rendering.
fn scalar_eq(a: &Value, reference: &Value) -> bool {
    match (a.as_number(), reference.as_number()) {
        (Some(x), Some(y)) => (x - y).abs() < 1e-5,
        _ => a.to_string() == reference.to_string(),
    }
}

/// Equality across all but the last argument against the last. A single
/// comparison unwraps to a bare bool; more than one is wrapped as a list.
fn eq(args: &[Value], span: Span) -> Result<Value, EvalError> {
    let Some((reference, rest)) = args.split_last() else {
        return Err(EvalError::new(EvalErrorMsg::Internal(
            "'=' requires at least one argument".into(),
        ))
        .with_span(span));
    };
    let results: Vec<Value> = rest.iter().map(|x| Value::Bool(scalar_eq(x, reference))).collect();
    match <[Value; 1]>::try_from(results) {
        Ok([single]) => Ok(single),
        Err(results) => Ok(Value::List(results)),
    }
}

/// Asymmetric: for each argument `x` before the last (`reference`), emits
/// `x > reference` -- always wrapped as a list, even for a single
/// comparison (spec.md §4.6).
fn gt(args: &[Value], span: Span) -> Result<Value, EvalError> {
    let Some((reference, rest)) = args.split_last() else {
        return Err(EvalError::new(EvalErrorMsg::Internal(
            "'>' requires at least one argument".into(),
        ))
        .with_span(span));
    };
    let results = rest
        .iter()
        .map(|x| {
            let gt = match (x.as_number(), reference.as_number()) {
                (Some(v), Some(r)) => v > r,
                _ => x.to_string() > reference.to_string(),
            };
            Value::Bool(gt)
        })
        .collect();
    Ok(Value::List(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn test_add_string_fallback() {
        let result = add(
            &[Value::Str("product 1".into()), Value::Str("++".into())],
            span(),
        )
        .unwrap();
        assert_eq!(result.to_string(), "product 1++");
    }

    #[test]
    fn test_add_degrades_after_first_string() {
        let result = add(
            &[
                Value::Str("product 1: ".into()),
                Value::Number(65.25),
            ],
            span(),
        )
        .unwrap();
        assert_eq!(result.to_string(), "product 1: 65.25");
    }

    #[test]
    fn test_add_all_numeric_stays_numeric() {
        let result = add(&[Value::Number(1.0), Value::Number(2.0)], span()).unwrap();
        assert!(matches!(result, Value::Number(n) if n == 3.0));
    }

    #[test]
    fn test_sub_unary_negates() {
        let result = sub(&[Value::Number(5.0)], span()).unwrap();
        assert!(matches!(result, Value::Number(n) if n == -5.0));
    }

    #[test]
    fn test_div_by_zero_is_infinity() {
        let result = div(&[Value::Number(1.0), Value::Number(0.0)], span()).unwrap();
        assert!(matches!(result, Value::Number(n) if n.is_infinite()));
    }

    #[test]
    fn test_eq_unwraps_single_comparison() {
        let result = eq(&[Value::Number(1.0), Value::Number(1.0)], span()).unwrap();
        assert!(matches!(result, Value::Bool(true)));
    }

    #[test]
    fn test_eq_wraps_multiple_comparisons() {
        let result = eq(
            &[Value::Number(1.0), Value::Number(2.0), Value::Number(1.0)],
            span(),
        )
        .unwrap();
        match result {
            Value::List(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(items[0], Value::Bool(true)));
                assert!(matches!(items[1], Value::Bool(false)));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_gt_always_wraps() {
        let result = gt(&[Value::Number(5.0), Value::Number(2.0)], span()).unwrap();
        match result {
            Value::List(items) => {
                assert_eq!(items.len(), 1);
                assert!(matches!(items[0], Value::Bool(true)));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }
}
