//! The fused lexer/parser: a single linear pass that tokenizes and reduces
//! at the same time (spec.md §4.1).
//!
//! The parse state is a stack of frames, each an ordered list of
//! [`PendingToken`]s; the stack starts with one empty frame. Per spec.md §9,
//! the transient `Function`/`Operator` lexer states are kept out of the
//! final [`Node`] tree entirely -- they only ever live in a `PendingToken`,
//! which this module owns privately.

use crate::ast::{AstNode, Node, Op};
use crate::error::{ParseError, ParseErrorMsg};
use crate::functions;
use crate::lexer::{self, RawToken};
use crate::span::{Span, Spanned};
use crate::value::Value;

/// One slot in a parse frame: either a finished AST node, or a function
/// name / operator still waiting to be folded into a `Call`.
#[derive(Debug, Clone)]
enum PendingToken {
    Done(AstNode),
    Function(Spanned<String>),
    Operator(Spanned<Op>),
}

/// The result of a successful compile: the top-level node sequence plus
/// every field path encountered, for the applicability checker.
#[derive(Debug, Clone)]
pub struct CompiledAst {
    pub roots: Vec<AstNode>,
    pub fields: Vec<String>,
}

pub fn parse(src: &str) -> Result<CompiledAst, ParseError> {
    let mut stack: Vec<Vec<PendingToken>> = vec![Vec::new()];
    let mut fields = Vec::new();
    let mut pos = 0;
    let len = src.len();

    while pos < len {
        pos = lexer::skip_whitespace(src, pos);
        if pos >= len {
            break;
        }
        let c = src[pos..].chars().next().unwrap();

        if c == '(' {
            stack.push(Vec::new());
            pos += 1;
        } else if c == ')' {
            pos = reduce_close_paren(&mut stack, pos)?;
        } else {
            let (tok, next) = lexer::lex_one(src, pos)?;
            push_token(&mut stack, &mut fields, tok, Span::new(pos, next))?;
            pos = next;
        }

        reduce_operators(stack.last_mut().expect("stack is never empty"));
    }

    if stack.len() != 1 {
        return Err(ParseError::new(Span::at(pos), ParseErrorMsg::UnknownError));
    }
    let top = stack.pop().unwrap();
    if top.len() != 1 {
        let span = top.first().map(pending_span).unwrap_or_else(|| Span::at(pos));
        return Err(ParseError::new(span, ParseErrorMsg::UnhandledReduce));
    }
    match top.into_iter().next().unwrap() {
        PendingToken::Done(node) => Ok(CompiledAst {
            roots: vec![node],
            fields,
        }),
        other => Err(ParseError::new(pending_span(&other), ParseErrorMsg::UnhandledReduce)),
    }
}

fn pending_span(tok: &PendingToken) -> Span {
    match tok {
        PendingToken::Done(n) => n.span,
        PendingToken::Function(f) => f.span,
        PendingToken::Operator(o) => o.span,
    }
}

fn push_token(
    stack: &mut [Vec<PendingToken>],
    fields: &mut Vec<String>,
    tok: RawToken,
    span: Span,
) -> Result<(), ParseError> {
    let frame = stack.last_mut().expect("stack is never empty");
    let item = match tok {
        RawToken::Field(path) => {
            fields.push(path.clone());
            PendingToken::Done(Spanned::new(span, Node::Field(path)))
        }
        RawToken::Number(n) => {
            PendingToken::Done(Spanned::new(span, Node::Literal(Value::Number(n))))
        }
        RawToken::Str(s) => PendingToken::Done(Spanned::new(span, Node::Literal(Value::Str(s)))),
        RawToken::Operator(op) => PendingToken::Operator(Spanned::new(span, op)),
        RawToken::Ident(name) => {
            if functions::is_builtin(&name) {
                PendingToken::Function(Spanned::new(span, name))
            } else {
                return Err(ParseError::new(span, ParseErrorMsg::UnknownToken(name)));
            }
        }
        RawToken::LParen | RawToken::RParen => {
            unreachable!("parens are consumed by the caller before lexing a token")
        }
    };
    frame.push(item);
    Ok(())
}

/// Handles a `)` at `pos`: folds the just-finished frame into either a
/// `Call` (if the frame below ends in a pending function name) or a `Group`.
fn reduce_close_paren(stack: &mut Vec<Vec<PendingToken>>, pos: usize) -> Result<usize, ParseError> {
    if stack.len() < 2 {
        return Err(ParseError::new(Span::at(pos), ParseErrorMsg::UnbalancedParens));
    }
    let top = stack.pop().unwrap();
    let close_span = Span::new(pos, pos + 1);
    let top_span = frame_span(&top, close_span);
    let args = finalize_frame(top)?;

    let below = stack.last_mut().expect("checked len >= 2 above");
    let is_call = matches!(below.last(), Some(PendingToken::Function(_)));
    if is_call {
        let func = match below.pop().unwrap() {
            PendingToken::Function(f) => f,
            _ => unreachable!(),
        };
        let span = func.span.merge(top_span);
        below.push(PendingToken::Done(Spanned::new(
            span,
            // Original casing is preserved for rendering (spec.md §3); only
            // `functions::lookup` uppercases, at dispatch time.
            Node::Call(func.inner, args),
        )));
    } else {
        below.push(PendingToken::Done(Spanned::new(top_span, Node::Group(args))));
    }
    Ok(pos + 1)
}

fn frame_span(frame: &[PendingToken], fallback: Span) -> Span {
    let mut span = None;
    for tok in frame {
        let s = pending_span(tok);
        span = Some(span.map_or(s, |acc: Span| acc.merge(s)));
    }
    span.unwrap_or(fallback)
}

/// Converts a closed frame into finished AST nodes. Fails if any
/// `Function`/`Operator` token never got folded -- a dangling operator or an
/// unapplied function name, neither of which the [`Node`] type can express.
fn finalize_frame(frame: Vec<PendingToken>) -> Result<Vec<AstNode>, ParseError> {
    frame
        .into_iter()
        .map(|tok| match tok {
            PendingToken::Done(node) => Ok(node),
            PendingToken::Operator(op) => {
                Err(ParseError::new(op.span, ParseErrorMsg::DanglingOperator))
            }
            PendingToken::Function(f) => Err(ParseError::new(f.span, ParseErrorMsg::UnhandledReduce)),
        })
        .collect()
}

/// Per-token operator reduction (spec.md §4.1): if the current frame ends in
/// `value operator value`, fold the triple into a `Call`, applying
/// precedence correction against the left operand first. Runs at most once
/// per call, mirroring the single `if` (not a reduce-to-fixpoint loop) in
/// the original implementation -- sufficient because this is invoked after
/// every single token is appended.
fn reduce_operators(frame: &mut Vec<PendingToken>) {
    let n = frame.len();
    if n < 3 {
        return;
    }
    let op = match &frame[n - 2] {
        PendingToken::Operator(o) => *o,
        _ => return,
    };

    // Precedence correction only ever matters when the left operand is
    // itself an operator `Call` -- see DESIGN.md for why `Group` is exempt.
    let climb_target = match &frame[n - 3] {
        PendingToken::Done(node) => match &node.inner {
            Node::Call(name, args) if !args.is_empty() => {
                Op::from_name(name).and_then(|op1| match (op1.precedence(), op.inner.precedence()) {
                    (Some(p1), Some(p2)) if p2 > p1 => Some(()),
                    _ => None,
                })
            }
            _ => None,
        },
        _ => None,
    };

    let b = match frame.pop().unwrap() {
        PendingToken::Done(node) => node,
        _ => unreachable!("checked frame[n-2] is an operator, so frame[n-1] was pushed after it"),
    };
    let _op = match frame.pop().unwrap() {
        PendingToken::Operator(o) => o,
        _ => unreachable!(),
    };

    if climb_target.is_some() {
        let mut a = match frame.pop().unwrap() {
            PendingToken::Done(node) => node,
            _ => unreachable!(),
        };
        if let Node::Call(_, args) = &mut a.inner {
            let x = args.pop().expect("checked non-empty above");
            let new_span = x.span.merge(b.span);
            args.push(Spanned::new(new_span, Node::Call(op.inner.name().to_string(), vec![x, b])));
        }
        a.span = a.span.merge(b.span);
        frame.push(PendingToken::Done(a));
    } else {
        let a = match frame.pop().unwrap() {
            PendingToken::Done(node) => node,
            _ => unreachable!(),
        };
        let span = a.span.merge(b.span);
        frame.push(PendingToken::Done(Spanned::new(
            span,
            Node::Call(op.inner.name().to_string(), vec![a, b]),
        )));
    }
}

impl Op {
    /// Inverse of [`Op::name`]; used to recognize an already-built `Call`
    /// node as an operator application during precedence correction.
    pub fn from_name(name: &str) -> Option<Op> {
        match name {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" => Some(Op::Mul),
            "/" => Some(Op::Div),
            "=" => Some(Op::Eq),
            ">" => Some(Op::Gt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> AstNode {
        let ast = parse(src).unwrap();
        assert_eq!(ast.roots.len(), 1);
        ast.roots.into_iter().next().unwrap()
    }

    #[test]
    fn test_simple_field() {
        let node = parse_ok("[price]");
        assert!(matches!(node.inner, Node::Field(p) if p == "price"));
    }

    #[test]
    fn test_deeply_nested_parens() {
        let node = parse_ok("(((((((((([price]))))))))))");
        assert!(matches!(node.inner, Node::Group(_)));
    }

    #[test]
    fn test_precedence_climb() {
        // 1 + 2 / 3 should parse as 1 + (2 / 3), not (1 + 2) / 3.
        let node = parse_ok("1 + 2 / 3");
        match node.inner {
            Node::Call(name, args) => {
                assert_eq!(name, "+");
                assert_eq!(args.len(), 2);
                match &args[1].inner {
                    Node::Call(inner_name, inner_args) => {
                        assert_eq!(inner_name, "/");
                        assert_eq!(inner_args.len(), 2);
                    }
                    other => panic!("expected nested `/` call, got {other:?}"),
                }
            }
            other => panic!("expected `+` call, got {other:?}"),
        }
    }

    #[test]
    fn test_function_call() {
        // Original casing is preserved in the node; only dispatch uppercases.
        let node = parse_ok("sum([price])");
        match node.inner {
            Node::Call(name, args) => {
                assert_eq!(name, "sum");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_field_error() {
        assert_eq!(
            parse("[price").unwrap_err().msg,
            ParseErrorMsg::UnterminatedField
        );
    }

    #[test]
    fn test_unknown_function_error() {
        assert!(matches!(
            parse("bogus(1)").unwrap_err().msg,
            ParseErrorMsg::UnknownToken(_)
        ));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!(parse("(1 + 2").is_err());
        assert!(parse("1 + 2)").is_err());
    }

    #[test]
    fn test_whitespace_and_comma_insensitivity() {
        let a = parse("sum([price],[cost])").unwrap();
        let b = parse("sum( [price]  [cost] )").unwrap();
        assert_eq!(format!("{:?}", a.roots), format!("{:?}", b.roots));
    }
}
