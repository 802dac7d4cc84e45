//! Tokenization of a single lexeme at a given byte offset.
//!
//! The lexer and parser are a single fused pass (spec.md §4.1): this module
//! only knows how to recognize *one* token starting at a byte offset: it does
//! not look ahead, track a stack, or know about precedence. `parser.rs` calls
//! it once per step of its frame-stack reduction loop.

use lazy_static::lazy_static;
use regex::Regex;

use crate::ast::Op;
use crate::error::{ParseError, ParseErrorMsg};
use crate::span::Span;

/// A single recognized lexeme, not yet folded into the AST.
#[derive(Debug, Clone, PartialEq)]
pub enum RawToken {
    Field(String),
    Operator(Op),
    Number(f64),
    Str(String),
    LParen,
    RParen,
    /// `[A-Za-z][A-Za-z_0-9-]+` -- may or may not name a built-in; the parser
    /// decides, since only it knows the environment.
    Ident(String),
}

fn new_fullmatch_regex(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{pattern})")).unwrap()
}

lazy_static! {
    /// `[0-9]+(\.[0-9]*)?` -- a leading `.` is never accepted; a bare
    /// trailing `.` is accepted (spec.md §4.1 rule 3, §6).
    static ref NUMBER_RE: Regex = new_fullmatch_regex(r"[0-9]+(\.[0-9]*)?");
    /// First character letter, then one or more of letter/digit/underscore/
    /// hyphen -- note the `+` (not `*`): a single-letter identifier is never
    /// recognized (spec.md §4.1 rule 7, §6).
    static ref IDENT_RE: Regex = new_fullmatch_regex(r"[A-Za-z][A-Za-z_0-9-]+");
}

/// Bytes treated as whitespace between tokens: space, tab, CR, LF, and
/// (deliberately) comma -- spec.md §4.1.
fn is_formula_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | ',')
}

/// Advances past any run of whitespace/commas starting at `pos`.
pub fn skip_whitespace(src: &str, pos: usize) -> usize {
    let mut end = pos;
    for c in src[pos..].chars() {
        if is_formula_whitespace(c) {
            end += c.len_utf8();
        } else {
            break;
        }
    }
    end
}

/// Recognizes exactly one token starting at `pos` (which must not be
/// whitespace). Returns the token and the byte offset immediately after it.
pub fn lex_one(src: &str, pos: usize) -> Result<(RawToken, usize), ParseError> {
    let rest = &src[pos..];
    let c = rest.chars().next().expect("lex_one called at end of input");

    if c == '[' {
        return lex_field(src, pos);
    }
    if let Some(op) = Op::from_char(c) {
        return Ok((RawToken::Operator(op), pos + 1));
    }
    if c.is_ascii_digit() {
        let m = NUMBER_RE.find(rest).expect("digit must match NUMBER_RE");
        let text = m.as_str();
        let value: f64 = text
            .parse()
            .map_err(|_| ParseError::new(Span::new(pos, pos + text.len()), ParseErrorMsg::UnknownError))?;
        return Ok((RawToken::Number(value), pos + text.len()));
    }
    if c == '"' || c == '\'' {
        return lex_string(src, pos);
    }
    if c == '(' {
        return Ok((RawToken::LParen, pos + 1));
    }
    if c == ')' {
        return Ok((RawToken::RParen, pos + 1));
    }
    if let Some(m) = IDENT_RE.find(rest) {
        let text = m.as_str().to_string();
        return Ok((RawToken::Ident(text), pos + m.end()));
    }

    // Nothing matched: report the single offending character, mirroring the
    // original implementation's "unknown token" diagnostic granularity.
    Err(ParseError::new(
        Span::new(pos, pos + c.len_utf8()),
        ParseErrorMsg::UnknownToken(c.to_string()),
    ))
}

/// `[` followed by any characters up to `]`.
fn lex_field(src: &str, pos: usize) -> Result<(RawToken, usize), ParseError> {
    debug_assert_eq!(src.as_bytes()[pos], b'[');
    match src[pos + 1..].find(']') {
        Some(rel_end) => {
            let path = src[pos + 1..pos + 1 + rel_end].to_string();
            Ok((RawToken::Field(path), pos + 1 + rel_end + 1))
        }
        None => Err(ParseError::new(
            Span::at(pos),
            ParseErrorMsg::UnterminatedField,
        )),
    }
}

/// Opened by `"` or `'`; closed by the same quote only when the preceding
/// byte is not a backslash. Escape sequences are never decoded -- the
/// backslash is retained verbatim in the resulting string (spec.md §4.1
/// rule 4, §9).
fn lex_string(src: &str, pos: usize) -> Result<(RawToken, usize), ParseError> {
    let quote = src.as_bytes()[pos];
    let bytes = src.as_bytes();
    let mut i = pos + 1;
    while i < bytes.len() {
        if bytes[i] == quote && bytes[i - 1] != b'\\' {
            let contents = src[pos + 1..i].to_string();
            return Ok((RawToken::Str(contents), i + 1));
        }
        i += 1;
    }
    Err(ParseError::new(
        Span::at(pos),
        ParseErrorMsg::UnterminatedString,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> Vec<RawToken> {
        let mut pos = 0;
        let mut out = Vec::new();
        loop {
            pos = skip_whitespace(src, pos);
            if pos >= src.len() {
                break;
            }
            let (tok, next) = lex_one(src, pos).unwrap();
            out.push(tok);
            pos = next;
        }
        out
    }

    #[test]
    fn test_field_token() {
        assert_eq!(lex_all("[price]"), vec![RawToken::Field("price".into())]);
        assert_eq!(
            lex_all("[lines.price]"),
            vec![RawToken::Field("lines.price".into())]
        );
    }

    #[test]
    fn test_unterminated_field() {
        assert_eq!(
            lex_one("[price", 0).unwrap_err().msg,
            ParseErrorMsg::UnterminatedField
        );
    }

    #[test]
    fn test_number_token() {
        assert_eq!(lex_all("65.25"), vec![RawToken::Number(65.25)]);
        assert_eq!(lex_all("5."), vec![RawToken::Number(5.0)]);
        assert_eq!(lex_all("5"), vec![RawToken::Number(5.0)]);
    }

    #[test]
    fn test_string_token_retains_backslash() {
        assert_eq!(
            lex_all(r#""escaped \" q""#),
            vec![RawToken::Str(r#"escaped \" q"#.into())]
        );
        assert_eq!(lex_all("'hi'"), vec![RawToken::Str("hi".into())]);
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            lex_one("\"abc", 0).unwrap_err().msg,
            ParseErrorMsg::UnterminatedString
        );
    }

    #[test]
    fn test_operator_and_parens() {
        assert_eq!(
            lex_all("(1+2)"),
            vec![
                RawToken::LParen,
                RawToken::Number(1.0),
                RawToken::Operator(Op::Add),
                RawToken::Number(2.0),
                RawToken::RParen,
            ]
        );
    }

    #[test]
    fn test_single_letter_identifier_not_recognized() {
        // Minimum identifier length is 2; a lone letter falls through to the
        // unknown-token branch.
        assert!(lex_one("x", 0).is_err());
    }

    #[test]
    fn test_whitespace_and_comma_are_equivalent_separators() {
        assert_eq!(
            lex_all("1, 2\t3\n4"),
            vec![
                RawToken::Number(1.0),
                RawToken::Number(2.0),
                RawToken::Number(3.0),
                RawToken::Number(4.0),
            ]
        );
    }
}
