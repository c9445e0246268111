//! The reader: characters in, AST out.
//!
//! Token model: whitespace separates tokens, `;` starts a line comment,
//! `(`/`)` delimit expressions, `"…"` string tokens keep their quotes,
//! and the shorthands `'x`, `` `x ``, `,x` expand to `(quote x)`,
//! `(quasiquote x)`, `(unquote x)`. Symbol tokens are lowercased.

use std::{iter::Peekable, str::Chars};

use crate::{ast::Ast, exception_public::Exception};

/// Maximum nesting depth for expressions during parsing.
///
/// This prevents stack overflow from hostile input like a page of `(`.
const MAX_NESTING_DEPTH: u16 = 200;

/// A parse- or analyze-time failure, pinned to `filename:line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub filename: String,
    pub line: u32,
    pub message: String,
    /// True when the input simply ended mid-datum. `read` uses this to
    /// pull more lines instead of failing.
    pub incomplete: bool,
}

impl SyntaxError {
    pub fn new(filename: &str, line: u32, message: impl Into<String>) -> Self {
        Self {
            filename: filename.to_owned(),
            line,
            message: message.into(),
            incomplete: false,
        }
    }

    fn incomplete(filename: &str, line: u32, message: impl Into<String>) -> Self {
        Self {
            filename: filename.to_owned(),
            line,
            message: message.into(),
            incomplete: true,
        }
    }

    pub fn into_exception(self) -> Exception {
        Exception::syntax(&self.filename, self.line, &self.message)
    }
}

/// Parses a whole program: every top-level expression becomes a child of a
/// synthetic `(begin …)` so the file evaluates as one implicit sequence.
pub(crate) fn parse_program(source: &str, filename: &str) -> Result<Ast, SyntaxError> {
    let mut cursor = Cursor::new(source, filename);
    let mut children = vec![Ast::symbol("begin", 1)];
    loop {
        cursor.skip_blank();
        if cursor.peek().is_none() {
            break;
        }
        children.push(parse_form(&mut cursor, 0)?);
    }
    Ok(Ast::expr(children, 1))
}

/// Parses exactly one datum, for the `read` primitive.
///
/// Text past the first complete datum is ignored. Running out of input
/// before the datum closes reports an `incomplete` error.
pub(crate) fn parse_datum(source: &str, filename: &str) -> Result<Ast, SyntaxError> {
    let mut cursor = Cursor::new(source, filename);
    cursor.skip_blank();
    if cursor.peek().is_none() {
        return Err(SyntaxError::incomplete(filename, cursor.line, "end of input"));
    }
    parse_form(&mut cursor, 0)
}

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    filename: &'a str,
    line: u32,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str, filename: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            filename,
            line: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    /// Skips whitespace and `;` line comments.
    fn skip_blank(&mut self) {
        while let Some(c) = self.peek() {
            if c == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if c == ' ' || c == '\t' || c == '\n' || c == '\r' {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.filename, self.line, message)
    }

    fn eof(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::incomplete(self.filename, self.line, message)
    }
}

/// Reader shorthand characters and the forms they expand to.
fn shorthand_keyword(c: char) -> Option<&'static str> {
    match c {
        '\'' => Some("quote"),
        '`' => Some("quasiquote"),
        ',' => Some("unquote"),
        _ => None,
    }
}

fn parse_form(cursor: &mut Cursor<'_>, depth: u16) -> Result<Ast, SyntaxError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(cursor.error("expression nesting too deep"));
    }
    match cursor.peek() {
        None => Err(cursor.eof("unexpected end of input")),
        Some(')') => Err(cursor.error("unexpected ')'")),
        Some('(') => parse_expr(cursor, depth),
        Some('"') => parse_string(cursor),
        Some(c) if shorthand_keyword(c).is_some() => {
            let line = cursor.line;
            cursor.bump();
            let keyword = shorthand_keyword(c).expect("peeked shorthand");
            cursor.skip_blank();
            if cursor.peek().is_none() {
                return Err(cursor.eof(format!("end of input after {keyword} shorthand")));
            }
            let datum = parse_form(cursor, depth + 1)?;
            Ok(Ast::expr(vec![Ast::symbol(keyword, line), datum], line))
        }
        Some(_) => parse_symbol(cursor),
    }
}

fn parse_expr(cursor: &mut Cursor<'_>, depth: u16) -> Result<Ast, SyntaxError> {
    let line = cursor.line;
    cursor.bump(); // consume '('
    let mut children = Vec::new();
    loop {
        cursor.skip_blank();
        match cursor.peek() {
            None => return Err(cursor.eof("unterminated expression")),
            Some(')') => {
                cursor.bump();
                return Ok(Ast::expr(children, line));
            }
            Some(_) => children.push(parse_form(cursor, depth + 1)?),
        }
    }
}

/// Reads a string token, keeping the surrounding quotes in the stored text
/// so the analyzer can distinguish string literals from identifiers.
fn parse_string(cursor: &mut Cursor<'_>) -> Result<Ast, SyntaxError> {
    let line = cursor.line;
    let mut text = String::new();
    text.push('"');
    cursor.bump(); // consume opening quote
    loop {
        match cursor.bump() {
            None => return Err(cursor.eof("unterminated string literal")),
            Some('\\') => {
                text.push('\\');
                match cursor.bump() {
                    None => return Err(cursor.eof("unterminated string literal")),
                    Some(escaped) => text.push(escaped),
                }
            }
            Some('"') => {
                text.push('"');
                return Ok(Ast::symbol(text, line));
            }
            Some(c) => text.push(c),
        }
    }
}

fn parse_symbol(cursor: &mut Cursor<'_>) -> Result<Ast, SyntaxError> {
    let line = cursor.line;
    let mut text = String::new();
    while let Some(c) = cursor.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' | ')' | ';' => break,
            '(' | '"' | '\'' | '`' | ',' => {
                return Err(cursor.error(format!("unexpected '{c}' in symbol")));
            }
            // symbol text is lowercase-normalized
            _ => {
                text.push(c.to_ascii_lowercase());
                cursor.bump();
            }
        }
    }
    debug_assert!(!text.is_empty(), "symbol token cannot be empty");
    Ok(Ast::symbol(text, line))
}

// Criteria: ((+ | -) [0-9]) | [0-9]) [0-9]*
pub(crate) fn is_integer_text(text: &str) -> bool {
    let rest = match text.as_bytes() {
        [b'+' | b'-', d, ..] if d.is_ascii_digit() => &text[2..],
        [d, ..] if d.is_ascii_digit() => &text[1..],
        _ => return false,
    };
    rest.bytes().all(|b| b.is_ascii_digit())
}

// Criteria: ((+ | -) [0-9]) | [0-9]) [0-9]* \. [0-9] [0-9]*
pub(crate) fn is_float_text(text: &str) -> bool {
    let rest = match text.as_bytes() {
        [b'+' | b'-', d, ..] if d.is_ascii_digit() => &text[2..],
        [d, ..] if d.is_ascii_digit() => &text[1..],
        _ => return false,
    };
    let Some((integral, fractional)) = rest.split_once('.') else {
        return false;
    };
    integral.bytes().all(|b| b.is_ascii_digit())
        && !fractional.is_empty()
        && fractional.bytes().all(|b| b.is_ascii_digit())
}

/// True for a token that was read as a string literal (quotes retained).
pub(crate) fn is_string_text(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

/// Strips the surrounding quotes and decodes the `\n \t \" \\` escapes.
pub(crate) fn decode_string_literal(text: &str) -> Result<String, String> {
    debug_assert!(is_string_text(text));
    let inner = &text[1..text.len() - 1];
    let mut decoded = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('"') => decoded.push('"'),
            Some('\\') => decoded.push('\\'),
            Some(other) => return Err(format!("unsupported escape '\\{other}' in string literal")),
            None => return Err("dangling '\\' in string literal".to_owned()),
        }
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(source: &str) -> Ast {
        parse_datum(source, "<test>").unwrap()
    }

    #[test]
    fn symbols_are_lowercased() {
        let ast = parse_one("Foo-Bar");
        assert_eq!(ast.symbol_text(), Some("foo-bar"));
    }

    #[test]
    fn strings_keep_quotes_and_case() {
        let ast = parse_one("\"Hello\\nWorld\"");
        assert_eq!(ast.symbol_text(), Some("\"Hello\\nWorld\""));
    }

    #[test]
    fn shorthand_expands_to_quote() {
        let ast = parse_one("'(1 2)");
        assert_eq!(ast.render(), "(quote (1 2))");
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let ast = parse_program("; header\n(f) ; trailing\n", "<test>").unwrap();
        assert_eq!(ast.render(), "(begin (f))");
    }

    #[test]
    fn stray_close_paren_is_rejected() {
        let err = parse_program(")", "<test>").unwrap_err();
        assert!(!err.incomplete);
        assert!(err.message.contains("unexpected ')'"), "got: {}", err.message);
    }

    #[test]
    fn unterminated_expression_is_incomplete() {
        let err = parse_datum("(f 1 2", "<test>").unwrap_err();
        assert!(err.incomplete);
    }

    #[test]
    fn open_paren_inside_symbol_is_rejected() {
        let err = parse_program("ab(cd)", "<test>").unwrap_err();
        assert!(err.message.contains("unexpected '('"), "got: {}", err.message);
    }

    /// Pretty-printed ASTs re-parse to structurally equal trees.
    #[test]
    fn parse_print_is_idempotent() {
        let sources = [
            "(define (fact n) (if (= n 0) 1 (* n (fact (- n 1)))))",
            "'(1 ,(+ 1 1) 3)",
            "`(a (b ,(* 2 3)))",
            "(let ((x 3) (y 4)) (+ (* x x) (* y y)))",
            "(display \"he said \\\"hi\\\"\")",
            "(cond ((= 1 2) 'a) (else 'b))",
        ];
        for source in sources {
            let first = parse_program(source, "<test>").unwrap();
            let rendered = first.render();
            let second = parse_program(&rendered, "<test>").unwrap();
            assert_eq!(first, second, "round-trip changed structure for {source:?}");
            assert_eq!(rendered, second.render(), "second print differs for {source:?}");
        }
    }

    #[test]
    fn classifiers_match_literal_grammar() {
        assert!(is_integer_text("42") && is_integer_text("-7") && is_integer_text("+0"));
        assert!(!is_integer_text("4.2") && !is_integer_text("-") && !is_integer_text("a1"));
        assert!(is_float_text("3.5") && is_float_text("-0.25"));
        assert!(!is_float_text("3.") && !is_float_text(".5") && !is_float_text("35"));
    }
}
