//! Parse- and analyze-time error reporting.
//!
//! Every failure carries `Syntax` kind and a `file:line:` prefixed
//! message so editors can jump to the fault.

use lilt::{ErrorKind, Exception, Runner};

fn new_err(source: &str) -> Exception {
    Runner::new(source, "bad.scm", vec![]).expect_err("program should be rejected")
}

fn assert_syntax(source: &str, fragment: &str) {
    let err = new_err(source);
    assert_eq!(err.kind(), ErrorKind::Syntax, "for {source:?}: {err}");
    assert!(
        err.message().contains(fragment),
        "for {source:?}: expected {fragment:?} in {:?}",
        err.message()
    );
    assert!(
        err.message().starts_with("bad.scm:"),
        "message should lead with file:line, got {:?}",
        err.message()
    );
}

#[test]
fn stray_close_paren() {
    assert_syntax(")", "unexpected ')'");
}

#[test]
fn unterminated_expression() {
    assert_syntax("(define x", "unterminated expression");
}

#[test]
fn unterminated_string() {
    assert_syntax("(display \"oops)", "unterminated string");
}

#[test]
fn open_paren_inside_a_symbol() {
    assert_syntax("(foo ab(cd))", "unexpected '('");
}

#[test]
fn quote_mark_inside_a_symbol() {
    assert_syntax("(foo ab'cd)", "unexpected '''");
}

#[test]
fn empty_expression() {
    assert_syntax("()", "empty expression");
}

#[test]
fn set_bang_needs_a_variable() {
    assert_syntax("(set! 3 4)", "not a valid variable name");
    assert_syntax("(set! x)", "set!");
}

#[test]
fn define_requires_a_body_for_procedures() {
    assert_syntax("(define (f x))", "no body");
}

#[test]
fn define_var_form_takes_one_expression() {
    assert_syntax("(define x 1 2)", "define");
}

#[test]
fn lambda_parameter_validation() {
    assert_syntax("(lambda (x x) x)", "duplicate parameter");
    assert_syntax("(lambda (a . b c) a)", "only one parameter may follow '.'");
    assert_syntax("(lambda (a .) a)", "'.' must be followed by a rest parameter");
}

#[test]
fn if_clause_count() {
    assert_syntax("(if 1)", "if: expected 2 or 3 clauses");
    assert_syntax("(if 1 2 3 4)", "if: expected 2 or 3 clauses");
}

#[test]
fn cond_else_must_be_last() {
    assert_syntax("(cond (else 1) ((= 1 1) 2))", "else must be the last clause");
}

#[test]
fn cond_clauses_need_a_consequent() {
    assert_syntax("(cond ((= 1 1)))", "no consequent");
}

#[test]
fn let_bindings_are_pairs() {
    assert_syntax("(let ((x)) x)", "binding must be a");
    assert_syntax("(let (x 1) x)", "binding must be a");
}

#[test]
fn quote_takes_exactly_one_datum() {
    assert_syntax("(quote a b)", "quote: expected exactly 1 clause");
}

#[test]
fn integer_literals_must_fit_64_bits() {
    assert_syntax("(+ 99999999999999999999999999 1)", "out of range");
}

#[test]
fn nesting_depth_is_bounded() {
    let source = format!("{}{}{}", "(".repeat(300), "1", ")".repeat(300));
    assert_syntax(&source, "nesting too deep");
}

#[test]
fn line_numbers_point_at_the_fault() {
    let err = new_err("(define x 1)\n(define y\n");
    assert!(
        err.message().starts_with("bad.scm:3") || err.message().starts_with("bad.scm:2"),
        "expected a line near the fault, got {:?}",
        err.message()
    );
}
