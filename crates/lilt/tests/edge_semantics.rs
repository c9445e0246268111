//! Edge-case semantics: the corners that distinguish this dialect.

use lilt::{CollectStringPrint, ErrorKind, NoInput, NoPrint, Object, Runner};
use pretty_assertions::assert_eq;

fn run(source: &str) -> Option<Object> {
    Runner::new(source, "<test>", vec![])
        .expect("program should analyze")
        .run(&mut NoPrint, &mut NoInput)
        .expect("program should run")
}

fn run_value(source: &str) -> Object {
    run(source).expect("program should produce a value")
}

fn run_display(source: &str) -> String {
    run_value(source).to_string()
}

fn run_err_kind(source: &str) -> ErrorKind {
    Runner::new(source, "<test>", vec![])
        .expect("program should analyze")
        .run(&mut NoPrint, &mut NoInput)
        .expect_err("program should fail")
        .kind()
}

// =============================================================================
// Symbols and case
// =============================================================================

/// Symbol text is lowercase-normalized by the reader; strings keep case.
#[test]
fn symbols_are_lowercased_but_strings_are_not() {
    assert_eq!(run_value("'FOO"), Object::Symbol("foo".to_owned()));
    assert_eq!(run_value("\"FOO\""), Object::String("FOO".to_owned()));
    assert_eq!(run_value("(eq? 'Foo 'foo)"), Object::Bool(true));
}

/// Identifiers are case-insensitive because the reader lowercases them.
#[test]
fn variable_references_are_case_insensitive() {
    assert_eq!(run_value("(begin (define Counter 7) COUNTER)"), Object::Int(7));
}

// =============================================================================
// Quotation details
// =============================================================================

#[test]
fn quoting_the_empty_list_yields_nil() {
    assert_eq!(run_value("'()"), Object::Nil);
    assert_eq!(run_value("(null? '())"), Object::Bool(true));
}

#[test]
fn quoted_strings_and_numbers_are_plain_values() {
    assert_eq!(run_value("'42"), Object::Int(42));
    assert_eq!(run_value("'3.5"), Object::Float(3.5));
    assert_eq!(run_value("'\"text\""), Object::String("text".to_owned()));
}

#[test]
fn nested_quotes_stay_data() {
    assert_eq!(run_display("''a"), "(quote a)");
}

#[test]
fn quasiquote_without_unquote_behaves_like_quote() {
    assert_eq!(run_display("`(1 2 3)"), "(1 2 3)");
}

// =============================================================================
// Printing corners
// =============================================================================

#[test]
fn improper_tails_print_with_a_dot() {
    assert_eq!(run_display("(cons 1 (cons 2 3))"), "(1 2 . 3)");
}

#[test]
fn printing_a_cyclic_pair_terminates() {
    // the cycle is constructed through explicit mutation; printing must
    // stop rather than hang or crash (the structure itself leaks, which
    // the dialect accepts)
    let mut print = CollectStringPrint::new();
    let runner = Runner::new(
        "(begin (define p (cons 1 2)) (set-cdr! p p) (display p) 'ok)",
        "<test>",
        vec![],
    )
    .unwrap();
    let result = runner.run(&mut print, &mut NoInput).unwrap();
    assert_eq!(result, Some(Object::Symbol("ok".to_owned())));
    assert!(print.output().ends_with("...)"), "got: {}", print.output());
}

#[test]
fn procedures_have_a_printed_form() {
    assert_eq!(run_display("car"), "<primitive-procedure car>");
    assert_eq!(
        run_display("(begin (define (f x) x) f)"),
        "<compound-procedure f>"
    );
    assert_eq!(run_display("(lambda (x) x)"), "<compound-procedure>");
}

// =============================================================================
// Sequencing and definitions
// =============================================================================

#[test]
fn begin_returns_the_last_value() {
    assert_eq!(run_value("(begin 1 2 3)"), Object::Int(3));
}

#[test]
fn a_trailing_define_produces_no_value() {
    assert_eq!(run("(begin (define x 1))"), None);
}

#[test]
fn redefinition_replaces_the_binding() {
    assert_eq!(run_value("(begin (define x 1) (define x 2) x)"), Object::Int(2));
}

#[test]
fn define_result_cannot_be_an_operand() {
    assert_eq!(run_err_kind("(+ 1 (define x 2))"), ErrorKind::TypeMismatch);
}

#[test]
fn let_initializers_see_the_outer_scope() {
    let source = "(begin (define x 10) (let ((x 1) (y x)) y))";
    assert_eq!(run_value(source), Object::Int(10));
}

// =============================================================================
// Higher-order corners
// =============================================================================

#[test]
fn procedures_are_first_class_values() {
    let source = "(begin
                    (define (twice f x) (f (f x)))
                    (twice (lambda (n) (* n n)) 3))";
    assert_eq!(run_value(source), Object::Int(81));
}

#[test]
fn builtins_pass_as_arguments() {
    let source = "(begin (include \"seq\") (map car (list (list 1 2) (list 3 4))))";
    assert_eq!(run_display(source), "(1 3)");
}

#[test]
fn errors_inside_mapped_procedures_propagate() {
    let source = "(begin (include \"seq\") (map (lambda (x) (car x)) (list 1 2)))";
    assert_eq!(run_err_kind(source), ErrorKind::TypeMismatch);
}

#[test]
fn user_errors_propagate_through_apply() {
    let source = "(apply (lambda () (error \"inner\")) nil)";
    assert_eq!(run_err_kind(source), ErrorKind::UserRaised);
}

// =============================================================================
// Heap snapshots
// =============================================================================

#[test]
fn heap_diff_reports_no_changes_between_clean_runs() {
    let runner = Runner::new("(begin (define xs (list 1 2)) (car xs))", "<test>", vec![]).unwrap();
    let (_, first) = runner.run_ref_counts(&mut NoPrint, &mut NoInput).unwrap();
    let (_, second) = runner.run_ref_counts(&mut NoPrint, &mut NoInput).unwrap();
    let diff = first.diff(&second);
    assert!(diff.is_empty(), "clean runs should match: {diff}");
    assert_eq!(diff.to_string(), "HeapDiff: no changes");
}
