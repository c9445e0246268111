//! Standard-library module tests: `(include "seq")` and
//! `(include "symbol")`.

use lilt::{CollectStringPrint, ErrorKind, NoInput, NoPrint, Object, Runner};
use pretty_assertions::assert_eq;

fn run_value(source: &str) -> Object {
    Runner::new(source, "<test>", vec![])
        .expect("program should analyze")
        .run(&mut NoPrint, &mut NoInput)
        .expect("program should run")
        .expect("program should produce a value")
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
// seq
// =============================================================================

#[test]
fn map_applies_over_the_whole_list() {
    let source = "(begin (include \"seq\") (map (lambda (x) (* x x)) (list 1 2 3 4)))";
    assert_eq!(run_display(source), "(1 4 9 16)");
}

#[test]
fn for_each_runs_for_effect_only() {
    let mut print = CollectStringPrint::new();
    let runner = Runner::new(
        "(begin (include \"seq\") (for-each display (list 1 2 3)))",
        "<test>",
        vec![],
    )
    .unwrap();
    assert_eq!(runner.run(&mut print, &mut NoInput).unwrap(), None);
    assert_eq!(print.output(), "123");
}

#[test]
fn filter_keeps_only_truthy_verdicts() {
    let source = "(begin (include \"seq\") (filter (lambda (x) (< x 3)) (list 1 5 2 7 0)))";
    assert_eq!(run_display(source), "(1 2 0)");
}

#[test]
fn sort_with_an_ascending_comparator() {
    let source = "(begin (include \"seq\") (sort (lambda (a b) (- a b)) (list 3 1 2 5 4)))";
    assert_eq!(run_display(source), "(1 2 3 4 5)");
}

#[test]
fn sort_with_a_descending_comparator() {
    let source = "(begin (include \"seq\") (sort (lambda (a b) (- b a)) (list 3 1 2)))";
    assert_eq!(run_display(source), "(3 2 1)");
}

#[test]
fn sort_of_the_empty_list() {
    let source = "(begin (include \"seq\") (sort (lambda (a b) (- a b)) nil))";
    assert_eq!(run_display(source), "nil");
}

/// The comparator is threaded as a value, so a comparator that itself
/// sorts does not corrupt the outer sort.
#[test]
fn sort_is_reentrant() {
    let source = "(begin
                    (include \"seq\")
                    (define (noisy-cmp a b)
                      (sort (lambda (x y) (- x y)) (list 2 1))
                      (- a b))
                    (sort noisy-cmp (list 3 1 2)))";
    assert_eq!(run_display(source), "(1 2 3)");
}

#[test]
fn length_counts_elements() {
    assert_eq!(run_value("(begin (include \"seq\") (length (list 1 2 3)))"), Object::Int(3));
    assert_eq!(run_value("(begin (include \"seq\") (length nil))"), Object::Int(0));
}

#[test]
fn list_ref_is_zero_based() {
    let source = "(begin (include \"seq\") (list-ref (list 10 20 30) 1))";
    assert_eq!(run_value(source), Object::Int(20));
}

#[test]
fn list_ref_out_of_range() {
    let source = "(begin (include \"seq\") (list-ref (list 10 20 30) 5))";
    assert_eq!(run_err_kind(source), ErrorKind::BadIndex);
}

#[test]
fn range_is_inclusive_of_the_last_bound() {
    assert_eq!(run_display("(begin (include \"seq\") (range 1 5))"), "(1 2 3 4 5)");
    assert_eq!(run_display("(begin (include \"seq\") (range 5 1 -2))"), "(5 3 1)");
}

#[test]
fn range_rejects_misdirected_or_inexact_steps() {
    assert_eq!(run_err_kind("(begin (include \"seq\") (range 1 5 0))"), ErrorKind::BadRange);
    assert_eq!(run_err_kind("(begin (include \"seq\") (range 5 1 1))"), ErrorKind::BadRange);
    assert_eq!(run_err_kind("(begin (include \"seq\") (range 1 4 2))"), ErrorKind::BadRange);
}

#[test]
fn append_joins_two_sequences() {
    let source = "(begin (include \"seq\") (append (list 1 2) (list 3 4)))";
    assert_eq!(run_display(source), "(1 2 3 4)");
}

#[test]
fn append_accepts_nil_on_either_side() {
    assert_eq!(run_display("(begin (include \"seq\") (append nil (list 1)))"), "(1)");
    assert_eq!(run_display("(begin (include \"seq\") (append (list 1) nil))"), "(1)");
}

#[test]
fn reverse_builds_a_fresh_list() {
    let source = "(begin (include \"seq\") (define xs (list 1 2 3)) (reverse xs) xs)";
    assert_eq!(run_display(source), "(1 2 3)");
    assert_eq!(run_display("(begin (include \"seq\") (reverse (list 1 2 3)))"), "(3 2 1)");
}

#[test]
fn list_copy_shares_elements_but_not_the_spine() {
    let source = "(begin
                    (include \"seq\")
                    (define xs (list 1 2 3))
                    (define ys (list-copy xs))
                    (set-car! ys 99)
                    xs)";
    assert_eq!(run_display(source), "(1 2 3)");
}

#[test]
fn accumulate_folds_from_the_right() {
    assert_eq!(
        run_value("(begin (include \"seq\") (accumulate + 0 (list 1 2 3)))"),
        Object::Int(6)
    );
    // cons-accumulate rebuilds the list, proving right-to-left order
    assert_eq!(
        run_display("(begin (include \"seq\") (accumulate cons nil (list 1 2 3)))"),
        "(1 2 3)"
    );
}

#[test]
fn fold_left_folds_from_the_left() {
    assert_eq!(
        run_value("(begin (include \"seq\") (fold-left - 0 (list 1 2 3)))"),
        Object::Int(-6)
    );
}

#[test]
fn improper_chains_are_rejected() {
    let source = "(begin (include \"seq\") (length (cons 1 2)))";
    assert_eq!(run_err_kind(source), ErrorKind::NotASequence);
}

// =============================================================================
// symbol
// =============================================================================

#[test]
fn symbol_converts_numbers_and_strings() {
    assert_eq!(
        run_value("(begin (include \"symbol\") (symbol 42))"),
        Object::Symbol("42".to_owned())
    );
    assert_eq!(
        run_value("(begin (include \"symbol\") (symbol \"abc\"))"),
        Object::Symbol("abc".to_owned())
    );
}

#[test]
fn symbol_append_concatenates() {
    let source = "(begin (include \"symbol\") (symbol-append 'foo '- 'bar))";
    assert_eq!(run_value(source), Object::Symbol("foo-bar".to_owned()));
}

#[test]
fn module_symbols_compare_by_text_with_source_symbols() {
    let source = "(begin (include \"symbol\") (eq? (symbol \"abc\") 'abc))";
    assert_eq!(run_value(source), Object::Bool(true));
}

#[test]
fn seq_names_are_unbound_until_included() {
    let kind = run_err_kind("(map (lambda (x) x) (list 1))");
    assert_eq!(kind, ErrorKind::UnboundVariable);
}

#[test]
fn including_a_module_twice_is_harmless() {
    let source = "(begin (include \"seq\") (include \"seq\") (length (list 1)))";
    assert_eq!(run_value(source), Object::Int(1));
}
